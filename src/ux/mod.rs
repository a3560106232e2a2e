use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::time::Duration;

use crate::errors::PipelineError;
use crate::wire::{GenerationRequest, PostBatch, ToneProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountLevel {
    Comfortable,
    NearLimit,
    OverLimit,
}

/// Green up to 80% of the limit, yellow up to the limit, red past it.
pub fn count_level(count: usize, limit: usize) -> CountLevel {
    if count > limit {
        CountLevel::OverLimit
    } else if count * 5 > limit * 4 {
        CountLevel::NearLimit
    } else {
        CountLevel::Comfortable
    }
}

fn count_label(count: usize, limit: usize) -> String {
    let text = format!("{count}/{limit}");
    match count_level(count, limit) {
        CountLevel::Comfortable => text.green().to_string(),
        CountLevel::NearLimit => text.yellow().to_string(),
        CountLevel::OverLimit => text.red().bold().to_string(),
    }
}

pub fn show_request(req: &GenerationRequest) {
    println!("\n{}", "=== SNS POST GENERATOR ===".bold());
    println!("  account:  {}", req.account_url());
    println!("  platform: {}", req.platform().label());
    println!("  date:     {}", req.post_date().format("%Y-%m-%d"));
    if let Some(s) = req.secondary_url() {
        println!("  reference: {}", s);
    }
    if let Some(n) = req.user_note() {
        println!("  note:     {}", n);
    }
    println!();
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

pub fn show_tone(tone: &ToneProfile) {
    println!("\n{}", "=== TONE & MANNER ===".bold());
    println!("{}", indent(&tone.description, 2).cyan());
    println!();
}

pub fn show_batch(batch: &PostBatch, limit: usize) {
    println!("{}", "=== GENERATED POSTS ===".bold());
    for (i, draft) in batch.iter().enumerate() {
        println!(
            "\n{}. {}  [{}]",
            i + 1,
            draft.title.magenta().bold(),
            count_label(draft.char_count(), limit)
        );
        println!("{}", indent(&draft.content, 4));
    }
    println!();
}

pub fn show_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("{}", "Warnings:".yellow().bold());
    for w in warnings {
        println!(" - {}", w);
    }
    println!();
}

pub fn show_error(err: &PipelineError) {
    eprintln!("{} {}", "error:".red().bold(), err);
    if matches!(err, PipelineError::Format(_) | PipelineError::Shape(_)) {
        eprintln!("{}", "The model reply could not be used. Submit again to retry.".dimmed());
    }
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

/// Reads one line from stdin; None on EOF or a blank answer.
pub fn ask(prompt: &str) -> Option<String> {
    print!("{}: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    match io::stdin().read_line(&mut s) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
    }
}

fn indent(s: &str, n: usize) -> String {
    let pad = " ".repeat(n);
    s.lines()
        .map(|l| format!("{}{}", pad, l))
        .collect::<Vec<_>>()
        .join("\n")
}
