use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::PipelineError;

/// Ways of locating a JSON payload inside free-form model text, in the order
/// they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Contents of the first ```` ```json ```` fence.
    TaggedFence,
    /// Contents of the first fence of any kind.
    GenericFence,
    /// The whole reply.
    Raw,
    /// The first balanced `[...]` or `{...}` span in the reply.
    Bracketed,
}

impl Strategy {
    pub const ORDER: [Strategy; 4] = [
        Strategy::TaggedFence,
        Strategy::GenericFence,
        Strategy::Raw,
        Strategy::Bracketed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::TaggedFence => "json fence",
            Strategy::GenericFence => "code fence",
            Strategy::Raw => "raw reply",
            Strategy::Bracketed => "bracketed span",
        }
    }

    /// Candidate payload for this strategy, or None if the strategy does not apply.
    pub fn payload(self, text: &str) -> Option<&str> {
        match self {
            Strategy::TaggedFence => capture(tagged_fence(), text),
            Strategy::GenericFence => capture(generic_fence(), text),
            Strategy::Raw => Some(text.trim()).filter(|s| !s.is_empty()),
            Strategy::Bracketed => first_balanced_span(text),
        }
    }
}

fn tagged_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // An unclosed fence runs to the end of the reply (truncated output).
    RE.get_or_init(|| Regex::new(r"(?is)```json\s*(.*?)(?:```|\z)").expect("static regex"))
}

fn generic_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*\s*(.*?)(?:```|\z)").expect("static regex"))
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
}

/// Try each strategy in order; the first payload that parses wins.
///
/// `Bracketed` only runs when the reply has no fence, so stray brackets in
/// prose around a broken fence never stand in for the fenced payload. On
/// failure the diagnostic comes from the most specific candidate: the fence
/// when there is one, else the bracketed span, else the raw reply.
pub fn extract_with_strategy(text: &str) -> Result<(Strategy, Value), PipelineError> {
    let fenced = Strategy::TaggedFence.payload(text).is_some()
        || Strategy::GenericFence.payload(text).is_some();
    let mut failures: Vec<(Strategy, String)> = Vec::new();
    for strategy in Strategy::ORDER {
        if strategy == Strategy::Bracketed && fenced {
            continue;
        }
        let Some(payload) = strategy.payload(text) else {
            continue;
        };
        match serde_json::from_str::<Value>(payload) {
            Ok(v) => return Ok((strategy, v)),
            Err(e) => failures.push((strategy, e.to_string())),
        }
    }
    let reported = failures
        .iter()
        .find(|(s, _)| *s != Strategy::Raw)
        .or_else(|| failures.first());
    Err(PipelineError::Format(match reported {
        Some((strategy, msg)) => format!("{msg} (from {})", strategy.name()),
        None => "empty reply".to_string(),
    }))
}

pub fn extract_json(text: &str) -> Result<Value, PipelineError> {
    extract_with_strategy(text).map(|(_, v)| v)
}

/// Extracts the first top-level `[...]` or `{...}` substring.
/// Brackets inside JSON strings are skipped; returns None if nothing balances.
fn first_balanced_span(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let start = bytes.iter().position(|&b| b == b'[' || b == b'{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&s[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
