use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::wire::{GenerationRequest, Platform, Variant};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
    Anthropic,
    Ollama,
}

impl ProviderKind {
    /// Model used when neither the config file nor `--model` names one.
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "gpt-3.5-turbo",
            ProviderKind::Anthropic => "claude-3-5-haiku-latest",
            ProviderKind::Ollama => "llama3.1",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name="sns_postgen", version, about="Analyse a social media account's tone and draft six posts for a given date")]
pub struct Args {
    /// Social media account URL to write for
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long, value_enum, default_value_t = Platform::X)]
    pub platform: Platform,

    /// Planned posting date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Reference site for products and campaigns
    #[arg(long)]
    pub secondary_url: Option<String>,

    /// Extra free-text requirements (campaign info, tone tweaks, ...)
    #[arg(long)]
    pub note: Option<String>,

    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    /// Language the tone description and posts are written in
    #[arg(long)]
    pub language: Option<String>,

    #[arg(long)]
    pub config: Option<String>,

    #[arg(long)]
    pub artifacts_dir: Option<String>,

    #[arg(long, default_value_t = false)]
    pub save_request: bool,

    #[arg(long, default_value_t = false)]
    pub save_response: bool,

    /// Keep the session open and offer to regenerate after each result
    #[arg(long, default_value_t = false)]
    pub interactive: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Args {
    /// Validated request for `url` under `variant`. The date defaults to `today`.
    pub fn build_request(
        &self,
        variant: Variant,
        url: &str,
        today: NaiveDate,
    ) -> Result<GenerationRequest, PipelineError> {
        GenerationRequest::new(
            variant,
            url,
            self.platform,
            self.secondary_url.as_deref(),
            self.date.unwrap_or(today),
            self.note.as_deref(),
            today,
        )
    }
}
