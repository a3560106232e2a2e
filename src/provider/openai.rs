use async_trait::async_trait;
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::wire::CompletionRequest;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

/// OpenAI chat completions. Messages are forwarded as-is with their roles.
pub struct OpenAIProvider {
    api_key: String,
    api_base: String,
    client: Client,
}

impl OpenAIProvider {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self {
            api_key,
            api_base,
            client: Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

pub(crate) fn parse_chat_response(text: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(text)
        .map_err(|e| anyhow!("Failed to parse OpenAI response: {e}\nRaw: {text}"))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .ok_or_else(|| anyhow!("OpenAI: empty choices"))
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    async fn complete(&self, req: &CompletionRequest, debug: bool) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        let body = json!({
            "model": req.model,
            "messages": req.messages,
            "temperature": req.temperature,
            "max_tokens": req.max_tokens,
        });

        if debug {
            eprintln!(
                "debug[openai]: HTTP POST {} body:\n{}",
                url,
                serde_json::to_string_pretty(&body)?
            );
        }

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(req.timeout)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;

        if debug {
            eprintln!("debug[openai]: raw status: {}", status);
            eprintln!("debug[openai]: raw response:\n{}", &text);
        }

        if !status.is_success() {
            return Err(anyhow!("OpenAI API error ({}): {}", status, text));
        }

        parse_chat_response(&text)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
