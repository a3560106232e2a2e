use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::wire::{CompletionRequest, Role};
use super::Provider;

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct Anthropic {
    api_key: String,
    api_base: String,
    client: Client,
}

impl Anthropic {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self { api_key, api_base, client: Client::new() }
    }
}

#[derive(Serialize)]
struct MsgRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Msg<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MsgResponse {
    content: Vec<Block>,
}

#[derive(Deserialize)]
struct Block {
    #[serde(default)]
    text: String,
    #[serde(default)]
    r#type: String,
}

/// The messages API takes the system prompt as a top-level field, not a message.
fn split_messages(req: &CompletionRequest) -> (Option<String>, Vec<Msg<'_>>) {
    let system: Vec<&str> = req
        .messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();
    let rest = req
        .messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| Msg { role: "user", content: &m.content })
        .collect();
    let system = if system.is_empty() { None } else { Some(system.join("\n\n")) };
    (system, rest)
}

pub(crate) fn parse_msg_response(text: &str) -> Result<String> {
    let parsed: MsgResponse = serde_json::from_str(text)
        .map_err(|e| anyhow!("anthropic response parse error: {}", e))?;

    parsed
        .content
        .into_iter()
        .find(|b| b.r#type == "text" || !b.text.is_empty())
        .map(|b| b.text.trim().to_string())
        .ok_or_else(|| anyhow!("anthropic: empty content"))
}

#[async_trait]
impl Provider for Anthropic {
    async fn complete(&self, req: &CompletionRequest, debug: bool) -> Result<String> {
        let url = format!("{}/v1/messages", self.api_base.trim_end_matches('/'));
        let (system, messages) = split_messages(req);
        let body = MsgRequest {
            model: &req.model,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
            messages,
            system,
        };

        if debug {
            eprintln!("debug/anthropic: POST {}", url);
        }

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .timeout(req.timeout)
            .json(&body)
            .send()
            .await
            .context("anthropic request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("anthropic read body failed")?;
        if debug {
            eprintln!("debug/anthropic: raw body:\n{}\n", text);
        }
        if !status.is_success() {
            return Err(anyhow!("Anthropic API error ({}): {}", status, text));
        }

        parse_msg_response(&text)
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Message;
    use std::time::Duration;

    #[test]
    fn system_prompt_moves_to_top_level() {
        let req = CompletionRequest {
            model: "claude".into(),
            messages: vec![Message::system("persona"), Message::user("question")],
            temperature: 0.7,
            max_tokens: 500,
            timeout: Duration::from_secs(30),
        };
        let (system, msgs) = split_messages(&req);
        assert_eq!(system.as_deref(), Some("persona"));
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].content, "question");
    }

    #[test]
    fn picks_text_block() {
        let body = r#"{"content":[{"type":"text","text":"calm and witty"}]}"#;
        assert_eq!(parse_msg_response(body).unwrap(), "calm and witty");
        assert!(parse_msg_response(r#"{"content":[]}"#).is_err());
    }
}
