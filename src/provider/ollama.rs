use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::wire::{CompletionRequest, Message};
use super::Provider;

pub const DEFAULT_URL: &str = "http://localhost:11434";

pub struct Ollama {
    url: String,
    client: Client,
}

impl Ollama {
    pub fn new(url: String) -> Self {
        Self { url, client: Client::new() }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: MsgOut,
}

#[derive(Deserialize)]
struct MsgOut {
    content: String,
}

/// Reply text from a non-streaming `/api/chat` body.
pub(crate) fn parse_chat_response(text: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(text)
        .map_err(|e| anyhow!("ollama response parse error: {e}\nRaw: {text}"))?;
    Ok(parsed.message.content.trim().to_string())
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, req: &CompletionRequest, debug: bool) -> Result<String> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = ChatRequest {
            model: &req.model,
            messages: &req.messages,
            stream: false,
            options: OllamaOptions {
                temperature: req.temperature,
                num_predict: req.max_tokens,
            },
        };

        if debug {
            eprintln!("debug/ollama: POST {}", url);
        }

        let resp = self
            .client
            .post(&url)
            .timeout(req.timeout)
            .json(&body)
            .send()
            .await
            .context("ollama request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("ollama read body failed")?;

        if debug {
            eprintln!("debug/ollama: raw body:\n{}\n", text);
        }
        if !status.is_success() {
            return Err(anyhow!("ollama error ({}): {}", status, text));
        }

        parse_chat_response(&text)
    }

    fn name(&self) -> &'static str {
        "ollama"
    }
}
