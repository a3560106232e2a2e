use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::cli::ProviderKind;
use crate::wire::CompletionRequest;

pub mod openai;
pub mod anthropic;
pub mod ollama;

/// A chat-completion endpoint: role-tagged messages in, generated text out.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn complete(&self, req: &CompletionRequest, debug: bool) -> Result<String>;

    fn name(&self) -> &'static str;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

/// Environment variable holding the credential for `kind`, if it needs one.
pub fn api_key_var(kind: ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::OpenAI => Some("OPENAI_API_KEY"),
        ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
        ProviderKind::Ollama => None,
    }
}

/// Builds the provider, reading its API key up front so a missing credential
/// stops the program before any input is processed.
pub fn make_provider(kind: ProviderKind, api_base: Option<String>) -> Result<DynProvider> {
    let api_key = match api_key_var(kind) {
        Some(var) => {
            let key = std::env::var(var).map_err(|_| anyhow!("{var} env var is not set"))?;
            if key.trim().is_empty() {
                return Err(anyhow!("{var} env var is empty"));
            }
            Some(key)
        }
        None => None,
    };
    make_provider_with_key(kind, api_key, api_base)
}

pub fn make_provider_with_key(
    kind: ProviderKind,
    api_key: Option<String>,
    api_base: Option<String>,
) -> Result<DynProvider> {
    let key = || api_key.clone().ok_or_else(|| anyhow!("no API key for {kind:?}"));
    match kind {
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(
            key()?,
            api_base.unwrap_or_else(|| openai::DEFAULT_API_BASE.to_string()),
        ))),
        ProviderKind::Anthropic => Ok(Box::new(anthropic::Anthropic::new(
            key()?,
            api_base.unwrap_or_else(|| anthropic::DEFAULT_API_BASE.to_string()),
        ))),
        ProviderKind::Ollama => Ok(Box::new(ollama::Ollama::new(
            api_base.unwrap_or_else(|| ollama::DEFAULT_URL.to_string()),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_needs_no_key() {
        assert_eq!(api_key_var(ProviderKind::Ollama), None);
        let p = make_provider_with_key(ProviderKind::Ollama, None, None).unwrap();
        assert_eq!(p.name(), "ollama");
    }

    #[test]
    fn hosted_providers_require_a_key() {
        assert!(make_provider_with_key(ProviderKind::OpenAI, None, None).is_err());
        assert!(make_provider_with_key(ProviderKind::Anthropic, None, None).is_err());
        let p = make_provider_with_key(ProviderKind::OpenAI, Some("sk-test".into()), None).unwrap();
        assert_eq!(p.name(), "openai");
    }
}
