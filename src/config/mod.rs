use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::cli::{Args, ProviderKind};
use crate::wire::Variant;

/// Sampling settings for one of the two model calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl StageConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self { temperature: 0.7, max_tokens: 500, timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: String,
    pub provider: ProviderKind,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub variant: Variant,
    /// Natural language the tone description and posts are written in.
    pub language: String,
    pub tone: StageConfig,
    pub generation: StageConfig,
    pub artifacts_dir: String,
    pub save_request: bool,
    pub save_response: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: "2025-06-01".into(),
            provider: ProviderKind::OpenAI,
            model: ProviderKind::OpenAI.default_model().into(),
            api_base: None,
            variant: Variant::Generic,
            language: "Japanese".into(),
            tone: StageConfig::default(),
            generation: StageConfig { temperature: 0.8, max_tokens: 2000, timeout_secs: 60 },
            artifacts_dir: ".postgen/runs".into(),
            save_request: false,
            save_response: false,
        }
    }
}

impl Config {
    /// Defaults, overlaid with the TOML file at `path` when given.
    /// Tables merge key by key, so a partial `[generation]` section keeps the
    /// generation defaults for the keys it leaves out.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(p) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(p)?;
        let file: toml::Value = toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", p.display()))?;
        let mut merged = toml::Value::try_from(Self::default())
            .context("failed to serialize default config")?;
        let names_model = file.get("model").is_some();
        merge(&mut merged, file);
        let mut cfg = merged
            .try_into::<Config>()
            .with_context(|| format!("invalid config file {}", p.display()))?;
        if !names_model {
            cfg.model = cfg.provider.default_model().to_string();
        }
        Ok(cfg)
    }

    /// Command-line flags win over the file. Switching provider without
    /// `--model` also switches the model, unless the file chose one.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(p) = args.provider {
            if args.model.is_none() && self.model == self.provider.default_model() {
                self.model = p.default_model().to_string();
            }
            self.provider = p;
        }
        if let Some(m) = &args.model {
            self.model = m.clone();
        }
        if let Some(v) = args.variant {
            self.variant = v;
        }
        if let Some(l) = &args.language {
            self.language = l.clone();
        }
        if let Some(dir) = &args.artifacts_dir {
            self.artifacts_dir = dir.clone();
        }
        self.save_request |= args.save_request;
        self.save_response |= args.save_response;
    }
}

fn merge(base: &mut toml::Value, over: toml::Value) {
    match (base, over) {
        (toml::Value::Table(b), toml::Value::Table(o)) => {
            for (k, v) in o {
                match b.get_mut(&k) {
                    Some(existing) => merge(existing, v),
                    None => {
                        b.insert(k, v);
                    }
                }
            }
        }
        (b, o) => *b = o,
    }
}
