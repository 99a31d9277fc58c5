use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::prompt::PromptOpts;
use crate::sampler::SampleOpts;

/// Knobs for the aggregation/sampling/prompt pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub sample_cap: usize,
    pub recurring_threshold: usize,
    pub top_category_limit: usize,
    pub per_cluster_samples: usize,
    pub backfill_below: usize,
    pub max_description_chars: usize,
    pub target_words_min: usize,
    pub target_words_max: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_cap: 100,
            recurring_threshold: 3,
            top_category_limit: 5,
            per_cluster_samples: 3,
            backfill_below: 10,
            max_description_chars: 500,
            target_words_min: 1500,
            target_words_max: 2500,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the TOML file at `path` if given, then `INSPECTION_*`
    /// variables from `lookup`, then `overrides`. The result is validated.
    pub fn load<F>(path: Option<&Path>, lookup: F, overrides: &ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env_from(lookup)?;
        cfg.apply_overrides(overrides);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn apply_overrides(&mut self, o: &ConfigOverrides) {
        if let Some(v) = o.sample_cap { self.sample_cap = v; }
        if let Some(v) = o.recurring_threshold { self.recurring_threshold = v; }
        if let Some(v) = o.top_category_limit { self.top_category_limit = v; }
        if let Some(v) = o.per_cluster_samples { self.per_cluster_samples = v; }
        if let Some(v) = o.backfill_below { self.backfill_below = v; }
    }

    /// Applies `INSPECTION_*` overrides read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&'static str, &mut usize); 5] = [
            ("INSPECTION_SAMPLE_CAP", &mut self.sample_cap),
            ("INSPECTION_CLUSTER_THRESHOLD", &mut self.recurring_threshold),
            ("INSPECTION_TOP_CATEGORIES", &mut self.top_category_limit),
            ("INSPECTION_PER_CLUSTER", &mut self.per_cluster_samples),
            ("INSPECTION_BACKFILL_BELOW", &mut self.backfill_below),
        ];
        for (var, slot) in fields {
            if let Some(raw) = lookup(var) {
                *slot = parse_env(var, &raw)?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let minimums = [
            ("sample_cap", self.sample_cap, 1),
            ("recurring_threshold", self.recurring_threshold, 1),
            ("top_category_limit", self.top_category_limit, 1),
        ];
        for (field, value, min) in minimums {
            if value < min {
                return Err(ConfigError::TooSmall { field, min });
            }
        }
        if self.target_words_min > self.target_words_max {
            return Err(ConfigError::InvertedWordRange {
                min: self.target_words_min,
                max: self.target_words_max,
            });
        }
        Ok(())
    }

    pub fn sample_opts(&self) -> SampleOpts {
        SampleOpts {
            cap: self.sample_cap,
            per_cluster: self.per_cluster_samples,
            backfill_below: self.backfill_below,
        }
    }

    pub fn prompt_opts(&self) -> PromptOpts {
        PromptOpts {
            max_description_chars: self.max_description_chars,
            target_words_min: self.target_words_min,
            target_words_max: self.target_words_max,
        }
    }
}

/// Explicit per-run values, typically from command-line flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub sample_cap: Option<usize>,
    pub recurring_threshold: Option<usize>,
    pub top_category_limit: Option<usize>,
    pub per_cluster_samples: Option<usize>,
    pub backfill_below: Option<usize>,
}

/// Settings for the chat-completions client.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GeneratorConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingEnv("OPENAI_API_KEY"))?;
        let base_url = lookup("OPENAI_BASE_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());
        let model = lookup("INSPECTION_MODEL").unwrap_or_else(|| Self::DEFAULT_MODEL.to_string());
        let timeout_secs = match lookup("INSPECTION_TIMEOUT_SECS") {
            Some(v) => parse_env("INSPECTION_TIMEOUT_SECS", &v)?,
            None => 60,
        };
        let max_tokens = match lookup("INSPECTION_MAX_TOKENS") {
            Some(v) => parse_env("INSPECTION_MAX_TOKENS", &v)?,
            None => 4000,
        };
        let temperature = match lookup("INSPECTION_TEMPERATURE") {
            Some(v) => parse_env("INSPECTION_TEMPERATURE", &v)?,
            None => 0.3,
        };
        Ok(Self { api_key, base_url, model, timeout_secs, max_tokens, temperature })
    }
}

fn parse_env<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidEnv { var, value: raw.to_string() })
}
