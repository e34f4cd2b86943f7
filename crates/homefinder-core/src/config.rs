//! Lightweight configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_LOOKUP__API_KEY`). Every section has
//! defaults, so a missing file yields a working configuration.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
        Ok(config)
    }

    /// Wraps an explicit figment; defaults are layered underneath it.
    pub fn from_figment(figment: Figment) -> Self {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(figment);
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        let settings = self.settings()?;
        if matches!(env, "prod" | "production") && settings.lookup.enabled && settings.lookup.api_key.is_none() {
            tracing::warn!("generative lookup is enabled without an API key; fallback searches will return nothing");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub catalog: CatalogSettings,
    pub matcher: MatcherSettings,
    pub resolver: ResolverSettings,
    pub lookup: LookupSettings,
    pub voice: VoiceSettings,
    pub session: SessionSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.matcher.low_tier_threshold >= self.matcher.high_tier_threshold {
            return Err(Error::InvalidConfig(format!(
                "matcher.low_tier_threshold ({}) must be below matcher.high_tier_threshold ({})",
                self.matcher.low_tier_threshold, self.matcher.high_tier_threshold
            )));
        }
        if self.resolver.max_results == 0 {
            return Err(Error::InvalidConfig("resolver.max_results must be at least 1".into()));
        }
        if self.resolver.narrated_results > self.resolver.max_results {
            return Err(Error::InvalidConfig(format!(
                "resolver.narrated_results ({}) exceeds resolver.max_results ({})",
                self.resolver.narrated_results, self.resolver.max_results
            )));
        }
        if !(0.0..=1.0).contains(&self.voice.volume) {
            return Err(Error::InvalidConfig(format!("voice.volume must be within 0..=1, got {}", self.voice.volume)));
        }
        Ok(())
    }
}

/// Where the catalog comes from. `dir` holds `*.json` files; when unset the
/// built-in catalog is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogSettings {
    pub dir: Option<String>,
}

impl CatalogSettings {
    pub fn resolved_dir(&self, base: &Path) -> Option<PathBuf> {
        self.dir.as_deref().map(|d| resolve_with_base(base, d))
    }
}

/// How the location, price and type tiers combine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TierMode {
    #[default]
    Union,
    Narrow,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatcherSettings {
    pub high_tier_threshold: u64,
    pub low_tier_threshold: u64,
    pub keyword_limit: usize,
    pub tier_mode: TierMode,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self { high_tier_threshold: 5_000_000, low_tier_threshold: 2_000_000, keyword_limit: 5, tier_mode: TierMode::Union }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResolverSettings {
    pub max_results: usize,
    pub narrated_results: usize,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self { max_results: 5, narrated_results: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LookupSettings {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    pub max_properties: usize,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-3.5-turbo".to_string(),
            api_key: None,
            max_tokens: 600,
            max_properties: 3,
            timeout_secs: 20,
            retries: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VoiceSettings {
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
    /// Keep recognizing after a final result instead of ending the session.
    pub continuous: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language: "en-GB".to_string(),
            rate: 0.9,
            pitch: 1.0,
            volume: 1.0,
            continuous: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionSettings {
    pub turn_timeout_secs: u64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self { turn_timeout_secs: 45 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
