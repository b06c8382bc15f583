//! Configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`__` separates nested keys, e.g. `APP_RETRIEVAL__TOP_K`).

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
    /// Load from the current directory using `RUST_ENV` (default `dev`).
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_from(Path::new("."), &env_name)
    }

    pub fn load_from(base_dir: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(base_dir.join("config.toml")));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file(base_dir.join("config.dev.toml"))),
            "prod" | "production" => figment = figment.merge(Toml::file(base_dir.join("config.prod.toml"))),
            "test" | "testing" => figment = figment.merge(Toml::file(base_dir.join("config.test.toml"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Ok(Self { figment })
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed settings with defaults filled in and ranges validated.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(self.figment.clone())
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

/// Which ranking strategy a deployment serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Dense,
    Lexical,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dense => f.write_str("dense"),
            Self::Lexical => f.write_str("lexical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Deterministic feature hashing, for development and tests.
    Hashing,
    /// No embedder; dense deployments must be queried with vectors.
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub index: IndexSettings,
    pub retrieval: RetrievalSettings,
    pub bm25: Bm25Settings,
    pub embedding: EmbeddingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub dir: String,
    pub strategy: Strategy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Settings {
    pub k1: f32,
    pub b: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: EmbeddingProvider,
    pub dimension: usize,
}

impl Default for IndexSettings {
    fn default() -> Self { Self { dir: "data/index".to_string(), strategy: Strategy::Dense } }
}

impl Default for RetrievalSettings {
    fn default() -> Self { Self { top_k: 5, max_context_chars: 12_000 } }
}

impl Default for Bm25Settings {
    fn default() -> Self { Self { k1: 1.5, b: 0.75 } }
}

impl Default for EmbeddingSettings {
    fn default() -> Self { Self { provider: EmbeddingProvider::Hashing, dimension: 384 } }
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.index.dir.trim().is_empty() {
            return Err(Error::InvalidConfig("index.dir must not be empty".into()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::InvalidConfig("retrieval.top_k must be at least 1".into()));
        }
        if self.retrieval.max_context_chars == 0 {
            return Err(Error::InvalidConfig("retrieval.max_context_chars must be at least 1".into()));
        }
        if !(self.bm25.k1 >= 0.0 && self.bm25.k1.is_finite()) {
            return Err(Error::InvalidConfig(format!("bm25.k1 must be a finite value >= 0, got {}", self.bm25.k1)));
        }
        if !(0.0..=1.0).contains(&self.bm25.b) {
            return Err(Error::InvalidConfig(format!("bm25.b must be within [0, 1], got {}", self.bm25.b)));
        }
        if self.embedding.provider == EmbeddingProvider::Hashing && self.embedding.dimension == 0 {
            return Err(Error::InvalidConfig("embedding.dimension must be at least 1".into()));
        }
        Ok(())
    }

    /// Index directory after `~`/`${VAR}` expansion, relative to `base`.
    pub fn index_dir(&self, base: &Path) -> PathBuf { resolve_with_base(base, &self.index.dir) }
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
