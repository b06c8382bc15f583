//! Shared plumbing for the passagedb binaries.

use anyhow::Context;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use passagedb_core::config::{Config, Settings, Strategy};
use passagedb_core::types::RetrievedPassage;
use passagedb_retrieval::context::provenance;

/// Log to stderr, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Dense,
    Lexical,
}

impl From<StrategyArg> for Strategy {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Dense => Strategy::Dense,
            StrategyArg::Lexical => Strategy::Lexical,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Directory holding config.toml and config.<env>.toml
    #[arg(long, env = "PASSAGEDB_CONFIG_DIR", default_value = ".")]
    pub config_dir: PathBuf,

    /// Selects config.<env>.toml
    #[arg(long = "env", env = "RUST_ENV", default_value = "dev")]
    pub env_name: String,

    /// Overrides index.dir
    #[arg(long)]
    pub index_dir: Option<String>,

    /// Overrides index.strategy
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,
}

impl ConfigArgs {
    /// Merged, validated settings with command-line overrides applied.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let config = Config::load_from(&self.config_dir, &self.env_name)
            .with_context(|| format!("loading configuration from {}", self.config_dir.display()))?;
        let mut settings = config.settings()?;
        if let Some(dir) = &self.index_dir { settings.index.dir = dir.clone(); }
        if let Some(strategy) = self.strategy { settings.index.strategy = strategy.into(); }
        settings.validate()?;
        Ok(settings)
    }
}

/// One numbered entry per result: rank, score, id and provenance, then an
/// excerpt of the text.
pub fn format_results(results: &[RetrievedPassage], excerpt_chars: usize) -> String {
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        let excerpt: String = r.text.chars().take(excerpt_chars).collect();
        let ellipsis = if r.text.chars().count() > excerpt_chars { "…" } else { "" };
        out.push_str(&format!("{:>2}. {:.4}  {}  {}\n    {}{}\n", i + 1, r.score, r.id, provenance(r), excerpt, ellipsis));
    }
    out
}
