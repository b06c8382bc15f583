use std::time::Instant;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use passagedb_cli::{init_tracing, ConfigArgs};
use passagedb_core::artifacts::ArtifactLayout;
use passagedb_core::PassageStore;
use passagedb_text::artifact::{tokenize_passages, write_token_sequences};
use passagedb_text::PassageTokenizer;

/// Tokenize metadata.jsonl into the lexical artifact (bm25_tokens.json).
#[derive(Parser)]
#[command(name = "passagedb-tokens", version, about)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.config.settings()?;
    let layout = ArtifactLayout::new(settings.index_dir(&cli.config.config_dir));
    let started = Instant::now();

    let store = PassageStore::load(&layout.metadata())?;
    let tokenizer = PassageTokenizer::new()?;
    let pb = ProgressBar::new(store.len() as u64);
    pb.set_style(ProgressStyle::default_bar().template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} passages ({percent}%) {msg}")?.progress_chars("#>-"));
    let sequences = tokenize_passages(pb.wrap_iter(store.iter()), &tokenizer);
    pb.finish_with_message("tokenized");
    let total_tokens: usize = sequences.iter().map(Vec::len).sum();

    write_token_sequences(&layout.lexical_tokens(), &sequences)?;
    tracing::info!(passages = sequences.len(), tokens = total_tokens, elapsed_ms = started.elapsed().as_millis() as u64, "wrote lexical artifact");
    println!("Wrote {} ({} passages, {} tokens)", layout.lexical_tokens().display(), sequences.len(), total_tokens);
    Ok(())
}
