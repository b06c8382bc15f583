use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};

use passagedb_cli::{format_results, init_tracing, ConfigArgs};
use passagedb_retrieval::{AnswerOutcome, Query, RetrievalService};

const EXCERPT_CHARS: usize = 200;

/// Query a passage index built by the ingest pipeline.
#[derive(Parser)]
#[command(name = "passagedb", version, about)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the top-ranked passages for a query
    Query {
        query: String,
        /// Number of results; zero or negative prints nothing
        #[arg(short = 'k', long, allow_negative_numbers = true)]
        top_k: Option<i64>,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the model-ready context block for a query
    Context {
        query: String,
        #[arg(short = 'k', long, allow_negative_numbers = true)]
        top_k: Option<i64>,
        #[arg(long)]
        max_chars: Option<usize>,
    },
    /// Answer a query; without an answer model this lists the sources
    Ask {
        query: String,
        #[arg(short = 'k', long, allow_negative_numbers = true)]
        top_k: Option<i64>,
    },
    /// Load the index and print generation info
    Status,
    /// Read queries from stdin; `:reload`, `:status` and `:quit` are commands
    Repl {
        #[arg(short = 'k', long, allow_negative_numbers = true)]
        top_k: Option<i64>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = cli.config.settings()?;
    let service = RetrievalService::from_settings(&settings, &cli.config.config_dir);
    service.reload()?;
    let default_k = settings.retrieval.top_k as i64;

    match cli.command {
        Command::Query { query, top_k, json } => {
            let results = service.retrieve(Query::Text(&query), top_k.unwrap_or(default_k))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else if results.is_empty() {
                println!("No results.");
            } else {
                print!("{}", format_results(&results, EXCERPT_CHARS));
            }
        }
        Command::Context { query, top_k, max_chars } => {
            let block = service.retrieve_context(Query::Text(&query), top_k, max_chars)?;
            print!("{}", block.text);
            eprintln!("{} of {} passages fit", block.included, block.passages.len());
        }
        Command::Ask { query, top_k } => {
            let sources = service.retrieve(Query::Text(&query), top_k.unwrap_or(default_k))?;
            let outcome = AnswerOutcome::from_model(Err::<String, _>("no answer model configured"), sources);
            println!("{}", outcome.text());
        }
        Command::Status => {
            println!("{}", serde_json::to_string_pretty(&service.status())?);
        }
        Command::Repl { top_k } => repl(&service, top_k.unwrap_or(default_k))?,
    }
    Ok(())
}

fn repl(service: &RetrievalService, top_k: i64) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        match line.trim() {
            "" => {}
            ":quit" | ":q" => break,
            ":reload" => match service.reload() {
                Ok(info) => writeln!(stdout, "generation {} ({} passages, {})", info.generation, info.passages, info.strategy)?,
                Err(e) => writeln!(stdout, "reload failed, still serving the previous generation: {e}")?,
            },
            ":status" => writeln!(stdout, "{}", serde_json::to_string(&service.status())?)?,
            query => match service.retrieve(Query::Text(query), top_k) {
                Ok(results) if results.is_empty() => writeln!(stdout, "No results.")?,
                Ok(results) => write!(stdout, "{}", format_results(&results, EXCERPT_CHARS))?,
                Err(e) => writeln!(stdout, "error: {e}")?,
            },
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}
