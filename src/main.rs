//! # askme CLI
//!
//! ```bash
//! askme --config ./config/askme.toml serve          # build the index and serve HTTP
//! askme ask "What is your experience with Essbase?" # answer once, print JSON
//! askme chunks --preview 3                          # inspect chunking, no network
//! ```
//!
//! Logs go to stderr and honour `RUST_LOG` (default `info`, or `debug`
//! with `--verbose`). Command output goes to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use askme::chunk::Chunker;
use askme::config;
use askme::corpus::load_corpus;
use askme::pipeline::build_from_config;
use askme::qa::snippet;
use askme::server::{run_server, AppState};

/// askme — answer questions about a profile from its own documents.
#[derive(Parser)]
#[command(name = "askme", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Missing file means defaults.
    #[arg(long, global = true, default_value = "./config/askme.toml")]
    config: PathBuf,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and start the HTTP server.
    ///
    /// Binds to `[server].bind`; the `PORT` environment variable overrides
    /// the port.
    Serve,

    /// Build the index, answer one question, and print the JSON response.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Load and chunk the corpus without embedding anything.
    Chunks {
        /// Print the first N chunks.
        #[arg(long, default_value_t = 0)]
        preview: usize,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            let port = std::env::var("PORT").ok();
            let bind = cfg.server.bind_with_port(port.as_deref())?;
            let (qa, stats) = build_from_config(&cfg).await?;
            run_server(AppState::new(qa, stats), &bind).await?;
        }
        Commands::Ask { question } => {
            let (qa, _) = build_from_config(&cfg).await?;
            let response = qa.ask(&question).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Chunks { preview } => {
            let corpus = load_corpus(&cfg.corpus)?;
            let chunker = Chunker::new(cfg.chunking.chunk_size, cfg.chunking.chunk_overlap)?;
            let chunks = chunker.split(&corpus.text);

            println!("chunks");
            println!("  sources: {}", corpus.sources.len());
            println!("  placeholder corpus: {}", corpus.placeholder);
            println!("  corpus chars: {}", corpus.text.chars().count());
            println!("  chunk_size / overlap: {} / {}", chunker.chunk_size(), chunker.chunk_overlap());
            println!("  chunks: {}", chunks.len());
            for c in chunks.iter().take(preview) {
                println!(
                    "  [{}] @{} ({} chars) {:?}",
                    c.index,
                    c.start,
                    c.char_len(),
                    snippet(&c.text, 80)
                );
            }
        }
    }

    Ok(())
}
