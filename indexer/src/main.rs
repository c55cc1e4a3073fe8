use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use trecdex_core::Normalization;
use trecdex_indexer::build_index;

#[derive(Parser)]
#[command(name = "trecdex-indexer")]
#[command(about = "Build an inverted index over a tagged newswire corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a fresh index from a corpus file (plain or .gz) or directory
    Build {
        /// Corpus file or directory
        #[arg(long)]
        input: PathBuf,
        /// Index destination; must not exist yet
        #[arg(long)]
        output: PathBuf,
        /// Stem tokens before indexing
        #[arg(long, default_value_t = false)]
        stem: bool,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, stem } => {
            let start = std::time::Instant::now();
            let summary = build_index(&input, &output, Normalization::from_stem_flag(stem))?;
            tracing::info!(
                num_docs = summary.num_docs,
                num_terms = summary.num_terms,
                took_s = start.elapsed().as_secs_f64(),
                "done"
            );
            Ok(())
        }
    }
}
