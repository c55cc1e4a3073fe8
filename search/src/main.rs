use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use trecdex_core::Normalization;
use trecdex_search::batch::{read_topics, run_batch, Mode};
use trecdex_search::fetch::{fetch, write_document, DocRef};
use trecdex_search::open_index;
use trecdex_search::session::{run as run_session, Session};

#[derive(Parser)]
#[command(name = "trecdex-search")]
#[command(about = "Query a trecdex index", long_about = None)]
struct Cli {
    /// Index directory path
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every topic in a query file and write a TREC run file
    Batch {
        /// File of alternating topic-id and query lines
        #[arg(long)]
        queries: PathBuf,
        /// Run file to write
        #[arg(long)]
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = Mode::Bm25)]
        mode: Mode,
        /// Stem query tokens; must match how the index was built
        #[arg(long, default_value_t = false)]
        stem: bool,
        /// Last column of every run line
        #[arg(long)]
        run_tag: Option<String>,
    },
    /// Ranked search with summaries on stdin/stdout
    Interactive,
    /// Print one stored document and its metadata
    Fetch {
        #[arg(long, conflicts_with = "id", required_unless_present = "id")]
        docno: Option<String>,
        #[arg(long)]
        id: Option<u32>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let (index, store) = open_index(&cli.index)?;

    match cli.command {
        Commands::Batch { queries, output, mode, stem, run_tag } => {
            let normalization = Normalization::from_stem_flag(stem);
            if normalization != index.normalization {
                tracing::warn!(requested = %normalization, built_with = %index.normalization, "normalization differs from index");
            }
            let file = File::open(&queries).with_context(|| format!("opening query file {}", queries.display()))?;
            let topics = read_topics(BufReader::new(file))?;
            let out = File::create(&output).with_context(|| format!("creating run file {}", output.display()))?;
            let run_tag = run_tag.unwrap_or_else(|| mode.default_run_tag().to_string());
            let start = std::time::Instant::now();
            let written = run_batch(&index, &topics, mode, normalization, &run_tag, &mut BufWriter::new(out))?;
            tracing::info!(topics = topics.len(), lines = written, took_s = start.elapsed().as_secs_f64(), "batch run complete");
        }
        Commands::Interactive => {
            let mut session = Session::new(&index, &store);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            run_session(&mut session, stdin.lock(), &mut stdout)?;
        }
        Commands::Fetch { docno, id } => {
            let doc_ref = match (docno, id) {
                (Some(docno), _) => DocRef::Docno(docno),
                (None, Some(id)) => DocRef::Id(id),
                (None, None) => anyhow::bail!("either --docno or --id is required"),
            };
            let doc = fetch(&index, &store, &doc_ref)?;
            write_document(&mut io::stdout().lock(), &doc)?;
        }
    }
    Ok(())
}
