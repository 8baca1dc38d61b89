//! Command-line entrypoint for the plagiarism checker.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use uuid::Uuid;

use plagiarism::config::Config;
use plagiarism::corpus::{
    DEFAULT_IMPORT_SOURCE, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_THRESHOLD, DEFAULT_SOURCE,
};
use plagiarism::{
    CheckRequest, CorpusIndex, DiskCorpusStore, EmbeddingProvider, NewDocument,
    PlagiarismDetector, SentenceEmbedder,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "bangla-plagiarism")]
#[command(about = "Exact and semantic plagiarism checks for Bangla/English text")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a text file against the corpus and print the result as JSON
    Check {
        file: PathBuf,
        /// Similarity threshold in [0, 1] (defaults to PLAGIARISM_THRESHOLD)
        #[arg(short, long)]
        threshold: Option<f32>,
        /// Only look for exact word runs
        #[arg(long)]
        no_paraphrase: bool,
    },
    /// Add a text file to the corpus
    Add {
        file: PathBuf,
        /// Document title (defaults to the file stem)
        #[arg(short, long)]
        title: Option<String>,
        /// Source tag
        #[arg(short, long, default_value = DEFAULT_SOURCE)]
        source: String,
        /// Document language
        #[arg(short, long, default_value = plagiarism::corpus::DEFAULT_LANGUAGE)]
        language: String,
    },
    /// Import every .txt file in a directory
    Import {
        dir: PathBuf,
        #[arg(short, long, default_value = DEFAULT_IMPORT_SOURCE)]
        source: String,
    },
    /// List corpus documents
    List,
    /// Remove a document by id
    Remove { id: Uuid },
    /// Show corpus statistics
    Stats,
    /// Case-insensitive substring search over the corpus
    Search {
        query: String,
        #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
        /// Minimum score for a hit
        #[arg(long, default_value_t = DEFAULT_SEARCH_THRESHOLD)]
        threshold: f64,
    },
    /// Export the corpus as JSON
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let detector = build_detector(&config).await?;
    handle(cli.command, &detector, &config).await
}

async fn build_detector(config: &Config) -> Result<PlagiarismDetector> {
    if config.model_path.is_none() {
        tracing::warn!("No PLAGIARISM_MODEL_PATH configured, running embedder in stub mode");
    }
    let embedder = SentenceEmbedder::load(config.embedder_config())?;
    tracing::info!(
        model_id = embedder.model_id(),
        dim = embedder.dim(),
        corpus = %config.corpus_path.display(),
        "Embedder ready"
    );
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(embedder);

    let store = DiskCorpusStore::open(config.corpus_path.clone())
        .await
        .with_context(|| format!("opening corpus at {}", config.corpus_path.display()))?;
    let index = Arc::new(CorpusIndex::new(provider, config.index_config()));

    Ok(PlagiarismDetector::new(
        Arc::new(store),
        index,
        config.detector_config(),
    ))
}

async fn handle(command: Command, detector: &PlagiarismDetector, config: &Config) -> Result<()> {
    match command {
        Command::Check {
            file,
            threshold,
            no_paraphrase,
        } => {
            let text = read_text(&file).await?;
            let request = CheckRequest::new(text)
                .with_threshold(threshold.unwrap_or(config.threshold))
                .with_paraphrase(!no_paraphrase);
            let response = detector.check(request).await?;
            print_json(&response)
        }
        Command::Add {
            file,
            title,
            source,
            language,
        } => {
            let content = read_text(&file).await?;
            let title = match title {
                Some(title) => title,
                None => file_stem(&file)?,
            };
            let document = NewDocument::new(title, content)
                .with_source(source)
                .with_language(language);
            let stored = detector.add_document(document).await?;
            println!("{}", stored.id);
            Ok(())
        }
        Command::Import { dir, source } => {
            let report = detector.import_directory(&dir, &source).await?;
            print_json(&report)
        }
        Command::List => {
            for document in detector.list_documents().await? {
                println!(
                    "{}\t{}\t{}\t{} words",
                    document.id, document.title, document.source, document.word_count
                );
            }
            Ok(())
        }
        Command::Remove { id } => {
            if !detector.remove_document(id).await? {
                bail!("no document with id {id}");
            }
            Ok(())
        }
        Command::Stats => print_json(&detector.stats().await?),
        Command::Search {
            query,
            limit,
            threshold,
        } => print_json(&detector.search(&query, limit, threshold).await?),
        Command::Export { path } => {
            let count = detector.export(&path).await?;
            println!("exported {count} documents to {}", path.display());
            Ok(())
        }
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name", path.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
