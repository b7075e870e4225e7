mod config;

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tome_llm::ollama::OllamaProvider;
use tome_llm::provider::EmbedFuture;
use tome_llm::{LlmProvider, TimedProvider};
use tome_rag::{EngineOptions, RagEngine};
use tome_store::document::{IngestionPipeline, SplitterConfig, TextSplitter, loader_for};
use tome_store::{InMemoryVectorStore, VectorStore};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "tome",
    version,
    about = "Ask questions about a document, answered from its own text"
)]
struct Cli {
    /// Document to ingest (.pdf, .txt, .md)
    file: PathBuf,

    /// Questions to answer. Read line by line from stdin when omitted.
    questions: Vec<String>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "tome.toml")]
    config: PathBuf,

    /// Override the collection name from the configuration
    #[arg(long)]
    collection: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    config.validate()?;

    let ollama = OllamaProvider::new(
        &config.llm.base_url,
        config.llm.model.clone(),
        config.llm.embedding_model.clone(),
    );
    ollama
        .health_check()
        .await
        .with_context(|| format!("Ollama is not reachable at {}", config.llm.base_url))?;
    let provider = Arc::new(TimedProvider::new(
        ollama,
        Duration::from_secs(config.llm.timeout_secs),
    ));

    let store = build_store(&config)?;
    let collection = cli
        .collection
        .unwrap_or_else(|| config.index.collection.clone());

    ingest(&cli.file, &config, provider.clone(), store.clone(), &collection).await?;

    let engine = RagEngine::new(
        provider,
        store,
        collection,
        EngineOptions {
            top_k: config.index.top_k,
            expansions: config.query.expansions,
            max_context_chars: config.query.max_context_chars,
        },
    );

    let questions = if cli.questions.is_empty() {
        read_questions_from_stdin()?
    } else {
        cli.questions
    };
    if questions.is_empty() {
        anyhow::bail!("no questions given");
    }

    let mut failed = 0_usize;
    for question in &questions {
        match engine.ask(question).await {
            Ok(answer) => {
                println!("Q: {question}");
                println!("{answer}\n");
            }
            Err(e) => {
                failed += 1;
                tracing::error!("question {question:?} failed: {e}");
            }
        }
    }

    if failed == questions.len() {
        anyhow::bail!("all {failed} questions failed");
    }
    Ok(())
}

async fn ingest(
    file: &std::path::Path,
    config: &Config,
    provider: Arc<TimedProvider<OllamaProvider>>,
    store: Arc<dyn VectorStore>,
    collection: &str,
) -> anyhow::Result<()> {
    let loader = loader_for(file)?;
    let splitter = TextSplitter::new(SplitterConfig {
        chunk_size: config.chunking.chunk_size,
        chunk_overlap: config.chunking.chunk_overlap,
    });
    let embed_fn = Box::new(move |text: &str| -> EmbedFuture {
        let provider = provider.clone();
        let text = text.to_owned();
        Box::pin(async move { provider.embed(&text).await })
    });

    let pipeline = IngestionPipeline::new(splitter, store, collection.to_owned(), embed_fn);
    let stats = pipeline
        .load_and_ingest(loader.as_ref(), file)
        .await
        .with_context(|| format!("failed to ingest {}", file.display()))?;

    if stats.indexed == 0 {
        anyhow::bail!("no content was indexed from {}", file.display());
    }
    Ok(())
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn VectorStore>> {
    #[cfg(feature = "qdrant")]
    if let Some(url) = &config.index.qdrant_url {
        let store = tome_store::QdrantVectorStore::new(url, config.index.distance)
            .with_context(|| format!("failed to connect to Qdrant at {url}"))?;
        return Ok(Arc::new(store));
    }
    #[cfg(not(feature = "qdrant"))]
    if config.index.qdrant_url.is_some() {
        anyhow::bail!("index.qdrant_url is set but this build has no qdrant support");
    }
    Ok(Arc::new(InMemoryVectorStore::new(config.index.distance)))
}

fn read_questions_from_stdin() -> anyhow::Result<Vec<String>> {
    let mut questions = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read question from stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            questions.push(line.to_owned());
        }
    }
    Ok(questions)
}
