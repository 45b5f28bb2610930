//! First-run setup: fetch the corpus and build the index.

use reqwest::Client;
use scriptura::config::RagConfig;
use scriptura::corpus::{self, VerseRecord};
use scriptura::pipeline::RagPipeline;
use scriptura::types::RagError;
use url::Url;

/// Resolves corpus records, preferring the configured resource and falling
/// back to the built-in sample corpus when it cannot be fetched.
///
/// A corpus that exists but does not parse is fatal — degraded data is
/// acceptable, silently wrong data is not.
pub async fn resolve_corpus(config: &RagConfig) -> Result<Vec<VerseRecord>, RagError> {
    let url = Url::parse(&config.corpus_url)
        .map_err(|err| RagError::Config(format!("invalid corpus url: {err}")))?;
    let client = Client::builder()
        .user_agent("scriptura-chat/0.1")
        .use_rustls_tls()
        .build()?;

    match corpus::fetch_corpus(&client, &url, &config.corpus_path).await {
        Ok(fetch) => {
            if fetch.from_cache {
                println!(
                    "Using corpus at {} ({} verses).",
                    fetch.path.display(),
                    fetch.verses
                );
            } else {
                println!(
                    "Downloaded corpus to {} ({:.1} MB, {} verses).",
                    fetch.path.display(),
                    fetch.bytes as f64 / (1024.0 * 1024.0),
                    fetch.verses
                );
            }
        }
        Err(err @ RagError::CorpusParse(_)) => return Err(err),
        Err(err) => {
            tracing::warn!(%err, "corpus download failed; using built-in sample corpus");
            println!("Corpus download failed ({err}); continuing with the sample corpus.");
            return Ok(corpus::sample_corpus());
        }
    }

    match corpus::load_corpus(&config.corpus_path).await {
        Ok(records) => Ok(records),
        Err(RagError::CorpusNotFound { .. }) => {
            println!("Corpus file disappeared; continuing with the sample corpus.");
            Ok(corpus::sample_corpus())
        }
        Err(err) => Err(err),
    }
}

/// Runs the full setup flow: resolve the corpus, report its shape, build
/// the index. The build runs to completion; interrupting it leaves a
/// partial index that `/rebuild` replaces from scratch.
pub async fn run_setup(pipeline: &RagPipeline, config: &RagConfig) -> Result<(), RagError> {
    println!("Setting up the verse index (this embeds the whole corpus and can take a while)...");

    let records = resolve_corpus(config).await?;
    let stats = corpus::corpus_stats(&records);
    println!(
        "Corpus loaded: {} books, {} chapters, {} verses.",
        stats.books, stats.chapters, stats.verses
    );

    let report = pipeline.build(&records).await?;
    println!(
        "Index built: {} fragments from {} documents ({} skipped).",
        report.inserted, report.documents, report.skipped
    );
    Ok(())
}
