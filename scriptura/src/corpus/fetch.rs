//! One-time corpus download.
//!
//! The corpus resource is fetched over HTTP on first setup and written
//! through to disk; later runs reuse the on-disk copy and skip the
//! network. A body that does not validate as corpus JSON is rejected
//! without being written, so a bad download can never poison later runs.

use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::fs;
use url::Url;

use crate::corpus::{CorpusFile, parse_corpus};
use crate::types::RagError;

/// Default download source for the King James corpus.
pub const DEFAULT_CORPUS_URL: &str =
    "https://github.com/scrollmapper/bible_databases/raw/refs/heads/master/formats/json/KJV.json";

/// Result of resolving the corpus resource, from cache or network.
#[derive(Clone, Debug)]
pub struct CorpusFetch {
    pub path: PathBuf,
    pub bytes: usize,
    pub verses: usize,
    pub from_cache: bool,
}

/// Ensures a validated corpus file exists at `target`.
///
/// An existing readable copy that parses short-circuits the network; a
/// stale copy that no longer parses is replaced. Network failures surface
/// as [`RagError::Http`], invalid payloads as [`RagError::CorpusParse`].
pub async fn fetch_corpus(
    client: &Client,
    url: &Url,
    target: &Path,
) -> Result<CorpusFetch, RagError> {
    if target.exists() {
        let raw = fs::read_to_string(target).await?;
        match parse_corpus(&raw) {
            Ok(file) => {
                return Ok(CorpusFetch {
                    path: target.to_path_buf(),
                    bytes: raw.len(),
                    verses: file.verse_count(),
                    from_cache: true,
                });
            }
            Err(err) => {
                tracing::warn!(path = %target.display(), %err, "cached corpus invalid; re-downloading");
            }
        }
    }

    let body = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let file: CorpusFile = parse_corpus(&body)?;
    let verses = file.verse_count();

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(target, &body).await?;

    tracing::info!(
        url = %url,
        path = %target.display(),
        bytes = body.len(),
        verses,
        "corpus downloaded"
    );

    Ok(CorpusFetch {
        path: target.to_path_buf(),
        bytes: body.len(),
        verses,
        from_cache: false,
    })
}
