//! HTTP utilities for fetching support packages.
//!
//! Downloads land in a persistent cache directory keyed by file name; a file
//! that is already cached is reused without touching the network.

use crate::bundler::error::{Error, ErrorExt, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Fetches a URL into a cache directory.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` into `cache_dir`, returning the local file path.
    ///
    /// Implementations reuse an existing file with the same name.
    async fn download(&self, url: &str, cache_dir: &Path) -> Result<PathBuf>;
}

/// [`Downloader`] backed by `reqwest`.
#[derive(Debug, Default, Clone)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    /// Create a downloader with a default client
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, cache_dir: &Path) -> Result<PathBuf> {
        download_to_cache(&self.client, url, cache_dir).await
    }
}

/// Derive the cache file name from the last path segment of a URL.
pub fn cache_filename(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::GenericError(format!("URL {url} does not name a file")))
}

/// Downloads `url` into `cache_dir` unless a file of the same name is already cached.
pub async fn download_to_cache(
    client: &reqwest::Client,
    url: &str,
    cache_dir: &Path,
) -> Result<PathBuf> {
    let filename = cache_filename(url)?;
    let dest = cache_dir.join(&filename);

    if dest.is_file() {
        log::info!("Using cached {}", dest.display());
        return Ok(dest);
    }

    tokio::fs::create_dir_all(cache_dir)
        .await
        .fs_context("creating download cache", cache_dir)?;

    log::info!("Downloading {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = response.bytes().await?;

    // Write beside the final name so an interrupted transfer never looks cached.
    let partial = cache_dir.join(format!("{filename}.partial"));
    {
        let mut file = tokio::fs::File::create(&partial)
            .await
            .fs_context("creating download file", &partial)?;
        file.write_all(&bytes)
            .await
            .fs_context("writing download file", &partial)?;
        file.flush()
            .await
            .fs_context("writing download file", &partial)?;
    }
    tokio::fs::rename(&partial, &dest)
        .await
        .fs_context("finalizing download", &dest)?;

    log::debug!("Downloaded {} bytes to {}", bytes.len(), dest.display());
    Ok(dest)
}
