//! Bounded-concurrency media downloads.
//!
//! Every ref becomes its own task. Tasks queue on a shared semaphore, so at
//! most `concurrency` requests are in flight. A failed download is logged and
//! counted; it never cancels the others.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::MediaRef;
use crate::constants::FETCH_USER_AGENT;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Outcome counts of a batch of downloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: usize,
    pub failed: usize,
}

/// Downloads media refs to their local paths.
#[derive(Debug, Clone)]
pub struct MediaFetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl MediaFetcher {
    /// Create a fetcher allowing `concurrency` downloads in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(concurrency: usize, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(FETCH_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        })
    }

    /// Download every ref and wait until all have finished.
    pub async fn fetch_all(&self, refs: &[MediaRef]) -> FetchSummary {
        info!(count = refs.len(), "Downloading media");
        let mut tasks = JoinSet::new();

        for media_ref in refs {
            let client = self.client.clone();
            let semaphore = Arc::clone(&self.semaphore);
            let url = media_ref.source_url.clone();
            let dest = media_ref.local_path.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return false;
                };
                match download_to(&client, &url, &dest).await {
                    Ok(bytes) => {
                        info!(url = %url, bytes, "Downloaded media");
                        true
                    }
                    Err(e) => {
                        warn!(url = %url, path = %dest.display(), "Cannot download media: {e}");
                        false
                    }
                }
            });
        }

        let mut summary = FetchSummary::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(true) => summary.downloaded += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    error!("Download task panicked: {e}");
                    summary.failed += 1;
                }
            }
        }

        debug!(
            downloaded = summary.downloaded,
            failed = summary.failed,
            "Media downloads finished"
        );
        summary
    }
}

/// GET `url` and write the full body to `dest`, creating parent directories.
async fn download_to(client: &Client, url: &str, dest: &Path) -> Result<usize, DownloadError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status(status));
    }
    let body = response.bytes().await?;

    if let Some(parent) = dest.parent() {
        // create_dir_all tolerates a sibling task creating the same directory.
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| DownloadError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    tokio::fs::write(dest, &body)
        .await
        .map_err(|source| DownloadError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
    Ok(body.len())
}
