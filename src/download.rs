use crate::config::Config;
use crate::error::{Result, WorkerError};
use std::time::Duration;
use tracing::debug;

/// Source-document retrieval seam. Production uses the blocking HTTP
/// fetcher; tests inject fixture bytes.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.download.timeout_seconds))
            .build()
            .map_err(|e| WorkerError::Download {
                url: "".to_string(),
                reason: format!("building http client: {e}"),
            })?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| WorkerError::Download {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let bytes = resp.bytes().map_err(|e| WorkerError::Download {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        debug!("downloaded {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// Fetch and reject empty payloads before anything is staged.
pub fn fetch_source(fetcher: &dyn Fetcher, url: &str) -> Result<Vec<u8>> {
    let bytes = fetcher.fetch(url)?;
    if bytes.is_empty() {
        return Err(WorkerError::Download {
            url: url.to_string(),
            reason: "source file download is 0 bytes".to_string(),
        });
    }
    Ok(bytes)
}
