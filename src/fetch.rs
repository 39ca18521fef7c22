//! Retrieval of the raw boundary listing.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::FetchError;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Something that can turn a listing URL into parsed JSON.
pub trait Fetch {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError>;
}

/// Blocking HTTP downloader used for live runs.
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpDownloader {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        tracing::info!(%url, "downloading boundary listing");
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(http_err)?;
        let body = response.text().map_err(http_err)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Reads a previously saved listing from disk, ignoring the URL.
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Fetch for LocalFile {
    fn get_json(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        tracing::info!(path = %self.path.display(), %url, "reading boundary listing from file");
        let raw = fs::read_to_string(&self.path).map_err(|source| FetchError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}
