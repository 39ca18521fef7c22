//! Error types for every stage of a run.
//!
//! Fetch and config failures abort the run. Build and catalog failures are
//! scoped to a single country; the runner logs them and moves on.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to download {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse boundary listing: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("unknown country code {0}")]
    UnknownCountry(String),
    #[error("{country} {admin_level}: year '{value}' is not a year")]
    InvalidYear {
        country: String,
        admin_level: String,
        value: String,
    },
    #[error("{country} {admin_level}: no file name in resource url '{url}'")]
    InvalidResourceUrl {
        country: String,
        admin_level: String,
        url: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog request {action} failed: {source}")]
    Http {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("catalog rejected {action} ({status}): {message}")]
    Rejected {
        action: &'static str,
        status: u16,
        message: String,
    },
    #[error("catalog returned a resource '{0}' that was not requested")]
    UnexpectedResource(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unknown catalog site '{0}' (expected prod, stage, feature, demo or dev)")]
    UnknownSite(String),
    #[error("unknown update frequency '{0}'")]
    UnknownFrequency(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("progress state {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("start marker '{0}' is not RESET, RESUME or a country code")]
    InvalidStart(String),
    #[error("start country '{0}' is not in the boundary listing")]
    UnknownStart(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write report {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
