//! Checkpoint state so an interrupted run can pick up where it stopped.
//!
//! The state directory holds `progress.txt` (`iso3=<code>` of the country being
//! processed) and `batch.txt` (the batch id shared by every catalog write).

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use uuid::Uuid;

use crate::error::ProgressError;

pub const PROGRESS_FILE: &str = "progress.txt";
pub const BATCH_FILE: &str = "batch.txt";
pub const PROGRESS_KEY: &str = "iso3";
pub const DEFAULT_STATE_DIR_NAME: &str = "hdx-scraper-geoboundaries";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartMarker {
    /// Forget saved state and process everything.
    Reset,
    /// Continue from the saved country, if any.
    Resume,
    /// Start at this country code.
    From(String),
}

impl FromStr for StartMarker {
    type Err = ProgressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("RESET") {
            return Ok(Self::Reset);
        }
        if trimmed.eq_ignore_ascii_case("RESUME") {
            return Ok(Self::Resume);
        }
        let code = trimmed
            .strip_prefix(PROGRESS_KEY)
            .and_then(|rest| rest.strip_prefix('='))
            .unwrap_or(trimmed);
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self::From(code.to_ascii_uppercase()))
        } else {
            Err(ProgressError::InvalidStart(value.to_string()))
        }
    }
}

pub fn default_state_dir() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_STATE_DIR_NAME)
}

#[derive(Debug)]
pub struct Progress {
    dir: PathBuf,
    batch: String,
    start_at: Option<String>,
}

impl Progress {
    pub fn open(dir: impl Into<PathBuf>, start: &StartMarker) -> Result<Self, ProgressError> {
        let dir = dir.into();
        if *start == StartMarker::Reset && dir.exists() {
            fs::remove_dir_all(&dir).map_err(|source| io_err(&dir, source))?;
        }
        fs::create_dir_all(&dir).map_err(|source| io_err(&dir, source))?;

        let batch = match read_optional(&dir.join(BATCH_FILE))? {
            Some(batch) if !batch.is_empty() => batch,
            _ => {
                let batch = Uuid::new_v4().to_string();
                write_file(&dir.join(BATCH_FILE), &batch)?;
                batch
            }
        };

        let start_at = match start {
            StartMarker::Reset => None,
            StartMarker::From(code) => Some(code.clone()),
            StartMarker::Resume => read_optional(&dir.join(PROGRESS_FILE))?.and_then(|line| {
                line.strip_prefix(PROGRESS_KEY)
                    .and_then(|rest| rest.strip_prefix('='))
                    .map(str::to_string)
            }),
        };
        if let Some(code) = &start_at {
            tracing::info!(start = %code, batch = %batch, "resuming run");
        }

        Ok(Self { dir, batch, start_at })
    }

    pub fn batch(&self) -> &str {
        &self.batch
    }

    /// Keys still to process: everything from the start key onwards.
    /// A start key missing from `keys` is an error; nothing is processed.
    pub fn remaining<'a>(&self, keys: &'a [String]) -> Result<&'a [String], ProgressError> {
        let Some(start) = &self.start_at else {
            return Ok(keys);
        };
        keys.iter()
            .position(|key| key.eq_ignore_ascii_case(start))
            .map(|index| &keys[index..])
            .ok_or_else(|| ProgressError::UnknownStart(start.clone()))
    }

    /// Persist `key` as the country currently being processed.
    pub fn record(&self, key: &str) -> Result<(), ProgressError> {
        write_file(&self.dir.join(PROGRESS_FILE), &format!("{PROGRESS_KEY}={key}"))
    }

    /// Drop the state directory after a complete run.
    pub fn finish(self) -> Result<(), ProgressError> {
        fs::remove_dir_all(&self.dir).map_err(|source| io_err(&self.dir, source))
    }
}

fn io_err(path: &Path, source: std::io::Error) -> ProgressError {
    ProgressError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, ProgressError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw.trim().to_string())),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(io_err(path, source)),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ProgressError> {
    fs::write(path, contents).map_err(|source| io_err(path, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> Vec<String> {
        ["AFG", "BDI", "PHL"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_start_markers() {
        assert_eq!("RESET".parse::<StartMarker>().unwrap(), StartMarker::Reset);
        assert_eq!("resume".parse::<StartMarker>().unwrap(), StartMarker::Resume);
        assert_eq!("phl".parse::<StartMarker>().unwrap(), StartMarker::From("PHL".into()));
        assert_eq!(
            "iso3=BDI".parse::<StartMarker>().unwrap(),
            StartMarker::From("BDI".into())
        );
        assert!("Philippines".parse::<StartMarker>().is_err());
    }

    #[test]
    fn resume_continues_from_recorded_key_with_same_batch() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("state");

        let first = Progress::open(&dir, &StartMarker::Reset).unwrap();
        first.record("BDI").unwrap();
        let batch = first.batch().to_string();

        let resumed = Progress::open(&dir, &StartMarker::Resume).unwrap();
        assert_eq!(resumed.batch(), batch);
        let keys = keys();
        assert_eq!(resumed.remaining(&keys).unwrap(), &keys[1..]);
    }

    #[test]
    fn reset_discards_saved_state() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("state");

        let first = Progress::open(&dir, &StartMarker::Reset).unwrap();
        first.record("PHL").unwrap();
        let old_batch = first.batch().to_string();

        let fresh = Progress::open(&dir, &StartMarker::Reset).unwrap();
        assert_ne!(fresh.batch(), old_batch);
        let keys = keys();
        assert_eq!(fresh.remaining(&keys).unwrap().len(), 3);
    }

    #[test]
    fn explicit_start_and_finish() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("state");
        let progress = Progress::open(&dir, &StartMarker::From("PHL".into())).unwrap();
        let keys = keys();
        assert_eq!(progress.remaining(&keys).unwrap(), &keys[2..]);
        progress.finish().unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn start_code_missing_from_listing_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let progress = Progress::open(tmp.path().join("state"), &StartMarker::From("XYZ".into())).unwrap();
        let keys = keys();
        assert!(matches!(
            progress.remaining(&keys),
            Err(ProgressError::UnknownStart(code)) if code == "XYZ"
        ));
    }
}
