//! Local JSON file source, for demos and offline work.
//!
//! The file is re-read on every fetch, so editing it while the app runs
//! behaves like a change in the remote collection.

use std::path::PathBuf;

use serde_json::Value;

use super::SnapshotSource;
use crate::error::FeedError;

pub struct FileSource {
    path: PathBuf,
    label: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.display().to_string();
        Self { path, label }
    }
}

impl SnapshotSource for FileSource {
    fn name(&self) -> &str {
        &self.label
    }

    /// An empty (or whitespace-only) file reads as `null`.
    fn fetch(&self) -> Result<Value, FeedError> {
        let text = std::fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
