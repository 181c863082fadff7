//! Error types for each failure domain.
//!
//! The taxonomy follows how far a failure is allowed to travel:
//!
//! * [`MalformedRecord`] never leaves the projector: the record is dropped
//!   and the rest of the snapshot is still rendered.
//! * [`FeedError`] and [`SnapshotError`] reach the user as the error banner.
//! * [`ExportError`] is reported separately from feed errors and never
//!   touches the subscription.
//! * [`LocaleError`] only happens while loading a locale override file.

use serde_json::Value;
use thiserror::Error;

/// A transport-level failure while fetching a snapshot.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed responded with HTTP {0}")]
    Status(u16),
    #[error("could not read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A delivered payload that cannot be turned into a keyed collection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot must be an object, an array or null, got {0}")]
    NotACollection(&'static str),
}

/// Why a single raw record was excluded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedRecord {
    #[error("record is {0}, not an object")]
    NotAnObject(&'static str),
    #[error("field `{field}` should be a string, got {found}")]
    WrongType {
        field: &'static str,
        found: &'static str,
    },
    #[error("expiryDate `{0}` is not a YYYY-MM-DD date")]
    BadExpiry(String),
}

#[derive(Debug, Error)]
pub enum LocaleError {
    #[error("unknown language `{0}` in locale table")]
    UnknownLanguage(String),
    #[error("unknown locale key `{key}` for language `{language}`")]
    UnknownKey { language: String, key: String },
    #[error("entry `{key}` for `{language}` is missing the `{{{placeholder}}}` placeholder")]
    MissingPlaceholder {
        language: &'static str,
        key: &'static str,
        placeholder: &'static str,
    },
    #[error("could not read locale file: {0}")]
    Io(#[from] std::io::Error),
    #[error("locale file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("document generation failed: {0}")]
    Generate(String),
    #[error("could not write document: {0}")]
    Io(#[from] std::io::Error),
}

/// Short JSON type name used in error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
