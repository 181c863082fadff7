//! The live deal feed.
//!
//! This module defines the [`SnapshotSource`] trait, which fetches the
//! remote collection once, and [`subscribe`], which turns any source into a
//! stream of full-snapshot deliveries on a background thread.
//!
//! ## Adding a new source
//!
//! 1. Create a new file in this directory (e.g. `sse.rs`).
//! 2. Define a struct and implement [`SnapshotSource`] for it.  `fetch()`
//!    returns the whole collection as a JSON value.
//! 3. Add `mod sse;` below and re-export the struct.
//! 4. Construct it in `main.rs`.
//!
//! Change detection, error reporting and teardown are all handled by
//! [`subscribe`], so sources stay small.

mod file;
mod http;
mod subscription;

pub use file::FileSource;
pub use http::HttpSource;
pub use subscription::{subscribe, Subscription};

use serde_json::{Map, Value};

use crate::deal::RawSnapshot;
use crate::error::{kind_of, FeedError, SnapshotError};

/// Trait every feed source must implement.
///
/// [`subscribe`] calls [`fetch()`](SnapshotSource::fetch) periodically on a
/// background thread, so implementations must be [`Send`].
pub trait SnapshotSource: Send {
    /// Human-readable label used in logs.
    fn name(&self) -> &str;

    /// Fetch the entire current collection.
    ///
    /// `Value::Null` means the collection is empty or does not exist.
    fn fetch(&self) -> Result<Value, FeedError>;
}

/// Messages sent from the subscription thread to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMsg {
    /// The full current collection, replacing whatever came before.
    Snapshot(Value),
    /// The feed could not be reached or read.
    Error(String),
}

/// Reduce a delivered value to an id → record mapping.
///
/// * `null` is an empty collection and gives `Ok(None)`.
/// * An object is used as-is.
/// * An array (the store sends these when keys are sequential integers)
///   becomes a mapping keyed by index, with `null` holes skipped.
/// * Anything else cannot be a collection.
pub fn into_snapshot(value: Value) -> Result<Option<RawSnapshot>, SnapshotError> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map)),
        Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .enumerate()
                .filter(|(_, item)| !item.is_null())
                .map(|(i, item)| (i.to_string(), item))
                .collect::<Map<String, Value>>(),
        )),
        other => Err(SnapshotError::NotACollection(kind_of(&other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_is_an_empty_collection() {
        assert_eq!(into_snapshot(Value::Null), Ok(None));
    }

    #[test]
    fn object_is_used_as_is() {
        let snap = into_snapshot(json!({ "k1": { "title": "a" } })).unwrap().unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap["k1"]["title"], "a");
    }

    #[test]
    fn array_is_keyed_by_index_without_holes() {
        let snap = into_snapshot(json!([null, { "title": "one" }, { "title": "two" }]))
            .unwrap()
            .unwrap();
        let keys: Vec<&str> = snap.keys().map(String::as_str).collect();
        assert_eq!(keys, ["1", "2"]);
    }

    #[test]
    fn scalars_are_rejected() {
        assert_eq!(
            into_snapshot(json!("deals")),
            Err(SnapshotError::NotACollection("a string"))
        );
        assert_eq!(
            into_snapshot(json!(3)),
            Err(SnapshotError::NotACollection("a number"))
        );
    }
}
