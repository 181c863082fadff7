//! Realtime-database REST source.
//!
//! The store exposes every path as JSON at `{base}/{path}.json`.  A `GET`
//! returns the whole collection, or `null` when nothing is stored there.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::SnapshotSource;
use crate::error::FeedError;

/// Fetches one collection over HTTP.
pub struct HttpSource {
    /// Full `.json` endpoint, built once in [`HttpSource::new`].
    endpoint: String,
    client: Client,
}

impl HttpSource {
    /// Build a source for `path` under the database at `base_url`.
    ///
    /// `timeout` bounds each request, so a hung connection shows up as a
    /// transport failure instead of silently stalling the poller.
    pub fn new(base_url: &str, path: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint(base_url, path),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SnapshotSource for HttpSource {
    fn name(&self) -> &str {
        &self.endpoint
    }

    fn fetch(&self) -> Result<Value, FeedError> {
        let response = self.client.get(&self.endpoint).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".json").unwrap_or(path);
    format!("{base}/{path}.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_path() {
        assert_eq!(
            endpoint("https://db.example.com", "deals"),
            "https://db.example.com/deals.json"
        );
    }

    #[test]
    fn endpoint_tolerates_stray_slashes_and_suffix() {
        assert_eq!(
            endpoint("https://db.example.com/", "/public/deals/"),
            "https://db.example.com/public/deals.json"
        );
        assert_eq!(
            endpoint("https://db.example.com", "deals.json"),
            "https://db.example.com/deals.json"
        );
    }

    #[test]
    fn source_is_named_after_its_endpoint() {
        let source = HttpSource::new("https://db.example.com", "deals", Duration::from_secs(5))
            .unwrap();
        assert_eq!(source.name(), "https://db.example.com/deals.json");
        assert_eq!(source.endpoint(), source.name());
    }
}
