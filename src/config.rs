//! Command-line flags and the optional JSON config file.
//!
//! Precedence, lowest first: built-in defaults, `config.json`, CLI flags.
//! The config file is only ever read; nothing here writes it back.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::locale::Language;

const APP_DIR: &str = "dealfeed";

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the realtime database
    #[arg(long)]
    pub url: Option<String>,

    /// Collection path under the database
    #[arg(long)]
    pub path: Option<String>,

    /// Read snapshots from a local JSON file instead of the network
    #[arg(long, conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Seconds between feed polls
    #[arg(long)]
    pub interval: Option<u64>,

    /// Display language (hu, en, de)
    #[arg(long)]
    pub lang: Option<Language>,

    /// JSON file overriding built-in display strings
    #[arg(long)]
    pub locale_file: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Print the current deal list once and exit
    #[arg(long, default_value_t = false)]
    pub print: bool,

    /// Export the current deal list to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub language: Language,
    pub locale_file: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: Option<String>,
    pub path: String,
    pub file: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            language: Language::default(),
            locale_file: None,
            export_dir: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: "deals".into(),
            file: None,
            poll_interval_secs: 30,
            request_timeout_secs: 10,
        }
    }
}

impl FeedConfig {
    /// Never zero; a zero interval would spin the poller.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

impl AppConfig {
    /// Default location: `<config dir>/dealfeed/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path).
    ///
    /// A missing file silently gives the defaults; an unreadable or corrupt
    /// one gives the defaults with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unusable config file");
                Self::default()
            }
        }
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Overlay the flags that were actually given.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.feed.url = Some(url.clone());
            self.feed.file = None;
        }
        if let Some(path) = &cli.path {
            self.feed.path = path.clone();
        }
        if let Some(file) = &cli.file {
            self.feed.file = Some(file.clone());
        }
        if let Some(secs) = cli.interval {
            self.feed.poll_interval_secs = secs;
        }
        if let Some(language) = cli.lang {
            self.language = language;
        }
        if let Some(locale_file) = &cli.locale_file {
            self.locale_file = Some(locale_file.clone());
        }
    }

    /// Directory exports are written to: configured, else the data dir,
    /// else the working directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Default log file: `<data dir>/dealfeed/dealfeed.log`.
    pub fn default_log_path() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dealfeed.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dealfeed-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let path = temp_config(
            "partial.json",
            r#"{ "language": "en", "feed": { "url": "https://db.example.com" } }"#,
        );
        let config = AppConfig::load(Some(&path));

        assert_eq!(config.language, Language::En);
        assert_eq!(config.feed.url.as_deref(), Some("https://db.example.com"));
        assert_eq!(config.feed.path, "deals");
        assert_eq!(config.feed.poll_interval_secs, 30);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let path = temp_config("corrupt.json", "{ language: ");
        assert_eq!(AppConfig::load(Some(&path)), AppConfig::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = Path::new("/nonexistent/dealfeed/config.json");
        assert_eq!(AppConfig::load(Some(path)), AppConfig::default());
    }

    #[test]
    fn cli_flags_override_the_file() {
        let mut config = AppConfig::default();
        config.feed.file = Some(PathBuf::from("old.json"));

        let cli = Cli::parse_from([
            "dealfeed",
            "--url",
            "https://db.example.com",
            "--path",
            "public/deals",
            "--interval",
            "5",
            "--lang",
            "DE",
        ]);
        config.apply_cli(&cli);

        assert_eq!(config.feed.url.as_deref(), Some("https://db.example.com"));
        assert_eq!(config.feed.file, None, "--url replaces a configured file");
        assert_eq!(config.feed.path, "public/deals");
        assert_eq!(config.feed.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.language, Language::De);
    }

    #[test]
    fn file_and_url_flags_conflict() {
        let result = Cli::try_parse_from(["dealfeed", "--url", "https://x", "--file", "d.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let feed = FeedConfig {
            poll_interval_secs: 0,
            ..FeedConfig::default()
        };
        assert_eq!(feed.poll_interval(), Duration::from_secs(1));
    }
}
