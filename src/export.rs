//! Snapshot export.
//!
//! The exporter only ever sees the list the screen is showing: it is handed
//! an [`ExportRequest`] built from the already-projected deals, and it
//! neither filters nor reorders them.  Turning the request into bytes is
//! the job of a [`DocumentGenerator`]; the bundled [`TableDocument`] writes
//! a plain-text table.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::info;

use crate::error::ExportError;

/// One exported line: what the deal is called and when it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub name: String,
    /// Already formatted for display, e.g. `2026-01-31` or the locale's
    /// "no expiry" text.
    pub expiry: String,
}

/// Everything a generator needs, with all strings already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub title: String,
    pub created_label: String,
    pub name_label: String,
    pub expiry_label: String,
    pub rows: Vec<ExportRow>,
}

/// Renders an [`ExportRequest`] into a finished document.
pub trait DocumentGenerator: Send + Sync {
    /// File extension of the produced document, without the dot.
    fn extension(&self) -> &'static str;

    fn generate(&self, request: &ExportRequest) -> Result<Vec<u8>, ExportError>;
}

/// A UTF-8 text document: title, created line, then a two-column table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableDocument;

impl DocumentGenerator for TableDocument {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn generate(&self, request: &ExportRequest) -> Result<Vec<u8>, ExportError> {
        let mut builder = Builder::default();
        builder.push_record([request.name_label.clone(), request.expiry_label.clone()]);
        for row in &request.rows {
            builder.push_record([row.name.clone(), row.expiry.clone()]);
        }
        let mut table = builder.build();
        table.with(Style::modern());

        let document = format!(
            "{}\n{}\n\n{}\n",
            request.title, request.created_label, table
        );
        Ok(document.into_bytes())
    }
}

/// `deals-<date>.<ext>` inside `dir`.
pub fn default_file_name(dir: &Path, today: NaiveDate, extension: &str) -> PathBuf {
    dir.join(format!("deals-{}.{extension}", today.format("%Y-%m-%d")))
}

/// Generate the document and write it to `path`, creating parent
/// directories as needed.
pub fn write_document(
    generator: &dyn DocumentGenerator,
    request: &ExportRequest,
    path: &Path,
) -> Result<PathBuf, ExportError> {
    let bytes = generator.generate(request)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), rows = request.rows.len(), "deal list exported");
    Ok(path.to_path_buf())
}
