//! Output writers for crawled articles.
//!
//! # Submodules
//!
//! - [`xlsx`]: Excel workbook, the default
//! - [`csv`]: comma-separated values with a header row
//! - [`json`]: pretty-printed array of article objects
//!
//! Every format carries the columns of [`EXPORT_COLUMNS`] in order, one row
//! per article, and overwrites the destination file.
//!
//! [`EXPORT_COLUMNS`]: crate::models::EXPORT_COLUMNS

pub mod csv;
pub mod json;
pub mod xlsx;

use crate::models::Article;
use std::error::Error;
use std::path::Path;

/// File format, chosen from the output path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self, Box<dyn Error>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx") => Ok(Self::Xlsx),
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(format!(
                "unsupported output file {}: use a .xlsx, .csv or .json extension",
                path.display()
            )
            .into()),
        }
    }
}

/// Write `articles` to `path` in `format`.
pub fn write_articles(
    articles: &[Article],
    path: &Path,
    format: ExportFormat,
) -> Result<(), Box<dyn Error>> {
    match format {
        ExportFormat::Xlsx => xlsx::write_workbook(articles, path),
        ExportFormat::Csv => csv::write_csv(articles, path),
        ExportFormat::Json => json::write_json(articles, path),
    }
}
