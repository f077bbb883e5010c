//! Excel workbook output.
//!
//! One worksheet with a bold header row followed by one row per article.

use crate::models::{Article, EXPORT_COLUMNS};
use crate::utils::truncate_for_log;
use rust_xlsxwriter::{Format, Workbook};
use std::borrow::Cow;
use std::error::Error;
use std::path::Path;
use tracing::{instrument, warn};

/// Excel refuses cells holding more characters than this.
pub const MAX_CELL_CHARS: usize = 32_767;

#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = articles.len()))]
pub fn write_workbook(articles: &[Article], path: &Path) -> Result<(), Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, name) in EXPORT_COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
    }
    for (i, article) in articles.iter().enumerate() {
        let row = u32::try_from(i + 1)?;
        for (col, value) in article.cells().into_iter().enumerate() {
            let cell = fit_cell(value);
            if matches!(cell, Cow::Owned(_)) {
                warn!(
                    link = %article.link,
                    column = EXPORT_COLUMNS[col],
                    preview = %truncate_for_log(value, 60),
                    "Cell too long for Excel; truncating"
                );
            }
            sheet.write_string(row, col as u16, cell)?;
        }
    }

    workbook.save(path)?;
    Ok(())
}

/// `value`, cut to [`MAX_CELL_CHARS`] characters if longer.
fn fit_cell(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        None => Cow::Borrowed(value),
        Some((cut, _)) => Cow::Owned(value[..cut].to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_cell() {
        assert!(matches!(fit_cell("short"), Cow::Borrowed("short")));
        let long = "é".repeat(MAX_CELL_CHARS + 10);
        let cut = fit_cell(&long);
        assert_eq!(cut.chars().count(), MAX_CELL_CHARS);
    }

    #[test]
    fn test_write_workbook_creates_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("news.xlsx");
        let articles = vec![Article {
            title: "Title".to_string(),
            date: "2020-02-02".to_string(),
            link: "https://news.test/a/".to_string(),
            content: "x".repeat(MAX_CELL_CHARS + 1),
            source: "news.test".to_string(),
        }];

        write_workbook(&articles, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
