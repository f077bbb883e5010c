//! CSV output with a header row.

use crate::models::Article;
use std::error::Error;
use std::path::Path;
use tracing::instrument;

#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = articles.len()))]
pub fn write_csv(articles: &[Article], path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = ::csv::Writer::from_path(path)?;
    for article in articles {
        writer.serialize(article)?;
    }
    writer.flush()?;
    Ok(())
}
