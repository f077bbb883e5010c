//! JSON output.
//!
//! Articles are written as one pretty-printed array:
//!
//! ```text
//! [
//!   { "title": "...", "date": "...", "link": "...", "content": "...", "source": "..." }
//! ]
//! ```

use crate::models::Article;
use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::instrument;

#[instrument(level = "info", skip_all, fields(path = %path.display(), rows = articles.len()))]
pub fn write_json(articles: &[Article], path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, articles)?;
    writer.flush()?;
    Ok(())
}
