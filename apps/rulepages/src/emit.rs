//! Page rendering and writing.

use crate::error::{Result, TransformError};
use crate::models::page::PageMetadata;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Join front matter and body into the page layout:
///
/// ```text
/// ---
/// <front matter>
/// ---
///
/// <body>
/// ```
pub fn render_page(front_matter: &str, body: &str) -> String {
    format!("---\n{}\n---\n\n{}\n", front_matter.trim(), body.trim())
}

/// Write `<dest_dir>/<stem>.md`, creating `dest_dir` when missing and
/// overwriting any existing page.
pub fn write_page(dest_dir: &Path, stem: &str, meta: &PageMetadata, body: &str) -> Result<PathBuf> {
    let page = render_page(&meta.to_yaml()?, body);
    fs::create_dir_all(dest_dir).map_err(|e| TransformError::io(dest_dir, e))?;
    let dest = dest_dir.join(format!("{}.md", stem));
    fs::write(&dest, page).map_err(|e| TransformError::io(&dest, e))?;
    info!("{}", dest.display());
    Ok(dest)
}
