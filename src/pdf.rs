use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Extracts the text of every page with pdf-extract and joins the pages in
/// document order, without a separator.
///
/// The document is read into memory and released before returning, on the
/// error path as well.
pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let pages = pdf_extract::extract_text_by_pages(path)
        .with_context(|| format!("failed to extract text from {}", path.display()))?;
    debug!(
        "extracted {} page(s) from {}",
        pages.len(),
        path.display()
    );
    Ok(pages.concat())
}
