use std::path::Path;

use tracing::debug;

use crate::error::MatchError;

/// Extracts the text of every page of a PDF resume, in page order.
pub fn extract_pdf_text(path: &Path) -> Result<String, MatchError> {
    let text = pdf_extract::extract_text(path).map_err(|e| MatchError::Pdf {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), chars = text.len(), "Extracted resume text");
    Ok(text)
}
