use bytes::Bytes;
use thiserror::Error;

const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("file is not a PDF document")]
    NotAPdf,
    #[error("could not read PDF: {0}")]
    Parse(String),
    #[error("PDF parser crashed on this file")]
    Corrupt,
    #[error("PDF contains no extractable text")]
    NoText,
}

/// Text pulled out of an uploaded PDF, one entry per page.
#[derive(Debug, Clone)]
pub struct Extraction {
    pages: Vec<String>,
}

impl Extraction {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Full document text, pages joined with a newline. A page with no
    /// text keeps its slot as an empty segment, so the separator count
    /// always tracks the page count.
    pub fn text(&self) -> String {
        self.pages.join("\n")
    }
}

#[cfg(test)]
impl Extraction {
    pub(crate) fn from_pages(pages: Vec<String>) -> Self {
        Self { pages }
    }
}

pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Extract per-page text from a PDF held in memory.
///
/// Parsing is CPU-bound and the parser is known to panic on some hostile
/// files, so the work runs on the blocking pool and a panic surfaces as an
/// ordinary decode failure instead of taking the worker down.
pub async fn extract_pdf(bytes: Bytes) -> Result<Extraction, ExtractError> {
    if !looks_like_pdf(&bytes) {
        return Err(ExtractError::NotAPdf);
    }

    let joined =
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
            .await;

    let raw_pages = match joined {
        Ok(Ok(pages)) => pages,
        Ok(Err(err)) => return Err(ExtractError::Parse(err.to_string())),
        Err(join_err) if join_err.is_panic() => return Err(ExtractError::Corrupt),
        Err(join_err) => return Err(ExtractError::Parse(join_err.to_string())),
    };

    let pages: Vec<String> = raw_pages
        .into_iter()
        .map(|page| page.trim().to_string())
        .collect();

    if pages.iter().all(String::is_empty) {
        return Err(ExtractError::NoText);
    }
    Ok(Extraction { pages })
}
