//! Wire and result types for the `/upload` and `/chat` endpoints.
//!
//! Field names mirror the backend's JSON exactly (`pages_lines`,
//! `extracted_images`, `pdf_summary`, …) so serde needs no renaming. The
//! library-facing [`UploadOutcome`] and [`BotReply`] wrap the raw responses
//! with rendered HTML and timing, which is what most callers actually want.

use crate::error::PdfChatError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One image extracted from the uploaded PDF.
///
/// The payload is base64 text as sent on the wire; use [`decode`] for the
/// raw bytes or [`save_to`] to write it to disk.
///
/// [`decode`]: ExtractedImage::decode
/// [`save_to`]: ExtractedImage::save_to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedImage {
    /// Base64-encoded image bytes.
    pub data: String,
    /// File-extension tag reported by the extractor (`png`, `jpeg`, …).
    pub ext: String,
    /// 1-based page the image was found on.
    pub page_num: u32,
    /// 1-based index of the image on that page.
    pub image_index: u32,
}

impl ExtractedImage {
    /// Decode the base64 payload to raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>, PdfChatError> {
        STANDARD
            .decode(&self.data)
            .map_err(|e| PdfChatError::InvalidImageData {
                page: self.page_num,
                index: self.image_index,
                detail: e.to_string(),
            })
    }

    /// The canonical file name for this image: `page{N}_img{M}.{ext}`.
    pub fn file_name(&self) -> String {
        format!("page{}_img{}.{}", self.page_num, self.image_index, self.ext)
    }

    /// Decode and write the image into `dir`, returning the written path.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, PdfChatError> {
        let bytes = self.decode()?;
        let path = dir.join(self.file_name());
        std::fs::write(&path, &bytes).map_err(|e| PdfChatError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

/// Raw `/upload` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Extracted text, one `Vec<String>` of sentence lines per page.
    #[serde(default)]
    pub pages_lines: Vec<Vec<String>>,
    /// Images found in the document.
    #[serde(default)]
    pub extracted_images: Vec<ExtractedImage>,
    /// Markdown summary produced by the backend's model, if any.
    #[serde(default)]
    pub pdf_summary: Option<String>,
    /// Non-fatal extraction/summarisation problems.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Raw `/chat` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The model's reply text (Markdown subset).
    pub response: String,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendErrorBody {
    pub error: String,
}

/// Timing for one upload round trip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadStats {
    /// Size of the uploaded file in bytes.
    pub file_bytes: u64,
    /// Wall-clock duration of the whole round trip.
    pub duration_ms: u64,
    /// Pages of text the backend extracted.
    pub text_pages: usize,
    /// Images the backend extracted.
    pub image_count: usize,
}

/// Result of [`crate::session::ChatSession::upload`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// The backend's summary as sent (Markdown subset), when one was
    /// produced.
    pub summary_markdown: Option<String>,
    /// The summary rendered to HTML, or the fallback paragraph when the
    /// backend produced none.
    pub summary_html: String,
    /// Images extracted from the document.
    pub images: Vec<ExtractedImage>,
    /// Non-fatal problems reported by the backend.
    pub warnings: Vec<String>,
    /// Timing and size information.
    pub stats: UploadStats,
}

/// Result of [`crate::session::ChatSession::send`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotReply {
    /// The reply as sent by the backend (Markdown subset).
    pub text: String,
    /// The reply rendered to HTML.
    pub html: String,
    /// Wall-clock duration of the round trip.
    pub duration_ms: u64,
    /// Transport retries consumed before this reply arrived.
    pub retries: u8,
}
