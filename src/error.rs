//! Error types for the pdfchat library.
//!
//! A single fatal error enum covers every way a session operation can fail:
//! bad local input, a missing API key, transport failures, and backend
//! rejections. Backend *warnings* are not errors — the `/upload` endpoint
//! returns partial results with a `warnings` array, and those are carried
//! inside [`crate::output::UploadOutcome`] so callers can show them without
//! losing the summary.
//!
//! The Markdown renderer has no error type at all: it is total over every
//! string input (see [`crate::markdown`]).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdfchat library.
#[derive(Debug, Error)]
pub enum PdfChatError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// A chat message was empty after trimming.
    #[error("Chat message is empty")]
    EmptyMessage,

    // ── API key errors ────────────────────────────────────────────────────
    /// No API key could be resolved from config, environment, or key store.
    #[error(
        "No API key configured.\n\
         Provide one with --api-key, set GEMINI_API_KEY, or store it once with:\n\
         pdfchat set-key"
    )]
    MissingApiKey,

    /// Reading or writing the stored API key failed.
    #[error("Key store error at '{path}': {source}")]
    KeyStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The HTTP request could not be completed (connection refused, DNS, …).
    #[error("Request to {endpoint} failed: {reason}\nIs the backend running at the configured URL?")]
    RequestFailed { endpoint: String, reason: String },

    /// The HTTP request exceeded the configured timeout.
    #[error("Request to {endpoint} timed out after {secs}s\nIncrease the timeout or check the backend.")]
    RequestTimeout { endpoint: String, secs: u64 },

    // ── Backend errors ────────────────────────────────────────────────────
    /// The backend returned a non-success status with an error message.
    ///
    /// The message is the `error` field of the backend's JSON body when
    /// present, otherwise the raw status line.
    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    /// The backend returned 2xx but the body did not match the expected shape.
    #[error("Unexpected response from {endpoint}: {detail}")]
    InvalidResponse { endpoint: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write a rendered summary or an extracted image to disk.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An extracted image's base64 payload could not be decoded.
    #[error("Invalid image data for page {page} image {index}: {detail}")]
    InvalidImageData {
        page: u32,
        index: u32,
        detail: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_names_remedies() {
        let msg = PdfChatError::MissingApiKey.to_string();
        assert!(msg.contains("GEMINI_API_KEY"));
        assert!(msg.contains("set-key"));
    }

    #[test]
    fn backend_error_display() {
        let e = PdfChatError::Backend {
            status: 400,
            message: "Gemini API Key is missing".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("400"), "got: {msg}");
        assert!(msg.contains("Gemini API Key is missing"));
    }

    #[test]
    fn timeout_display() {
        let e = PdfChatError::RequestTimeout {
            endpoint: "/chat".into(),
            secs: 60,
        };
        assert!(e.to_string().contains("/chat"));
        assert!(e.to_string().contains("60s"));
    }

    #[test]
    fn not_a_pdf_shows_magic() {
        let e = PdfChatError::NotAPdf {
            path: PathBuf::from("notes.txt"),
            magic: *b"hell",
        };
        assert!(e.to_string().contains("notes.txt"));
    }
}
