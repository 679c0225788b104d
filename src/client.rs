//! HTTP client for the backend's `/upload` and `/chat` endpoints.
//!
//! The backend contract (shapes in [`crate::output`]):
//!
//! - `POST /upload` — multipart form with the PDF bytes under `file` and the
//!   API key under `gemini_api_key`; returns extracted text, images, a
//!   Markdown summary, and warnings.
//! - `POST /chat` — JSON body with the message plus the previously extracted
//!   text/image context; the API key travels in the `X-Gemini-Api-Key`
//!   header; returns the model's reply.
//!
//! ## Retry Strategy
//!
//! Chat turns retry transient failures (timeout, connection blip, 429, 5xx)
//! with exponential backoff: `retry_backoff_ms * 2^attempt`, so 500 ms →
//! 1 s → 2 s with the defaults. Permanent errors (400, bad key) surface
//! immediately. Uploads are not retried — the body is large and the backend
//! call is expensive, so the caller decides whether to resubmit.

use crate::config::SessionConfig;
use crate::error::PdfChatError;
use crate::output::{BackendErrorBody, ChatResponse, ExtractedImage, UploadResponse};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// `POST /chat` request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    pdf_text_context: &'a [Vec<String>],
    pdf_image_context: &'a [ExtractedImage],
}

/// A successful chat turn plus the retries it took to get there.
#[derive(Debug)]
pub struct ChatOutcome {
    pub response: ChatResponse,
    pub retries: u8,
}

/// Client over the two backend endpoints.
///
/// Cheap to clone; the inner `reqwest::Client` is reference-counted.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: SessionConfig,
}

impl BackendClient {
    /// Build a client from the session configuration.
    pub fn new(config: SessionConfig) -> Result<Self, PdfChatError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| PdfChatError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// Upload a local PDF and return the backend's extraction + summary.
    ///
    /// The file is validated locally first (exists, readable, `%PDF` magic)
    /// so a typo'd path fails in microseconds instead of after a full
    /// upload round trip.
    pub async fn upload(
        &self,
        path: &Path,
        api_key: &str,
    ) -> Result<UploadResponse, PdfChatError> {
        let (file_name, bytes) = read_pdf(path).await?;
        info!("Uploading {} ({} bytes)", path.display(), bytes.len());

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str("application/pdf")
                    .map_err(|e| PdfChatError::Internal(format!("multipart: {e}")))?,
            )
            .text("gemini_api_key", api_key.to_string());

        let url = self.config.upload_url();
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(Duration::from_secs(self.config.upload_timeout_secs))
            .send()
            .await
            .map_err(|e| map_transport_error("/upload", e, self.config.upload_timeout_secs))?;

        parse_response::<UploadResponse>("/upload", response).await
    }

    /// Send one chat message with the given document context.
    ///
    /// Transient failures are retried per the config; see the module docs.
    pub async fn chat(
        &self,
        message: &str,
        text_context: &[Vec<String>],
        image_context: &[ExtractedImage],
        api_key: &str,
    ) -> Result<ChatOutcome, PdfChatError> {
        let body = ChatRequest {
            message,
            pdf_text_context: text_context,
            pdf_image_context: image_context,
        };
        let url = self.config.chat_url();

        let mut last_err: Option<PdfChatError> = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let backoff = self.config.retry_backoff_ms * 2u64.pow(attempt - 1);
                warn!(
                    "Chat retry {}/{} after {}ms",
                    attempt, self.config.max_retries, backoff
                );
                sleep(Duration::from_millis(backoff)).await;
            }

            let result = self
                .http
                .post(&url)
                .header("X-Gemini-Api-Key", api_key)
                .json(&body)
                .timeout(Duration::from_secs(self.config.chat_timeout_secs))
                .send()
                .await
                .map_err(|e| map_transport_error("/chat", e, self.config.chat_timeout_secs));

            match result {
                Ok(response) => {
                    let status = response.status();
                    if is_transient_status(status) {
                        let err = backend_error("/chat", response).await;
                        warn!("Chat attempt {} got HTTP {}", attempt + 1, status);
                        last_err = Some(err);
                        continue;
                    }
                    let parsed = parse_response::<ChatResponse>("/chat", response).await?;
                    debug!("Chat reply: {} chars", parsed.response.len());
                    return Ok(ChatOutcome {
                        response: parsed,
                        retries: attempt as u8,
                    });
                }
                Err(e) if is_transient_error(&e) => {
                    warn!("Chat attempt {} failed: {}", attempt + 1, e);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err
            .unwrap_or_else(|| PdfChatError::Internal("chat retries exhausted".into())))
    }
}

// ── Local input validation ───────────────────────────────────────────────

/// Read a local PDF, checking existence, readability, and magic bytes.
async fn read_pdf(path: &Path) -> Result<(String, Vec<u8>), PdfChatError> {
    if !path.exists() {
        return Err(PdfChatError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfChatError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PdfChatError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(PdfChatError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());

    debug!("Validated local PDF: {}", path.display());
    Ok((file_name, bytes))
}

/// Validate a path without reading the whole file. Used by callers that
/// want to fail fast before constructing a session.
pub fn validate_pdf_path(path: &Path) -> Result<PathBuf, PdfChatError> {
    use std::io::Read;

    if !path.exists() {
        return Err(PdfChatError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    match std::fs::File::open(path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(PdfChatError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfChatError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(PdfChatError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(path.to_path_buf())
}

// ── Response handling ────────────────────────────────────────────────────

fn map_transport_error(endpoint: &str, e: reqwest::Error, timeout_secs: u64) -> PdfChatError {
    if e.is_timeout() {
        PdfChatError::RequestTimeout {
            endpoint: endpoint.to_string(),
            secs: timeout_secs,
        }
    } else {
        PdfChatError::RequestFailed {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        }
    }
}

fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status.as_u16() == 429 || status.is_server_error()
}

fn is_transient_error(e: &PdfChatError) -> bool {
    matches!(
        e,
        PdfChatError::RequestTimeout { .. } | PdfChatError::RequestFailed { .. }
    )
}

/// Turn a non-2xx response into [`PdfChatError::Backend`], preferring the
/// server's `{"error": ...}` message over the bare status line.
async fn backend_error(endpoint: &str, response: reqwest::Response) -> PdfChatError {
    let status = response.status().as_u16();
    let message = match response.text().await {
        Ok(body) => serde_json::from_str::<BackendErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    format!("HTTP error from {endpoint}")
                } else {
                    body.chars().take(200).collect()
                }
            }),
        Err(e) => format!("unreadable error body: {e}"),
    };
    PdfChatError::Backend { status, message }
}

async fn parse_response<T: serde::de::DeserializeOwned>(
    endpoint: &str,
    response: reqwest::Response,
) -> Result<T, PdfChatError> {
    if !response.status().is_success() {
        return Err(backend_error(endpoint, response).await);
    }
    let body = response
        .text()
        .await
        .map_err(|e| PdfChatError::InvalidResponse {
            endpoint: endpoint.to_string(),
            detail: format!("body read failed: {e}"),
        })?;
    serde_json::from_str(&body).map_err(|e| PdfChatError::InvalidResponse {
        endpoint: endpoint.to_string(),
        detail: format!("{e}"),
    })
}
