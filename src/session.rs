//! Session controller: upload a document, keep its context, chat about it.
//!
//! [`ChatSession`] is the Rust counterpart of the browser controller the
//! backend was originally paired with: one upload populates the text and
//! image context, and every subsequent chat turn sends that context along
//! with the user's message. The context lives for the lifetime of the
//! session value — there is no persistence between runs.
//!
//! ## API key resolution
//!
//! Resolved once at construction, most- to least-specific:
//!
//! 1. **Explicit config value** (`SessionConfig::api_key`) — the caller
//!    decided; used as-is.
//! 2. **`GEMINI_API_KEY` environment variable** — set at the execution
//!    environment level (shell, CI).
//! 3. **Key store** — the key persisted by a previous `pdfchat set-key`
//!    (see [`crate::keystore`]).
//!
//! A session cannot exist without a key; [`PdfChatError::MissingApiKey`]
//! names all three remedies.

use crate::client::BackendClient;
use crate::config::SessionConfig;
use crate::error::PdfChatError;
use crate::keystore;
use crate::markdown;
use crate::output::{BotReply, ExtractedImage, UploadOutcome, UploadStats};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Fallback shown when the backend produced no summary.
const NO_SUMMARY: &str = "No summary generated.";

/// A stateful chat session against the PDF backend.
///
/// # Example
/// ```rust,no_run
/// use pdfchat::{ChatSession, SessionConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut session = ChatSession::new(SessionConfig::default())?;
///     let outcome = session.upload("report.pdf".as_ref()).await?;
///     println!("{}", outcome.summary_html);
///     let reply = session.send("What are the key findings?").await?;
///     println!("{}", reply.html);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct ChatSession {
    client: BackendClient,
    config: SessionConfig,
    api_key: String,
    text_context: Vec<Vec<String>>,
    image_context: Vec<ExtractedImage>,
}

impl ChatSession {
    /// Create a session, resolving the API key and building the HTTP client.
    ///
    /// Performs no network I/O.
    pub fn new(config: SessionConfig) -> Result<Self, PdfChatError> {
        let api_key = resolve_api_key(&config)?;
        let client = BackendClient::new(config.clone())?;
        Ok(Self {
            client,
            config,
            api_key,
            text_context: Vec::new(),
            image_context: Vec::new(),
        })
    }

    /// Whether an upload has populated the chat context.
    pub fn has_document(&self) -> bool {
        !self.text_context.is_empty() || !self.image_context.is_empty()
    }

    /// The extracted images from the last upload.
    pub fn images(&self) -> &[ExtractedImage] {
        &self.image_context
    }

    /// Upload a PDF, replacing any previous document context.
    ///
    /// On success the summary is rendered (per `SessionConfig::render_html`)
    /// and the extracted text/images become the context for [`send`].
    /// Backend warnings are returned in the outcome, not raised as errors.
    ///
    /// [`send`]: ChatSession::send
    pub async fn upload(&mut self, path: &Path) -> Result<UploadOutcome, PdfChatError> {
        let start = Instant::now();
        let file_bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let response = self.client.upload(path, &self.api_key).await?;

        // Context replaces wholesale: one document per session at a time.
        self.text_context = response.pages_lines;
        self.image_context = response.extracted_images.clone();

        let summary_html = match response.pdf_summary.as_deref() {
            Some(md) if !md.trim().is_empty() => self.render(md),
            _ => self.render(NO_SUMMARY),
        };

        let stats = UploadStats {
            file_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
            text_pages: self.text_context.len(),
            image_count: self.image_context.len(),
        };

        info!(
            "Upload complete: {} text pages, {} images, {} warnings, {}ms",
            stats.text_pages,
            stats.image_count,
            response.warnings.len(),
            stats.duration_ms
        );

        Ok(UploadOutcome {
            summary_markdown: response.pdf_summary,
            summary_html,
            images: response.extracted_images,
            warnings: response.warnings,
            stats,
        })
    }

    /// Send a chat message with the current document context.
    ///
    /// Works with an empty context too — the backend answers without
    /// document grounding, exactly as the original did before an upload.
    pub async fn send(&self, message: &str) -> Result<BotReply, PdfChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(PdfChatError::EmptyMessage);
        }

        let start = Instant::now();
        let outcome = self
            .client
            .chat(message, &self.text_context, &self.image_context, &self.api_key)
            .await?;

        let text = outcome.response.response;
        let html = self.render(&text);
        debug!("Chat turn done in {}ms", start.elapsed().as_millis());

        Ok(BotReply {
            html,
            text,
            duration_ms: start.elapsed().as_millis() as u64,
            retries: outcome.retries,
        })
    }

    fn render(&self, text: &str) -> String {
        if self.config.render_html {
            markdown::render(text)
        } else {
            text.to_string()
        }
    }
}

/// Resolve the API key from config, environment, or the key store.
fn resolve_api_key(config: &SessionConfig) -> Result<String, PdfChatError> {
    if let Some(ref key) = config.api_key {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }

    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        if !key.trim().is_empty() {
            debug!("API key resolved from GEMINI_API_KEY");
            return Ok(key.trim().to_string());
        }
    }

    if let Some(key) = keystore::load()? {
        debug!("API key resolved from key store");
        return Ok(key);
    }

    Err(PdfChatError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::keystore::TEST_ENV_LOCK as ENV_LOCK;

    fn clean_env() -> impl Drop {
        struct Restore;
        impl Drop for Restore {
            fn drop(&mut self) {
                std::env::remove_var("GEMINI_API_KEY");
                std::env::remove_var("PDFCHAT_CONFIG_DIR");
            }
        }
        std::env::remove_var("GEMINI_API_KEY");
        Restore
    }

    #[test]
    fn explicit_key_wins() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _restore = clean_env();
        std::env::set_var("GEMINI_API_KEY", "env-key");
        let config = SessionConfig::builder().api_key("config-key").build().unwrap();
        assert_eq!(resolve_api_key(&config).unwrap(), "config-key");
    }

    #[test]
    fn env_key_used_when_config_empty() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _restore = clean_env();
        std::env::set_var("GEMINI_API_KEY", "env-key");
        let config = SessionConfig::default();
        assert_eq!(resolve_api_key(&config).unwrap(), "env-key");
    }

    #[test]
    fn keystore_is_last_resort() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _restore = clean_env();
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("PDFCHAT_CONFIG_DIR", dir.path());
        keystore::store("stored-key").unwrap();
        assert_eq!(resolve_api_key(&SessionConfig::default()).unwrap(), "stored-key");
    }

    #[test]
    fn missing_key_is_fatal() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _restore = clean_env();
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("PDFCHAT_CONFIG_DIR", dir.path());
        let err = resolve_api_key(&SessionConfig::default()).unwrap_err();
        assert!(matches!(err, PdfChatError::MissingApiKey));
    }

    #[test]
    fn empty_message_rejected_before_network() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _restore = clean_env();
        let config = SessionConfig::builder().api_key("k").build().unwrap();
        let session = ChatSession::new(config).unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        let err = rt.block_on(session.send("   ")).unwrap_err();
        assert!(matches!(err, PdfChatError::EmptyMessage));
        assert!(!session.has_document());
    }

    #[test]
    fn render_respects_config_flag() {
        let _guard = ENV_LOCK.lock().unwrap();
        let _restore = clean_env();
        let html_on = ChatSession::new(
            SessionConfig::builder().api_key("k").build().unwrap(),
        )
        .unwrap();
        assert_eq!(html_on.render("**x**"), "<p><strong>x</strong></p>");

        let html_off = ChatSession::new(
            SessionConfig::builder()
                .api_key("k")
                .render_html(false)
                .build()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(html_off.render("**x**"), "**x**");
    }
}
