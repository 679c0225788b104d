//! Configuration for a pdfchat session.
//!
//! All behaviour is controlled through [`SessionConfig`], built via its
//! [`SessionConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs, serialise them for logging, and diff two runs
//! to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A positional constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on documented defaults
//! for the rest.

use crate::error::PdfChatError;
use serde::{Deserialize, Serialize};

/// Default backend address, matching the original deployment.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Configuration for a chat session against the PDF backend.
///
/// Built via [`SessionConfig::builder()`] or [`SessionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdfchat::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .base_url("https://pdf.example.net")
///     .chat_timeout_secs(90)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Base URL of the backend. `/upload` and `/chat` are appended to it.
    /// Default: `http://127.0.0.1:8080`.
    pub base_url: String,

    /// Explicit API key. Takes precedence over the `GEMINI_API_KEY`
    /// environment variable and the key store.
    pub api_key: Option<String>,

    /// Timeout for the `/upload` round trip in seconds. Default: 120.
    ///
    /// Uploads carry the whole PDF and wait for extraction plus the
    /// summary-generation model call, so they need far more headroom than
    /// chat turns.
    pub upload_timeout_secs: u64,

    /// Timeout for a `/chat` round trip in seconds. Default: 60.
    pub chat_timeout_secs: u64,

    /// Maximum retry attempts on a transient chat failure. Default: 3.
    ///
    /// 429/5xx and timeouts are usually transient (overloaded model,
    /// network blip). Permanent errors (bad API key, 400) are not retried
    /// and surface immediately.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Render backend Markdown to HTML in session results. Default: true.
    ///
    /// When false, `summary_html` / `BotReply::html` carry the raw text
    /// unchanged — useful for terminal display where HTML is noise.
    pub render_html: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            upload_timeout_secs: 120,
            chat_timeout_secs: 60,
            max_retries: 3,
            retry_backoff_ms: 500,
            render_html: true,
        }
    }
}

impl SessionConfig {
    /// Create a new builder for `SessionConfig`.
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The full `/upload` endpoint URL.
    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base_url.trim_end_matches('/'))
    }

    /// The full `/chat` endpoint URL.
    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url.trim_end_matches('/'))
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug)]
pub struct SessionConfigBuilder {
    config: SessionConfig,
}

impl SessionConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn upload_timeout_secs(mut self, secs: u64) -> Self {
        self.config.upload_timeout_secs = secs.max(1);
        self
    }

    pub fn chat_timeout_secs(mut self, secs: u64) -> Self {
        self.config.chat_timeout_secs = secs.max(1);
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn render_html(mut self, v: bool) -> Self {
        self.config.render_html = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SessionConfig, PdfChatError> {
        let c = &self.config;
        if c.base_url.trim().is_empty() {
            return Err(PdfChatError::InvalidConfig("base_url is empty".into()));
        }
        if !c.base_url.starts_with("http://") && !c.base_url.starts_with("https://") {
            return Err(PdfChatError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if let Some(ref key) = c.api_key {
            if key.trim().is_empty() {
                return Err(PdfChatError::InvalidConfig("api_key is empty".into()));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = SessionConfig::default();
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.upload_timeout_secs, 120);
        assert_eq!(c.chat_timeout_secs, 60);
        assert_eq!(c.max_retries, 3);
        assert!(c.render_html);
    }

    #[test]
    fn endpoint_urls_strip_trailing_slash() {
        let c = SessionConfig::builder()
            .base_url("http://host:9000/")
            .build()
            .unwrap();
        assert_eq!(c.upload_url(), "http://host:9000/upload");
        assert_eq!(c.chat_url(), "http://host:9000/chat");
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(SessionConfig::builder().base_url("").build().is_err());
        assert!(SessionConfig::builder()
            .base_url("ftp://host")
            .build()
            .is_err());
    }

    #[test]
    fn rejects_blank_api_key() {
        assert!(SessionConfig::builder().api_key("   ").build().is_err());
    }
}
