//! # pdfchat
//!
//! Upload PDF documents to a summarisation backend and chat about their
//! contents — as a library or through the `pdfchat` CLI.
//!
//! ## What this crate does
//!
//! The backend does the heavy lifting (text extraction, image extraction,
//! model calls); this crate is its client. It posts a PDF with an API key,
//! receives a Markdown summary plus extracted images and warnings, keeps
//! the extracted text/image context for the session, and relays chat
//! messages against that context. Backend replies arrive in a restricted
//! Markdown subset, which the [`markdown`] module renders to display-ready
//! HTML.
//!
//! ## Flow Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Validate  local file checks (%PDF magic, readability)
//!  ├─ 2. Upload    POST /upload (multipart: file + API key)
//!  ├─ 3. Context   store extracted text lines + images in the session
//!  ├─ 4. Render    summary Markdown → HTML (<p>/<strong>/<ul>/<li>)
//!  └─ 5. Chat      POST /chat per message, context attached, reply rendered
//! ```
//!
//! Calls are sequential — there is no concurrency to coordinate, and no
//! state outside the [`ChatSession`] value.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfchat::{ChatSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key resolved from config, GEMINI_API_KEY, or the key store
//!     let config = SessionConfig::default();
//!     let mut session = ChatSession::new(config)?;
//!
//!     let outcome = session.upload("document.pdf".as_ref()).await?;
//!     println!("{}", outcome.summary_html);
//!
//!     let reply = session.send("What are the key findings?").await?;
//!     println!("{}", reply.html);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfchat` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdfchat = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod keystore;
pub mod markdown;
pub mod output;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{BackendClient, validate_pdf_path};
pub use config::{SessionConfig, SessionConfigBuilder, DEFAULT_BASE_URL};
pub use error::PdfChatError;
pub use markdown::render;
pub use output::{BotReply, ChatResponse, ExtractedImage, UploadOutcome, UploadResponse, UploadStats};
pub use session::ChatSession;
