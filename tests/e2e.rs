//! End-to-end integration tests for pdfchat.
//!
//! The gated tests talk to a live backend and therefore need a running
//! deployment plus a real API key. They are skipped unless `PDFCHAT_E2E`
//! is set, so they never run in CI by accident.
//!
//! Run with:
//!   PDFCHAT_E2E=1 PDFCHAT_BASE_URL=http://127.0.0.1:8080 \
//!   GEMINI_API_KEY=... cargo test --test e2e -- --nocapture
//!
//! Everything else in this file runs offline.

use pdfchat::{render, ChatSession, SessionConfig};
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

fn e2e_config() -> SessionConfig {
    let mut builder = SessionConfig::builder();
    if let Ok(url) = std::env::var("PDFCHAT_BASE_URL") {
        builder = builder.base_url(url);
    }
    builder.build().expect("valid e2e config")
}

/// Skip this test if PDFCHAT_E2E is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("PDFCHAT_E2E").is_err() {
            println!("SKIP — set PDFCHAT_E2E=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP — test file not found: {}", p.display());
            return;
        }
        p
    }};
}

/// Assert the rendered HTML passes basic well-formedness checks.
fn assert_html_quality(html: &str, context: &str) {
    assert!(!html.trim().is_empty(), "[{context}] HTML is empty");

    // Every list must be closed.
    assert_eq!(
        html.matches("<ul>").count(),
        html.matches("</ul>").count(),
        "[{context}] Unbalanced <ul> tags"
    );
    assert_eq!(
        html.matches("<li>").count(),
        html.matches("</li>").count(),
        "[{context}] Unbalanced <li> tags"
    );
    assert_eq!(
        html.matches("<p>").count(),
        html.matches("</p>").count(),
        "[{context}] Unbalanced <p> tags"
    );

    // The renderer only ever emits these four tags at line starts.
    for line in html.lines() {
        assert!(
            line.starts_with("<p>")
                || line.starts_with("<ul>")
                || line.starts_with("</ul>")
                || line.starts_with("<li>"),
            "[{context}] Unexpected output line: {line:?}"
        );
    }

    println!("[{context}] ✓  {} bytes, quality checks passed", html.len());
}

// ── Renderer tests through the public API (offline) ─────────────────────────

#[test]
fn render_summary_like_input() {
    let html = render(
        "**Summary:**\n\
         * The report proposes a new rollout plan.\n\
         * Costs are itemised on page 4.\n\
         \n\
         Figures appear on pages 2 and 3.",
    );
    assert_html_quality(&html, "summary_like");
    assert!(html.starts_with("<p><strong>Summary:</strong></p>"));
    assert!(html.contains("<li>The report proposes a new rollout plan.</li>"));
    assert!(html.ends_with("<p>Figures appear on pages 2 and 3.</p>"));
}

#[test]
fn render_is_total_over_hostile_input() {
    // Never panics, never errors — whatever the backend sends.
    let many_stars = "*".repeat(500);
    let many_lines = "a\n".repeat(1000);
    let inputs = [
        "",
        "****",
        "**",
        "* ",
        "\n\n\n",
        "**unclosed\n* item\n1.missing space",
        "🎉 **émojis** and unicode ✓",
        "<script>alert(1)</script>",
        many_stars.as_str(),
        many_lines.as_str(),
    ];
    for input in inputs {
        let html = render(input);
        if !html.is_empty() {
            assert_html_quality(&html, "hostile");
        }
    }
}

#[test]
fn render_output_is_not_valid_input() {
    // One pass only: re-rendering HTML wraps tags in fresh paragraphs.
    let once = render("* a");
    let twice = render(&once);
    assert_ne!(once, twice);
    assert!(twice.contains("<p><ul></p>"));
}

// ── Session construction tests (offline) ─────────────────────────────────────

#[test]
fn session_requires_an_api_key_source() {
    let dir = tempfile::tempdir().unwrap();
    // Point the key store at an empty directory so only config counts.
    std::env::set_var("PDFCHAT_CONFIG_DIR", dir.path());
    std::env::remove_var("GEMINI_API_KEY");

    let err = ChatSession::new(SessionConfig::default()).unwrap_err();
    assert!(err.to_string().contains("GEMINI_API_KEY"));

    let ok = ChatSession::new(
        SessionConfig::builder().api_key("k").build().unwrap(),
    );
    assert!(ok.is_ok());
    std::env::remove_var("PDFCHAT_CONFIG_DIR");
}

#[tokio::test]
async fn upload_rejects_missing_file_before_network() {
    let config = SessionConfig::builder()
        .api_key("k")
        // Nothing listens here; the local check must fire first.
        .base_url("http://127.0.0.1:1")
        .build()
        .unwrap();
    let mut session = ChatSession::new(config).unwrap();
    let err = session
        .upload("/definitely/not/a/real/file.pdf".as_ref())
        .await
        .unwrap_err();
    assert!(
        err.to_string().contains("not found"),
        "expected local validation error, got: {err}"
    );
}

// ── Live tests (need a backend + API key) ────────────────────────────────────

#[tokio::test]
async fn e2e_upload_and_chat() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("sample.pdf"));

    let mut session = ChatSession::new(e2e_config()).expect("session");

    let outcome = session
        .upload(&path)
        .await
        .expect("upload should succeed against a live backend");

    assert_html_quality(&outcome.summary_html, "e2e_upload");
    println!(
        "[e2e_upload] {} text pages, {} images, {} warnings",
        outcome.stats.text_pages,
        outcome.stats.image_count,
        outcome.warnings.len()
    );

    let reply = session
        .send("Give me a one-line description of this document.")
        .await
        .expect("chat should succeed");
    assert!(!reply.text.trim().is_empty());
    assert_html_quality(&reply.html, "e2e_chat");
}

#[tokio::test]
async fn e2e_chat_without_document() {
    if std::env::var("PDFCHAT_E2E").is_err() {
        println!("SKIP — set PDFCHAT_E2E=1 to run e2e tests");
        return;
    }

    let session = ChatSession::new(e2e_config()).expect("session");
    let reply = session
        .send("Say hello in five words or fewer.")
        .await
        .expect("context-free chat should succeed");
    assert!(!reply.text.trim().is_empty());
}
