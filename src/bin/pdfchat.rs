//! CLI binary for pdfchat.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SessionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdfchat::{markdown, ChatSession, SessionConfig};
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Store your API key once
  pdfchat set-key

  # Upload a PDF and print the rendered summary
  pdfchat upload report.pdf

  # Raw Markdown summary, extracted images saved to ./images/
  pdfchat upload report.pdf --raw --save-images images

  # Upload then chat interactively about the document
  pdfchat chat --file report.pdf

  # Chat without a document (no context attached)
  pdfchat chat

  # Run the Markdown renderer over a file or stdin
  pdfchat render summary.md
  echo '* a' | pdfchat render

  # Against a remote deployment
  pdfchat --base-url https://pdf.example.net upload report.pdf

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY       API key (overridden by --api-key)
  PDFCHAT_BASE_URL     Backend base URL (overridden by --base-url)
  PDFCHAT_CONFIG_DIR   Override the key-store directory

SETUP:
  1. Store the key:   pdfchat set-key        (or: export GEMINI_API_KEY=...)
  2. Upload + chat:   pdfchat chat --file document.pdf
"#;

/// Upload PDFs to a summarisation backend and chat about their contents.
#[derive(Parser, Debug)]
#[command(
    name = "pdfchat",
    version,
    about = "Upload PDFs to a summarisation backend and chat about their contents",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL.
    #[arg(long, global = true, env = "PDFCHAT_BASE_URL")]
    base_url: Option<String>,

    /// API key (overrides GEMINI_API_KEY and the key store).
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Upload timeout in seconds.
    #[arg(long, global = true, default_value_t = 120)]
    upload_timeout: u64,

    /// Chat timeout in seconds.
    #[arg(long, global = true, default_value_t = 60)]
    chat_timeout: u64,

    /// Retries per chat turn on transient failure.
    #[arg(long, global = true, default_value_t = 3)]
    max_retries: u32,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a PDF and print its summary.
    Upload {
        /// Local PDF file path.
        file: PathBuf,

        /// Print the raw Markdown summary instead of rendered HTML.
        #[arg(long)]
        raw: bool,

        /// Output the full upload outcome as JSON.
        #[arg(long, conflicts_with = "raw")]
        json: bool,

        /// Write extracted images into this directory.
        #[arg(long, value_name = "DIR")]
        save_images: Option<PathBuf>,
    },

    /// Chat interactively; optionally upload a document first for context.
    Chat {
        /// PDF to upload before the first message.
        #[arg(long, value_name = "PDF")]
        file: Option<PathBuf>,

        /// Print replies as rendered HTML instead of raw text.
        #[arg(long)]
        html: bool,
    },

    /// Render restricted-Markdown text to HTML (file or stdin).
    Render {
        /// Input file; reads stdin when omitted.
        file: Option<PathBuf>,
    },

    /// Store an API key for future sessions (prompts on stdin).
    SetKey {
        /// Key value; prompted for when omitted.
        key: Option<String>,
    },

    /// Remove the stored API key.
    ClearKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Render { ref file } => run_render(file.as_deref()),
        Command::SetKey { ref key } => run_set_key(key.as_deref()),
        Command::ClearKey => {
            pdfchat::keystore::clear().context("Failed to clear the stored key")?;
            if !cli.quiet {
                eprintln!("{} stored API key removed", green("✔"));
            }
            Ok(())
        }
        Command::Upload {
            ref file,
            raw,
            json,
            ref save_images,
        } => run_upload(&cli, file, raw, json, save_images.as_deref()).await,
        Command::Chat { ref file, html } => run_chat(&cli, file.as_deref(), html).await,
    }
}

/// Map CLI args to `SessionConfig` and open a session.
fn build_session(cli: &Cli, render_html: bool) -> Result<ChatSession> {
    let mut builder = SessionConfig::builder()
        .upload_timeout_secs(cli.upload_timeout)
        .chat_timeout_secs(cli.chat_timeout)
        .max_retries(cli.max_retries)
        .render_html(render_html);

    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url.clone());
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }

    let config = builder.build().context("Invalid configuration")?;
    ChatSession::new(config).context("Could not open a session")
}

fn thinking_spinner(prefix: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix(prefix.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

async fn run_upload(
    cli: &Cli,
    file: &std::path::Path,
    raw: bool,
    json: bool,
    save_images: Option<&std::path::Path>,
) -> Result<()> {
    // Fail on a bad path before opening the session.
    pdfchat::validate_pdf_path(file)?;

    let mut session = build_session(cli, !raw)?;

    let bar = (!cli.quiet).then(|| {
        let b = thinking_spinner("Uploading");
        b.set_message(format!("{} — extracting and summarising…", file.display()));
        b
    });

    let outcome = session.upload(file).await;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    let outcome = outcome.context("Upload failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    if raw {
        match outcome.summary_markdown.as_deref() {
            Some(md) => println!("{md}"),
            None => println!("No summary generated."),
        }
    } else {
        println!("{}", outcome.summary_html);
    }

    for warning in &outcome.warnings {
        eprintln!("{} {}", yellow("⚠"), warning);
    }

    if let Some(dir) = save_images {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for img in &outcome.images {
            let path = img.save_to(dir)?;
            if !cli.quiet {
                eprintln!("  {} {}", dim("wrote"), path.display());
            }
        }
    }

    if !cli.quiet {
        eprintln!(
            "{} {} text pages, {} images, {}ms",
            green("✔"),
            bold(&outcome.stats.text_pages.to_string()),
            outcome.stats.image_count,
            outcome.stats.duration_ms,
        );
    }

    Ok(())
}

async fn run_chat(cli: &Cli, file: Option<&std::path::Path>, html: bool) -> Result<()> {
    let mut session = build_session(cli, html)?;

    if let Some(path) = file {
        pdfchat::validate_pdf_path(path)?;
        let bar = (!cli.quiet).then(|| {
            let b = thinking_spinner("Uploading");
            b.set_message(format!("{}…", path.display()));
            b
        });
        let outcome = session.upload(path).await;
        if let Some(b) = &bar {
            b.finish_and_clear();
        }
        let outcome = outcome.context("Upload failed")?;

        for warning in &outcome.warnings {
            eprintln!("{} {}", yellow("⚠"), warning);
        }
        eprintln!(
            "{} PDF processed! You can now ask me questions about its content.",
            cyan("◆")
        );
    } else {
        eprintln!(
            "{} No document loaded — answers will have no PDF context.",
            dim("·")
        );
    }

    eprintln!("{}", dim("Type a message and press Enter; empty line or Ctrl-D quits."));

    let stdin = io::stdin();
    loop {
        eprint!("{} ", bold("you>"));
        io::stderr().flush().ok();

        let mut line = String::new();
        let read = stdin.lock().read_line(&mut line)?;
        if read == 0 {
            break; // EOF
        }
        let message = line.trim();
        if message.is_empty() {
            break;
        }

        let bar = (!cli.quiet).then(|| {
            let b = thinking_spinner("AI is thinking");
            b.set_message("…");
            b
        });
        let reply = session.send(message).await;
        if let Some(b) = &bar {
            b.finish_and_clear();
        }

        match reply {
            Ok(reply) => {
                let shown = if html { &reply.html } else { &reply.text };
                println!("{} {}", cyan("bot>"), shown);
                if reply.retries > 0 && !cli.quiet {
                    eprintln!("  {}", dim(&format!("({} retries)", reply.retries)));
                }
            }
            Err(e) => {
                // A failed turn doesn't end the session, matching the
                // original controller's behaviour.
                eprintln!("{} {}", red("✗"), e);
            }
        }
    }

    if !cli.quiet {
        eprintln!("{} bye", green("✔"));
    }
    Ok(())
}

fn run_render(file: Option<&std::path::Path>) -> Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let html = markdown::render(&text);
    if !html.is_empty() {
        println!("{html}");
    }
    Ok(())
}

fn run_set_key(key: Option<&str>) -> Result<()> {
    let key = match key {
        Some(k) => k.to_string(),
        None => {
            eprint!("API key: ");
            io::stderr().flush().ok();
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line
        }
    };

    let path = pdfchat::keystore::store(&key).context("Failed to store the key")?;
    eprintln!("{} key stored at {}", green("✔"), dim(&path.display().to_string()));
    Ok(())
}
