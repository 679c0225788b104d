//! Persistent API-key storage: a single key-value lookup on disk.
//!
//! The browser front-end kept the key in `localStorage` under one entry;
//! the CLI equivalent is one file, `{config_dir}/pdfchat/api_key`, holding
//! the key verbatim. Nothing else is ever persisted.
//!
//! Location resolution, most- to least-specific:
//! 1. `PDFCHAT_CONFIG_DIR` environment variable (tests and containers)
//! 2. The platform config directory via `dirs::config_dir()`
//! 3. `~/.config` as a last resort
//!
//! On Unix the file is written with mode 0600 since it holds a credential.

use crate::error::PdfChatError;
use std::path::PathBuf;
use tracing::debug;

const KEY_FILE: &str = "api_key";

/// Resolve the directory holding the key file.
pub fn store_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("PDFCHAT_CONFIG_DIR") {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|d| d.join("pdfchat"))
}

fn key_path() -> Option<PathBuf> {
    store_dir().map(|d| d.join(KEY_FILE))
}

/// Load the stored API key, if one exists.
///
/// Returns `Ok(None)` when no key has been stored; only genuine I/O
/// failures are errors.
pub fn load() -> Result<Option<String>, PdfChatError> {
    let Some(path) = key_path() else {
        return Ok(None);
    };
    match std::fs::read_to_string(&path) {
        Ok(contents) => {
            let key = contents.trim().to_string();
            if key.is_empty() {
                Ok(None)
            } else {
                debug!("Loaded API key from {}", path.display());
                Ok(Some(key))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(PdfChatError::KeyStore { path, source: e }),
    }
}

/// Store the API key for future sessions, replacing any previous key.
pub fn store(key: &str) -> Result<PathBuf, PdfChatError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(PdfChatError::InvalidConfig("API key is empty".into()));
    }
    let Some(dir) = store_dir() else {
        return Err(PdfChatError::Internal(
            "Could not determine a config directory for the key store".into(),
        ));
    };
    let path = dir.join(KEY_FILE);

    std::fs::create_dir_all(&dir).map_err(|e| PdfChatError::KeyStore {
        path: dir.clone(),
        source: e,
    })?;
    std::fs::write(&path, key).map_err(|e| PdfChatError::KeyStore {
        path: path.clone(),
        source: e,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600)).map_err(|e| {
            PdfChatError::KeyStore {
                path: path.clone(),
                source: e,
            }
        })?;
    }

    debug!("Stored API key at {}", path.display());
    Ok(path)
}

/// Remove the stored API key. Succeeds silently if none exists.
pub fn clear() -> Result<(), PdfChatError> {
    let Some(path) = key_path() else {
        return Ok(());
    };
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PdfChatError::KeyStore { path, source: e }),
    }
}

/// Serialises env-var mutation across the crate's tests;
/// `PDFCHAT_CONFIG_DIR` and `GEMINI_API_KEY` are process-global.
#[cfg(test)]
pub(crate) static TEST_ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
