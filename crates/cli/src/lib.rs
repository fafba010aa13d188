pub mod commands;
pub mod profile;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing_subscriber::EnvFilter;

pub use profile::{load_profile, Profile, ProfileSpec, RuleSpec};

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `level` when set, so a single module can be turned up
/// without touching the command line.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("Invalid log level '{level}'"))?,
    };
    // A subscriber may already be installed when commands run in-process (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}

/// Current time as an RFC 3339 string for report metadata.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Read a symbol listing as text. Returns the text and its SHA-256.
pub fn read_listing(path: &Path) -> Result<(String, String)> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read symbol listing at {}", path.display()))?;
    let hash = sha256_bytes(&bytes);
    let text = String::from_utf8(bytes)
        .with_context(|| format!("Symbol listing is not valid UTF-8: {}", path.display()))?;
    Ok((text, hash))
}

/// Variant label derived from a listing path: the file stem, or `variant` when there is none.
pub fn infer_label(path: &Path) -> String {
    path.file_stem().and_then(|os_str| os_str.to_str()).unwrap_or("variant").to_string()
}
