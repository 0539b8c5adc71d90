//! Crate-wide error type and `Result` alias.

use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Template file missing at the expected location.
    #[error("template not found: {}", path.display())]
    TemplateNotFound { path: PathBuf },

    /// Template exists but the read failed.
    #[error("failed to read template {}: {source}", path.display())]
    TemplateRead { path: PathBuf, source: io::Error },

    /// Template violates the composition contract; indicates a packaging
    /// defect, not a runtime condition.
    #[error("template contract violated: {0}")]
    TemplateContract(String),

    /// Inbound envelope carried a command outside the closed vocabulary, or a
    /// known command with a payload that does not match its declared shape.
    #[error("command not supported: {0}")]
    UnsupportedCommand(String),

    /// Malformed semantic version, reported by the version engine.
    #[error("invalid version: {0}")]
    Version(#[from] semver::Error),

    #[error("json error: {0}")]
    Json(Box<serde_json::Error>),

    /// OS entropy source failed while drawing a nonce.
    #[error("entropy source failed: {0}")]
    Entropy(getrandom::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Box::new(err))
    }
}
