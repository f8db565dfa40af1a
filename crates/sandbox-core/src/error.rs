//! Error taxonomy for the sandbox engine.
//!
//! Only construction-time input can fail. Once a `Simulation` exists, ticks,
//! brush strokes, source edits and queries never return errors: out-of-domain
//! input is a silent no-op and near-zero divisions are skipped per cell.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SandboxError {
    /// A configuration field failed validation.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("invalid brush: {0}")]
    InvalidBrush(String),

    #[error("invalid rain settings: {0}")]
    InvalidRain(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl SandboxError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        SandboxError::InvalidConfig { field, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, SandboxError>;
