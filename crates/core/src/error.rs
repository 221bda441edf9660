//! Error types for Droidant
//!
//! Centralized error handling using thiserror. Subsystem crates carry their
//! own error enums; this one covers the shared concerns (settings, IO).

use thiserror::Error;

/// Main error type for Droidant
#[derive(Error, Debug)]
pub enum DroidantError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for Droidant operations
pub type Result<T> = std::result::Result<T, DroidantError>;
