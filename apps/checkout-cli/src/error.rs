//! # CLI Error Type
//!
//! Unified error type for the checkout runner.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in tally-checkout                         │
//! │                                                                         │
//! │  main()                                                                 │
//! │    │                                                                    │
//! │    ├── bad flag? ─────────── CliError::Usage ──────────────┐            │
//! │    ├── config file/env? ──── CliError::InvalidConfig ──────┤            │
//! │    ├── file unreadable? ──── CliError::Io ─────────────────┤            │
//! │    ├── products.json? ────── CliError::Json ───────────────┤            │
//! │    ├── rules.toml? ───────── CliError::Toml / InvalidRule ─┤            │
//! │    └── checkout? ─────────── CliError::Core ───────────────┤            │
//! │                                                            ▼            │
//! │                             stderr: "error: ..."   exit_code()          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use tally_core::CoreError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Everything that can stop a checkout run before the report is printed.
#[derive(Debug, Error)]
pub enum CliError {
    // =========================================================================
    // Invocation / Configuration
    // =========================================================================
    /// Unknown flag or missing flag value.
    #[error("{0}")]
    Usage(String),

    /// Configuration resolved to something unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // =========================================================================
    // Input Files
    // =========================================================================
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Product file is not a JSON array of product records.
    #[error("Invalid product file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Rule or config file is not valid TOML for its schema.
    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A rule table parsed but its parameters are unusable.
    #[error("Rule {index} ({kind}): {reason}")]
    InvalidRule {
        index: usize,
        kind: &'static str,
        reason: String,
    },

    // =========================================================================
    // Engine
    // =========================================================================
    /// Cart construction or checkout failed.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// - 2: the invocation itself was wrong
    /// - 1: anything else
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            _ => 1,
        }
    }
}
