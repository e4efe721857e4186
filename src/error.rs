//! Error types for bastionctl.
//!
//! All errors are represented by [`BastionError`], which covers address
//! parsing, template rendering, cluster discovery, child process launch and
//! profile loading.

use std::path::PathBuf;
use thiserror::Error;

/// All possible errors that can occur in bastionctl.
#[derive(Error, Debug)]
pub enum BastionError {
    /// A `host:port` string (or a value derived from one) is malformed.
    #[error("Invalid address {addr:?}: {reason}")]
    AddressFormat {
        /// The offending input, verbatim.
        addr: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The SSH config template failed to parse or execute.
    #[error("Template error: {0}")]
    Template(String),

    /// The cluster topology could not be obtained from the proxy.
    #[error("Failed to reach proxy: {0}")]
    Connection(String),

    /// The ssh client could not be launched.
    #[error("Failed to run {program}: {source}")]
    ChildProcess {
        /// Path of the program that was being spawned.
        program: String,
        /// Underlying launch failure.
        #[source]
        source: std::io::Error,
    },

    /// Config file does not exist at the expected path.
    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    /// Could not determine the user's config or home directory.
    #[error("Could not determine config directory")]
    NoConfigDir,

    /// Failed to read a file from disk.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing failed.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A value required by the command is absent from both flags and profile.
    #[error("Missing required setting: {0}")]
    MissingProfileField(&'static str),
}

impl BastionError {
    /// Build an [`BastionError::AddressFormat`] for `addr`.
    pub fn address(addr: &str, reason: impl Into<String>) -> Self {
        BastionError::AddressFormat {
            addr: addr.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenient Result type alias for bastionctl operations.
pub type Result<T> = std::result::Result<T, BastionError>;
