//! Unified error type for the pppbridge workspace.
//!
//! Transport and encoding failures are fatal for the notification helper;
//! path errors surface through the intercepted call's `errno` in the shim.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Creating the datagram socket failed.
    #[error("socket: {source}")]
    Socket {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Connecting to the supervisor socket failed (including no listener).
    #[error("connect {path}: {source}")]
    Connect {
        /// Socket path that was dialed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Sending the datagram failed.
    #[error("write: {source}")]
    Send {
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The kernel accepted only part of the message.
    #[error("partial write: sent {sent} of {expected} bytes")]
    PartialWrite {
        /// Bytes accepted by the kernel.
        sent: usize,
        /// Size of the encoded message.
        expected: usize,
    },

    /// An environment entry has no `=` separator.
    #[error("malformed environment entry: {entry:?}")]
    MalformedEnvEntry {
        /// Lossy rendering of the offending entry.
        entry: String,
    },

    /// An environment variable name exceeds the configured maximum.
    #[error("environment variable name {key:?} is longer than {max} bytes")]
    KeyTooLong {
        /// Lossy rendering of the offending name.
        key: String,
        /// Configured maximum length.
        max: usize,
    },

    /// The same variable name appears twice in the environment.
    #[error("duplicate environment variable {key:?}")]
    DuplicateKey {
        /// The repeated name.
        key: String,
    },

    /// A term exceeds the size its wire representation can express.
    #[error("{what} too large to encode: {len}")]
    TermTooLarge {
        /// Kind of term.
        what: &'static str,
        /// Offending size.
        len: usize,
    },

    /// A byte stream is not a valid encoded term.
    #[error("invalid term at byte {offset}: {message}")]
    Decode {
        /// Position of the failure.
        offset: usize,
        /// Description of the failure.
        message: String,
    },

    /// A redirected path would exceed `PATH_MAX`.
    #[error("redirected path is {len} bytes, limit is {max}")]
    PathTooLong {
        /// Length of the rewritten path including the terminating NUL.
        len: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation on a file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, BridgeError>;
