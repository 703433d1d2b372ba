use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors: any of these stops the run before (or instead of) processing.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Config file {} is not found.", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Settings in {} are malformed: {source}", path.display())]
    ConfigMalformed {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },

    #[error("Invalid delay range \"{input}\" (expected MIN-MAX, e.g. 5-10)")]
    MalformedDelay { input: String },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Invalid log level: {input}")]
    InvalidLogLevel { input: String },

    #[error("Invalid log rotation \"{input}\" (expected a size such as 10 MB)")]
    InvalidRotation { input: String },

    #[error("Invalid log format \"{input}\" (expected full, compact or pretty)")]
    InvalidLogFormat { input: String },

    #[error("Invalid log compression \"{input}\" (expected none or gz)")]
    InvalidCompression { input: String },

    #[error("No sessions found in {}", folder.display())]
    NoSessions { folder: PathBuf },

    #[error("Failed to list sessions in {}: {reason}", folder.display())]
    SessionsFolder { folder: PathBuf, reason: String },

    #[error("Failed to access usernames list {}: {source}", path.display())]
    PendingList {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to prepare results folder {}: {source}", path.display())]
    Results {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to set up logging in {}: {source}", path.display())]
    Logging {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Failure while looking up a single username. Always recovered by the worker.
#[derive(Debug, Error)]
pub(crate) enum LookupError {
    #[error("username doesn't belong to a user: {username}")]
    NotAUser { username: String },

    #[error("no account named {username}")]
    NotFound { username: String },

    #[error("remote returned status {code}")]
    Status { code: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Failure while establishing a session. Aborts only the affected worker.
#[derive(Debug, Error)]
pub(crate) enum AuthError {
    #[error("unusable session file {}: {reason}", path.display())]
    InvalidSession { path: PathBuf, reason: String },

    #[error("session rejected by remote (status {code})")]
    Rejected { code: u16 },

    #[error("transport error: {0}")]
    Transport(String),
}
