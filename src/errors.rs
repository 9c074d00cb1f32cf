use std::time::Duration;
use thiserror::Error;

/// Errors raised by the rigctld connection.
#[derive(Debug, Error)]
pub enum RigError {
    /// Could not establish the TCP connection.
    #[error("failed to connect to rigctld at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// rigctld closed the stream (EOF) while a reply was expected.
    #[error("connection closed by rigctld")]
    Closed,

    /// No complete reply arrived within the query timeout.
    #[error("no reply to '{query}' within {timeout:?}")]
    Timeout { query: char, timeout: Duration },

    /// A line that cannot appear in an extended-mode reply.
    #[error("malformed reply line: {0}")]
    Malformed(String),
}

/// Errors raised by a remote store implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be set up (bad URL, unreadable token file).
    #[error("store initialization failed: {0}")]
    Init(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The datastore answered with a non-success HTTP status.
    #[error("datastore returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Signing the service-account assertion failed.
    #[error("token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Path contains an empty segment or addresses through a non-object node.
    #[error("invalid store path: {0}")]
    InvalidPath(String),

    /// Write rejected on purpose (memory store in failure mode).
    #[error("write rejected: {0}")]
    Rejected(String),
}

/// Why a poll response was not applied to the status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// rigctld returned a non-zero `RPRT` code.
    #[error("rigctld returned RPRT {0}")]
    Failed(String),

    /// Successful reply with no data lines.
    #[error("reply carries no data")]
    MissingData,

    #[error("invalid frequency '{0}'")]
    InvalidFrequency(String),
}

/// Configuration load and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
