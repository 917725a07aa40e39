//! Error taxonomy for one export run
//!
//! Every variant is terminal: nothing is retried, the binary reports the
//! error and exits with `exit_code()`.

use std::io;

use thiserror::Error;

/// Longest body excerpt carried inside an error
const BODY_SNIPPET_LEN: usize = 512;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("invalid argument: {0}")]
    Argument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unable to perform request: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned status {status}, body {body}")]
    HttpStatus { status: u16, body: String },

    #[error("unable to decode response: {source} (raw: {body})")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    #[error("API returned error: {0:?}")]
    Api(String),

    #[error("got result for wrong {field}? expected {expected:?}, got {actual:?}")]
    ProtocolMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("malformed history record: {0}")]
    MalformedRecord(#[from] RecordError),

    #[error("unable to write CSV: {0}")]
    Write(String),
}

/// Why a raw `[index, hashrate, balance]` tuple could not be decoded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("wanted {expected} items, got {actual}, entry: {raw}")]
    Arity {
        expected: usize,
        actual: usize,
        raw: String,
    },

    #[error("unable to decode {field}: {reason}, entry: {raw}")]
    Field {
        field: &'static str,
        reason: String,
        raw: String,
    },
}

impl ExportError {
    /// Process exit code: 2 for usage problems, 1 for everything at runtime
    pub fn exit_code(&self) -> u8 {
        match self {
            ExportError::Argument(_) | ExportError::Config(_) => 2,
            _ => 1,
        }
    }

    pub fn http_status(status: u16, body: &str) -> Self {
        ExportError::HttpStatus {
            status,
            body: snippet(body),
        }
    }

    pub fn decode(source: serde_json::Error, body: &str) -> Self {
        ExportError::Decode {
            source,
            body: snippet(body),
        }
    }
}

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Write(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Write(err.to_string())
    }
}

/// Truncate a response body for inclusion in an error message
pub fn snippet(body: &str) -> String {
    if body.len() <= BODY_SNIPPET_LEN {
        return body.to_string();
    }
    let mut end = BODY_SNIPPET_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}… ({} bytes total)", &body[..end], body.len())
}
