//! Error types
//!
//! `SchemaError` is fatal at startup. `ValidationError` and `InvokeError` are
//! recovered per request and rendered as JSON error bodies.

use crate::schema::ValueType;
use thiserror::Error;

/// Failure to load the routing document into a schema store
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read routing document {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON routing document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML routing document: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("routing document has an empty \"cmd\"")]
    EmptyCommand,
    #[error("route name must not be empty")]
    EmptyRoute,
    #[error("route [{0}] contains characters that need percent-encoding")]
    InvalidRouteName(String),
    #[error("route [{route}] declares invalid method [{method}]")]
    InvalidMethod { route: String, method: String },
    #[error("route [{method} {path}] is declared more than once")]
    DuplicateRoute { path: String, method: String },
    #[error("default for [{param}] on [{method} {path}] does not fit a 64-bit integer")]
    IntegerOutOfRange {
        path: String,
        method: String,
        param: String,
    },
}

/// Request body rejected by the parameter schema
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Incorrect parameter [{0}]")]
    UnknownParameter(String),
    #[error("The value of [{name}] should be type [{expected}] not [{actual}]")]
    TypeMismatch {
        name: String,
        expected: ValueType,
        actual: ValueType,
    },
}

/// External command could not produce a result
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} did not finish within {seconds}s")]
    Timeout { command: String, seconds: u64 },
}
