//! Errors of the fallible surfaces: format lookup, JSON views and option handling.
//!
//! Markdown import and export are total and never produce these.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// No format registered under this name
    FormatNotFound(String),
    /// Source text the format could not read
    ParseError(String),
    /// Note the format could not write
    SerializationError(String),
    /// Operation the format does not offer, or an option value it does not accept
    NotSupported(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Unknown format '{name}'"),
            FormatError::ParseError(msg) => write!(f, "Could not parse input: {msg}"),
            FormatError::SerializationError(msg) => write!(f, "Could not serialize note: {msg}"),
            FormatError::NotSupported(msg) => write!(f, "Not supported: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            FormatError::SerializationError(err.to_string())
        } else {
            FormatError::ParseError(err.to_string())
        }
    }
}
