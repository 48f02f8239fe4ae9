use std::io;
use std::time::Duration;

use thiserror::Error;

/// Error that ends a single connection's lifecycle.
///
/// Either the request line could not be parsed, or closing the socket
/// failed after an otherwise clean exchange. A close failure is only
/// promoted to this level when no earlier error exists, so the first
/// fault discovered is the one surfaced.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("close error: {source}")]
    CloseError { source: io::Error },
}

impl HttpError {
    pub fn close(e: io::Error) -> Self {
        Self::CloseError { source: e }
    }
}

/// Errors produced while reading and parsing a request line.
///
/// Each variant is terminal for exactly one request: the connection is
/// closed with no response written, and nothing propagates beyond the
/// connection's own task.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("request line too long, current: {current_size} exceed the limit {max_size}")]
    LineTooLong { current_size: usize, max_size: usize },

    #[error("connection closed before a complete request line, read {read} bytes")]
    IncompleteRequestLine { read: usize },

    #[error("invalid request line: {reason}")]
    InvalidRequestLine { reason: String },

    #[error("unsupported http method: {method}")]
    UnsupportedMethod { method: String },

    #[error("unsupported http version: {version}")]
    UnsupportedVersion { version: String },

    #[error("invalid request uri: {uri}")]
    InvalidUri { uri: String },

    #[error("request line not received within {limit:?}")]
    ReadTimeout { limit: Duration },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn line_too_long(current_size: usize, max_size: usize) -> Self {
        Self::LineTooLong { current_size, max_size }
    }

    pub fn incomplete(read: usize) -> Self {
        Self::IncompleteRequestLine { read }
    }

    pub fn invalid_request_line<S: ToString>(str: S) -> Self {
        Self::InvalidRequestLine { reason: str.to_string() }
    }

    pub fn unsupported_method<S: ToString>(str: S) -> Self {
        Self::UnsupportedMethod { method: str.to_string() }
    }

    pub fn unsupported_version<S: ToString>(str: S) -> Self {
        Self::UnsupportedVersion { version: str.to_string() }
    }

    pub fn invalid_uri<S: ToString>(str: S) -> Self {
        Self::InvalidUri { uri: str.to_string() }
    }

    pub fn read_timeout(limit: Duration) -> Self {
        Self::ReadTimeout { limit }
    }
}
