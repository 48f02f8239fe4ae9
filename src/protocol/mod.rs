//! Protocol types shared across the crate.
//!
//! This module holds the request-side vocabulary ([`RequestLine`],
//! [`Request`], [`QueryParams`]) and the error taxonomy
//! ([`ParseError`], [`HttpError`]).

mod error;
mod query;
mod request;

pub use error::{HttpError, ParseError};
pub use query::QueryParams;
pub use request::{Request, RequestLine};
