//! Request handler traits and utilities.
//!
//! A handler is a capability: it receives the open connection (wrapped in
//! a [`Request`]) together with the parsed query parameters, and performs
//! the rest of the exchange itself — writing whatever response bytes it
//! wants and letting the connection close when the request is dropped.
//!
//! Most callers never implement [`Handler`] directly; an async function
//! taking a [`Request`] can be adapted with [`make_handler`]:
//!
//! ```
//! use line_http::{Request, make_handler};
//! use tokio::io::AsyncWriteExt;
//!
//! async fn ping(mut request: Request) -> std::io::Result<()> {
//!     request.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\npong").await
//! }
//!
//! let handler = make_handler(ping);
//! ```

use std::error::Error;

use async_trait::async_trait;

use crate::protocol::Request;

/// Boxed error a handler may return; it is logged, never propagated.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// An operation invoked with a dispatched request.
///
/// Implementations are stored in the registry behind `Arc` and may be
/// called from many connection tasks concurrently.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: Request) -> Result<(), BoxError>;
}

/// Adapter turning an async function into a [`Handler`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut, Err> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), Err>> + Send,
    Err: Into<BoxError>,
{
    async fn handle(&self, request: Request) -> Result<(), BoxError> {
        (self.f)(request).await.map_err(Into::into)
    }
}

/// Wraps an async function in a [`HandlerFn`] suitable for registration.
pub fn make_handler<F, Fut, Err>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), Err>> + Send,
    Err: Into<BoxError>,
{
    HandlerFn { f }
}
