//! Request-side protocol types.
//!
//! [`RequestLine`] is what the decoder produces from the first line of an
//! HTTP/1.1 request. [`Request`] is the context handed to a registered
//! handler: the open connection plus the parsed query parameters.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::Method;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;

use crate::protocol::QueryParams;

/// A parsed request line: `METHOD SP REQUEST-URI SP VERSION`.
///
/// The request target is already split into its path component and the
/// parsed query parameters. The version is kept as the raw text that
/// appeared on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    path: String,
    version: String,
    query_params: QueryParams,
}

impl RequestLine {
    pub(crate) fn new(method: Method, path: String, version: String, query_params: QueryParams) -> Self {
        Self { method, path, version, query_params }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The path component of the request target, used for registry lookup.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The HTTP version exactly as it appeared on the wire, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    pub(crate) fn into_query_params(self) -> QueryParams {
        self.query_params
    }
}

/// The context a handler receives on dispatch.
///
/// Owning a `Request` means owning the connection: the handler writes any
/// response bytes itself, and the socket closes when the request is
/// dropped. `Request` implements [`AsyncRead`] and [`AsyncWrite`] by
/// delegating to the underlying stream, so handlers can use the
/// `tokio::io` extension traits directly.
pub struct Request {
    stream: TcpStream,
    query_params: QueryParams,
}

impl Request {
    pub(crate) fn new(stream: TcpStream, query_params: QueryParams) -> Self {
        Self { stream, query_params }
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Consumes the request, handing back the raw connection.
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("peer_addr", &self.stream.peer_addr().ok())
            .field("query_params", &self.query_params)
            .finish()
    }
}

impl AsyncRead for Request {
    fn poll_read(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for Request {
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.stream).poll_shutdown(cx)
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.stream).poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.stream.is_write_vectored()
    }
}
