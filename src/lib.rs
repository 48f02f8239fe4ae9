//! A minimal asynchronous request-line dispatcher over raw TCP
//!
//! This crate accepts TCP connections, parses exactly one HTTP/1.1
//! request line per connection by hand (no HTTP parser stack), and
//! dispatches to a handler registered for the exact request path. The
//! handler receives the open connection together with the parsed query
//! parameters and performs the rest of the exchange itself.
//!
//! # Features
//!
//! - Hand-written request-line parsing bounded at 4096 bytes
//! - Exact-path handler registry, safely shared across connections
//! - One lightweight task per connection, fully concurrent
//! - Query parameters with multi-value semantics (`x=1&x=2`)
//! - Optional connection cap and read deadline
//! - Configurable method policy (strict `GET`/`HTTP/1.1` by default)
//! - Clean error handling: failures never cross connection boundaries
//!
//! # Example
//!
//! ```no_run
//! use line_http::{Request, Server, make_handler};
//! use tokio::io::AsyncWriteExt;
//! use tracing::{Level, error};
//! use tracing_subscriber::FmtSubscriber;
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     let server = Server::new("127.0.0.1:8080");
//!     server.register("/ping", make_handler(ping));
//!
//!     if let Err(e) = server.start().await {
//!         error!(cause = %e, "server exited");
//!     }
//! }
//!
//! async fn ping(mut request: Request) -> std::io::Result<()> {
//!     let body = "pong";
//!     let response = format!("HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{body}", body.len());
//!     request.write_all(response.as_bytes()).await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`server`]: bind address, accept loop and configuration
//! - [`router`]: the exact-path handler registry
//! - [`codec`]: the hand-written request-line decoder
//! - [`protocol`]: request context, query parameters and error types
//! - [`handler`]: the handler trait and function adapter
//!
//! # Scope
//!
//! Only the request line is interpreted. Headers, bodies, keep-alive,
//! TLS and response generation are out of scope: a request whose path
//! has no registered handler, or that fails to parse, is answered by
//! closing the connection with zero bytes written.

pub mod codec;
pub mod handler;
pub mod protocol;
pub mod router;
pub mod server;

mod connection;
mod utils;

pub use codec::{MAX_LINE_BYTES, MethodPolicy, RequestLineDecoder};
pub use handler::{BoxError, Handler, HandlerFn, make_handler};
pub use protocol::{HttpError, ParseError, QueryParams, Request, RequestLine};
pub use router::Router;
pub use server::{Server, ServerBuilder, ServerError};
