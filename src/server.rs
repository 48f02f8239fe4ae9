//! The listener: bind address, handler registry and accept loop.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::codec::MethodPolicy;
use crate::connection::{self, ConnectionOptions};
use crate::handler::Handler;
use crate::router::Router;

/// Errors that keep the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding the listening socket failed; the accept loop never begins.
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },
}

/// Builder for a [`Server`].
///
/// The defaults match the minimal design: unbounded concurrent
/// connections, no read deadline, and only `GET` + `HTTP/1.1` admitted.
#[derive(Debug)]
pub struct ServerBuilder {
    addr: String,
    max_connections: Option<usize>,
    read_timeout: Option<Duration>,
    method_policy: MethodPolicy,
}

impl ServerBuilder {
    fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), max_connections: None, read_timeout: None, method_policy: MethodPolicy::default() }
    }

    /// Caps the number of connections served at once.
    ///
    /// When the cap is reached the accept loop waits for a slot before
    /// accepting again, so excess clients queue in the listen backlog.
    pub fn max_connections(mut self, limit: usize) -> Self {
        self.max_connections = Some(limit);
        self
    }

    /// Disconnects a client whose request line does not arrive within `limit`.
    pub fn read_timeout(mut self, limit: Duration) -> Self {
        self.read_timeout = Some(limit);
        self
    }

    /// Chooses which request lines are dispatched.
    pub fn method_policy(mut self, policy: MethodPolicy) -> Self {
        self.method_policy = policy;
        self
    }

    pub fn build(self) -> Server {
        Server {
            addr: self.addr,
            router: Router::new(),
            max_connections: self.max_connections,
            options: ConnectionOptions { read_timeout: self.read_timeout, method_policy: self.method_policy },
        }
    }
}

/// A TCP listener dispatching request lines to registered handlers.
///
/// The server owns its bind address and an exact-path handler registry.
/// Construction performs no I/O; [`Server::start`] binds the socket and
/// runs the accept loop until the process ends.
///
/// ```no_run
/// use line_http::{Request, Server, make_handler};
/// use tokio::io::AsyncWriteExt;
///
/// # async fn run() {
/// let server = Server::new("127.0.0.1:8080");
/// server.register("/ping", make_handler(ping));
/// if let Err(e) = server.start().await {
///     eprintln!("server failed: {e}");
/// }
/// # }
///
/// async fn ping(mut request: Request) -> std::io::Result<()> {
///     request.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\npong").await
/// }
/// ```
#[derive(Debug)]
pub struct Server {
    addr: String,
    router: Router,
    max_connections: Option<usize>,
    options: ConnectionOptions,
}

impl Server {
    /// Creates a server for `addr` with default configuration and an
    /// empty registry. No I/O happens until [`Server::start`].
    pub fn new(addr: impl Into<String>) -> Self {
        Self::builder(addr).build()
    }

    pub fn builder(addr: impl Into<String>) -> ServerBuilder {
        ServerBuilder::new(addr)
    }

    /// The configured bind address, as given at construction.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Inserts or replaces the handler for `path`.
    ///
    /// May be called before the server starts or concurrently with a
    /// running accept loop; in-flight lookups see either the old handler
    /// or the new one.
    pub fn register<H>(&self, path: impl Into<String>, handler: H)
    where
        H: Handler + 'static,
    {
        self.router.register(path, handler);
    }

    /// Binds the listening socket and runs the accept loop.
    ///
    /// Only a bind failure is returned; everything after that is logged
    /// and contained. In normal operation this future never resolves.
    pub async fn start(&self) -> Result<(), ServerError> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Binds the listening socket without starting the accept loop.
    ///
    /// Split out from [`Server::start`] so callers can bind port 0 and
    /// read the assigned local address before serving.
    pub async fn bind(&self) -> Result<TcpListener, ServerError> {
        match TcpListener::bind(&self.addr).await {
            Ok(listener) => {
                info!(addr = %self.addr, "listening");
                Ok(listener)
            }
            Err(e) => {
                error!(addr = %self.addr, cause = %e, "bind server error");
                Err(ServerError::Bind { addr: self.addr.clone(), source: e })
            }
        }
    }

    /// Runs the accept loop on an already-bound listener.
    ///
    /// Every accepted connection gets its own task. Accept failures are
    /// transient: they are logged and the loop continues. The listener is
    /// owned here, so it is released on any exit path.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), ServerError> {
        let limiter = self.max_connections.map(|limit| Arc::new(Semaphore::new(limit)));

        loop {
            let permit = match &limiter {
                Some(semaphore) => match Arc::clone(semaphore).acquire_owned().await {
                    Ok(permit) => Some(permit),
                    // the semaphore is never closed while serving
                    Err(_) => return Ok(()),
                },
                None => None,
            };

            let (stream, remote_addr) = match listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let router = self.router.clone();
            let options = self.options;
            tokio::spawn(async move {
                // hold the connection slot for the task's whole lifetime
                let _permit = permit;
                connection::serve(stream, remote_addr, router, options).await;
            });
        }
    }
}
