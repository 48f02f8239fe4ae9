//! Per-connection request handling.
//!
//! Each accepted connection runs [`serve`] in its own task: read until a
//! full request line is buffered, parse it, look up the exact path in the
//! registry and hand the open connection to the matching handler. Exactly
//! one request is served per connection; there is no keep-alive.
//!
//! Every exit path leaves the connection closed. On dispatch the stream
//! moves into the handler and closes when the handler drops it; on a
//! parse failure or an unmatched path this task shuts the stream down
//! itself, writing nothing. A close failure is reported only when no
//! earlier error was recorded, so the first fault encountered is the one
//! surfaced.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Decoder;
use tracing::{debug, warn};

use crate::codec::{MAX_LINE_BYTES, MethodPolicy, RequestLineDecoder};
use crate::protocol::{HttpError, ParseError, Request, RequestLine};
use crate::router::Router;

/// Per-connection knobs inherited from the server configuration.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConnectionOptions {
    pub(crate) read_timeout: Option<Duration>,
    pub(crate) method_policy: MethodPolicy,
}

/// Runs one accepted connection to completion.
///
/// All failures are contained here: nothing that happens on this
/// connection can affect another connection or the accept loop.
pub(crate) async fn serve(mut stream: TcpStream, remote_addr: SocketAddr, router: Router, options: ConnectionOptions) {
    let mut error: Option<HttpError> = None;

    match read_request_line(&mut stream, &options).await {
        Ok(line) => {
            debug!(%remote_addr, method = %line.method(), path = line.path(), "parsed request line");

            match router.at(line.path()) {
                Some(handler) => {
                    // ownership of the stream, and with it close
                    // responsibility, transfers to the handler here
                    let request = Request::new(stream, line.into_query_params());
                    if let Err(e) = handler.handle(request).await {
                        warn!(%remote_addr, cause = %e, "handler failed");
                    }
                    return;
                }
                None => debug!(%remote_addr, path = line.path(), "no handler registered, dropping request"),
            }
        }
        Err(e) => error = Some(e.into()),
    }

    // parse failure or unmatched path: close with nothing written
    if let Err(close_error) = stream.shutdown().await {
        match &error {
            None => error = Some(HttpError::close(close_error)),
            Some(first) => debug!(%remote_addr, cause = %close_error, first = %first, "close failed after earlier error"),
        }
    }

    if let Some(e) = error {
        warn!(%remote_addr, cause = %e, "connection closed without response");
    }
}

/// Reads from the stream until the decoder yields a request line.
///
/// Unlike a single fixed read, this accumulates across reads until CRLF
/// shows up or the line-length bound trips. EOF before the terminator is
/// a [`ParseError::IncompleteRequestLine`]; a configured read deadline
/// applies to every read individually.
async fn read_request_line(stream: &mut TcpStream, options: &ConnectionOptions) -> Result<RequestLine, ParseError> {
    let mut decoder = RequestLineDecoder::new(options.method_policy);
    let mut buffer = BytesMut::with_capacity(MAX_LINE_BYTES);

    loop {
        if let Some(line) = decoder.decode(&mut buffer)? {
            return Ok(line);
        }

        let read = match options.read_timeout {
            Some(limit) => timeout(limit, stream.read_buf(&mut buffer)).await.map_err(|_| ParseError::read_timeout(limit))??,
            None => stream.read_buf(&mut buffer).await?,
        };

        if read == 0 {
            return Err(ParseError::incomplete(buffer.len()));
        }
    }
}
