//! Hand-written decoder for the first line of an HTTP/1.1 request.
//!
//! No HTTP parser crate is involved: the decoder scans the buffer for the
//! first CRLF, splits the line on single ASCII spaces into exactly three
//! fields, and validates method, target and version itself. Only the
//! request line is decoded; headers and bodies are neither parsed nor
//! required, and any bytes after the CRLF are left in the buffer.
//!
//! The decoder is driven through [`tokio_util::codec::Decoder`], so it can
//! be fed incrementally: it returns `Ok(None)` until a full line is
//! buffered, and fails with [`ParseError::LineTooLong`] once the line
//! cannot terminate within [`MAX_LINE_BYTES`].

use bytes::{Buf, BytesMut};
use http::{Method, Uri};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::{ParseError, QueryParams, RequestLine};
use crate::utils::ensure;

/// Maximum bytes a request line may occupy, CRLF included.
pub const MAX_LINE_BYTES: usize = 4096;

const CRLF: &[u8] = b"\r\n";

/// Which request lines are allowed through the decoder.
///
/// The registry only ever sees requests the policy admits; everything else
/// fails parsing and the connection closes with nothing written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MethodPolicy {
    /// Only `GET` with `HTTP/1.1` is accepted.
    #[default]
    GetOnly,
    /// Any valid method token with any `HTTP/`-prefixed version is accepted.
    AllowAny,
}

/// Decoder producing one [`RequestLine`] from buffered connection bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLineDecoder {
    policy: MethodPolicy,
}

impl RequestLineDecoder {
    pub fn new(policy: MethodPolicy) -> Self {
        Self { policy }
    }
}

impl Decoder for RequestLineDecoder {
    type Item = RequestLine;
    type Error = ParseError;

    /// Attempts to decode a request line from the buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(line))` once a full, valid request line is buffered
    /// - `Ok(None)` if more data is needed
    /// - `Err(_)` if the line is over the size limit or malformed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match find_crlf(src) {
            Some(line_end) => {
                ensure!(
                    line_end + CRLF.len() <= MAX_LINE_BYTES,
                    ParseError::line_too_long(line_end + CRLF.len(), MAX_LINE_BYTES)
                );

                let line = src.split_to(line_end);
                src.advance(CRLF.len());
                trace!(line_size = line.len(), "located request line");

                parse_request_line(&line, self.policy).map(Some)
            }
            // no terminator yet: keep reading unless the line can no longer fit
            None => {
                ensure!(src.len() < MAX_LINE_BYTES, ParseError::line_too_long(src.len(), MAX_LINE_BYTES));
                Ok(None)
            }
        }
    }
}

fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(CRLF.len()).position(|window| window == CRLF)
}

fn parse_request_line(line: &[u8], policy: MethodPolicy) -> Result<RequestLine, ParseError> {
    let text = std::str::from_utf8(line).map_err(|_| ParseError::invalid_request_line("request line is not valid utf-8"))?;

    let fields = text.split(' ').collect::<Vec<_>>();
    ensure!(
        fields.len() == 3,
        ParseError::invalid_request_line(format!("expected 3 space-separated fields, got {}", fields.len()))
    );
    let (method_text, target, version) = (fields[0], fields[1], fields[2]);

    match policy {
        MethodPolicy::GetOnly => {
            ensure!(method_text == "GET", ParseError::unsupported_method(method_text));
            ensure!(version == "HTTP/1.1", ParseError::unsupported_version(version));
        }
        MethodPolicy::AllowAny => {
            ensure!(version.starts_with("HTTP/"), ParseError::unsupported_version(version));
        }
    }

    let method = Method::from_bytes(method_text.as_bytes()).map_err(|_| ParseError::unsupported_method(method_text))?;

    // origin-form only: the registry matches absolute paths exactly
    ensure!(target.starts_with('/'), ParseError::invalid_uri(target));
    let uri = target.parse::<Uri>().map_err(|_| ParseError::invalid_uri(target))?;

    let query_params = QueryParams::parse(uri.query().unwrap_or_default());

    Ok(RequestLine::new(method, uri.path().to_string(), version.to_string(), query_params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> Result<Option<RequestLine>, ParseError> {
        let mut buffer = BytesMut::from(input);
        RequestLineDecoder::default().decode(&mut buffer)
    }

    #[test]
    fn partial_input_needs_more_data() {
        let mut decoder = RequestLineDecoder::default();
        let mut buffer = BytesMut::from(&b"GET /ping HT"[..]);
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.extend_from_slice(b"TP/1.1\r\n");
        let line = decoder.decode(&mut buffer).unwrap().expect("line complete");
        assert_eq!(line.method(), &Method::GET);
        assert_eq!(line.path(), "/ping");
        assert_eq!(line.version(), "HTTP/1.1");
        assert!(line.query_params().is_empty());
    }

    #[test]
    fn query_string_is_split_from_the_path() {
        let line = decode(b"GET /ping?x=1&x=2&y=z HTTP/1.1\r\n\r\n").unwrap().expect("line complete");
        assert_eq!(line.path(), "/ping");
        assert_eq!(line.query_params().get_all("x"), ["1", "2"]);
        assert_eq!(line.query_params().get("y"), Some("z"));
    }

    #[test]
    fn bytes_after_the_terminator_stay_in_the_buffer() {
        let mut decoder = RequestLineDecoder::default();
        let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: example\r\n\r\n"[..]);
        decoder.decode(&mut buffer).unwrap().expect("line complete");
        assert_eq!(&buffer[..], b"Host: example\r\n\r\n");
    }

    #[test]
    fn missing_terminator_within_limit_is_too_long() {
        let mut decoder = RequestLineDecoder::default();
        let mut buffer = BytesMut::from(&vec![b'a'; MAX_LINE_BYTES][..]);
        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::LineTooLong { .. })));
    }

    #[test]
    fn terminator_past_the_limit_is_too_long() {
        let mut request = vec![b'a'; MAX_LINE_BYTES + 10];
        request.extend_from_slice(CRLF);
        let mut buffer = BytesMut::from(&request[..]);
        assert!(matches!(RequestLineDecoder::default().decode(&mut buffer), Err(ParseError::LineTooLong { .. })));
    }

    #[test]
    fn line_just_inside_the_limit_is_accepted() {
        let mut request = b"GET /".to_vec();
        request.extend(std::iter::repeat_n(b'a', MAX_LINE_BYTES - request.len() - " HTTP/1.1\r\n".len()));
        request.extend_from_slice(b" HTTP/1.1\r\n");
        assert_eq!(request.len(), MAX_LINE_BYTES);

        let mut buffer = BytesMut::from(&request[..]);
        let line = RequestLineDecoder::default().decode(&mut buffer).unwrap().expect("line complete");
        assert_eq!(line.path().len(), MAX_LINE_BYTES - "GET  HTTP/1.1\r\n".len());
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert!(matches!(decode(b"GET /ping\r\n"), Err(ParseError::InvalidRequestLine { .. })));
        assert!(matches!(decode(b"GET  /ping HTTP/1.1\r\n"), Err(ParseError::InvalidRequestLine { .. })));
        assert!(matches!(decode(b"GET /ping HTTP/1.1 extra\r\n"), Err(ParseError::InvalidRequestLine { .. })));
    }

    #[test]
    fn non_utf8_line_is_rejected() {
        assert!(matches!(decode(b"GET /\xff\xfe HTTP/1.1\r\n"), Err(ParseError::InvalidRequestLine { .. })));
    }

    #[test]
    fn get_only_policy_rejects_other_methods_and_versions() {
        assert!(matches!(decode(b"POST /ping HTTP/1.1\r\n"), Err(ParseError::UnsupportedMethod { .. })));
        assert!(matches!(decode(b"GET /ping HTTP/1.0\r\n"), Err(ParseError::UnsupportedVersion { .. })));
    }

    #[test]
    fn allow_any_policy_admits_other_methods_and_versions() {
        let mut decoder = RequestLineDecoder::new(MethodPolicy::AllowAny);

        let mut buffer = BytesMut::from(&b"POST /submit?a=b HTTP/1.0\r\n"[..]);
        let line = decoder.decode(&mut buffer).unwrap().expect("line complete");
        assert_eq!(line.method(), &Method::POST);
        assert_eq!(line.path(), "/submit");
        assert_eq!(line.version(), "HTTP/1.0");

        let mut buffer = BytesMut::from(&b"DELETE /item FTP/1.0\r\n"[..]);
        assert!(matches!(decoder.decode(&mut buffer), Err(ParseError::UnsupportedVersion { .. })));
    }

    #[test]
    fn target_must_be_an_absolute_path() {
        assert!(matches!(decode(b"GET ping HTTP/1.1\r\n"), Err(ParseError::InvalidUri { .. })));
        assert!(matches!(decode(b"GET http://example.com/ping HTTP/1.1\r\n"), Err(ParseError::InvalidUri { .. })));
    }

    #[test]
    fn undecodable_query_escape_still_dispatches() {
        let line = decode(b"GET /ping?x=%zz HTTP/1.1\r\n").unwrap().expect("line complete");
        assert_eq!(line.path(), "/ping");
        assert_eq!(line.query_params().get("x"), Some("%zz"));
    }
}
