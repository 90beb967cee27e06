//! Request line and header parsing.
//!
//! The decoder is driven by a `FramedRead`: input arrives in arbitrary-sized
//! chunks and the decoder asks for more (`Ok(None)`) until the buffer holds
//! the full head section, delimited by the CRLF-CRLF terminator. Everything
//! after the terminator — body bytes over-read in the same transport read —
//! stays in the framed read buffer, where the body sender picks it up later.
//!
//! Parsing semantics:
//!
//! - request line is `METHOD SP PATH[?QUERY] SP VERSION`
//! - the method must be one of the supported set; anything else is an
//!   `InternalServerError`-classified failure (kept for wire compatibility)
//! - the version must be literally `HTTP/1.0` or `HTTP/1.1`, else
//!   `BadRequest`
//! - the query string splits on `&`, each pair on the first `=`; a pair
//!   with no `=` (including the empty pair left by `&&` or a trailing `&`)
//!   is `BadRequest`
//! - header lines are `NAME: VALUE`, whitespace trimmed on both sides; a
//!   line without a colon is silently ignored; duplicate names are
//!   last-write-wins
//!
//! End of stream with an empty buffer means the client closed an idle
//! connection: the framed read simply ends, no error.

use std::collections::HashMap;

use bytes::BytesMut;
use http::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::protocol::{HttpError, Method, RequestHead, Version};
use crate::utils::ensure;

/// Maximum size in bytes allowed for the request head section.
const MAX_HEAD_BYTES: usize = 8 * 1024;

/// Decoder producing one [`RequestHead`] per request.
///
/// Stateless: body bytes are not decoded here, they are read on demand
/// directly from the framed read buffer and the transport (see
/// [`ReqBodySender`](crate::protocol::ReqBodySender)).
#[derive(Debug, Default)]
pub struct RequestDecoder;

impl RequestDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for RequestDecoder {
    type Item = RequestHead;
    type Error = HttpError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(end) = find_head_end(src) else {
            ensure!(
                src.len() <= MAX_HEAD_BYTES,
                HttpError::bad_request(format!(
                    "request head exceeds {MAX_HEAD_BYTES} bytes before terminator"
                ))
            );
            return Ok(None);
        };

        ensure!(
            end <= MAX_HEAD_BYTES,
            HttpError::bad_request(format!("request head exceeds {MAX_HEAD_BYTES} bytes"))
        );

        let head_bytes = src.split_to(end).freeze();
        trace!(head_size = end, buffered = src.len(), "decoded request head");

        parse_head(&head_bytes).map(Some)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(head) = self.decode(src)? {
            return Ok(Some(head));
        }
        // a clean close between requests ends the loop; a close mid-head
        // is a protocol violation
        ensure!(src.is_empty(), HttpError::bad_request("connection closed inside request head"));
        Ok(None)
    }
}

/// Finds the end of the head section (one past the CRLF-CRLF terminator).
fn find_head_end(src: &[u8]) -> Option<usize> {
    src.windows(4).position(|window| window == b"\r\n\r\n").map(|pos| pos + 4)
}

fn parse_head(bytes: &[u8]) -> Result<RequestHead, HttpError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| HttpError::bad_request("request head is not valid utf-8"))?;

    let mut lines = text.lines();
    let request_line = lines.next().unwrap_or("").trim();

    let mut pieces = request_line.split_whitespace();
    let method: Method = pieces.next().unwrap_or("").parse()?;
    let target = pieces.next().unwrap_or("");
    let version: Version = pieces.next().unwrap_or("").parse()?;

    let (path, query) = parse_target(target)?;

    let mut headers = HeaderMap::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        // a line with no colon is not a header; skip it silently
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let Ok(name) = HeaderName::from_bytes(name.trim().as_bytes()) else {
            continue;
        };
        let Ok(value) = HeaderValue::from_str(value.trim()) else {
            continue;
        };
        // last write wins on duplicates
        headers.insert(name, value);
    }

    Ok(RequestHead::new(method, version, path, headers, query))
}

/// Splits the request target into path and query-parameter map.
fn parse_target(target: &str) -> Result<(String, HashMap<String, String>), HttpError> {
    let mut query = HashMap::new();

    let Some((path, raw_query)) = target.split_once('?') else {
        return Ok((target.to_string(), query));
    };

    for pair in raw_query.split('&') {
        // an empty pair (trailing `&`, or `&&`) has no `=` either
        let Some((name, value)) = pair.split_once('=') else {
            return Err(HttpError::bad_request(format!("malformed query pair: {pair:?}")));
        };
        query.insert(name.to_string(), value.to_string());
    }

    Ok((path.to_string(), query))
}
