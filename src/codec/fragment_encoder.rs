//! Response fragment encoding.

use std::io::{self, Write};

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{HttpError, ResponseFragment, Version};

/// Initial buffer space reserved for a status line or header block.
const INIT_HEAD_SIZE: usize = 1024;

/// Encoder writing [`ResponseFragment`]s to the wire, one at a time, in
/// emission order.
///
/// Carries the protocol version of the request being answered so that status
/// lines echo it; the connection sets it before each response. Body chunks
/// are written verbatim — a handler that wants chunked transfer encoding
/// supplies its own chunk framing.
///
/// Header *names* reach the wire lowercased: `HeaderMap` normalizes names on
/// insertion, and header names are case-insensitive on the wire, so the
/// original casing is not preserved. Values are written untouched.
#[derive(Debug)]
pub struct FragmentEncoder {
    version: Version,
}

impl FragmentEncoder {
    pub fn new() -> Self {
        Self { version: Version::Http11 }
    }

    /// Sets the protocol version used on subsequent status lines.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

impl Default for FragmentEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<ResponseFragment> for FragmentEncoder {
    type Error = HttpError;

    fn encode(&mut self, item: ResponseFragment, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            ResponseFragment::StatusLine(status) => {
                dst.reserve(INIT_HEAD_SIZE);
                write!(FastWrite(dst), "{} {} {}\r\n", self.version, status.code(), status.reason())
                    .map_err(HttpError::from)
            }

            ResponseFragment::HeaderBlock(headers) => {
                dst.reserve(INIT_HEAD_SIZE);
                for (name, value) in headers.iter() {
                    dst.put_slice(name.as_ref());
                    dst.put_slice(b": ");
                    dst.put_slice(value.as_ref());
                    dst.put_slice(b"\r\n");
                }
                dst.put_slice(b"\r\n");
                Ok(())
            }

            ResponseFragment::BodyChunk(bytes) => {
                dst.put_slice(&bytes);
                Ok(())
            }
        }
    }
}

/// Writes into a `BytesMut` without going through an intermediate string.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Status;
    use http::header::{CONNECTION, CONTENT_LENGTH};
    use http::{HeaderMap, HeaderValue};

    fn encode(encoder: &mut FragmentEncoder, fragment: ResponseFragment) -> BytesMut {
        let mut dst = BytesMut::new();
        encoder.encode(fragment, &mut dst).unwrap();
        dst
    }

    #[test]
    fn status_line_carries_version_code_and_reason() {
        let mut encoder = FragmentEncoder::new();

        let out = encode(&mut encoder, ResponseFragment::StatusLine(Status::Ok));
        assert_eq!(&out[..], b"HTTP/1.1 200 Ok\r\n");

        encoder.set_version(Version::Http10);
        let out = encode(&mut encoder, ResponseFragment::StatusLine(Status::NotFound));
        assert_eq!(&out[..], b"HTTP/1.0 404 NotFound\r\n");
    }

    #[test]
    fn header_block_ends_with_blank_line() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        headers.insert(CONNECTION, HeaderValue::from_static("Keep-Alive"));

        let out = encode(&mut FragmentEncoder::new(), ResponseFragment::HeaderBlock(headers));
        let text = std::str::from_utf8(&out).unwrap();

        assert!(text.contains("content-length: 0\r\n"));
        assert!(text.contains("connection: Keep-Alive\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn body_chunk_is_written_verbatim() {
        let out = encode(&mut FragmentEncoder::new(), ResponseFragment::body("raw\r\nbytes"));
        assert_eq!(&out[..], b"raw\r\nbytes");
    }
}
