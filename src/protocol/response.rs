//! Response fragments: the units of a handler's streamed output.

use bytes::Bytes;
use futures::stream::BoxStream;
use http::HeaderMap;

use crate::protocol::{HttpError, Status};

/// One unit of a handler's streamed response.
///
/// A response is modeled as a lazy, possibly infinite sequence of fragments:
/// exactly one `StatusLine` first, exactly one `HeaderBlock` second, then
/// zero or more `BodyChunk`s. The engine trusts this ordering rather than
/// enforcing it; the session writes fragments to the transport in exactly the
/// order they are produced, so a misordered sequence produces malformed HTTP
/// on the wire.
#[derive(Debug)]
pub enum ResponseFragment {
    /// The response status line.
    StatusLine(Status),
    /// The response header block. The connection-persistence header is
    /// reconciled by the session before this block hits the wire.
    HeaderBlock(HeaderMap),
    /// Raw body bytes, written verbatim with no added framing. A handler
    /// that wants chunked transfer encoding emits the chunk-size/CRLF
    /// framing itself as part of its body bytes.
    BodyChunk(Bytes),
}

impl ResponseFragment {
    /// Builds a body fragment from anything convertible to [`Bytes`].
    pub fn body<B: Into<Bytes>>(bytes: B) -> Self {
        ResponseFragment::BodyChunk(bytes.into())
    }

    #[inline]
    pub fn is_status_line(&self) -> bool {
        matches!(self, ResponseFragment::StatusLine(_))
    }

    #[inline]
    pub fn is_header_block(&self) -> bool {
        matches!(self, ResponseFragment::HeaderBlock(_))
    }

    #[inline]
    pub fn is_body_chunk(&self) -> bool {
        matches!(self, ResponseFragment::BodyChunk(_))
    }
}

/// The lazy fragment sequence produced by one handler invocation.
///
/// An `Err` item aborts the sequence and is reported to the connection loop,
/// which answers with a minimal failure response carrying the error's status.
pub type FragmentStream = BoxStream<'static, Result<ResponseFragment, HttpError>>;
