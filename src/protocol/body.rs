//! Lazy request body retrieval.
//!
//! Request bodies are not read at parse time: they may be large and many
//! handlers never ask for them. Instead the connection task stays the single
//! owner of the transport and *lends* body access to the request through a
//! channel pair:
//!
//! - [`ReqBody`]: the consumer side, owned by the [`Request`] handed to the
//!   handler. Asking for the body sends a request over the channel and
//!   suspends until the bytes arrive.
//! - [`ReqBodySender`]: the producer side, which borrows the connection's
//!   framed reader for the duration of one request and serves body requests
//!   while the session runs.
//!
//! The two sides are driven concurrently by the connection loop's `select!`,
//! so a handler that suspends on the body never deadlocks against the task
//! that owns the transport.
//!
//! [`Request`]: crate::protocol::Request

use std::cmp;
use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, oneshot};
use tokio_util::codec::FramedRead;
use tracing::trace;

use crate::codec::RequestDecoder;
use crate::protocol::HttpError;

/// One body read request: how many bytes, and where to send them.
#[derive(Debug)]
struct BodyRequest {
    length: usize,
    reply: oneshot::Sender<Result<Bytes, HttpError>>,
}

/// Consumer side of the body channel, carried inside a request.
#[derive(Debug)]
pub struct ReqBody {
    signal: mpsc::Sender<BodyRequest>,
}

impl ReqBody {
    /// Creates a body channel pair for one request.
    ///
    /// The sender borrows the connection's framed reader; any bytes that were
    /// over-read while scanning for the header terminator are still sitting
    /// in its read buffer and are consumed first.
    pub(crate) fn body_channel<R>(
        framed_read: &mut FramedRead<R, RequestDecoder>,
    ) -> (ReqBody, ReqBodySender<'_, R>) {
        let (signal, receiver) = mpsc::channel(1);
        (ReqBody { signal }, ReqBodySender { framed_read, receiver })
    }

    /// A body handle with no producer behind it. Fetching through it fails.
    #[cfg(test)]
    pub(crate) fn detached() -> ReqBody {
        let (signal, _) = mpsc::channel(1);
        ReqBody { signal }
    }

    /// Requests exactly `length` body bytes from the connection task.
    pub(crate) async fn fetch(&mut self, length: usize) -> Result<Bytes, HttpError> {
        let (reply, response) = oneshot::channel();
        self.signal
            .send(BodyRequest { length, reply })
            .await
            .map_err(|_| HttpError::internal("body channel closed"))?;
        response.await.map_err(|_| HttpError::internal("body read canceled"))?
    }
}

/// Producer side of the body channel, run by the connection task.
#[derive(Debug)]
pub struct ReqBodySender<'conn, R> {
    framed_read: &'conn mut FramedRead<R, RequestDecoder>,
    receiver: mpsc::Receiver<BodyRequest>,
}

impl<R> ReqBodySender<'_, R>
where
    R: AsyncRead + Unpin,
{
    /// Serves body requests until every [`ReqBody`] handle is dropped.
    ///
    /// Runs concurrently with the session; completes once the request (and
    /// with it the consumer side of the channel) has gone away.
    pub async fn serve(&mut self) {
        while let Some(BodyRequest { length, reply }) = self.receiver.recv().await {
            let result = self.read_exact(length).await.map_err(HttpError::from);
            // the requester may have been dropped mid-read; nothing to do then
            let _ = reply.send(result);
        }
    }

    /// Reads exactly `length` bytes: buffered leftovers first, then an
    /// exact-length read from the transport. Short reads never escape.
    async fn read_exact(&mut self, length: usize) -> io::Result<Bytes> {
        let buffer = self.framed_read.read_buffer_mut();
        let buffered = cmp::min(length, buffer.len());

        let mut bytes = BytesMut::with_capacity(length);
        bytes.extend_from_slice(&buffer.split_to(buffered));

        if bytes.len() < length {
            let mut rest = vec![0u8; length - bytes.len()];
            self.framed_read.get_mut().read_exact(&mut rest).await?;
            bytes.extend_from_slice(&rest);
        }

        trace!(buffered, total = length, "request body read");
        Ok(bytes.freeze())
    }
}
