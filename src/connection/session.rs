use futures::{SinkExt, StreamExt};
use http::header::CONNECTION;
use http::{HeaderMap, HeaderValue};
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::codec::FragmentEncoder;
use crate::protocol::{FragmentStream, HttpError, ResponseFragment};

/// Drives one handler invocation: pulls fragments off the handler's stream
/// and writes each to the transport, in emission order.
///
/// Tracks two flags:
///
/// - `keep_alive`, seeded from the request (`Connection` header, or the
///   HTTP-version default) and reconciled against the handler's header block
///   before it is written;
/// - `done`, set when a write finds the peer gone. From then on the session
///   keeps draining the fragment stream without writing — cancellation is
///   cooperative, signaled to the handler through its token, never forced.
#[derive(Debug)]
pub struct Session<'conn, W> {
    framed_write: &'conn mut FramedWrite<W, FragmentEncoder>,
    keep_alive: bool,
    cancel: CancellationToken,
    done: bool,
}

impl<'conn, W> Session<'conn, W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(
        framed_write: &'conn mut FramedWrite<W, FragmentEncoder>,
        keep_alive: bool,
        cancel: CancellationToken,
    ) -> Self {
        Self { framed_write, keep_alive, cancel, done: false }
    }

    /// Consumes the fragment stream and returns the final persistence
    /// decision once it is exhausted.
    ///
    /// A classified error yielded by the stream aborts the session and
    /// propagates to the connection loop; a transport error while writing
    /// does not — it flips `done` and cancels the handler's token.
    pub async fn process_request(mut self, mut fragments: FragmentStream) -> Result<bool, HttpError> {
        while let Some(item) = fragments.next().await {
            let fragment = item?;

            if self.done {
                // peer is gone; drain without writing
                continue;
            }

            let fragment = match fragment {
                ResponseFragment::HeaderBlock(headers) => {
                    ResponseFragment::HeaderBlock(self.reconcile_connection(headers))
                }
                fragment => fragment,
            };

            if let Err(e) = self.framed_write.send(fragment).await {
                debug!(cause = %e, "response write failed, peer closed; requesting handler stop");
                self.done = true;
                self.cancel.cancel();
            }
        }

        Ok(self.keep_alive && !self.done)
    }

    /// Reconciles connection persistence into the handler's header block.
    ///
    /// While keep-alive holds, an explicit `Connection` header from the
    /// handler is honored (the value `Close`/`close` turns keep-alive off);
    /// absent one, `Connection: Keep-Alive` is injected. Once keep-alive is
    /// off, `Connection: Close` is forced regardless of what the handler
    /// set.
    fn reconcile_connection(&mut self, mut headers: HeaderMap) -> HeaderMap {
        if self.keep_alive {
            match headers.get(CONNECTION).map(HeaderValue::as_bytes) {
                Some(b"Close") | Some(b"close") => {
                    self.keep_alive = false;
                }
                Some(_) => {}
                None => {
                    headers.insert(CONNECTION, HeaderValue::from_static("Keep-Alive"));
                }
            }
        } else {
            headers.insert(CONNECTION, HeaderValue::from_static("Close"));
        }
        headers
    }
}
