use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, HeaderValue};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::codec::{FragmentEncoder, RequestDecoder};
use crate::protocol::body::ReqBody;
use crate::protocol::{HttpError, Request, RequestHead, ResponseFragment, Status, Version};
use crate::connection::Session;
use crate::router::Router;

const READ_BUFFER_CAPACITY: usize = 8 * 1024;

/// One accepted connection: reads request heads off the transport, routes
/// each to a handler, and writes the fragments the handler yields, until the
/// persistence decision or EOF ends the loop.
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, FragmentEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder, READ_BUFFER_CAPACITY),
            framed_write: FramedWrite::new(writer, FragmentEncoder::new()),
        }
    }

    /// Serves requests until the peer hangs up cleanly, a request is not
    /// persistent, or the head fails to parse.
    ///
    /// A parse failure still gets its status written before the error
    /// propagates; handler errors are absorbed into a failure response and
    /// the connection carries on.
    pub async fn process(mut self, router: Arc<Router>) -> Result<(), HttpError> {
        loop {
            let head = match self.framed_read.next().await {
                Some(Ok(head)) => head,
                Some(Err(e)) => {
                    self.send_failure(Version::Http11, e.status()).await?;
                    return Err(e);
                }
                None => return Ok(()),
            };

            let version = head.version();
            let keep_alive = self.handle_request(head, &router).await?;
            if version == Version::Http10 || !keep_alive {
                debug!("closing connection after response");
                return Ok(());
            }
        }
    }

    /// Dispatches one request and returns whether the connection persists.
    ///
    /// The handler and the body sender run concurrently under a biased
    /// `select!`: response fragments drain with priority, while body
    /// requests are serviced whenever the session is not ready, so a
    /// handler awaiting its request body never starves.
    async fn handle_request(
        &mut self,
        head: RequestHead,
        router: &Router,
    ) -> Result<bool, HttpError> {
        let version = head.version();
        let keep_alive = head.keep_alive();
        self.framed_write.encoder_mut().set_version(version);

        let Some(matched) = router.match_route(head.method(), head.path()) else {
            debug!(method = %head.method(), path = head.path(), "no route matched");
            self.send_failure(version, Status::NotFound).await?;
            return Ok(keep_alive);
        };
        let (route, params) = matched.into_parts();
        let handler = route.handler();

        let result = {
            let cancel = CancellationToken::new();
            let (req_body, mut body_sender) = ReqBody::body_channel(&mut self.framed_read);
            let request = Request::new(head, params, req_body);
            let session = Session::new(&mut self.framed_write, keep_alive, cancel.clone());

            let session_future = async {
                let fragments = handler.handle(request, cancel).await?;
                session.process_request(fragments).await
            };
            tokio::pin!(session_future);

            let serve_future = body_sender.serve();
            tokio::pin!(serve_future);
            let mut body_done = false;

            loop {
                tokio::select! {
                    biased;
                    result = &mut session_future => break result,
                    _ = &mut serve_future, if !body_done => {
                        body_done = true;
                    }
                }
            }
        };

        match result {
            Ok(persist) => Ok(persist),
            Err(e) => {
                error!(cause = %e, "handler failed");
                self.send_failure(version, e.status()).await?;
                Ok(keep_alive)
            }
        }
    }

    /// Writes a bare failure response: status line plus an empty body
    /// advertised by `Content-Length: 0`.
    async fn send_failure(&mut self, version: Version, status: Status) -> Result<(), HttpError> {
        self.framed_write.encoder_mut().set_version(version);
        self.framed_write.feed(ResponseFragment::StatusLine(status)).await?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("0"));
        self.framed_write.send(ResponseFragment::HeaderBlock(headers)).await?;
        Ok(())
    }
}
