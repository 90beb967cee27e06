//! The handler contract.
//!
//! A handler is constructed per request (by the matched route's factory) and
//! consumed into its fragment stream. Cancellation is cooperative: the
//! session cancels the token when a write finds the peer gone, and a handler
//! that streams for a long time should poll [`CancellationToken::is_cancelled`]
//! between fragments and stop yielding. Nothing interrupts a handler that
//! ignores it.

use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::protocol::{FragmentStream, HttpError, Request};

/// Produces the response for one request as a lazy fragment sequence.
///
/// Errors returned here — or yielded mid-stream — are caught at the
/// connection loop boundary and answered with a minimal failure response
/// carrying the error's status classification.
#[async_trait]
pub trait Handler: Send {
    async fn handle(
        self: Box<Self>,
        request: Request,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, HttpError>;
}

/// Adapts an async closure into a [`Handler`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: FnOnce(Request, CancellationToken) -> Fut + Send,
    Fut: Future<Output = Result<FragmentStream, HttpError>> + Send,
{
    async fn handle(
        self: Box<Self>,
        request: Request,
        cancel: CancellationToken,
    ) -> Result<FragmentStream, HttpError> {
        (self.f)(request, cancel).await
    }
}

/// Wraps an async closure as a [`Handler`].
///
/// ```no_run
/// use futures::stream;
/// use http::HeaderMap;
/// use pico_http::handler::make_handler;
/// use pico_http::protocol::{FragmentStream, ResponseFragment, Status};
///
/// let handler = make_handler(|_request, _cancel| async {
///     let fragments = vec![
///         Ok(ResponseFragment::StatusLine(Status::Ok)),
///         Ok(ResponseFragment::HeaderBlock(HeaderMap::new())),
///         Ok(ResponseFragment::body("hello")),
///     ];
///     Ok(Box::pin(stream::iter(fragments)) as FragmentStream)
/// });
/// ```
pub fn make_handler<F, Fut>(f: F) -> HandlerFn<F>
where
    F: FnOnce(Request, CancellationToken) -> Fut + Send,
    Fut: Future<Output = Result<FragmentStream, HttpError>> + Send,
{
    HandlerFn { f }
}
