//! An endless multipart stream: one part per second until the client hangs
//! up, at which point the cancellation token stops the generator.
//!
//! ```sh
//! curl -N http://127.0.0.1:8080/ticker
//! ```

use std::time::Duration;

use bytes::Bytes;
use futures::stream;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pico_http::handler::make_handler;
use pico_http::protocol::{FragmentStream, HttpError, Method, ResponseFragment, Status};
use pico_http::router::Route;
use pico_http::server::Server;

const BOUNDARY: &str = "pico-bd";

fn ticker(cancel: CancellationToken) -> FragmentStream {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("multipart/x-mixed-replace; boundary=pico-bd"),
    );

    let head = stream::iter([
        Ok(ResponseFragment::StatusLine(Status::Ok)),
        Ok(ResponseFragment::HeaderBlock(headers)),
    ]);

    let parts = stream::unfold((cancel, 0u64), |(cancel, tick)| async move {
        if cancel.is_cancelled() {
            return None;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        let part = format!(
            "--{BOUNDARY}\r\ncontent-type: text/plain\r\n\r\ntick {tick}\r\n"
        );
        Some((Ok(ResponseFragment::BodyChunk(Bytes::from(part))), (cancel, tick + 1)))
    });

    Box::pin(futures::StreamExt::chain(head, parts))
}

#[tokio::main]
async fn main() -> Result<(), HttpError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = Server::builder()
        .route(Route::new(Method::Get, "/ticker", || {
            make_handler(|_request, cancel| async move { Ok(ticker(cancel)) })
        }))
        .build();

    info!(port = 8080, "start listening");
    server.run("127.0.0.1:8080").await
}
