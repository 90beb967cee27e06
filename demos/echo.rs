//! Echo server: `POST /echo` replies with the request body,
//! `GET /greet/<name>` greets by positional parameter.
//!
//! ```sh
//! curl -d 'hello there' http://127.0.0.1:8080/echo
//! curl http://127.0.0.1:8080/greet/world
//! ```

use bytes::Bytes;
use futures::stream;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, HeaderValue};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pico_http::handler::make_handler;
use pico_http::protocol::{FragmentStream, HttpError, Method, ResponseFragment, Status};
use pico_http::router::Route;
use pico_http::server::Server;

fn text_response(body: Bytes) -> Result<FragmentStream, HttpError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    Ok(Box::pin(stream::iter([
        Ok(ResponseFragment::StatusLine(Status::Ok)),
        Ok(ResponseFragment::HeaderBlock(headers)),
        Ok(ResponseFragment::BodyChunk(body)),
    ])))
}

#[tokio::main]
async fn main() -> Result<(), HttpError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = Server::builder()
        .route(Route::new(Method::Post, "/echo", || {
            make_handler(|mut request, _cancel| async move {
                let body = request.body().await?;
                text_response(body)
            })
        }))
        .route(Route::new(Method::Get, "/greet", || {
            make_handler(|request, _cancel| async move {
                let name = request.params().first().map(String::as_str).unwrap_or("stranger");
                text_response(Bytes::from(format!("hello, {name}!\n")))
            })
        }))
        .build();

    info!(port = 8080, "start listening");
    server.run("127.0.0.1:8080").await
}
