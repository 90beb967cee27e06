//! End-to-end tests driving `HttpConnection` over an in-memory duplex pipe.

use std::sync::Arc;

use bytes::Bytes;
use futures::stream;
use http::header::{CONNECTION, CONTENT_LENGTH};
use http::{HeaderMap, HeaderValue};
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::task::JoinHandle;

use pico_http::connection::HttpConnection;
use pico_http::handler::make_handler;
use pico_http::protocol::{
    FragmentStream, HttpError, Method, ResponseFragment, Status,
};
use pico_http::router::{Route, Router};

fn ok_fragments(body: Bytes) -> FragmentStream {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    Box::pin(stream::iter([
        Ok(ResponseFragment::StatusLine(Status::Ok)),
        Ok(ResponseFragment::HeaderBlock(headers)),
        Ok(ResponseFragment::BodyChunk(body)),
    ]))
}

fn echo_route() -> Route {
    Route::new(Method::Post, "/echo", || {
        make_handler(|mut request, _cancel| async move {
            let body = request.body().await?;
            Ok(ok_fragments(body))
        })
    })
}

fn hello_route() -> Route {
    Route::new(Method::Get, "/hello", || {
        make_handler(|_request, _cancel| async {
            Ok(ok_fragments(Bytes::from_static(b"hello")))
        })
    })
}

fn closing_route() -> Route {
    Route::new(Method::Get, "/bye", || {
        make_handler(|_request, _cancel| async {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_LENGTH, HeaderValue::from_static("3"));
            headers.insert(CONNECTION, HeaderValue::from_static("Close"));
            Ok(Box::pin(stream::iter([
                Ok(ResponseFragment::StatusLine(Status::Ok)),
                Ok(ResponseFragment::HeaderBlock(headers)),
                Ok(ResponseFragment::body("bye")),
            ])) as FragmentStream)
        })
    })
}

fn failing_route() -> Route {
    Route::new(Method::Get, "/fail", || {
        make_handler(|_request, _cancel| async {
            Err::<FragmentStream, _>(HttpError::internal("simulated failure"))
        })
    })
}

/// Spawns the connection loop over one end of a duplex pipe; the returned
/// stream is the client end.
fn start_connection(routes: Vec<Route>) -> (DuplexStream, JoinHandle<Result<(), HttpError>>) {
    let mut router = Router::new();
    for route in routes {
        router.add_route(route);
    }
    let router = Arc::new(router);

    let (client, server) = duplex(16 * 1024);
    let task = tokio::spawn(async move {
        let (reader, writer) = tokio::io::split(server);
        HttpConnection::new(reader, writer).process(router).await
    });
    (client, task)
}

/// Reads one response off the pipe: head up to the blank line, then exactly
/// `content-length` body bytes.
async fn read_response(client: &mut DuplexStream) -> String {
    let mut buf = Vec::new();
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let mut chunk = [0u8; 256];
        let n = client.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before response head completed");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = std::str::from_utf8(&buf[..head_end]).unwrap();
    let content_length: usize = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length").then(|| value.trim().parse().unwrap())
        })
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let mut chunk = [0u8; 256];
        let n = client.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed inside response body");
        buf.extend_from_slice(&chunk[..n]);
    }
    assert_eq!(buf.len(), head_end + content_length, "over-read past the response");
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn echoes_body_arriving_in_pieces() {
    let (mut client, task) = start_connection(vec![echo_route()]);

    client
        .write_all(b"POST /echo HTTP/1.1\r\ncontent-length: 11\r\n\r\nhello")
        .await
        .unwrap();
    tokio::task::yield_now().await;
    client.write_all(b" world").await.unwrap();

    let response = read_response(&mut client).await;
    assert!(response.starts_with("HTTP/1.1 200 Ok\r\n"));
    assert!(response.contains("content-length: 11\r\n"));
    assert!(response.ends_with("\r\n\r\nhello world"));

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn http11_keeps_the_connection_alive() {
    let (mut client, task) = start_connection(vec![hello_route()]);

    client.write_all(b"GET /hello HTTP/1.1\r\n\r\n").await.unwrap();
    let first = read_response(&mut client).await;
    assert!(first.starts_with("HTTP/1.1 200 Ok\r\n"));
    assert!(first.contains("connection: Keep-Alive\r\n"));

    // second request on the same connection
    client.write_all(b"GET /hello HTTP/1.1\r\n\r\n").await.unwrap();
    let second = read_response(&mut client).await;
    assert!(second.ends_with("\r\n\r\nhello"));

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn http10_serves_one_request_then_closes() {
    let (mut client, task) = start_connection(vec![hello_route()]);

    client.write_all(b"GET /hello HTTP/1.0\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert!(response.starts_with("HTTP/1.0 200 Ok\r\n"));

    task.await.unwrap().unwrap();

    // connection is gone
    let mut rest = Vec::new();
    client.read_to_end(&mut rest).await.unwrap();
    assert!(rest.is_empty());
}

#[tokio::test]
async fn http10_keep_alive_header_persists_the_connection_loop_exits_anyway() {
    // A 1.0 client asking for keep-alive gets the header echoed back, but
    // the loop still closes after one exchange.
    let (mut client, task) = start_connection(vec![hello_route()]);

    client
        .write_all(b"GET /hello HTTP/1.0\r\nconnection: keep-alive\r\n\r\n")
        .await
        .unwrap();
    let response = read_response(&mut client).await;
    assert!(response.contains("connection: Keep-Alive\r\n"));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn handler_close_header_ends_the_connection() {
    let (mut client, task) = start_connection(vec![closing_route()]);

    client.write_all(b"GET /bye HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert!(response.contains("connection: Close\r\n"));
    assert!(response.ends_with("bye"));

    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn unmatched_route_gets_404_and_connection_survives() {
    let (mut client, task) = start_connection(vec![hello_route()]);

    client.write_all(b"GET /nowhere HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert!(response.starts_with("HTTP/1.1 404 NotFound\r\n"));
    assert!(response.contains("content-length: 0\r\n"));

    client.write_all(b"GET /hello HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert!(response.starts_with("HTTP/1.1 200 Ok\r\n"));

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn handler_error_becomes_500() {
    let (mut client, task) = start_connection(vec![failing_route()]);

    client.write_all(b"GET /fail HTTP/1.1\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert!(response.starts_with("HTTP/1.1 500 InternalServerError\r\n"));
    assert!(response.contains("content-length: 0\r\n"));

    drop(client);
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn malformed_request_gets_400_and_an_error() {
    let (mut client, task) = start_connection(vec![hello_route()]);

    client.write_all(b"GET /hello HTTP/2.0\r\n\r\n").await.unwrap();
    let response = read_response(&mut client).await;
    assert!(response.starts_with("HTTP/1.1 400 BadRequest\r\n"));

    let result = task.await.unwrap();
    assert!(result.is_err());
}
