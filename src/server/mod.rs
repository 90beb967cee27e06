//! TCP accept loop: binds an address, registers routes, and spawns one task
//! per accepted connection.

use std::sync::Arc;

use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{debug, error, info, warn};

use crate::connection::HttpConnection;
use crate::protocol::HttpError;
use crate::router::{Route, Router};

/// Accumulates routes before the server starts.
///
/// ```no_run
/// use pico_http::server::Server;
/// use pico_http::router::Route;
/// use pico_http::handler::make_handler;
/// use pico_http::protocol::{FragmentStream, Method, ResponseFragment, Status};
/// use futures::stream;
/// use http::HeaderMap;
///
/// # async fn run() -> Result<(), pico_http::protocol::HttpError> {
/// let server = Server::builder()
///     .route(Route::new(Method::Get, "/ping", || {
///         make_handler(|_request, _cancel| async {
///             let fragments = stream::iter([
///                 Ok(ResponseFragment::StatusLine(Status::Ok)),
///                 Ok(ResponseFragment::HeaderBlock(HeaderMap::new())),
///             ]);
///             Ok(Box::pin(fragments) as FragmentStream)
///         })
///     }))
///     .build();
/// server.run("127.0.0.1:8080").await
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ServerBuilder {
    router: Router,
}

impl ServerBuilder {
    pub fn route(mut self, route: Route) -> Self {
        self.router.add_route(route);
        self
    }

    pub fn build(self) -> Server {
        Server { router: Arc::new(self.router) }
    }
}

/// Accepts connections and hands each to its own [`HttpConnection`] task.
#[derive(Debug)]
pub struct Server {
    router: Arc<Router>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Binds `addr` and serves until the task is dropped. A failed bind is
    /// fatal; a failed accept is logged and the loop continues.
    pub async fn run<Addr: ToSocketAddrs>(&self, addr: Addr) -> Result<(), HttpError> {
        let tcp_listener = match TcpListener::bind(&addr).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e.into());
            }
        };
        info!("server listening");

        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let router = Arc::clone(&self.router);
            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::new(reader, writer);
                if let Err(e) = connection.process(router).await {
                    debug!(peer = %remote_addr, cause = %e, "connection ended with error");
                }
            });
        }
    }
}
