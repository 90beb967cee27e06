//! Serves the current directory under `/static`.
//!
//! ```sh
//! curl http://127.0.0.1:8080/static/README.md
//! ```

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use pico_http::protocol::HttpError;
use pico_http::server::Server;
use pico_http::static_files::static_route;

#[tokio::main]
async fn main() -> Result<(), HttpError> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = Server::builder().route(static_route("/static", ".")).build();

    info!(port = 8080, "start listening");
    tokio::select! {
        result = server.run("127.0.0.1:8080") => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}
