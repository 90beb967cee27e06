//! Connection-level plumbing: the per-connection request loop and the
//! per-request response session.

mod http_connection;
mod session;

pub use http_connection::HttpConnection;
pub use session::Session;
