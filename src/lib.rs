//! An embeddable HTTP/1.x server engine.
//!
//! Requests are routed through a path trie ([`router`]), parsed and encoded
//! by tokio codecs ([`codec`]), and answered by handlers that yield a lazy
//! stream of response fragments ([`handler`], [`protocol`]). Each accepted
//! connection runs its own task ([`connection`], [`server`]); request bodies
//! are read from the transport only when a handler asks for them.

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod router;
pub mod server;
pub mod static_files;

mod utils;
