//! Core protocol types and abstractions.
//!
//! This module holds the building blocks the rest of the engine is assembled
//! from:
//!
//! - **Enums** ([`types`]): [`Method`], [`Version`] and [`Status`] — the
//!   closed sets of methods, protocol versions and status codes the engine
//!   understands.
//! - **Request model** ([`request`]): [`RequestHead`] produced by the
//!   decoder, and [`Request`] — the head plus positional parameters and a
//!   lazy body handle — handed to handlers.
//! - **Body streaming** ([`body`]): the [`ReqBody`]/[`ReqBodySender`] channel
//!   pair that lets the connection task lend transport access to a request
//!   without sharing ownership.
//! - **Response fragments** ([`response`]): [`ResponseFragment`] and
//!   [`FragmentStream`] — a handler's streamed output.
//! - **Errors** ([`error`]): the status-classified [`HttpError`].

mod types;
pub use types::Method;
pub use types::Status;
pub use types::Version;

mod request;
pub use request::Request;
pub use request::RequestHead;

mod response;
pub use response::FragmentStream;
pub use response::ResponseFragment;

mod error;
pub use error::HttpError;

pub mod body;
pub use body::ReqBody;
pub use body::ReqBodySender;
