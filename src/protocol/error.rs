use std::io;

use thiserror::Error;

use crate::protocol::Status;

/// The status-classified error carried through the engine.
///
/// Errors raised while parsing a request or running a handler are caught at
/// the connection loop boundary and converted into a minimal failure response
/// whose status line carries [`HttpError::status`]. Transport errors hit
/// while *writing* a response never take this path: the session converts them
/// into the cooperative done signal instead (see
/// [`Session`](crate::connection::Session)).
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("bad request: {reason}")]
    BadRequest { reason: String },

    #[error("not found: {reason}")]
    NotFound { reason: String },

    #[error("internal server error: {reason}")]
    Internal { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl HttpError {
    pub fn bad_request<S: ToString>(reason: S) -> Self {
        Self::BadRequest { reason: reason.to_string() }
    }

    pub fn not_found<S: ToString>(reason: S) -> Self {
        Self::NotFound { reason: reason.to_string() }
    }

    pub fn internal<S: ToString>(reason: S) -> Self {
        Self::Internal { reason: reason.to_string() }
    }

    /// The status code a failure response for this error should carry.
    /// Unclassified failures default to `500`.
    pub fn status(&self) -> Status {
        match self {
            HttpError::BadRequest { .. } => Status::BadRequest,
            HttpError::NotFound { .. } => Status::NotFound,
            HttpError::Internal { .. } => Status::InternalServerError,
            HttpError::Io { .. } => Status::InternalServerError,
        }
    }
}
