//! Core protocol enums: request methods, protocol versions and status codes.
//!
//! The engine supports a closed set of each. Anything outside these sets is
//! rejected at parse time with the classification described in
//! [`HttpError`](crate::protocol::HttpError).

use std::fmt;
use std::str::FromStr;

use crate::protocol::HttpError;

/// The HTTP methods understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }
}

impl FromStr for Method {
    type Err = HttpError;

    /// An unrecognized method is classified as an internal server error,
    /// matching the wire behavior this engine is compatible with.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            other => Err(HttpError::internal(format!("unsupported method: {other:?}"))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The HTTP protocol versions understood by the engine.
///
/// The version drives the connection-persistence default: HTTP/1.1
/// connections are keep-alive unless asked otherwise, HTTP/1.0 connections
/// serve exactly one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http10,
    Http11,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

impl FromStr for Version {
    type Err = HttpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HTTP/1.0" => Ok(Version::Http10),
            "HTTP/1.1" => Ok(Version::Http11),
            other => Err(HttpError::bad_request(format!("unsupported version: {other:?}"))),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status codes the engine can put on a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 200,
    BadRequest = 400,
    NotFound = 404,
    InternalServerError = 500,
}

impl Status {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// The reason phrase written on the wire. These are the enum-name
    /// spellings (`NotFound`, not `Not Found`) for compatibility with the
    /// responses this engine replaces.
    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "Ok",
            Status::BadRequest => "BadRequest",
            Status::NotFound => "NotFound",
            Status::InternalServerError => "InternalServerError",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parsing() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("HEAD".parse::<Method>().unwrap(), Method::Head);

        let err = "PATCH".parse::<Method>().unwrap_err();
        assert_eq!(err.status(), Status::InternalServerError);

        let err = "get".parse::<Method>().unwrap_err();
        assert_eq!(err.status(), Status::InternalServerError);
    }

    #[test]
    fn version_parsing() {
        assert_eq!("HTTP/1.0".parse::<Version>().unwrap(), Version::Http10);
        assert_eq!("HTTP/1.1".parse::<Version>().unwrap(), Version::Http11);

        let err = "HTTP/2".parse::<Version>().unwrap_err();
        assert_eq!(err.status(), Status::BadRequest);
    }

    #[test]
    fn status_line_parts() {
        assert_eq!(Status::NotFound.code(), 404);
        assert_eq!(Status::NotFound.reason(), "NotFound");
        assert_eq!(Status::Ok.to_string(), "200 Ok");
    }
}
