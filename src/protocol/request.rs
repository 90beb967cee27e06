//! The parsed request model.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{header, HeaderMap};

use crate::protocol::body::ReqBody;
use crate::protocol::{HttpError, Method, Version};

/// The parsed request line and header section of one request.
///
/// Produced by the request decoder; immutable afterwards. The positional
/// path parameters and the body handle are attached later, once the router
/// has matched the request (see [`Request`]).
#[derive(Debug)]
pub struct RequestHead {
    method: Method,
    version: Version,
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
}

impl RequestHead {
    pub(crate) fn new(
        method: Method,
        version: Version,
        path: String,
        headers: HeaderMap,
        query: HashMap<String, String>,
    ) -> Self {
        Self { method, version, path, headers, query }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The request path with any query string already stripped.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Looks up a query parameter from the request target.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// The connection-persistence intent this request starts with: an
    /// explicit `Connection` header wins, otherwise HTTP/1.1 defaults to
    /// keep-alive and HTTP/1.0 to close.
    pub fn keep_alive(&self) -> bool {
        let connection = self.headers.get(header::CONNECTION).and_then(|v| v.to_str().ok());
        match connection {
            Some(value) if value.eq_ignore_ascii_case("close") => false,
            Some(value) if value.eq_ignore_ascii_case("keep-alive") => true,
            _ => self.version == Version::Http11,
        }
    }
}

/// One parsed HTTP request, as seen by a handler.
///
/// Read-only, except for [`Request::body`]: the body is fetched lazily, on
/// demand, through a channel served by the connection task.
#[derive(Debug)]
pub struct Request {
    head: RequestHead,
    params: Vec<String>,
    body: ReqBody,
}

impl Request {
    pub(crate) fn new(head: RequestHead, params: Vec<String>, body: ReqBody) -> Self {
        Self { head, params, body }
    }

    pub fn method(&self) -> Method {
        self.head.method()
    }

    pub fn version(&self) -> Version {
        self.head.version()
    }

    pub fn path(&self) -> &str {
        self.head.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.head.headers()
    }

    /// Looks up a header value, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Looks up a query parameter from the request target.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.head.query(name)
    }

    /// The positional path parameters captured by the router, in
    /// left-to-right order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The parsed `Content-Length` header, if present and well-formed.
    pub fn content_length(&self) -> Option<usize> {
        self.head
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    /// Retrieves the request body: exactly `Content-Length` bytes.
    ///
    /// Suspends until the connection task has read the bytes from the
    /// transport; any body bytes over-read during header parsing are used
    /// first. Fails with a `BadRequest` classification when the request
    /// carries no `Content-Length` header.
    ///
    /// Calling this more than once is unsupported: a second call attempts to
    /// read past where the first one left off.
    pub async fn body(&mut self) -> Result<Bytes, HttpError> {
        let length = self
            .content_length()
            .ok_or_else(|| HttpError::bad_request("missing Content-Length header"))?;
        self.body.fetch(length).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn head(version: Version, connection: Option<&'static str>) -> RequestHead {
        let mut headers = HeaderMap::new();
        if let Some(value) = connection {
            headers.insert(header::CONNECTION, HeaderValue::from_static(value));
        }
        RequestHead::new(Method::Get, version, "/".to_string(), headers, HashMap::new())
    }

    #[test]
    fn keep_alive_defaults_follow_version() {
        assert!(head(Version::Http11, None).keep_alive());
        assert!(!head(Version::Http10, None).keep_alive());
    }

    #[test]
    fn keep_alive_honors_connection_header() {
        assert!(!head(Version::Http11, Some("close")).keep_alive());
        assert!(!head(Version::Http11, Some("Close")).keep_alive());
        assert!(head(Version::Http10, Some("Keep-Alive")).keep_alive());
    }

    #[tokio::test]
    async fn body_requires_content_length() {
        let head = head(Version::Http11, None);
        let mut request = Request::new(head, Vec::new(), ReqBody::detached());

        let err = request.body().await.unwrap_err();
        assert_eq!(err.status(), crate::protocol::Status::BadRequest);
    }
}
