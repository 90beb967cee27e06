//! Static-file serving: a [`Handler`] that resolves the request's positional
//! parameters under a root directory and streams the file back.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};
use mime::Mime;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::handler::Handler;
use crate::protocol::{FragmentStream, HttpError, Method, Request, ResponseFragment, Status};
use crate::router::Route;

/// Serves files below `root`. The requested file is the path remainder the
/// router captured as positional parameters, joined back together.
#[derive(Debug)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, params: &[String]) -> Result<PathBuf, HttpError> {
        if params.is_empty() {
            return Err(HttpError::bad_request("no resource requested"));
        }
        let mut path = self.root.clone();
        for segment in params {
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl Handler for StaticFiles {
    async fn handle(
        self: Box<Self>,
        request: Request,
        _cancel: CancellationToken,
    ) -> Result<FragmentStream, HttpError> {
        let path = self.resolve(request.params())?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|_| HttpError::not_found(path.display().to_string()))?;
        if !metadata.is_file() {
            return Err(HttpError::not_found(path.display().to_string()));
        }

        debug!(path = %path.display(), "serving file");
        let contents = tokio::fs::read(&path).await?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type_value(&path));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(contents.len()));

        let fragments = stream::iter([
            Ok(ResponseFragment::StatusLine(Status::Ok)),
            Ok(ResponseFragment::HeaderBlock(headers)),
            Ok(ResponseFragment::BodyChunk(Bytes::from(contents))),
        ]);
        Ok(Box::pin(fragments))
    }
}

/// Builds a GET route serving files under `dir`. The route path is the
/// mount point; anything below it resolves inside `dir`.
pub fn static_route(path: &str, dir: impl Into<PathBuf>) -> Route {
    let root: PathBuf = dir.into();
    Route::new(Method::Get, path, move || StaticFiles::new(root.clone()))
}

fn content_type_value(path: &Path) -> HeaderValue {
    let mime = content_type(path);
    HeaderValue::from_str(mime.as_ref()).unwrap_or_else(|_| HeaderValue::from_static("text/plain"))
}

fn content_type(path: &Path) -> Mime {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => mime::TEXT_HTML,
        Some("css") => mime::TEXT_CSS,
        Some("js") => mime::APPLICATION_JAVASCRIPT,
        Some("png") => mime::IMAGE_PNG,
        _ => mime::TEXT_PLAIN,
    }
}
