//! Built-in default handlers: file download, file upload, and the 400 page
//! answered to unrouted POSTs.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mime::Mime;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::{status, Request, Response};
use crate::BoxError;

use super::Handler;

const CHUNK_SIZE: usize = 16 * 1024;

/// Serves `GET` requests from files under a document root.
///
/// `/` maps to `index.html`. Paths containing `..` or not starting with `/`
/// are rejected with 400 before any filesystem access; files that cannot be
/// opened yield 404. The content type is derived from the file extension.
#[derive(Debug)]
pub struct StaticGetHandler {
    doc_root: PathBuf,
}

impl StaticGetHandler {
    pub fn new(doc_root: impl Into<PathBuf>) -> Self {
        Self { doc_root: doc_root.into() }
    }
}

#[async_trait]
impl<R, W> Handler<R, W> for StaticGetHandler
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn call(&self, request: Request<R>, mut response: Response<W>) -> Result<Response<W>, BoxError> {
        let path = request.path();

        // refuse traversal out of the document root
        if path.is_empty() || !path.starts_with('/') || path.contains("..") {
            response.simple_response(status::BAD_REQUEST).await?;
            return Ok(response);
        }

        let relative = if path == "/" { "index.html" } else { &path[1..] };
        let file_path = self.doc_root.join(relative);

        let Ok(mut file) = File::open(&file_path).await else {
            response.simple_response(status::NOT_FOUND).await?;
            return Ok(response);
        };
        let Ok(metadata) = file.metadata().await else {
            response.simple_response(status::NOT_FOUND).await?;
            return Ok(response);
        };

        response.set_code(status::OK);
        response.set_content_length(metadata.len());
        response.set_content_type(extension_to_mime(&file_path).essence_str());

        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            let n = file.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            response.write(&chunk[..n]).await?;
        }
        response.flush().await?;
        Ok(response)
    }
}

/// Stores the body of a `PUT` request as a file under the document root.
///
/// A file that cannot be created yields 403; success answers 200 with an
/// empty body.
#[derive(Debug)]
pub struct StaticPutHandler {
    doc_root: PathBuf,
}

impl StaticPutHandler {
    pub fn new(doc_root: impl Into<PathBuf>) -> Self {
        Self { doc_root: doc_root.into() }
    }
}

#[async_trait]
impl<R, W> Handler<R, W> for StaticPutHandler
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn call(&self, mut request: Request<R>, mut response: Response<W>) -> Result<Response<W>, BoxError> {
        let file_path = self.doc_root.join(request.path().trim_start_matches('/'));

        let Ok(mut file) = File::create(&file_path).await else {
            response.simple_response(status::FORBIDDEN).await?;
            return Ok(response);
        };

        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            let n = request.stream_mut().read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            file.write_all(&chunk[..n]).await?;
        }
        file.flush().await?;

        response.set_code(status::OK);
        response.set_content_length(0);
        response.set_content_type("text/html");
        Ok(response)
    }
}

/// Answers 400 to POST requests that matched no registration.
#[derive(Debug)]
pub(crate) struct DefaultPostHandler;

#[async_trait]
impl<R, W> Handler<R, W> for DefaultPostHandler
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    async fn call(&self, _request: Request<R>, mut response: Response<W>) -> Result<Response<W>, BoxError> {
        response.simple_response(status::BAD_REQUEST).await?;
        Ok(response)
    }
}

fn extension_to_mime(path: &Path) -> Mime {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match extension {
        "gif" => mime::IMAGE_GIF,
        "htm" | "html" => mime::TEXT_HTML,
        "jpg" | "jpeg" => mime::IMAGE_JPEG,
        "png" => mime::IMAGE_PNG,
        _ => mime::TEXT_PLAIN,
    }
}
