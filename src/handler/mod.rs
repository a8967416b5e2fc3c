//! Request handlers and the method/path dispatch table
//!
//! A [`Handler`] receives the parsed [`Request`] and the unsent [`Response`]
//! for one connection, consumes the body through the request's stream and
//! produces the response body, then hands the response back so the connection
//! task can close it. Plain `async fn`s become handlers through
//! [`make_handler`].
//!
//! [`HandlerTable`] stores the registered handlers per method (GET/POST/PUT)
//! and resolves a request path to a handler, falling back to the built-in
//! behavior for that method: static file download for GET, file upload for
//! PUT, a 400 page for POST. Requests with any other method resolve to a
//! handler that does nothing, which leaves the default 200 header block as
//! the whole response.

mod static_files;

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::warn;

use crate::protocol::{Request, Response};
use crate::BoxError;

pub use static_files::{StaticGetHandler, StaticPutHandler};

/// A request handler invoked by the connection task.
///
/// `R` and `W` are the read/write halves of the underlying connection. Any
/// returned error is caught at the connection task boundary and turns into a
/// silent connection close; handlers that want the peer to see a diagnosable
/// failure must write an error page themselves (see
/// [`Response::simple_response`]).
#[async_trait]
pub trait Handler<R, W>: Send + Sync {
    async fn call(&self, request: Request<R>, response: Response<W>) -> Result<Response<W>, BoxError>;
}

/// Adapter turning a plain async function into a [`Handler`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<R, W, F, Fut> Handler<R, W> for HandlerFn<F>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    F: Fn(Request<R>, Response<W>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<W>, BoxError>> + Send,
{
    async fn call(&self, request: Request<R>, response: Response<W>) -> Result<Response<W>, BoxError> {
        (self.f)(request, response).await
    }
}

pub fn make_handler<R, W, F, Fut>(f: F) -> HandlerFn<F>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
    F: Fn(Request<R>, Response<W>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<W>, BoxError>> + Send,
{
    HandlerFn { f }
}

/// Does nothing; the connection task's unconditional close then emits the
/// default header block.
struct EmptyHandler;

#[async_trait]
impl<R, W> Handler<R, W> for EmptyHandler
where
    R: Send + 'static,
    W: Send + 'static,
{
    async fn call(&self, _request: Request<R>, response: Response<W>) -> Result<Response<W>, BoxError> {
        Ok(response)
    }
}

/// Per-method name → handler mapping with built-in defaults.
pub struct HandlerTable<R, W> {
    get: HashMap<String, Arc<dyn Handler<R, W>>>,
    post: HashMap<String, Arc<dyn Handler<R, W>>>,
    put: HashMap<String, Arc<dyn Handler<R, W>>>,

    default_get: Arc<dyn Handler<R, W>>,
    default_post: Arc<dyn Handler<R, W>>,
    default_put: Arc<dyn Handler<R, W>>,
    unmatched_method: Arc<dyn Handler<R, W>>,
}

impl<R, W> HandlerTable<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    /// Creates a table whose default GET/PUT handlers serve files under
    /// `doc_root`.
    pub fn new(doc_root: impl Into<PathBuf>) -> Self {
        let doc_root = doc_root.into();
        Self {
            get: HashMap::new(),
            post: HashMap::new(),
            put: HashMap::new(),
            default_get: Arc::new(StaticGetHandler::new(doc_root.clone())),
            default_post: Arc::new(static_files::DefaultPostHandler),
            default_put: Arc::new(StaticPutHandler::new(doc_root)),
            unmatched_method: Arc::new(EmptyHandler),
        }
    }

    /// Registers `handler` for `method` and `path`. Methods other than
    /// GET/POST/PUT are not dispatched and the registration is dropped.
    pub fn register(&mut self, method: &str, path: &str, handler: Arc<dyn Handler<R, W>>) {
        let table = match method {
            "GET" => &mut self.get,
            "POST" => &mut self.post,
            "PUT" => &mut self.put,
            _ => {
                warn!(method, path, "ignoring registration for unsupported method");
                return;
            }
        };
        table.insert(path.to_owned(), handler);
    }

    /// Resolves the handler for `(method, path)`, falling back to the
    /// method's default behavior when no registration matches.
    pub fn resolve(&self, method: &str, path: &str) -> Arc<dyn Handler<R, W>> {
        let (table, default) = match method {
            "GET" => (&self.get, &self.default_get),
            "POST" => (&self.post, &self.default_post),
            "PUT" => (&self.put, &self.default_put),
            _ => return Arc::clone(&self.unmatched_method),
        };
        table.get(path).map(Arc::clone).unwrap_or_else(|| Arc::clone(default))
    }
}
