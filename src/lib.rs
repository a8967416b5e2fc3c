//! A minimal asynchronous HTTP/1.1 server
//!
//! This crate implements a small one-request-per-connection HTTP server on top
//! of tokio. Every accepted socket is driven by its own task; request and
//! response bodies are read and written through ordinary sequential `async`
//! calls while the socket I/O underneath is non-blocking and interleaved
//! across any number of concurrent connections.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use nano_http::handler::make_handler;
//! use nano_http::protocol::status;
//! use nano_http::server::{Server, ServerRequest, ServerResponse};
//! use nano_http::BoxError;
//!
//! async fn greeting(_request: ServerRequest, mut response: ServerResponse) -> Result<ServerResponse, BoxError> {
//!     response.set_code(status::OK);
//!     response.set_content_type("text/html");
//!     response.write(b"<html><body><h1>Hello, world.</h1></body></html>").await?;
//!     Ok(response)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), BoxError> {
//!     let mut server = Server::bind("127.0.0.1:8080", "./doc").await?;
//!     server.register("GET", "/Greeting", Arc::new(make_handler(greeting)));
//!     server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`stream`]: the byte stream adapter bridging sequential reads/writes to
//!   suspend/resume socket I/O
//! - [`protocol`]: request parsing and response emission over the adapter
//! - [`connection`]: per-connection task lifecycle and the registry used for
//!   forced shutdown
//! - [`handler`]: the handler trait and the method/path dispatch table
//! - [`server`]: listener setup and the accept loop
//!
//! # Limitations
//!
//! - One request per connection; no keep-alive or pipelining
//! - No chunked transfer encoding, TLS, or HTTP/2
//! - Only `Content-Length` and `Content-Type` request headers are observed
//! - No read or write timeouts; a silent peer holds its connection open

pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;
pub mod stream;

/// Error type returned by request handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use protocol::{HttpError, Request, Response};
pub use server::Server;
