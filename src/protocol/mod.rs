//! HTTP message types over the byte stream adapter
//!
//! This module provides the request and response halves of a single HTTP
//! exchange:
//!
//! - [`Request`]: parsed from the stream at connection start (request line,
//!   the two recognized headers, query/form parameters), then used by the
//!   handler to consume the body.
//! - [`Response`]: status/content-type/length set by the handler, with the
//!   header block emitted lazily on the first body write or on close.
//! - [`uri`]: percent decoding and `&`/`=` parameter parsing.
//! - [`status`]: the status codes this server emits and their reason phrases.

mod error;
mod request;
mod response;

pub mod status;
pub mod uri;

pub use error::HttpError;
pub use request::Request;
pub use response::Response;
