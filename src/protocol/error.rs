use std::io;
use thiserror::Error;

use crate::BoxError;

/// Failures that terminate a connection.
///
/// Neither variant is ever surfaced to the peer: the connection task logs the
/// error and tears the socket down silently.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    #[error("handler error: {source}")]
    Handler { source: BoxError },
}
