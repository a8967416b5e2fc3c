//! Status codes emitted by this server.

pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const FORBIDDEN: u16 = 403;
pub const NOT_FOUND: u16 = 404;
pub const INTERNAL_SERVER_ERROR: u16 = 500;

/// Reason phrase for a status code.
///
/// Codes outside the table fall back to the 200 phrase, which keeps unknown
/// codes emittable at the cost of a misleading reason text.
pub fn reason_phrase(code: u16) -> &'static str {
    match code {
        OK => "OK",
        BAD_REQUEST => "Bad Request",
        FORBIDDEN => "Forbidden",
        NOT_FOUND => "Not Found",
        INTERNAL_SERVER_ERROR => "Internal Server Error",
        _ => "OK",
    }
}
