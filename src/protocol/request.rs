//! HTTP request construction from the byte stream adapter.

use std::collections::HashMap;
use std::io;

use tokio::io::AsyncRead;

use crate::protocol::uri;
use crate::stream::StreamReader;

const CONTENT_LENGTH_TAG: &str = "Content-Length:";
const CONTENT_TYPE_TAG: &str = "Content-Type:";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A single parsed HTTP request.
///
/// Built once from the stream at connection start: the request line, the two
/// recognized headers (`Content-Length`, `Content-Type` — all other header
/// lines are dropped) and the decoded query/form parameters. The request owns
/// the read half of the connection; the body is consumed through
/// [`stream_mut`](Self::stream_mut) under the remaining-bytes budget declared
/// by `Content-Length`.
///
/// Immutable after construction, except for the stream position advancing as
/// the body is read.
#[derive(Debug)]
pub struct Request<R> {
    stream: StreamReader<R>,
    method: String,
    path: String,
    protocol: String,
    parameters: HashMap<String, String>,
    content_length: u64,
    content_type: String,
}

impl<R> Request<R>
where
    R: AsyncRead + Unpin,
{
    /// Reads the request line, headers and (for a form POST) the body from
    /// `stream`, suspending as socket data arrives.
    ///
    /// Malformed input is not actively detected: missing request-line tokens
    /// come out as empty strings and an unparsable `Content-Length` as zero.
    /// Only transport errors fail construction.
    pub async fn read_from(mut stream: StreamReader<R>) -> io::Result<Self> {
        let mut method = String::new();
        let mut target = String::new();
        let mut protocol = String::new();
        let mut content_length: u64 = 0;
        let mut content_type = String::new();

        let mut first_line = true;
        loop {
            let Some(mut line) = stream.read_line().await? else { break };
            if line.ends_with('\r') {
                line.pop();
            }
            if line.is_empty() {
                break;
            }

            if first_line {
                first_line = false;
                let mut tokens = line.split_whitespace();
                method = tokens.next().unwrap_or_default().to_owned();
                target = tokens.next().unwrap_or_default().to_owned();
                protocol = tokens.next().unwrap_or_default().to_owned();
            } else if let Some(rest) = line.strip_prefix(CONTENT_LENGTH_TAG) {
                content_length = parse_decimal(rest);
            } else if let Some(rest) = line.strip_prefix(CONTENT_TYPE_TAG) {
                content_type = rest.strip_prefix(' ').unwrap_or(rest).to_owned();
            }
        }

        let mut parameters = HashMap::new();
        let path = uri::parse_target(&target, &mut parameters);

        // bound the body reads for methods that carry one
        if method == "POST" || method == "PUT" {
            stream.set_remaining(content_length);
        }

        if method == "POST" && content_type == FORM_CONTENT_TYPE {
            let mut body = Vec::new();
            stream.read_to_end(&mut body).await?;
            // form values overwrite query values on collision
            uri::parse_parameters(&String::from_utf8_lossy(&body), &mut parameters);
        }

        Ok(Self { stream, method, path, protocol, parameters, content_length, content_type })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The percent-decoded path portion of the request target.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Looks up a decoded query/form parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    pub fn parameters(&self) -> &HashMap<String, String> {
        &self.parameters
    }

    /// The underlying stream, positioned at the start of the unread body.
    pub fn stream_mut(&mut self) -> &mut StreamReader<R> {
        &mut self.stream
    }
}

/// Decimal parse with strtol-style leniency: leading whitespace skipped, the
/// number ends at the first non-digit, and no digits at all yield zero.
fn parse_decimal(src: &str) -> u64 {
    let src = src.trim_start();
    let end = src.find(|c: char| !c.is_ascii_digit()).unwrap_or(src.len());
    src[..end].parse().unwrap_or(0)
}
