//! HTTP response emission over the byte stream adapter.

use std::io;

use tokio::io::AsyncWrite;

use crate::protocol::status;
use crate::stream::StreamWriter;

const PROTOCOL: &str = "HTTP/1.1";

/// A single HTTP response under construction.
///
/// The response starts in the `unsent` state: the handler mutates status,
/// content type and content length freely. The header block is emitted lazily
/// on the first body [`write`](Self::write), or by [`close`](Self::close) for
/// a bodyless response. After that point the setters still update the fields
/// but have no effect on the wire.
///
/// When no content length is declared, no `Content-Length` header is emitted
/// and the body simply ends when the connection closes.
#[derive(Debug)]
pub struct Response<W> {
    stream: StreamWriter<W>,
    code: u16,
    content_type: String,
    content_length: Option<u64>,
    headers_sent: bool,
}

impl<W> Response<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(stream: StreamWriter<W>) -> Self {
        Self {
            stream,
            code: status::OK,
            content_type: "text/html".to_owned(),
            content_length: None,
            headers_sent: false,
        }
    }

    pub fn set_code(&mut self, code: u16) {
        self.code = code;
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    pub fn set_content_length(&mut self, n: u64) {
        self.content_length = Some(n);
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// Whether the header block already reached the wire.
    pub fn headers_sent(&self) -> bool {
        self.headers_sent
    }

    /// Writes body bytes, emitting the header block first if still unsent.
    pub async fn write(&mut self, body: &[u8]) -> io::Result<()> {
        self.write_headers().await?;
        self.stream.write(body).await
    }

    /// Flushes buffered output to the socket.
    pub async fn flush(&mut self) -> io::Result<()> {
        self.stream.flush().await
    }

    /// Finishes the response: emits the header block even for a zero-byte
    /// body, then flushes. Safe to call more than once.
    pub async fn close(&mut self) -> io::Result<()> {
        self.write_headers().await?;
        self.stream.flush().await
    }

    /// Emits a canned HTML page for `code`, declaring its length before the
    /// headers go out. Used by the built-in handlers for error pages.
    pub async fn simple_response(&mut self, code: u16) -> io::Result<()> {
        let reason = status::reason_phrase(code);
        let entity = format!(
            "<html><head><title>{reason}</title></head><body><h1>{code} {reason}</h1></body></html>"
        );

        self.set_code(code);
        self.set_content_length(entity.len() as u64);
        self.set_content_type("text/html");

        self.write(entity.as_bytes()).await?;
        self.flush().await
    }

    async fn write_headers(&mut self) -> io::Result<()> {
        if self.headers_sent {
            return Ok(());
        }
        self.headers_sent = true;

        let mut head = format!(
            "{PROTOCOL} {} {}\r\nContent-Type: {}\r\n",
            self.code,
            status::reason_phrase(self.code),
            self.content_type
        );
        if let Some(n) = self.content_length {
            head.push_str(&format!("Content-Length: {n}\r\n"));
        }
        head.push_str("\r\n");

        self.stream.write(head.as_bytes()).await
    }
}
