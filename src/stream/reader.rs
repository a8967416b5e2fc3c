use std::cmp;
use std::io;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use super::BUFFER_SIZE;

/// Sequential reader over an asynchronous byte source.
///
/// The reader owns a bounded input buffer and an optional remaining-bytes
/// budget. While the budget is unset, reads continue until the peer closes the
/// stream. Once [`set_remaining`](Self::set_remaining) declares a budget,
/// exactly that many further bytes are delivered; reads past the budget return
/// zero without touching the socket, even if the peer sends more.
#[derive(Debug)]
pub struct StreamReader<R> {
    io: R,
    buffer: BytesMut,
    remaining: Option<u64>,
}

impl<R> StreamReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(io: R) -> Self {
        Self { io, buffer: BytesMut::with_capacity(BUFFER_SIZE), remaining: None }
    }

    /// Declares how many further bytes are logically part of the current
    /// message body. Bytes already buffered but not yet consumed count against
    /// the budget as they are delivered.
    ///
    /// Without this call the reader is unbounded and only ends at peer close.
    pub fn set_remaining(&mut self, n: u64) {
        self.remaining = Some(n);
    }

    /// The current remaining-bytes budget, or `None` when unbounded.
    pub fn remaining(&self) -> Option<u64> {
        self.remaining
    }

    /// Reads up to `dst.len()` bytes, suspending while the socket has no data.
    ///
    /// Returns `Ok(0)` at end-of-data: either the budget is exhausted or the
    /// peer closed the stream. Socket errors abort the read and propagate to
    /// the caller.
    pub async fn read(&mut self, dst: &mut [u8]) -> io::Result<usize> {
        if dst.is_empty() || self.remaining == Some(0) {
            return Ok(0);
        }

        if self.buffer.is_empty() {
            let n = self.io.read_buf(&mut self.buffer).await?;
            if n == 0 {
                return Ok(0);
            }
        }

        let mut len = cmp::min(dst.len(), self.buffer.len());
        if let Some(remaining) = self.remaining {
            len = cmp::min(len as u64, remaining) as usize;
        }

        dst[..len].copy_from_slice(&self.buffer[..len]);
        self.buffer.advance(len);
        if let Some(remaining) = &mut self.remaining {
            *remaining -= len as u64;
        }
        Ok(len)
    }

    /// Reads until end-of-data, appending to `dst`. Returns the number of
    /// bytes read.
    pub async fn read_to_end(&mut self, dst: &mut Vec<u8>) -> io::Result<usize> {
        let mut chunk = [0u8; 4096];
        let mut total = 0;
        loop {
            let n = self.read(&mut chunk).await?;
            if n == 0 {
                return Ok(total);
            }
            dst.extend_from_slice(&chunk[..n]);
            total += n;
        }
    }

    /// Reads one line, consuming through the `\n` terminator (not included in
    /// the returned string). Returns `None` once end-of-data is reached; a
    /// final partial line without a terminator is dropped.
    ///
    /// Intended for the header phase, before any budget is set.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        loop {
            if self.buffer.is_empty() {
                let n = self.io.read_buf(&mut self.buffer).await?;
                if n == 0 {
                    return Ok(None);
                }
            }

            match self.buffer.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    line.extend_from_slice(&self.buffer[..pos]);
                    self.buffer.advance(pos + 1);
                    return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
                }
                None => {
                    line.extend_from_slice(&self.buffer);
                    self.buffer.clear();
                }
            }
        }
    }
}
