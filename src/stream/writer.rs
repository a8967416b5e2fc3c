use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::BUFFER_SIZE;

/// Sequential buffered writer over an asynchronous byte sink.
///
/// Writes append to a bounded output buffer; the buffered region is written to
/// the socket (suspending the task) whenever the buffer fills, and on an
/// explicit [`flush`](Self::flush).
#[derive(Debug)]
pub struct StreamWriter<W> {
    io: W,
    buffer: BytesMut,
}

impl<W> StreamWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(io: W) -> Self {
        Self { io, buffer: BytesMut::with_capacity(BUFFER_SIZE) }
    }

    /// Appends `src` to the output buffer, draining to the socket whenever the
    /// buffer reaches capacity.
    pub async fn write(&mut self, mut src: &[u8]) -> io::Result<()> {
        while !src.is_empty() {
            let room = BUFFER_SIZE - self.buffer.len();
            let take = room.min(src.len());
            self.buffer.extend_from_slice(&src[..take]);
            src = &src[take..];

            if self.buffer.len() >= BUFFER_SIZE {
                self.write_buffer().await?;
            }
        }
        Ok(())
    }

    /// Forces buffered output to the socket. A no-op when nothing is buffered.
    pub async fn flush(&mut self) -> io::Result<()> {
        self.write_buffer().await?;
        self.io.flush().await
    }

    async fn write_buffer(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        self.io.write_all(self.buffer.as_ref()).await?;
        self.buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn buffers_until_flushed() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut writer = StreamWriter::new(server);

        writer.write(b"abc").await.unwrap();

        // nothing may reach the socket before the flush
        let mut buf = [0u8; 8];
        let peek = tokio::time::timeout(Duration::from_millis(20), client.read(&mut buf)).await;
        assert!(peek.is_err());

        writer.flush().await.unwrap();
        let n = client.read(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"abc");
    }

    #[tokio::test]
    async fn drains_to_the_socket_when_full() {
        let (mut client, server) = tokio::io::duplex(2 * BUFFER_SIZE);
        let mut writer = StreamWriter::new(server);

        let payload = vec![0x5au8; BUFFER_SIZE];
        writer.write(&payload).await.unwrap();

        // no explicit flush: a full buffer reaches the socket on its own
        let mut received = vec![0u8; BUFFER_SIZE];
        client.read_exact(&mut received).await.unwrap();
        assert_eq!(received, payload);
    }

    #[tokio::test]
    async fn flush_on_empty_buffer_is_a_noop() {
        let (_client, server) = tokio::io::duplex(16);
        let mut writer = StreamWriter::new(server);
        writer.flush().await.unwrap();
    }
}
