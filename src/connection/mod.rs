//! Connection lifecycle
//!
//! A [`Connection`] owns the two halves of one accepted socket and processes
//! exactly one request/response cycle on it: parse the request, resolve a
//! handler, invoke it, close the response. Whatever happens — success, a
//! handler failure or a transport failure — the socket is torn down exactly
//! once when the connection is dropped, and the peer is never shown an error
//! page for failures the handler did not answer itself.
//!
//! [`ConnectionRegistry`] tracks the live connections so that server shutdown
//! can force every one of them closed.

mod registry;

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::handler::HandlerTable;
use crate::protocol::{HttpError, Request, Response};
use crate::stream::{StreamReader, StreamWriter};

pub use registry::{ConnectionId, ConnectionRegistry};

/// One accepted socket, processed as a single request/response exchange.
pub struct Connection<R, W> {
    reader: StreamReader<R>,
    writer: StreamWriter<W>,
    handlers: Arc<HandlerTable<R, W>>,
}

impl<R, W> Connection<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(reader: R, writer: W, handlers: Arc<HandlerTable<R, W>>) -> Self {
        Self { reader: StreamReader::new(reader), writer: StreamWriter::new(writer), handlers }
    }

    /// Runs the dispatch sequence for the single request on this connection.
    ///
    /// Consumes the connection; the socket closes when the halves are dropped,
    /// on the error paths as much as on success.
    pub async fn process(self) -> Result<(), HttpError> {
        let Connection { reader, writer, handlers } = self;

        let request = Request::read_from(reader).await?;
        let response = Response::new(writer);

        debug!(method = request.method(), path = request.path(), "dispatching request");
        let handler = handlers.resolve(request.method(), request.path());

        let mut response =
            handler.call(request, response).await.map_err(|source| HttpError::Handler { source })?;
        response.close().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf};

    use crate::handler::make_handler;
    use crate::protocol::status;
    use crate::BoxError;

    use super::*;

    type TestRequest = Request<ReadHalf<DuplexStream>>;
    type TestResponse = Response<WriteHalf<DuplexStream>>;
    type TestTable = HandlerTable<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

    async fn exchange(table: TestTable, raw_request: &[u8]) -> (Vec<u8>, Result<(), HttpError>) {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let (server_read, server_write) = tokio::io::split(server);
        let connection = Connection::new(server_read, server_write, Arc::new(table));

        let task = tokio::spawn(connection.process());

        client.write_all(raw_request).await.unwrap();
        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();

        (out, task.await.unwrap())
    }

    #[tokio::test]
    async fn dispatches_to_the_registered_handler() {
        let mut table = TestTable::new("/tmp");
        table.register(
            "GET",
            "/hello",
            Arc::new(make_handler(|_request: TestRequest, mut response: TestResponse| async move {
                response.set_content_type("text/plain");
                response.write(b"hi").await?;
                Ok::<_, BoxError>(response)
            })),
        );

        let (out, result) = exchange(table, b"GET /hello HTTP/1.1\r\n\r\n").await;

        result.unwrap();
        assert_eq!(&out[..], b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhi");
    }

    #[tokio::test]
    async fn handler_reads_form_parameters() {
        let mut table = TestTable::new("/tmp");
        table.register(
            "POST",
            "/PostForm",
            Arc::new(make_handler(|request: TestRequest, mut response: TestResponse| async move {
                let name = request.parameter("name").unwrap_or("").to_owned();
                let age = request.parameter("age").unwrap_or("").to_owned();
                response.set_content_type("text/plain");
                response.write(format!("{name}/{age}").as_bytes()).await?;
                Ok::<_, BoxError>(response)
            })),
        );

        let raw = b"POST /PostForm HTTP/1.1\r\n\
            Content-Length: 16\r\n\
            Content-Type: application/x-www-form-urlencoded\r\n\
            \r\nname=taro&age=30";
        let (out, result) = exchange(table, raw).await;

        result.unwrap();
        assert!(out.ends_with(b"\r\n\r\ntaro/30"));
    }

    #[tokio::test]
    async fn handler_failure_closes_the_connection_silently() {
        let mut table = TestTable::new("/tmp");
        table.register(
            "GET",
            "/boom",
            Arc::new(make_handler(|_request: TestRequest, _response: TestResponse| async move {
                Err::<TestResponse, BoxError>("boom".into())
            })),
        );

        let (out, result) = exchange(table, b"GET /boom HTTP/1.1\r\n\r\n").await;

        // the peer sees only the closed socket, never an error page
        assert!(out.is_empty());
        assert!(matches!(result, Err(HttpError::Handler { .. })));
    }

    #[tokio::test]
    async fn unknown_method_gets_the_bare_header_block() {
        let table = TestTable::new("/tmp");
        let (out, result) = exchange(table, b"BREW /pot HTTP/1.1\r\n\r\n").await;

        result.unwrap();
        assert_eq!(&out[..], b"HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n");
    }

    #[tokio::test]
    async fn unrouted_post_gets_the_default_400_page() {
        let table = TestTable::new("/tmp");
        let (out, result) =
            exchange(table, b"POST /nowhere HTTP/1.1\r\nContent-Length: 0\r\n\r\n").await;

        result.unwrap();
        assert!(out.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }
}
