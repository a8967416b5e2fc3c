//! Listener setup and the accept loop.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::connection::{Connection, ConnectionRegistry};
use crate::handler::{Handler, HandlerTable};
use crate::protocol::{Request, Response};

/// Request type seen by handlers registered on a [`Server`].
pub type ServerRequest = Request<OwnedReadHalf>;
/// Response type seen by handlers registered on a [`Server`].
pub type ServerResponse = Response<OwnedWriteHalf>;
/// Handler type dispatched by a [`Server`].
pub type ServerHandler = Arc<dyn Handler<OwnedReadHalf, OwnedWriteHalf>>;

/// The accept loop: binds a listener, spawns one connection task per accepted
/// socket and tracks the tasks for forced shutdown.
///
/// Handlers are registered before [`run`](Self::run); unregistered paths fall
/// back to the built-in static file behavior over `doc_root`.
pub struct Server {
    listener: TcpListener,
    handlers: Arc<HandlerTable<OwnedReadHalf, OwnedWriteHalf>>,
    registry: Arc<ConnectionRegistry>,
    shutdown: CancellationToken,
}

impl Server {
    /// Binds the listener. The server does not accept until [`run`](Self::run).
    pub async fn bind(addr: impl ToSocketAddrs, doc_root: impl Into<PathBuf>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            handlers: Arc::new(HandlerTable::new(doc_root)),
            registry: Arc::new(ConnectionRegistry::new()),
            shutdown: CancellationToken::new(),
        })
    }

    /// Registers `handler` for `(method, path)`. Only possible before
    /// [`run`](Self::run) is started.
    pub fn register(&mut self, method: &str, path: &str, handler: ServerHandler) {
        match Arc::get_mut(&mut self.handlers) {
            Some(handlers) => handlers.register(method, path, handler),
            None => warn!(method, path, "cannot register handlers on a running server"),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of connections currently registered, i.e. not yet fully torn
    /// down.
    pub fn active_connections(&self) -> usize {
        self.registry.active_count()
    }

    /// Stops the accept loop and forces every live connection closed. The
    /// connection tasks unwind through their own teardown on their own
    /// schedule.
    pub fn shutdown(&self) {
        info!("server shutting down");
        self.shutdown.cancel();
        self.registry.close_all();
    }

    /// Accepts connections until [`shutdown`](Self::shutdown) is called.
    /// Accept failures are logged and do not stop the loop.
    pub async fn run(&self) -> io::Result<()> {
        info!(addr = %self.local_addr()?, "start listening");

        loop {
            let (tcp_stream, remote_addr) = select! {
                _ = self.shutdown.cancelled() => {
                    info!("accept loop stopped");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, "failed to accept");
                        continue;
                    }
                },
            };

            let (id, token) = self.registry.register();
            debug!(id, %remote_addr, "accepted connection");

            let handlers = Arc::clone(&self.handlers);
            let registry = Arc::clone(&self.registry);
            tokio::spawn(async move {
                let (read_half, write_half) = tcp_stream.into_split();
                let connection = Connection::new(read_half, write_half, handlers);

                select! {
                    _ = token.cancelled() => {
                        debug!(id, "connection cancelled by shutdown");
                    }
                    result = connection.process() => match result {
                        Ok(()) => debug!(id, "connection finished"),
                        // the peer sees only the closed socket
                        Err(e) => warn!(id, cause = %e, "connection terminated"),
                    },
                }

                registry.deregister(id);
            });
        }
    }
}
