use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;
use tracing::info;

pub type ConnectionId = u64;

/// Tracks live connection tasks so they can all be forced closed on server
/// shutdown.
///
/// The registry never owns a socket: each entry is a cancellation token the
/// owning task selects on. Cancelling a token makes that task drop its socket
/// at the current suspension point and unwind through its normal teardown.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: Mutex<HashMap<ConnectionId, CancellationToken>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new connection, returning its id and the token its task must
    /// select on.
    pub fn register(&self) -> (ConnectionId, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.connections.lock().expect("registry lock poisoned").insert(id, token.clone());
        (id, token)
    }

    /// Removes a connection. Removing an id that is already gone is a no-op.
    pub fn deregister(&self, id: ConnectionId) {
        self.connections.lock().expect("registry lock poisoned").remove(&id);
    }

    /// Cancels every live connection and clears membership. Used at server
    /// shutdown; does not wait for the tasks to finish.
    pub fn close_all(&self) {
        let mut connections = self.connections.lock().expect("registry lock poisoned");
        info!(count = connections.len(), "closing all connections");
        for (_, token) in connections.drain() {
            token.cancel();
        }
    }

    pub fn active_count(&self) -> usize {
        self.connections.lock().expect("registry lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_deregister() {
        let registry = ConnectionRegistry::new();
        let (id_a, _token_a) = registry.register();
        let (id_b, _token_b) = registry.register();
        assert_ne!(id_a, id_b);
        assert_eq!(registry.active_count(), 2);

        registry.deregister(id_a);
        assert_eq!(registry.active_count(), 1);

        // idempotent
        registry.deregister(id_a);
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn close_all_cancels_every_token_and_clears_membership() {
        let registry = ConnectionRegistry::new();
        let (_, token_a) = registry.register();
        let (_, token_b) = registry.register();

        registry.close_all();

        assert!(token_a.is_cancelled());
        assert!(token_b.is_cancelled());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn deregister_after_close_all_is_a_noop() {
        let registry = ConnectionRegistry::new();
        let (id, _token) = registry.register();
        registry.close_all();
        registry.deregister(id);
        assert_eq!(registry.active_count(), 0);
    }
}
