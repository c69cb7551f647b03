//! Shared state for the development server.
//!
//! Tracks live-reload clients and the settings the request handlers need,
//! using parking_lot RwLock for the client registry.

use crate::dev::DevEvent;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Client connection tracker for Server-Sent Events.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

/// Shared development server state.
pub struct DevServerState {
    /// Connected SSE clients
    pub clients: ClientRegistry,

    /// Next client ID
    pub next_client_id: RwLock<usize>,

    /// Directory served over HTTP
    pub server_root: PathBuf,

    /// Show in-page notifications in the reload client
    pub notify: bool,
}

impl DevServerState {
    /// Create new dev server state.
    ///
    /// # Arguments
    ///
    /// * `server_root` - Directory served over HTTP
    /// * `notify` - Whether the reload client shows in-page notifications
    pub fn new(server_root: PathBuf, notify: bool) -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_client_id: RwLock::new(0),
            server_root,
            notify,
        }
    }

    /// Register a new SSE client.
    ///
    /// # Returns
    ///
    /// Client ID and receiver for events
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = {
            let mut next_id = self.next_client_id.write();
            let id = *next_id;
            *next_id += 1;
            id
        };

        let (tx, rx) = mpsc::channel(100);
        self.clients.write().insert(id, tx);

        (id, rx)
    }

    /// Unregister an SSE client.
    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Send an event to one client.
    pub async fn send_to(&self, id: usize, event: &DevEvent) {
        let tx = self.clients.read().get(&id).cloned();
        if let Some(tx) = tx {
            if tx.send(event.to_json()).await.is_err() {
                self.unregister_client(id);
            }
        }
    }

    /// Broadcast an event to all connected clients.
    ///
    /// Clients whose channel is closed are dropped from the registry.
    pub async fn broadcast(&self, event: &DevEvent) {
        let json = event.to_json();

        // Clone senders so the lock is not held across awaits
        let clients = self.clients.read().clone();

        let mut failed_ids = Vec::new();
        for (id, tx) in clients {
            if tx.send(json.clone()).await.is_err() {
                failed_ids.push(id);
            }
        }

        for id in failed_ids {
            self.unregister_client(id);
        }
    }

    /// Get number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Directory served over HTTP.
    pub fn server_root(&self) -> &Path {
        &self.server_root
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;
