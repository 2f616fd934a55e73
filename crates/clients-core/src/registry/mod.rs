//! Persistent client registry
//!
//! The registry owns every [`PersistentClient`] and guarantees that no two
//! clients share a name or an identifier. A subnet may not overlap another
//! client's subnet or contain another client's IP.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use clients_core::{ClientRegistry, PersistentClient};
//!
//! # async fn demo() -> clients_core::Result<()> {
//! let registry = ClientRegistry::default();
//!
//! let laptop = PersistentClient::new("kids-laptop").with_ids(["192.168.1.20", "kids"])?;
//! registry.add(laptop).await?;
//!
//! let found = registry.find("192.168.1.20").await;
//! assert_eq!(found.map(|c| c.name), Some("kids-laptop".to_string()));
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! The registry is a cheap handle around one `tokio::sync::RwLock`. Clone it
//! into every task that needs it. Mutations hold the write lock for both
//! validation and the change itself; listing and lookups share the read
//! lock. The lock is fair, so a steady stream of readers cannot starve a
//! writer.

mod index;
mod snapshot;

pub use snapshot::Snapshot;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::client::PersistentClient;
use crate::config::RegistryConfig;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::traits::ClientLookup;

use index::ClientIndex;

/// Shared handle to the persistent client registry
#[derive(Debug, Clone)]
pub struct ClientRegistry {
    inner: Arc<RwLock<ClientIndex>>,
    supported_tags: Arc<[String]>,
}

impl ClientRegistry {
    /// Create an empty registry
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ClientIndex::new(
                config.supported_tags.iter().cloned(),
            ))),
            supported_tags: config.supported_tags.clone().into(),
        }
    }

    /// Tags clients may carry, in configuration order
    pub fn supported_tags(&self) -> &[String] {
        &self.supported_tags
    }

    /// Add a new client
    ///
    /// A fresh UID is minted for the stored record. Checks run in this
    /// order, and the first failure is returned with the registry untouched:
    ///
    /// 1. empty name (`InvalidName`)
    /// 2. no identifiers (`InvalidIdentifier`)
    /// 3. unsupported tag (`InvalidTag`)
    /// 4. name already used (`DuplicateName`)
    /// 5. identifier claimed or overlapped by another client
    ///    (`DuplicateIdentifier`)
    ///
    /// # Returns
    ///
    /// A copy of the stored client.
    pub async fn add(&self, client: PersistentClient) -> Result<PersistentClient> {
        let mut guard = self.inner.write().await;
        let name = client.name.clone();

        match guard.add(client) {
            Ok(stored) => {
                info!(name = %stored.name, uid = %stored.uid, ids = stored.ids.len(), "Client added");
                Ok(stored.clone())
            }
            Err(e) => {
                debug!(name = %name, error = %e, "Client add rejected");
                Err(e)
            }
        }
    }

    /// Replace the client named `old_name` with `client`
    ///
    /// The stored record keeps the UID and list position of the client it
    /// replaces. `client` is validated like [`Self::add`], except that the
    /// replaced client's own name and identifiers never clash.
    ///
    /// # Errors
    ///
    /// - `InvalidName`: `old_name` is empty
    /// - `NotFound`: no client named `old_name`
    /// - any error [`Self::add`] can return
    pub async fn update(&self, old_name: &str, client: PersistentClient) -> Result<PersistentClient> {
        let mut guard = self.inner.write().await;

        match guard.update(old_name, client) {
            Ok(stored) => {
                info!(old_name, name = %stored.name, uid = %stored.uid, "Client updated");
                Ok(stored.clone())
            }
            Err(e) => {
                debug!(old_name, error = %e, "Client update rejected");
                Err(e)
            }
        }
    }

    /// Remove the client named `name`
    ///
    /// # Errors
    ///
    /// - `InvalidName`: `name` is empty
    /// - `NotFound`: no client named `name`
    pub async fn remove(&self, name: &str) -> Result<PersistentClient> {
        let mut guard = self.inner.write().await;

        match guard.remove(name) {
            Ok(removed) => {
                info!(name, uid = %removed.uid, "Client removed");
                Ok(removed)
            }
            Err(e) => {
                debug!(name, error = %e, "Client remove rejected");
                Err(e)
            }
        }
    }

    /// Point-in-time copy of every client, in insertion order
    pub async fn list(&self) -> Snapshot {
        let guard = self.inner.read().await;
        guard.iter().cloned().collect()
    }

    /// Find the client matching a raw identifier
    ///
    /// An IP resolves to the client owning that exact IP, otherwise to the
    /// client owning the most specific subnet containing it. Malformed input
    /// matches nothing.
    pub async fn find(&self, raw: &str) -> Option<PersistentClient> {
        let id = match Identifier::classify(raw) {
            Ok(id) => id,
            Err(e) => {
                debug!(raw, error = %e, "Lookup of malformed identifier");
                return None;
            }
        };

        let guard = self.inner.read().await;
        let found = guard.find(&id).cloned();
        debug!(
            id = %id,
            kind = ?id.kind(),
            client = found.as_ref().map(|c| c.name.as_str()),
            "Identifier lookup"
        );
        found
    }

    /// Find a client by its name
    pub async fn find_by_name(&self, name: &str) -> Option<PersistentClient> {
        let guard = self.inner.read().await;
        guard.find_by_name(name).cloned()
    }

    /// Number of clients
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Check if the registry is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.len() == 0
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new(&RegistryConfig::default())
    }
}

#[async_trait]
impl ClientLookup for ClientRegistry {
    async fn find(&self, id: &str) -> Option<PersistentClient> {
        ClientRegistry::find(self, id).await
    }

    async fn find_by_name(&self, name: &str) -> Option<PersistentClient> {
        ClientRegistry::find_by_name(self, name).await
    }
}
