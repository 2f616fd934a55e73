// # Client Lookup Trait
//
// The read-only view of the registry handed to consumers such as the
// filtering engine and the query log.
//
// ## Usage
//
// ```rust,ignore
// use clients_core::ClientLookup;
//
// async fn settings_for(lookup: &dyn ClientLookup, remote: &str) {
//     match lookup.find(remote).await {
//         Some(client) => apply(&client.policy),
//         None => apply_global(),
//     }
// }
// ```

use async_trait::async_trait;

use crate::client::PersistentClient;

/// Trait for resolving request identifiers to persistent clients
///
/// Implementations return copies; callers never hold references into the
/// registry's storage.
///
/// # Thread Safety
///
/// All methods must be safe to call concurrently from multiple tasks.
#[async_trait]
pub trait ClientLookup: Send + Sync {
    /// Find the client matching a raw identifier
    ///
    /// # Parameters
    ///
    /// - `id`: IP address, CIDR block, MAC address or client ID, in any
    ///   accepted spelling
    ///
    /// # Returns
    ///
    /// - `Some(PersistentClient)`: The matching client; for an IP, an exact
    ///   match wins over the most specific covering subnet
    /// - `None`: No client matches, or `id` is malformed
    async fn find(&self, id: &str) -> Option<PersistentClient>;

    /// Find a client by its name
    async fn find_by_name(&self, name: &str) -> Option<PersistentClient>;
}
