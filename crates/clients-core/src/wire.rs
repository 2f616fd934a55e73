//! JSON wire format of the HTTP API
//!
//! These types mirror what API clients send and receive. Conversion into a
//! [`PersistentClient`] runs the identifier matcher, so a decoded client
//! always carries normalized identifiers. Identifier order on the wire is
//! not significant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::client::{BlockedServices, ClientPolicy, PersistentClient};
use crate::error::{Error, Result};
use crate::identifier::IdentifierSet;

/// A persistent client as exchanged over HTTP
///
/// Absent fields take the value of a client built in code: policy fields
/// follow [`ClientPolicy::default`], everything else is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientJson {
    pub name: String,
    pub ids: Vec<String>,
    pub tags: Vec<String>,
    pub upstreams: Vec<String>,

    pub use_global_settings: bool,
    pub filtering_enabled: bool,
    pub parental_enabled: bool,
    pub safebrowsing_enabled: bool,
    pub safesearch_enabled: bool,

    pub use_global_blocked_services: bool,
    pub blocked_services: Vec<String>,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub blocked_services_schedule: serde_json::Value,

    pub ignore_querylog: bool,
    pub ignore_statistics: bool,

    pub upstreams_cache_enabled: bool,
    pub upstreams_cache_size: u32,
}

impl Default for ClientJson {
    fn default() -> Self {
        Self::with_policy(String::new(), Vec::new(), Vec::new(), &ClientPolicy::default())
    }
}

impl ClientJson {
    /// Encode a stored client
    pub fn from_client(client: &PersistentClient) -> Self {
        Self::with_policy(
            client.name.clone(),
            client.ids.to_strings(),
            client.tags.iter().cloned().collect(),
            &client.policy,
        )
    }

    fn with_policy(name: String, ids: Vec<String>, tags: Vec<String>, policy: &ClientPolicy) -> Self {
        Self {
            name,
            ids,
            tags,
            upstreams: policy.upstreams.clone(),
            use_global_settings: policy.use_global_settings,
            filtering_enabled: policy.filtering_enabled,
            parental_enabled: policy.parental_enabled,
            safebrowsing_enabled: policy.safebrowsing_enabled,
            safesearch_enabled: policy.safesearch_enabled,
            use_global_blocked_services: policy.use_global_blocked_services,
            blocked_services: policy.blocked_services.ids.clone(),
            blocked_services_schedule: policy.blocked_services.schedule.clone(),
            ignore_querylog: policy.ignore_querylog,
            ignore_statistics: policy.ignore_statistics,
            upstreams_cache_enabled: policy.upstreams_cache_enabled,
            upstreams_cache_size: policy.upstreams_cache_size,
        }
    }

    /// Decode into a client with a fresh UID
    ///
    /// Fails with `InvalidName` when the name is empty, then with
    /// `InvalidIdentifier` naming the first empty or malformed entry of
    /// `ids`. Tags and uniqueness are checked later by the registry.
    pub fn into_client(self) -> Result<PersistentClient> {
        if self.name.is_empty() {
            return Err(Error::invalid_name("client name is empty"));
        }

        let ids = IdentifierSet::parse(&self.ids)?;

        let mut client = PersistentClient::new(self.name);
        client.ids = ids;
        client.tags = self.tags.into_iter().collect();
        client.policy = ClientPolicy {
            use_global_settings: self.use_global_settings,
            filtering_enabled: self.filtering_enabled,
            parental_enabled: self.parental_enabled,
            safebrowsing_enabled: self.safebrowsing_enabled,
            safesearch_enabled: self.safesearch_enabled,
            use_global_blocked_services: self.use_global_blocked_services,
            blocked_services: BlockedServices {
                ids: self.blocked_services,
                schedule: self.blocked_services_schedule,
            },
            upstreams: self
                .upstreams
                .into_iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect(),
            upstreams_cache_enabled: self.upstreams_cache_enabled,
            upstreams_cache_size: self.upstreams_cache_size,
            ignore_querylog: self.ignore_querylog,
            ignore_statistics: self.ignore_statistics,
        };

        Ok(client)
    }
}

impl From<&PersistentClient> for ClientJson {
    fn from(client: &PersistentClient) -> Self {
        Self::from_client(client)
    }
}

/// Response of `GET /control/clients`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientListJson {
    #[serde(default)]
    pub clients: Vec<ClientJson>,
    #[serde(default)]
    pub supported_tags: Vec<String>,
}

/// Body of `POST /control/clients/update`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateJson {
    /// Name of the client to replace
    #[serde(default)]
    pub name: String,
    /// Replacement data
    #[serde(default)]
    pub data: ClientJson,
}

/// Body of `POST /control/clients/search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchJson {
    #[serde(default)]
    pub clients: Vec<SearchIdJson>,
}

/// One identifier to search for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchIdJson {
    #[serde(default)]
    pub id: String,
}

/// One search result: the requested id mapped to its client, or `null`
pub type SearchResultJson = BTreeMap<String, Option<ClientJson>>;
