//! Persistent client records
//!
//! A [`PersistentClient`] is the unit of storage in the registry: a name,
//! a stable [`Uid`], the identifiers used to match traffic, and policy
//! settings consumed by the filtering engine.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identifier::IdentifierSet;

/// Immutable instance identifier of a persistent client
///
/// Minted once when a client is added and kept across every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(Uuid);

impl Uid {
    /// Generate a fresh random UID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Uid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Blocked services policy
///
/// The schedule is the weekly timetable during which the services are
/// blocked. The registry carries it without interpreting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockedServices {
    /// Service IDs to block
    #[serde(default)]
    pub ids: Vec<String>,

    /// Weekly schedule, opaque to the registry
    #[serde(default)]
    pub schedule: serde_json::Value,
}

/// Filtering settings of a persistent client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPolicy {
    /// Use global settings instead of the fields below
    pub use_global_settings: bool,
    pub filtering_enabled: bool,
    pub parental_enabled: bool,
    pub safebrowsing_enabled: bool,
    pub safesearch_enabled: bool,

    /// Use the global blocked services list instead of `blocked_services`
    pub use_global_blocked_services: bool,
    pub blocked_services: BlockedServices,

    /// Custom upstream DNS servers, uninterpreted
    pub upstreams: Vec<String>,
    pub upstreams_cache_enabled: bool,
    pub upstreams_cache_size: u32,

    pub ignore_querylog: bool,
    pub ignore_statistics: bool,
}

impl Default for ClientPolicy {
    fn default() -> Self {
        Self {
            use_global_settings: true,
            filtering_enabled: false,
            parental_enabled: false,
            safebrowsing_enabled: false,
            safesearch_enabled: false,
            use_global_blocked_services: true,
            blocked_services: BlockedServices::default(),
            upstreams: Vec::new(),
            upstreams_cache_enabled: false,
            upstreams_cache_size: 0,
            ignore_querylog: false,
            ignore_statistics: false,
        }
    }
}

/// A named, operator-defined client
#[derive(Debug, Clone, PartialEq)]
pub struct PersistentClient {
    /// Human-chosen name, unique within the registry
    pub name: String,

    /// Instance identifier
    pub uid: Uid,

    /// Normalized identifiers
    pub ids: IdentifierSet,

    /// Tags from the supported tag list
    pub tags: BTreeSet<String>,

    /// Policy payload
    pub policy: ClientPolicy,
}

impl PersistentClient {
    /// Create a client with a fresh UID, no identifiers and default policy
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: Uid::new(),
            ids: IdentifierSet::new(),
            tags: BTreeSet::new(),
            policy: ClientPolicy::default(),
        }
    }

    /// Replace the identifiers by classifying `raw`
    ///
    /// Leaves the client untouched when any entry is invalid.
    pub fn set_ids<I, S>(&mut self, raw: I) -> crate::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ids = IdentifierSet::parse(raw)?;
        Ok(())
    }

    /// Builder-style [`Self::set_ids`]
    pub fn with_ids<I, S>(mut self, raw: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_ids(raw)?;
        Ok(self)
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Whether both clients have the same identifiers, ignoring order
    pub fn equal_ids(&self, other: &Self) -> bool {
        equal_identifiers(self, other)
    }
}

/// Whether `a` and `b` carry the same set of normalized identifiers
///
/// Name, UID and policy are ignored.
pub fn equal_identifiers(a: &PersistentClient, b: &PersistentClient) -> bool {
    a.ids == b.ids
}
