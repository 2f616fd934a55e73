// # clients-core
//
// Core library for the persistent client registry.
//
// ## Architecture Overview
//
// A persistent client is a named policy record matched against incoming
// traffic by its identifiers: IP addresses, CIDR subnets, MAC addresses and
// client IDs. This crate provides:
//
// - **Identifier**: Classification and normalization of raw identifiers
// - **PersistentClient**: The stored record (name, UID, identifiers, policy)
// - **ClientRegistry**: Shared, lock-guarded container enforcing unique
//   names and non-overlapping identifiers
// - **ClientLookup**: Read-only trait consumed by the filtering engine
// - **wire / http**: JSON wire format and the axum handlers of the HTTP API
//
// ## Design Principles
//
// 1. **All-or-nothing**: A rejected add, update or remove changes nothing
// 2. **Explicit ownership**: The registry is a handle passed to consumers,
//    never a global
// 3. **Library-First**: The daemon is a thin wrapper around this crate
// 4. **Normalized identity**: Identifiers are compared as sets of canonical
//    values, never as raw strings

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod identifier;
pub mod registry;
pub mod traits;
pub mod wire;

// Re-export core types for convenience
pub use client::{BlockedServices, ClientPolicy, PersistentClient, Uid, equal_identifiers};
pub use config::{HttpConfig, RegistryConfig, ServiceConfig};
pub use error::{Error, Result};
pub use identifier::{Identifier, IdentifierKind, IdentifierSet, MacAddr, Subnet};
pub use registry::{ClientRegistry, Snapshot};
pub use traits::ClientLookup;
pub use wire::{ClientJson, ClientListJson, UpdateJson};
