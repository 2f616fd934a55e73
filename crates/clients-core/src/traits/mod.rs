//! Core traits for the client registry
//!
//! This module defines the interfaces other subsystems consume.
//!
//! - [`ClientLookup`]: Resolve request identifiers to persistent clients

pub mod client_lookup;

pub use client_lookup::ClientLookup;
