//! Error types for the client registry
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the client registry
#[derive(Error, Debug)]
pub enum Error {
    /// Empty or malformed client name
    #[error("Invalid client name: {0}")]
    InvalidName(String),

    /// Malformed or empty identifier, or an empty identifier set
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Tag outside the supported tag list
    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    /// Another client already uses this name
    #[error("Client name {0:?} is already used")]
    DuplicateName(String),

    /// Another client already claims (or overlaps) this identifier
    #[error("Identifier {identifier} is already used by client {owner:?}")]
    DuplicateIdentifier {
        /// The clashing identifier of the new record
        identifier: String,
        /// Name of the client that already claims it
        owner: String,
    },

    /// No client with this name
    #[error("Client not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid name error
    pub fn invalid_name(msg: impl Into<String>) -> Self {
        Self::InvalidName(msg.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier(msg.into())
    }

    /// Create an invalid tag error
    pub fn invalid_tag(tag: impl Into<String>) -> Self {
        Self::InvalidTag(tag.into())
    }

    /// Create a duplicate name error
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    /// Create a duplicate identifier error
    pub fn duplicate_identifier(identifier: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            identifier: identifier.into(),
            owner: owner.into(),
        }
    }

    /// Create a "not found" error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the error was caused by the caller's input
    ///
    /// Validation errors map to HTTP 400; everything else is a service
    /// failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidName(_)
                | Self::InvalidIdentifier(_)
                | Self::InvalidTag(_)
                | Self::DuplicateName(_)
                | Self::DuplicateIdentifier { .. }
                | Self::NotFound(_)
                | Self::Json(_)
        )
    }
}
