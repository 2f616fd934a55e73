//! Configuration types for the client registry service
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::SocketAddr;

/// Tags a persistent client may carry unless configured otherwise
pub const DEFAULT_SUPPORTED_TAGS: &[&str] = &[
    "device_audio",
    "device_camera",
    "device_gameconsole",
    "device_laptop",
    "device_nas",
    "device_other",
    "device_pc",
    "device_phone",
    "device_printer",
    "device_securityalarm",
    "device_tablet",
    "device_tv",
    "os_android",
    "os_ios",
    "os_linux",
    "os_macos",
    "os_other",
    "os_windows",
    "user_admin",
    "user_child",
    "user_regular",
];

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP API settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Registry settings
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl ServiceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.http.validate()?;
        self.registry.validate()?;

        Ok(())
    }
}

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address the API listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl HttpConfig {
    /// Validate the HTTP configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.max_body_bytes == 0 {
            return Err(crate::Error::config("HTTP max body size must be > 0"));
        }

        Ok(())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Tags persistent clients may carry
    #[serde(default = "default_supported_tags")]
    pub supported_tags: Vec<String>,
}

impl RegistryConfig {
    /// Validate the registry configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let mut seen = HashSet::new();
        for tag in &self.supported_tags {
            if tag.trim().is_empty() {
                return Err(crate::Error::config("Supported tag cannot be empty"));
            }
            if !seen.insert(tag.as_str()) {
                return Err(crate::Error::config(format!(
                    "Supported tag {tag:?} is listed twice"
                )));
            }
        }

        Ok(())
    }

    /// Replace the supported tags
    pub fn with_supported_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            supported_tags: default_supported_tags(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 3000))
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_supported_tags() -> Vec<String> {
    DEFAULT_SUPPORTED_TAGS.iter().map(|t| t.to_string()).collect()
}
