//! Service registry — the authoritative table of downstream services
//!
//! Built once at startup from configuration and injected into the
//! dispatcher, forwarder, and health aggregator. Listing order is
//! insertion order, which keeps health reports deterministic.

use crate::config::ServiceConfig;
use crate::error::{GatewayError, Result};
use indexmap::IndexMap;

/// Default health probe path when a service does not configure one
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// One registered downstream microservice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    /// Unique logical identifier (e.g. "auth-service")
    pub name: String,
    /// Network host
    pub host: String,
    /// Network port (always > 0)
    pub port: u16,
    /// Relative path used for liveness probing
    pub health_path: String,
}

impl ServiceEntry {
    /// Create an entry with the default health path
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            health_path: DEFAULT_HEALTH_PATH.to_string(),
        }
    }

    /// Base URL of the service (no trailing slash)
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Full URL of the service's health endpoint
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url(), self.health_path)
    }
}

/// Service registry — holds all configured downstream services
pub struct ServiceRegistry {
    services: IndexMap<String, ServiceEntry>,
}

impl ServiceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            services: IndexMap::new(),
        }
    }

    /// Build a registry from configuration, preserving configuration order
    pub fn from_config(configs: &IndexMap<String, ServiceConfig>) -> Result<Self> {
        let mut registry = Self::new();

        for (name, config) in configs {
            if config.port == 0 {
                return Err(GatewayError::Config(format!(
                    "Service '{}' has invalid port 0",
                    name
                )));
            }

            registry.register(ServiceEntry {
                name: name.clone(),
                host: config.host.clone(),
                port: config.port,
                health_path: config
                    .health_path
                    .clone()
                    .unwrap_or_else(|| DEFAULT_HEALTH_PATH.to_string()),
            });
        }

        Ok(registry)
    }

    /// Add or overwrite an entry keyed by name.
    ///
    /// Overwriting keeps the entry's original position so `list()` order
    /// stays stable across upserts.
    pub fn register(&mut self, entry: ServiceEntry) {
        self.services.insert(entry.name.clone(), entry);
    }

    /// Look up a service by name. Unknown names are a `None`, never a panic.
    pub fn lookup(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.get(name)
    }

    /// Whether a service name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Iterate over all entries in insertion order
    pub fn list(&self) -> impl Iterator<Item = &ServiceEntry> {
        self.services.values()
    }

    /// Number of registered services
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
