//! Configuration types for the EduMatch gateway
//!
//! The gateway is fully data-driven: the service registry contents, the
//! route table, CORS policy, and timeouts all come from an HCL file
//! supplied at process start. Nothing network-related is hard-coded.

mod route;
mod service;

pub use route::RouteConfig;
pub use service::ServiceConfig;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{GatewayError, Result};

/// Top-level gateway configuration
///
/// # HCL Example
///
/// ```hcl
/// listen = "0.0.0.0:8080"
/// name   = "edumatch-gateway"
///
/// services "auth-service" {
///   host        = "127.0.0.1"
///   port        = 3002
///   health_path = "/api/v1/health"
/// }
///
/// routes "/v1/auth" {
///   service = "auth-service"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g. "0.0.0.0:8080")
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Gateway name reported by the self health endpoint
    #[serde(default = "default_name")]
    pub name: String,

    /// Timeout for forwarded upstream requests, in seconds (default: 30)
    #[serde(default = "default_forward_timeout")]
    pub forward_timeout_secs: u64,

    /// Timeout for individual health probes, in seconds (default: 5)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Downstream services, keyed by logical name.
    /// Declaration order is registry order, which is health-report order.
    #[serde(default)]
    pub services: IndexMap<String, ServiceConfig>,

    /// Route bindings keyed by path prefix, matched longest-prefix-first
    #[serde(default)]
    pub routes: IndexMap<String, RouteConfig>,

    /// CORS policy for the gateway's own surface
    #[serde(default)]
    pub cors: CorsConfig,
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_name() -> String {
    "edumatch-gateway".to_string()
}

fn default_forward_timeout() -> u64 {
    30
}

fn default_probe_timeout() -> u64 {
    5
}

impl GatewayConfig {
    /// Load configuration from an HCL file.
    ///
    /// The file must contain valid HCL content regardless of extension.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            GatewayError::Config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_hcl(&content)
    }

    /// Parse configuration from an HCL string
    pub fn from_hcl(content: &str) -> Result<Self> {
        hcl::from_str(content)
            .map_err(|e| GatewayError::Config(format!("Failed to parse HCL config: {}", e)))
    }

    /// Validate the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        for (name, service) in &self.services {
            if service.port == 0 {
                return Err(GatewayError::Config(format!(
                    "Service '{}' has invalid port 0",
                    name
                )));
            }
        }

        for (prefix, route) in &self.routes {
            if prefix.is_empty() || !prefix.starts_with('/') {
                return Err(GatewayError::Config(format!(
                    "Route prefix '{}' must start with '/'",
                    prefix
                )));
            }
            // A route may reference a service absent from the registry
            // (e.g. disabled in this deployment); such requests answer 404
            // at runtime, so this is a warning rather than a hard error.
            if !self.services.contains_key(&route.service) {
                tracing::warn!(
                    prefix = prefix.as_str(),
                    service = route.service,
                    "Route references unregistered service"
                );
            }
        }

        Ok(())
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            name: default_name(),
            forward_timeout_secs: default_forward_timeout(),
            probe_timeout_secs: default_probe_timeout(),
            services: IndexMap::new(),
            routes: IndexMap::new(),
            cors: CorsConfig::default(),
        }
    }
}

/// CORS policy configuration
///
/// Applies to preflight handling on the gateway's own surface. Proxied
/// responses additionally carry the permissive overlay headers regardless
/// of this policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origins allowed to make cross-origin calls (default: any)
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,

    /// Allowed methods for preflight responses
    #[serde(default = "default_methods")]
    pub allowed_methods: Vec<String>,

    /// Allowed headers for preflight responses
    #[serde(default = "default_headers")]
    pub allowed_headers: Vec<String>,

    /// Whether credentialed requests are allowed (default: true)
    #[serde(default = "default_credentials")]
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds (default: 86400)
    #[serde(default = "default_max_age")]
    pub max_age: u64,
}

fn default_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_headers() -> Vec<String> {
    ["Content-Type", "Authorization", "X-Requested-With"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_credentials() -> bool {
    true
}

fn default_max_age() -> u64 {
    86400
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
            allowed_methods: default_methods(),
            allowed_headers: default_headers(),
            allow_credentials: default_credentials(),
            max_age: default_max_age(),
        }
    }
}
