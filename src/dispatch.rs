//! Route dispatcher — maps path prefixes to target services
//!
//! Prefixes in this system are mutually exclusive by design, but bindings
//! are still matched longest-prefix-first so overlapping configurations
//! behave predictably.

use crate::config::RouteConfig;
use crate::error::{GatewayError, Result};
use crate::registry::ServiceRegistry;
use crate::rewrite::{IdentityRewrite, PathRewrite, StripPrefixRewrite};
use indexmap::IndexMap;
use std::sync::Arc;

/// One compiled route binding
pub struct RouteBinding {
    /// Path prefix matched against incoming requests
    pub prefix: String,
    /// Target service name
    pub service: String,
    /// Path rewrite applied before forwarding
    pub rewrite: Arc<dyn PathRewrite>,
}

/// Route table — compiled bindings sorted longest-prefix-first
pub struct RouteTable {
    bindings: Vec<RouteBinding>,
}

impl RouteTable {
    /// Build a route table from configuration.
    ///
    /// A binding whose target service is absent from the registry is kept
    /// (it answers 404 at request time) but flagged at startup.
    pub fn from_config(
        routes: &IndexMap<String, RouteConfig>,
        registry: &ServiceRegistry,
    ) -> Result<Self> {
        let mut bindings: Vec<RouteBinding> = Vec::new();

        for (prefix, config) in routes {
            if prefix.is_empty() || !prefix.starts_with('/') {
                return Err(GatewayError::Config(format!(
                    "Route prefix '{}' must start with '/'",
                    prefix
                )));
            }
            if !registry.contains(&config.service) {
                tracing::warn!(
                    prefix = prefix.as_str(),
                    service = config.service,
                    "Route references unregistered service"
                );
            }

            let rewrite: Arc<dyn PathRewrite> = match &config.strip_prefix {
                Some(p) => Arc::new(StripPrefixRewrite::new(p.clone())),
                None => Arc::new(IdentityRewrite),
            };

            bindings.push(RouteBinding {
                prefix: prefix.trim_end_matches('/').to_string(),
                service: config.service.clone(),
                rewrite,
            });
        }

        // Longest prefix first, so first-match equals most-specific-match
        bindings.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Ok(Self { bindings })
    }

    /// Match a request path against all bindings.
    ///
    /// Matching is segment-aware: "/v1/auth" matches "/v1/auth" and
    /// "/v1/auth/login" but not "/v1/authx".
    pub fn match_path(&self, path: &str) -> Option<&RouteBinding> {
        self.bindings.iter().find(|b| {
            b.prefix.is_empty()
                || path == b.prefix
                || path
                    .strip_prefix(b.prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    /// Number of compiled bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate over bindings in match order
    pub fn iter(&self) -> impl Iterator<Item = &RouteBinding> {
        self.bindings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ServiceEntry;

    fn make_registry() -> ServiceRegistry {
        let mut registry = ServiceRegistry::new();
        registry.register(ServiceEntry::new("auth-service", "127.0.0.1", 3002));
        registry.register(ServiceEntry::new("user-service", "127.0.0.1", 3003));
        registry.register(ServiceEntry::new("matching-service", "127.0.0.1", 5000));
        registry
    }

    fn make_routes() -> IndexMap<String, RouteConfig> {
        let mut routes = IndexMap::new();
        routes.insert(
            "/v1/auth".to_string(),
            RouteConfig {
                service: "auth-service".to_string(),
                strip_prefix: None,
            },
        );
        routes.insert(
            "/v1/users".to_string(),
            RouteConfig {
                service: "user-service".to_string(),
                strip_prefix: None,
            },
        );
        routes
    }

    #[test]
    fn test_table_build() {
        let table = RouteTable::from_config(&make_routes(), &make_registry()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_match_prefix() {
        let table = RouteTable::from_config(&make_routes(), &make_registry()).unwrap();
        let binding = table.match_path("/v1/auth/login").unwrap();
        assert_eq!(binding.service, "auth-service");
    }

    #[test]
    fn test_match_exact_prefix() {
        let table = RouteTable::from_config(&make_routes(), &make_registry()).unwrap();
        let binding = table.match_path("/v1/users").unwrap();
        assert_eq!(binding.service, "user-service");
    }

    #[test]
    fn test_match_is_segment_aware() {
        let table = RouteTable::from_config(&make_routes(), &make_registry()).unwrap();
        assert!(table.match_path("/v1/authx").is_none());
        assert!(table.match_path("/v1/users42").is_none());
    }

    #[test]
    fn test_no_match() {
        let table = RouteTable::from_config(&make_routes(), &make_registry()).unwrap();
        assert!(table.match_path("/v1/unknown").is_none());
        assert!(table.match_path("/").is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let mut routes = make_routes();
        routes.insert(
            "/v1/users/me".to_string(),
            RouteConfig {
                service: "matching-service".to_string(),
                strip_prefix: None,
            },
        );
        let table = RouteTable::from_config(&routes, &make_registry()).unwrap();

        assert_eq!(
            table.match_path("/v1/users/me/profile").unwrap().service,
            "matching-service"
        );
        assert_eq!(
            table.match_path("/v1/users/42").unwrap().service,
            "user-service"
        );
    }

    #[test]
    fn test_unregistered_service_binding_kept() {
        let mut routes = make_routes();
        routes.insert(
            "/v1/ghost".to_string(),
            RouteConfig {
                service: "ghost-service".to_string(),
                strip_prefix: None,
            },
        );
        let table = RouteTable::from_config(&routes, &make_registry()).unwrap();
        // The binding survives; the forwarder answers 404 for it
        assert_eq!(table.match_path("/v1/ghost/x").unwrap().service, "ghost-service");
    }

    #[test]
    fn test_bad_prefix_rejected() {
        let mut routes = IndexMap::new();
        routes.insert(
            "no-slash".to_string(),
            RouteConfig {
                service: "auth-service".to_string(),
                strip_prefix: None,
            },
        );
        assert!(RouteTable::from_config(&routes, &make_registry()).is_err());
    }

    #[test]
    fn test_strip_prefix_binding() {
        let mut routes = IndexMap::new();
        routes.insert(
            "/v1/matching".to_string(),
            RouteConfig {
                service: "matching-service".to_string(),
                strip_prefix: Some("/v1".to_string()),
            },
        );
        let table = RouteTable::from_config(&routes, &make_registry()).unwrap();
        let binding = table.match_path("/v1/matching/run").unwrap();
        assert_eq!(
            binding.rewrite.rewrite("/v1/matching/run", "matching-service"),
            "/matching/run"
        );
    }
}
