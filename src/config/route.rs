//! Route configuration — externally exposed path prefixes

use serde::{Deserialize, Serialize};

/// Configuration for one route binding.
///
/// Routes are declared as labeled blocks keyed by path prefix:
///
/// ```hcl
/// routes "/v1/auth" {
///   service = "auth-service"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Target service name (must exist in the service registry)
    pub service: String,

    /// Optional prefix to strip from the path before forwarding.
    /// When unset the inbound path is forwarded unchanged.
    #[serde(default)]
    pub strip_prefix: Option<String>,
}
