//! CORS policy — preflight handling and the proxied-response overlay
//!
//! Preflight answers follow the configured policy. Proxied responses get
//! a fixed permissive overlay that overrides whatever CORS headers the
//! upstream set, so browsers always see a consistent policy at the edge.

use crate::config::CorsConfig;
use http::header::{HeaderMap, HeaderValue};

/// Headers overlaid on every proxied response
const OVERLAY_ALLOW_ORIGIN: &str = "*";
const OVERLAY_ALLOW_METHODS: &str = "GET,PUT,POST,DELETE,OPTIONS";
const OVERLAY_ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

/// CORS policy for the gateway surface
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
    allowed_methods: String,
    allowed_headers: String,
    allow_credentials: bool,
    max_age: String,
}

impl CorsPolicy {
    /// Build a policy from configuration
    pub fn new(config: &CorsConfig) -> Self {
        Self {
            allowed_origins: config.allowed_origins.clone(),
            allowed_methods: config.allowed_methods.join(", "),
            allowed_headers: config.allowed_headers.join(", "),
            allow_credentials: config.allow_credentials,
            max_age: config.max_age.to_string(),
        }
    }

    /// Whether the given Origin value is allowed by the policy
    pub fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == "*" || o == origin)
    }

    /// Write preflight response headers for an allowed origin
    pub fn apply_preflight(&self, headers: &mut HeaderMap, origin: &str) {
        if let Ok(value) = HeaderValue::from_str(origin) {
            headers.insert("access-control-allow-origin", value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.allowed_methods) {
            headers.insert("access-control-allow-methods", value);
        }
        if let Ok(value) = HeaderValue::from_str(&self.allowed_headers) {
            headers.insert("access-control-allow-headers", value);
        }
        if self.allow_credentials {
            headers.insert(
                "access-control-allow-credentials",
                HeaderValue::from_static("true"),
            );
        }
        if let Ok(value) = HeaderValue::from_str(&self.max_age) {
            headers.insert("access-control-max-age", value);
        }
    }

    /// Overlay the permissive CORS headers on a proxied response.
    ///
    /// Inserts override any values the upstream set.
    pub fn apply_overlay(headers: &mut HeaderMap) {
        headers.insert(
            "access-control-allow-origin",
            HeaderValue::from_static(OVERLAY_ALLOW_ORIGIN),
        );
        headers.insert(
            "access-control-allow-methods",
            HeaderValue::from_static(OVERLAY_ALLOW_METHODS),
        );
        headers.insert(
            "access-control-allow-headers",
            HeaderValue::from_static(OVERLAY_ALLOW_HEADERS),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_policy(origins: Vec<&str>) -> CorsPolicy {
        CorsPolicy::new(&CorsConfig {
            allowed_origins: origins.into_iter().map(String::from).collect(),
            ..CorsConfig::default()
        })
    }

    #[test]
    fn test_wildcard_origin_allowed() {
        let policy = make_policy(vec!["*"]);
        assert!(policy.origin_allowed("https://anything.example"));
    }

    #[test]
    fn test_exact_origin_allowed() {
        let policy = make_policy(vec!["https://app.edumatch.example"]);
        assert!(policy.origin_allowed("https://app.edumatch.example"));
        assert!(!policy.origin_allowed("https://evil.example"));
    }

    #[test]
    fn test_preflight_headers() {
        let policy = make_policy(vec!["https://app.edumatch.example"]);
        let mut headers = HeaderMap::new();
        policy.apply_preflight(&mut headers, "https://app.edumatch.example");

        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "https://app.edumatch.example"
        );
        assert!(headers
            .get("access-control-allow-methods")
            .unwrap()
            .to_str()
            .unwrap()
            .contains("PATCH"));
        assert_eq!(
            headers.get("access-control-allow-credentials").unwrap(),
            "true"
        );
        assert_eq!(headers.get("access-control-max-age").unwrap(), "86400");
    }

    #[test]
    fn test_overlay_overrides_upstream_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "access-control-allow-origin",
            HeaderValue::from_static("https://upstream.example"),
        );

        CorsPolicy::apply_overlay(&mut headers);

        assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
        assert_eq!(
            headers.get("access-control-allow-methods").unwrap(),
            "GET,PUT,POST,DELETE,OPTIONS"
        );
        assert_eq!(
            headers.get("access-control-allow-headers").unwrap(),
            "Content-Type, Authorization, X-Requested-With"
        );
    }
}
