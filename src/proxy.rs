//! Request forwarder — performs one request/response cycle to a
//! named downstream service
//!
//! A dead upstream is data (`ProxyOutcome`), not an error: connection
//! failures are isolated to the request that triggered them and never
//! escape the request handler.

use crate::registry::ServiceRegistry;
use crate::rewrite::PathRewrite;
use bytes::Bytes;
use std::time::Duration;

/// Gateway metadata header: the routed service name
pub const GATEWAY_SERVICE_HEADER: &str = "x-gateway-service";
/// Gateway metadata header: RFC 3339 forwarding timestamp
pub const GATEWAY_TIMESTAMP_HEADER: &str = "x-gateway-timestamp";

/// The result of a single forwarded request
pub enum ProxyOutcome {
    /// Upstream answered 2xx; relay verbatim
    Forwarded(UpstreamResponse),
    /// Upstream answered non-2xx; still relayed verbatim, never translated
    UpstreamError(UpstreamResponse),
    /// The requested service name is absent from the registry
    ServiceUnknown { service: String },
    /// TCP connect failure, DNS failure, or timeout reaching the upstream
    ServiceUnreachable { service: String, reason: String },
}

/// Response received from an upstream service
pub struct UpstreamResponse {
    /// HTTP status code
    pub status: http::StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Response body
    pub body: Bytes,
}

/// HTTP request forwarder
pub struct Forwarder {
    client: reqwest::Client,
    timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder with the default 30 second upstream timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a forwarder with a custom upstream timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(100)
            .build()
            .unwrap_or_default();

        Self { client, timeout }
    }

    /// The configured upstream timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward one request to the named service.
    ///
    /// Resolves the service via the registry, rewrites the path, forwards
    /// method/headers/body with the gateway metadata headers injected, and
    /// returns the outcome. Never retries and never fails over.
    #[allow(clippy::too_many_arguments)]
    pub async fn forward(
        &self,
        registry: &ServiceRegistry,
        rewrite: &dyn PathRewrite,
        method: &http::Method,
        uri: &http::Uri,
        headers: &http::HeaderMap,
        body: Bytes,
        service_name: &str,
    ) -> ProxyOutcome {
        let entry = match registry.lookup(service_name) {
            Some(entry) => entry,
            None => {
                tracing::warn!(service = service_name, "Route targets unknown service");
                return ProxyOutcome::ServiceUnknown {
                    service: service_name.to_string(),
                };
            }
        };

        // Build upstream URL from the rewritten path plus the original query
        let upstream_path = rewrite.rewrite(uri.path(), service_name);
        let upstream_url = match uri.query() {
            Some(query) => format!("{}{}?{}", entry.base_url(), upstream_path, query),
            None => format!("{}{}", entry.base_url(), upstream_path),
        };

        tracing::debug!(
            method = %method,
            path = uri.path(),
            target = upstream_url,
            service = service_name,
            "Forwarding request"
        );

        let mut req_builder = self.client.request(method.clone(), &upstream_url);

        // Forward headers verbatim (skip hop-by-hop headers).
        // Authorization passes through here untouched.
        for (key, value) in headers.iter() {
            if !is_hop_by_hop(key.as_str()) {
                req_builder = req_builder.header(key.clone(), value.clone());
            }
        }

        // Inject gateway metadata so the downstream can attribute the call
        req_builder = req_builder
            .header(GATEWAY_SERVICE_HEADER, service_name)
            .header(GATEWAY_TIMESTAMP_HEADER, chrono::Utc::now().to_rfc3339());

        let response = match req_builder.body(body).send().await {
            Ok(response) => response,
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("upstream timed out after {}ms", self.timeout.as_millis())
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    e.to_string()
                };
                tracing::error!(
                    service = service_name,
                    target = upstream_url,
                    error = reason,
                    "Upstream unreachable"
                );
                return ProxyOutcome::ServiceUnreachable {
                    service: service_name.to_string(),
                    reason,
                };
            }
        };

        let status = response.status();
        let resp_headers = response.headers().clone();
        let resp_body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(
                    service = service_name,
                    target = upstream_url,
                    error = %e,
                    "Failed to read upstream body"
                );
                return ProxyOutcome::ServiceUnreachable {
                    service: service_name.to_string(),
                    reason: format!("failed to read upstream body: {}", e),
                };
            }
        };

        let upstream = UpstreamResponse {
            status,
            headers: resp_headers,
            body: resp_body,
        };

        if status.is_success() {
            ProxyOutcome::Forwarded(upstream)
        } else {
            tracing::debug!(
                service = service_name,
                status = status.as_u16(),
                "Upstream returned error status, relaying verbatim"
            );
            ProxyOutcome::UpstreamError(upstream)
        }
    }
}

impl Default for Forwarder {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a header is a hop-by-hop header that should not be relayed
pub(crate) fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}
