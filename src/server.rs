//! HTTP surface — the gateway's listener and request handler
//!
//! One accept loop, one spawned task per connection. Each inbound request
//! is answered by the CORS layer (preflight), a health endpoint, or the
//! dispatcher + forwarder. Hyper drops the connection task when the
//! client disconnects, which aborts any in-flight upstream call.

use crate::cors::CorsPolicy;
use crate::dispatch::RouteTable;
use crate::error::{GatewayError, Result};
use crate::health::HealthAggregator;
use crate::observability::AccessLog;
use crate::proxy::{Forwarder, ProxyOutcome};
use crate::registry::ServiceRegistry;
use crate::SelfHealth;
use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared state for request handling
pub struct AppState {
    /// Gateway name reported by the self health endpoint
    pub gateway_name: String,
    pub registry: Arc<ServiceRegistry>,
    pub routes: Arc<RouteTable>,
    pub forwarder: Arc<Forwarder>,
    pub aggregator: Arc<HealthAggregator>,
    pub cors: Arc<CorsPolicy>,
    pub access_log: Arc<AccessLog>,
}

/// Bind the listener and spawn the accept loop.
///
/// Returns the task handle and the actually bound address (useful when
/// the configured port is 0).
pub async fn start_listener(
    addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr)> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Other(format!("Failed to bind {}: {}", addr, e)))?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Gateway listening");

    let handle = tokio::spawn(async move {
        loop {
            let (stream, remote_addr) = match listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                    continue;
                }
            };

            let state = state.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let _ = http1::Builder::new()
                    .serve_connection(
                        io,
                        service_fn(|req| handle_request(req, remote_addr, state.clone())),
                    )
                    .await;
            });
        }
    });

    Ok((handle, local_addr))
}

/// Handle an individual HTTP request
async fn handle_request(
    req: hyper::Request<Incoming>,
    remote_addr: SocketAddr,
    state: Arc<AppState>,
) -> std::result::Result<hyper::Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = req.into_parts();

    // Collect request body
    let body_bytes = match http_body_util::BodyExt::collect(body).await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => Bytes::new(),
    };

    let path = parts.uri.path().to_string();
    let method = parts.method.as_str().to_string();
    let tracker = state.access_log.start_request();

    // CORS preflight
    if parts.method == http::Method::OPTIONS {
        let origin = parts
            .headers
            .get("Origin")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("*");

        if !state.cors.origin_allowed(origin) {
            return Ok(json_response(
                403,
                serde_json::json!({"error": "Origin not allowed"}),
            ));
        }

        let mut response = hyper::Response::builder()
            .status(204)
            .body(Full::new(Bytes::new()))
            .unwrap();
        state.cors.apply_preflight(response.headers_mut(), origin);
        return Ok(response);
    }

    // Gateway self liveness — never fans out, always succeeds
    if parts.method == http::Method::GET && path == "/health" {
        let health = SelfHealth::now(&state.gateway_name);
        return Ok(json_response(200, serde_json::to_value(&health).unwrap()));
    }

    // Aggregated downstream health — 200 regardless of overall status
    if parts.method == http::Method::GET && path == "/health/services" {
        let report = state.aggregator.aggregate().await;
        return Ok(json_response(200, serde_json::to_value(&report).unwrap()));
    }

    // Dispatch to a downstream service
    let binding = match state.routes.match_path(&path) {
        Some(binding) => binding,
        None => {
            let response = json_response(404, serde_json::json!({"error": "No route matched"}));
            state.access_log.record(&tracker.build_entry(
                remote_addr.ip().to_string(),
                method,
                path,
                404,
                0,
                None,
                None,
            ));
            return Ok(response);
        }
    };

    let outcome = state
        .forwarder
        .forward(
            &state.registry,
            binding.rewrite.as_ref(),
            &parts.method,
            &parts.uri,
            &parts.headers,
            body_bytes,
            &binding.service,
        )
        .await;

    let target = state
        .registry
        .lookup(&binding.service)
        .map(|e| e.base_url());

    let (response, response_bytes) = match outcome {
        ProxyOutcome::Forwarded(upstream) | ProxyOutcome::UpstreamError(upstream) => {
            let bytes = upstream.body.len() as u64;
            let mut builder = hyper::Response::builder().status(upstream.status);
            for (key, value) in upstream.headers.iter() {
                // The relayed body is fully buffered, so hop-by-hop framing
                // headers from the upstream no longer apply
                if !crate::proxy::is_hop_by_hop(key.as_str()) {
                    builder = builder.header(key, value);
                }
            }
            let mut response = builder.body(Full::new(upstream.body)).unwrap();
            CorsPolicy::apply_overlay(response.headers_mut());
            (response, bytes)
        }
        ProxyOutcome::ServiceUnknown { service } => {
            let response = json_response(
                404,
                serde_json::json!({"error": "Service not found", "service": service}),
            );
            (response, 0)
        }
        ProxyOutcome::ServiceUnreachable { service, reason } => {
            let response = json_response(
                503,
                serde_json::json!({
                    "error": "Service unavailable",
                    "service": service,
                    "message": reason,
                }),
            );
            (response, 0)
        }
    };

    state.access_log.record(&tracker.build_entry(
        remote_addr.ip().to_string(),
        method,
        path,
        response.status().as_u16(),
        response_bytes,
        Some(binding.service.clone()),
        target,
    ));

    Ok(response)
}

/// Build a JSON response with the CORS overlay applied
fn json_response(status: u16, body: serde_json::Value) -> hyper::Response<Full<Bytes>> {
    let mut response = hyper::Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap();
    CorsPolicy::apply_overlay(response.headers_mut());
    response
}

