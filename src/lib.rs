//! # EduMatch Gateway
//!
//! The single externally-facing HTTP entry point for the EduMatch
//! microservices: resolves logical service names to network locations,
//! forwards requests with gateway metadata injected, and aggregates
//! downstream health into one report.
//!
//! ## Architecture
//!
//! ```text
//! Listener → Route Dispatcher → Request Forwarder → Downstream Service
//!                            ↘ Health Aggregator (fan-out probes)
//! ```
//!
//! ## Core Features
//!
//! - **Data-driven routing**: path prefixes bound to services from HCL
//!   configuration, matched longest-prefix-first
//! - **Failure isolation**: an unreachable downstream is a 503 for that
//!   request, never a gateway crash
//! - **Health aggregation**: concurrent probes, deterministic report order
//! - **CORS**: configurable preflight policy plus a permissive overlay on
//!   proxied responses
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use edumatch_gateway::{config::GatewayConfig, Gateway};
//!
//! #[tokio::main]
//! async fn main() -> edumatch_gateway::Result<()> {
//!     let config = GatewayConfig::from_file("gateway.hcl").await?;
//!     let gateway = Gateway::new(config)?;
//!     gateway.start().await?;
//!     gateway.wait_for_shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod cors;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod health;
pub(crate) mod observability;
pub mod proxy;
pub mod registry;
pub mod rewrite;
pub(crate) mod server;

// Re-export main types
pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use health::{HealthReport, OverallStatus};
pub use registry::{ServiceEntry, ServiceRegistry};

use serde::{Deserialize, Serialize};

/// Gateway runtime state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GatewayState {
    /// Gateway has been created but not yet started
    #[default]
    Created,
    /// Gateway is loading configuration and binding its listener
    Starting,
    /// Gateway is actively accepting and proxying requests
    Running,
    /// Gateway is shutting down
    Stopping,
    /// Gateway has fully stopped
    Stopped,
}

impl std::fmt::Display for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Self liveness snapshot — what `GET /health` returns.
///
/// Reports the gateway process itself, never downstream services; the
/// status is UP whenever the process can answer at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelfHealth {
    /// Always "UP"
    pub status: String,
    /// RFC 3339 timestamp of the snapshot
    pub timestamp: String,
    /// Gateway name from configuration
    pub gateway: String,
    /// Crate version
    pub version: String,
}

impl SelfHealth {
    /// Build a snapshot for the named gateway at the current instant
    pub fn now(gateway_name: &str) -> Self {
        Self {
            status: "UP".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            gateway: gateway_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_state_default() {
        assert_eq!(GatewayState::default(), GatewayState::Created);
    }

    #[test]
    fn test_gateway_state_display() {
        assert_eq!(GatewayState::Created.to_string(), "created");
        assert_eq!(GatewayState::Starting.to_string(), "starting");
        assert_eq!(GatewayState::Running.to_string(), "running");
        assert_eq!(GatewayState::Stopping.to_string(), "stopping");
        assert_eq!(GatewayState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn test_gateway_state_serialization() {
        let state = GatewayState::Running;
        let json = serde_json::to_string(&state).unwrap();
        let parsed: GatewayState = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, GatewayState::Running);
    }

    #[test]
    fn test_self_health_shape() {
        let health = SelfHealth::now("edumatch-gateway");
        assert_eq!(health.status, "UP");
        assert_eq!(health.gateway, "edumatch-gateway");
        assert!(!health.version.is_empty());
        // Timestamp must parse back as RFC 3339
        assert!(chrono::DateTime::parse_from_rfc3339(&health.timestamp).is_ok());
    }

    #[test]
    fn test_self_health_serialization() {
        let health = SelfHealth::now("gw");
        let json = serde_json::to_string(&health).unwrap();
        assert!(json.contains("\"status\":\"UP\""));
        assert!(json.contains("\"gateway\":\"gw\""));
    }
}
