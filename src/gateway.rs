//! Gateway orchestrator — high-level coordinator for all gateway components
//!
//! Ties together configuration, the service registry, the route table,
//! the forwarder, and the health aggregator into a single manageable unit.

use crate::config::GatewayConfig;
use crate::cors::CorsPolicy;
use crate::dispatch::RouteTable;
use crate::error::{GatewayError, Result};
use crate::health::HealthAggregator;
use crate::observability::AccessLog;
use crate::proxy::Forwarder;
use crate::registry::ServiceRegistry;
use crate::server::{self, AppState};
use crate::{GatewayState, SelfHealth};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// The main Gateway — coordinates all components
pub struct Gateway {
    /// Configuration supplied at construction
    config: GatewayConfig,
    /// Gateway runtime state
    state: Arc<RwLock<GatewayState>>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
    /// Listener task handle, present while running
    handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
    /// Address actually bound, present while running
    bound_addr: RwLock<Option<SocketAddr>>,
}

impl Gateway {
    /// Create a new gateway from configuration
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            state: Arc::new(RwLock::new(GatewayState::Created)),
            shutdown: Arc::new(AtomicBool::new(false)),
            handle: RwLock::new(None),
            bound_addr: RwLock::new(None),
        })
    }

    /// Start the gateway — binds the listener and begins accepting requests
    pub async fn start(&self) -> Result<()> {
        self.set_state(GatewayState::Starting);

        let registry = Arc::new(ServiceRegistry::from_config(&self.config.services)?);
        tracing::info!(services = registry.len(), "Services registered");

        let routes = Arc::new(RouteTable::from_config(&self.config.routes, &registry)?);
        tracing::info!(routes = routes.len(), "Route table compiled");

        let forwarder = Arc::new(Forwarder::with_timeout(Duration::from_secs(
            self.config.forward_timeout_secs,
        )));
        let aggregator = Arc::new(HealthAggregator::new(
            registry.clone(),
            Duration::from_secs(self.config.probe_timeout_secs),
        ));

        let app_state = Arc::new(AppState {
            gateway_name: self.config.name.clone(),
            registry,
            routes,
            forwarder,
            aggregator,
            cors: Arc::new(CorsPolicy::new(&self.config.cors)),
            access_log: Arc::new(AccessLog::new()),
        });

        let addr: SocketAddr = self.config.listen.parse().map_err(|e| {
            GatewayError::Config(format!(
                "Invalid listen address '{}': {}",
                self.config.listen, e
            ))
        })?;

        let (handle, local_addr) = server::start_listener(addr, app_state).await?;
        *self.handle.write().unwrap() = Some(handle);
        *self.bound_addr.write().unwrap() = Some(local_addr);

        self.set_state(GatewayState::Running);
        tracing::info!("Gateway is running");

        Ok(())
    }

    /// Initiate graceful shutdown
    pub async fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return; // Already shutting down
        }

        self.set_state(GatewayState::Stopping);
        tracing::info!("Gateway shutting down");

        if let Some(handle) = self.handle.write().unwrap().take() {
            handle.abort();
        }

        self.set_state(GatewayState::Stopped);
        tracing::info!("Gateway stopped");
    }

    /// Wait for a shutdown signal (Ctrl+C)
    pub async fn wait_for_shutdown(&self) {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        self.shutdown().await;
    }

    /// Get the current gateway state
    pub fn state(&self) -> GatewayState {
        self.state.read().unwrap().clone()
    }

    /// Self liveness snapshot for the gateway process itself.
    ///
    /// Always reports UP; downstream health is a separate concern.
    pub fn self_health(&self) -> SelfHealth {
        SelfHealth::now(&self.config.name)
    }

    /// The address the listener actually bound, once running
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        *self.bound_addr.read().unwrap()
    }

    /// Get the configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Check if the gateway is running
    pub fn is_running(&self) -> bool {
        self.state() == GatewayState::Running
    }

    /// Check if shutdown has been requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    fn set_state(&self, new_state: GatewayState) {
        let mut state = self.state.write().unwrap();
        tracing::debug!(from = %*state, to = %new_state, "State transition");
        *state = new_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RouteConfig, ServiceConfig};

    fn minimal_config() -> GatewayConfig {
        GatewayConfig {
            listen: "127.0.0.1:0".to_string(),
            ..GatewayConfig::default()
        }
    }

    fn config_with_route() -> GatewayConfig {
        let mut config = minimal_config();
        config.services.insert(
            "auth-service".to_string(),
            ServiceConfig {
                host: "127.0.0.1".to_string(),
                port: 3002,
                health_path: None,
            },
        );
        config.routes.insert(
            "/v1/auth".to_string(),
            RouteConfig {
                service: "auth-service".to_string(),
                strip_prefix: None,
            },
        );
        config
    }

    #[test]
    fn test_gateway_new() {
        let gw = Gateway::new(minimal_config()).unwrap();
        assert_eq!(gw.state(), GatewayState::Created);
        assert!(!gw.is_running());
        assert!(!gw.is_shutdown());
    }

    #[test]
    fn test_gateway_new_invalid_config() {
        let mut config = minimal_config();
        config.routes.insert(
            "no-slash".to_string(),
            RouteConfig {
                service: "auth-service".to_string(),
                strip_prefix: None,
            },
        );
        assert!(Gateway::new(config).is_err());
    }

    #[test]
    fn test_self_health_always_up() {
        let gw = Gateway::new(minimal_config()).unwrap();
        let health = gw.self_health();
        assert_eq!(health.status, "UP");
        assert_eq!(health.gateway, "edumatch-gateway");
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_gateway_start_and_shutdown() {
        let gw = Gateway::new(config_with_route()).unwrap();
        gw.start().await.unwrap();
        assert!(gw.is_running());
        assert!(gw.bound_addr().is_some());

        gw.shutdown().await;
        assert!(gw.is_shutdown());
        assert_eq!(gw.state(), GatewayState::Stopped);
    }

    #[tokio::test]
    async fn test_gateway_double_shutdown() {
        let gw = Gateway::new(minimal_config()).unwrap();
        gw.start().await.unwrap();
        gw.shutdown().await;
        gw.shutdown().await; // Should not panic
        assert_eq!(gw.state(), GatewayState::Stopped);
    }

    #[tokio::test]
    async fn test_gateway_invalid_listen_address() {
        let mut config = minimal_config();
        config.listen = "not-an-address".to_string();
        let gw = Gateway::new(config).unwrap();
        let result = gw.start().await;
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid listen address"));
    }
}
