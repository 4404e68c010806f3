//! Service configuration — downstream microservice locations

use serde::{Deserialize, Serialize};

/// Configuration for one downstream microservice
///
/// # Example
///
/// ```hcl
/// services "auth-service" {
///   host        = "127.0.0.1"
///   port        = 3002
///   health_path = "/api/v1/health"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Network host
    #[serde(default = "default_host")]
    pub host: String,

    /// Network port
    pub port: u16,

    /// Health probe path (default: "/health")
    #[serde(default)]
    pub health_path: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_parse_minimal() {
        let config: ServiceConfig = hcl::from_str("port = 3002").unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3002);
        assert!(config.health_path.is_none());
    }

    #[test]
    fn test_service_parse_full() {
        let config: ServiceConfig = hcl::from_str(
            r#"
            host        = "10.0.0.5"
            port        = 3004
            health_path = "/api/v1/health"
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "10.0.0.5");
        assert_eq!(config.port, 3004);
        assert_eq!(config.health_path.as_deref(), Some("/api/v1/health"));
    }
}
