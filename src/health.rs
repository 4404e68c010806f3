//! Health aggregator — fans out probes to every registered service
//! and summarizes up/down status
//!
//! Aggregation is infallible: a failed probe degrades that one entry,
//! never the report. Probes run concurrently but the report keeps
//! registry order, so two back-to-back reports list entries identically.

use crate::registry::ServiceRegistry;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Overall system status: `Up` only when every probe succeeded.
///
/// There is no `Down` value. The gateway answering the request at all
/// means the system is at worst degraded; gateway liveness is reported by
/// the separate self health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    Up,
    Degraded,
}

/// One probed service in a health report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthEntry {
    /// Logical service name
    pub service: String,
    /// URL that was probed
    pub url: String,
    /// Whether the probe returned 2xx within the timeout
    pub healthy: bool,
    /// RFC 3339 timestamp of the probe
    pub checked_at: String,
}

/// Healthy/unhealthy counts, always consistent with the entry list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSummary {
    pub total: usize,
    pub healthy: usize,
    pub unhealthy: usize,
}

/// The result of one health aggregation pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: OverallStatus,
    pub entries: Vec<HealthEntry>,
    pub summary: HealthSummary,
}

/// Health aggregator — probes every registered service concurrently
pub struct HealthAggregator {
    registry: Arc<ServiceRegistry>,
    client: reqwest::Client,
}

impl HealthAggregator {
    /// Create an aggregator probing with the given per-probe timeout
    pub fn new(registry: Arc<ServiceRegistry>, probe_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(probe_timeout)
            .build()
            .unwrap_or_default();

        Self { registry, client }
    }

    /// Probe every registered service and build a report.
    ///
    /// Probes run concurrently; `join_all` keeps results in input order,
    /// so entries always come out in registry order regardless of which
    /// probe finishes first.
    pub async fn aggregate(&self) -> HealthReport {
        let probes = self.registry.list().map(|entry| {
            let url = entry.health_url();
            let service = entry.name.clone();
            let client = self.client.clone();
            async move {
                let healthy = match client.get(&url).send().await {
                    Ok(resp) => resp.status().is_success(),
                    Err(_) => false,
                };
                if !healthy {
                    tracing::warn!(service = service, url = url, "Health probe failed");
                }
                HealthEntry {
                    service,
                    url,
                    healthy,
                    checked_at: chrono::Utc::now().to_rfc3339(),
                }
            }
        });

        let entries: Vec<HealthEntry> = join_all(probes).await;

        let healthy = entries.iter().filter(|e| e.healthy).count();
        let summary = HealthSummary {
            total: entries.len(),
            healthy,
            unhealthy: entries.len() - healthy,
        };
        let status = if summary.unhealthy == 0 {
            OverallStatus::Up
        } else {
            OverallStatus::Degraded
        };

        tracing::debug!(
            total = summary.total,
            healthy = summary.healthy,
            unhealthy = summary.unhealthy,
            "Health aggregation complete"
        );

        HealthReport {
            status,
            entries,
            summary,
        }
    }
}
