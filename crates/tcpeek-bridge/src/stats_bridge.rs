//! Stats bridge from tcpeek status reports to agent metrics.
//!
//! Every fetch is an independent round trip: validate the socket address,
//! send `REFRESH`, decode the response, and flatten it. No report outlives
//! the call that fetched it.
//!
//! A configuration error is the only failure callers ever see. If the daemon
//! is unreachable the fetch logs a warning and returns an empty result so a
//! polling cycle is never aborted by a transient outage.

use crate::config::BridgeConfig;
use crate::error::Result;
use crate::graph::{self, GraphDefinitions};
use crate::peer::PeerClient;
use crate::report::{GroupMetric, StatusReport};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Metric name to value.
pub type Metrics = BTreeMap<String, f64>;

/// Metrics and graph layouts built from a single round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub metrics: Metrics,
    pub graphs: GraphDefinitions,
}

/// Bridge between the tcpeek daemon and the monitoring agent.
#[derive(Debug, Clone)]
pub struct StatsBridge {
    config: BridgeConfig,
}

impl StatsBridge {
    /// Create a bridge. The socket address is checked on each fetch.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// The bridge configuration.
    #[must_use]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Namespace for metric keys: the configured prefix, or `tcpeek`.
    #[must_use]
    pub fn metric_key_prefix(&self) -> &str {
        self.config.metric_key_prefix()
    }

    /// Fetch the current counters as a flat metric map.
    pub async fn fetch_metrics(&self) -> Result<Metrics> {
        Ok(self
            .fetch_report()
            .await?
            .map(|report| Self::flatten(&report))
            .unwrap_or_default())
    }

    /// Fetch the groups currently reported and derive their graph layouts.
    pub async fn fetch_graph_definitions(&self) -> Result<GraphDefinitions> {
        Ok(self
            .fetch_report()
            .await?
            .map(|report| self.graph_definitions(&report))
            .unwrap_or_default())
    }

    /// Fetch once and build both metrics and graph layouts from that response.
    pub async fn fetch_snapshot(&self) -> Result<Snapshot> {
        Ok(self
            .fetch_report()
            .await?
            .map(|report| Snapshot {
                metrics: Self::flatten(&report),
                graphs: self.graph_definitions(&report),
            })
            .unwrap_or_default())
    }

    /// Run one round trip and decode it.
    ///
    /// Returns `Ok(None)` when the daemon could not be reached.
    pub async fn fetch_report(&self) -> Result<Option<StatusReport>> {
        let path = self.config.socket_path()?;
        let client = PeerClient::new(path, &self.config);

        match client.refresh().await {
            Ok(bytes) => {
                let report = StatusReport::decode(&bytes);
                debug!(
                    groups = report.groups.len(),
                    pcap = report.pcap.is_some(),
                    "Decoded tcpeek status report"
                );
                Ok(Some(report))
            }
            Err(e) if e.is_peer_unavailable() => {
                warn!("tcpeek unavailable, reporting no data this cycle: {}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Flatten every connection group of a report into one metric map.
    #[must_use]
    pub fn flatten(report: &StatusReport) -> Metrics {
        let mut metrics = Metrics::new();
        for (name, metric) in &report.groups {
            flatten_group(&mut metrics, name, metric);
        }
        metrics
    }

    /// Graph layouts for every connection group of a report.
    #[must_use]
    pub fn graph_definitions(&self, report: &StatusReport) -> GraphDefinitions {
        let label_prefix = graph::title_case(self.metric_key_prefix());
        let mut graphs = GraphDefinitions::new();
        for (name, _) in &report.groups {
            graph::add_group_graphs(&mut graphs, &label_prefix, name);
        }
        graphs
    }
}

/// Insert the seven `<group>_<kind>_<counter>` entries for one group.
pub fn flatten_group(metrics: &mut Metrics, group: &str, metric: &GroupMetric) {
    for (suffix, value) in graph::group_values(metric) {
        metrics.insert(format!("{group}_{suffix}"), value as f64);
    }
}
