//! tcpeek Metrics Bridge
//!
//! This crate republishes TCP connection-establishment statistics from a
//! local [tcpeek](https://github.com/pandax381/tcpeek) daemon as monitoring
//! agent metrics:
//!
//! - **Peer round trip**: one short-lived Unix socket connection per fetch,
//!   `REFRESH\r\n` out, one JSON status report back
//! - **Flattening**: seven `<group>_<kind>_<counter>` metrics per group
//! - **Graph layouts**: `<group>.success` and `<group>.failure` definitions
//! - **Plugin output**: value lines and graph metadata for the agent
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  REFRESH\r\n   ┌──────────────┐
//! │ StatsBridge  │───────────────►│ tcpeek       │
//! │  PeerClient  │◄───────────────│ daemon       │
//! └──────┬───────┘  JSON report   └──────────────┘
//!        │
//!        ├── fetch_metrics()           -> {"web_success_total": 10.0, ...}
//!        └── fetch_graph_definitions() -> {"web.success": {...}, ...}
//! ```
//!
//! The reserved `pcap` group never appears in either output. An unreachable
//! daemon yields empty results rather than an error.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tcpeek_bridge::{BridgeConfig, StatsBridge};
//!
//! # async fn run() -> tcpeek_bridge::Result<()> {
//! let bridge = StatsBridge::new(BridgeConfig::new("unix:///var/run/tcpeek/tcpeek.sock"));
//! let metrics = bridge.fetch_metrics().await?;
//! for (name, value) in &metrics {
//!     println!("{}.{name} = {value}", bridge.metric_key_prefix());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod output;
pub mod peer;
pub mod report;
pub mod stats_bridge;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use config::{BridgeConfig, DEFAULT_METRIC_KEY_PREFIX, UNIX_SCHEME};
pub use error::{BridgeError, Result};
pub use graph::{GraphDefinition, GraphDefinitions, MetricDescriptor};
pub use peer::PeerClient;
pub use report::{FailureStats, GroupMetric, PCAP_GROUP, PcapStats, StatusReport, SuccessStats};
pub use stats_bridge::{Metrics, Snapshot, StatsBridge};
