//! tcpeek status report model and decoder.
//!
//! The peer answers `REFRESH` with a JSON array of single-entry objects, one
//! per statistic group:
//!
//! ```text
//! [
//!   {"web":  {"success": {"total": 10, "dupsyn": 1, "dupsynack": 0},
//!             "failure": {"total": 2, "timeout": 1, "reject": 1, "unreach": 0}}},
//!   {"pcap": {"recv": 120, "drop": 0, "ifdrop": 0}}
//! ]
//! ```
//!
//! Decoding is permissive. Each group is validated on its own and malformed
//! groups are skipped, and a truncated document still yields every group from
//! array elements that were parsed before the damage.

use serde::de::{SeqAccess, Visitor};
use serde::{Deserialize, Deserializer as _, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

/// Reserved group carrying packet-capture counters rather than connection stats.
pub const PCAP_GROUP: &str = "pcap";

/// Successful connection establishment counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessStats {
    pub total: u64,
    #[serde(rename = "dupsyn")]
    pub dup_syn: u64,
    #[serde(rename = "dupsynack")]
    pub dup_syn_ack: u64,
}

/// Failed connection establishment counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FailureStats {
    pub total: u64,
    pub timeout: u64,
    pub reject: u64,
    /// ICMP unreachable
    pub unreach: u64,
}

/// Counters for one connection statistic group.
///
/// Both halves are required; a group missing either one is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMetric {
    pub success: SuccessStats,
    pub failure: FailureStats,
}

/// Packet capture counters from the reserved `pcap` group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcapStats {
    pub recv: u64,
    pub drop: u64,
    pub ifdrop: u64,
}

/// One decoded `REFRESH` response.
///
/// Lives for a single fetch; nothing is carried over between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    /// Connection groups in the order the peer sent them (never `pcap`)
    pub groups: Vec<(String, GroupMetric)>,
    /// The `pcap` group, if present and well formed
    pub pcap: Option<PcapStats>,
    /// Number of groups or array elements skipped as malformed
    pub rejected: usize,
    /// Whether the whole document parsed as a JSON array
    pub complete: bool,
}

impl StatusReport {
    /// Decode a peer response on a best-effort basis. Never fails.
    pub fn decode(bytes: &[u8]) -> Self {
        let mut report = StatusReport::default();
        let mut de = serde_json::Deserializer::from_slice(bytes);

        match (&mut de).deserialize_seq(ReportVisitor {
            report: &mut report,
        }) {
            Ok(()) => report.complete = true,
            Err(e) if bytes.is_empty() => {
                debug!("Empty tcpeek response: {}", e);
            }
            Err(e) => {
                warn!(
                    groups = report.groups.len(),
                    "Malformed tcpeek response, keeping groups decoded so far: {}", e
                );
            }
        }

        if report.rejected > 0 {
            warn!(rejected = report.rejected, "Skipped malformed tcpeek groups");
        }

        report
    }

    /// Whether the report has no connection groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn absorb(&mut self, element: Value) {
        let Value::Object(entries) = element else {
            debug!("Ignoring non-object tcpeek array element: {}", element);
            self.rejected += 1;
            return;
        };

        for (name, value) in entries {
            if name == PCAP_GROUP {
                match serde_json::from_value::<PcapStats>(value) {
                    Ok(pcap) => self.pcap = Some(pcap),
                    Err(e) => debug!("Ignoring malformed pcap group: {}", e),
                }
                continue;
            }

            match serde_json::from_value::<GroupMetric>(value) {
                Ok(metric) => self.groups.push((name, metric)),
                Err(e) => {
                    debug!(group = %name, "Rejecting tcpeek group: {}", e);
                    self.rejected += 1;
                }
            }
        }
    }
}

/// Streams array elements into a report so that elements parsed before a
/// syntax error survive it.
struct ReportVisitor<'a> {
    report: &'a mut StatusReport,
}

impl<'de> Visitor<'de> for ReportVisitor<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of tcpeek statistic groups")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(element) = seq.next_element::<Value>()? {
            self.report.absorb(element);
        }
        Ok(())
    }
}
