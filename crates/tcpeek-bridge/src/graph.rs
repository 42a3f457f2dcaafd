//! Graph layout metadata for the monitoring dashboard.
//!
//! Each connection group gets two graphs: `<group>.success` with three
//! metrics and `<group>.failure` with four. Metric names match the keys
//! produced by [`crate::stats_bridge::flatten_group`].

use crate::report::GroupMetric;
use serde::Serialize;
use std::collections::BTreeMap;

/// Graph id to layout.
pub type GraphDefinitions = BTreeMap<String, GraphDefinition>;

/// Unit used for every tcpeek graph.
pub const UNIT_INTEGER: &str = "integer";

/// One metric line within a graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricDescriptor {
    pub name: String,
    pub label: String,
    /// Whether the agent should report the per-interval difference.
    /// Consumed by the agent when reporting values, never sent as metadata.
    #[serde(skip_serializing)]
    pub diff: bool,
    pub stacked: bool,
}

impl MetricDescriptor {
    fn counter(name: String, label: &str) -> Self {
        Self {
            name,
            label: label.to_string(),
            diff: false,
            stacked: false,
        }
    }
}

/// How a dashboard should render a set of related metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphDefinition {
    pub label: String,
    pub unit: String,
    pub metrics: Vec<MetricDescriptor>,
}

/// Suffixes and labels of the success graph, in display order.
pub(crate) const SUCCESS_METRICS: [(&str, &str); 3] = [
    ("success_total", "Total"),
    ("success_dupsyn", "DupSyn"),
    ("success_dupsynack", "DupSynAck"),
];

/// Suffixes and labels of the failure graph, in display order.
pub(crate) const FAILURE_METRICS: [(&str, &str); 4] = [
    ("failure_total", "Total"),
    ("failure_timeout", "Timeout"),
    ("failure_reject", "Reject"),
    ("failure_unreach", "Unreach"),
];

/// Insert the success and failure graphs for `group` into `graphs`.
pub fn add_group_graphs(graphs: &mut GraphDefinitions, label_prefix: &str, group: &str) {
    graphs.insert(
        format!("{group}.success"),
        group_graph(label_prefix, group, "Success", &SUCCESS_METRICS),
    );
    graphs.insert(
        format!("{group}.failure"),
        group_graph(label_prefix, group, "Failure", &FAILURE_METRICS),
    );
}

fn group_graph(
    label_prefix: &str,
    group: &str,
    kind: &str,
    metrics: &[(&str, &str)],
) -> GraphDefinition {
    GraphDefinition {
        label: format!("{label_prefix} {group} {kind} Count"),
        unit: UNIT_INTEGER.to_string(),
        metrics: metrics
            .iter()
            .map(|(suffix, label)| MetricDescriptor::counter(format!("{group}_{suffix}"), label))
            .collect(),
    }
}

/// Counter values of a group paired with their metric suffixes.
pub(crate) fn group_values(metric: &GroupMetric) -> [(&'static str, u64); 7] {
    let GroupMetric { success, failure } = metric;
    [
        (SUCCESS_METRICS[0].0, success.total),
        (SUCCESS_METRICS[1].0, success.dup_syn),
        (SUCCESS_METRICS[2].0, success.dup_syn_ack),
        (FAILURE_METRICS[0].0, failure.total),
        (FAILURE_METRICS[1].0, failure.timeout),
        (FAILURE_METRICS[2].0, failure.reject),
        (FAILURE_METRICS[3].0, failure.unreach),
    ]
}

/// Upper-case the first letter of every word.
///
/// Words break on ASCII characters other than letters, digits and `_`, and on
/// Unicode whitespace. Non-ASCII letters, digits and punctuation stay inside
/// a word, so `"my-lb edge"` becomes `"My-Lb Edge"` while `"café·lb"`
/// only gains a capital `C`.
#[must_use]
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_word_separator(c);
    }
    out
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        !(c.is_ascii_alphanumeric() || c == '_')
    } else if c.is_alphanumeric() {
        false
    } else {
        c.is_whitespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("tcpeek"), "Tcpeek");
        assert_eq!(title_case("my-lb edge"), "My-Lb Edge");
        assert_eq!(title_case("under_score"), "Under_score");
        assert_eq!(title_case("Already"), "Already");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_title_case_non_ascii() {
        // Non-ASCII punctuation does not start a word
        assert_eq!(title_case("caf\u{e9}\u{b7}lb"), "Caf\u{e9}\u{b7}lb");
        assert_eq!(title_case("edge\u{2014}lb"), "Edge\u{2014}lb");
        // Unicode whitespace does
        assert_eq!(title_case("edge\u{3000}lb"), "Edge\u{3000}Lb");
        assert_eq!(title_case("\u{e9}t\u{e9} lb"), "\u{c9}t\u{e9} Lb");
    }

    #[test]
    fn test_add_group_graphs() {
        let mut graphs = GraphDefinitions::new();
        add_group_graphs(&mut graphs, "Tcpeek", "web");

        assert_eq!(graphs.len(), 2);

        let success = &graphs["web.success"];
        assert_eq!(success.label, "Tcpeek web Success Count");
        assert_eq!(success.unit, "integer");
        let names: Vec<&str> = success.metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["web_success_total", "web_success_dupsyn", "web_success_dupsynack"]
        );
        let labels: Vec<&str> = success.metrics.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Total", "DupSyn", "DupSynAck"]);

        let failure = &graphs["web.failure"];
        assert_eq!(failure.label, "Tcpeek web Failure Count");
        let names: Vec<&str> = failure.metrics.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "web_failure_total",
                "web_failure_timeout",
                "web_failure_reject",
                "web_failure_unreach"
            ]
        );
        assert!(
            graphs
                .values()
                .flat_map(|g| &g.metrics)
                .all(|m| !m.diff && !m.stacked)
        );
    }
}
