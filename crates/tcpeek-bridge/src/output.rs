//! Monitoring agent plugin output.
//!
//! Values are written one per line as `<key>\t<value>\t<unix_seconds>`, where
//! the key is `<prefix>.<graph_id>.<metric_name>`. Graph metadata is a
//! `# mackerel-agent-plugin` header line followed by one JSON document.

use crate::error::Result;
use crate::graph::{GraphDefinition, GraphDefinitions};
use crate::stats_bridge::Metrics;
use serde::Serialize;
use std::collections::BTreeMap;

/// Header line announcing graph metadata to the agent.
pub const META_HEADER: &str = "# mackerel-agent-plugin";

/// Environment variable the agent sets when it wants graph metadata.
pub const META_ENV: &str = "MACKEREL_AGENT_PLUGIN_META";

#[derive(Serialize)]
struct GraphMeta<'a> {
    graphs: BTreeMap<String, &'a GraphDefinition>,
}

/// Render value lines for every graphed metric that has a value.
///
/// Metrics without a graph are not reported, matching the agent's contract
/// that every value belongs to a declared graph.
#[must_use]
pub fn render_values(
    prefix: &str,
    graphs: &GraphDefinitions,
    metrics: &Metrics,
    timestamp: i64,
) -> Vec<String> {
    graphs
        .iter()
        .flat_map(|(id, graph)| graph.metrics.iter().map(move |m| (id, m)))
        .filter_map(|(id, descriptor)| {
            metrics
                .get(&descriptor.name)
                .map(|value| format!("{prefix}.{id}.{}\t{value}\t{timestamp}", descriptor.name))
        })
        .collect()
}

/// Render the graph metadata block, header line included.
pub fn render_meta(prefix: &str, graphs: &GraphDefinitions) -> Result<String> {
    let meta = GraphMeta {
        graphs: graphs
            .iter()
            .map(|(id, graph)| (format!("{prefix}.{id}"), graph))
            .collect(),
    };
    let json = serde_json::to_string(&meta)?;
    Ok(format!("{META_HEADER}\n{json}"))
}
