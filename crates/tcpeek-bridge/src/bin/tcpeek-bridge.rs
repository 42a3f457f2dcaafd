//! tcpeek monitoring agent plugin.
//!
//! Prints current connection statistics as agent value lines, or graph
//! definitions when the agent asks for plugin metadata.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tcpeek_bridge::{BridgeConfig, StatsBridge, logging, output};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "tcpeek-bridge")]
#[command(about = "Report tcpeek connection statistics to the monitoring agent")]
#[command(version)]
struct Cli {
    /// Socket (must be with prefix of 'unix://')
    #[arg(long)]
    socket: Option<String>,

    /// Prefix for metric keys and graph labels [default: tcpeek]
    #[arg(long)]
    metric_key_prefix: Option<String>,

    /// YAML config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Connect timeout in seconds [default: 3]
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Overall deadline for one fetch in seconds [default: 10]
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Print graph definitions instead of values
    #[arg(
        long,
        env = "MACKEREL_AGENT_PLUGIN_META",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    meta: bool,

    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn bridge_config(&self) -> Result<BridgeConfig> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::from_yaml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => BridgeConfig::default(),
        };

        if let Some(socket) = &self.socket {
            config.socket = socket.clone();
        }
        if let Some(prefix) = &self.metric_key_prefix {
            config.metric_key_prefix = prefix.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.deadline_secs {
            config.deadline = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let config = cli.bridge_config()?;
    config.validate()?;
    debug!(?config, "Starting tcpeek bridge");

    let bridge = StatsBridge::new(config);
    let prefix = bridge.metric_key_prefix().to_string();
    let mut stdout = std::io::stdout().lock();

    if cli.meta {
        let graphs = bridge.fetch_graph_definitions().await?;
        writeln!(stdout, "{}", output::render_meta(&prefix, &graphs)?)?;
    } else {
        let snapshot = bridge.fetch_snapshot().await?;
        let now = Utc::now().timestamp();
        for line in output::render_values(&prefix, &snapshot.graphs, &snapshot.metrics, now) {
            writeln!(stdout, "{line}")?;
        }
    }

    Ok(())
}
