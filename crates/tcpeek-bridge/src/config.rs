//! Bridge configuration.
//!
//! Values come from an optional YAML file and are overridden by command-line
//! flags. Durations in the file are human-readable (`"3s"`, `"500ms"`).

use crate::error::{BridgeError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scheme marker that identifies a Unix domain socket address.
pub const UNIX_SCHEME: &str = "unix://";

/// Fallback metric key prefix when none is configured.
pub const DEFAULT_METRIC_KEY_PREFIX: &str = "tcpeek";

/// Default bound on the connect phase.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default bound on a whole round trip (connect, write, read, decode).
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Default cap on the number of response bytes read from the peer.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Configuration for a [`crate::StatsBridge`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Peer address, must start with `unix://`
    pub socket: String,
    /// Namespace for metric and graph identifiers (empty means `tcpeek`)
    pub metric_key_prefix: String,
    /// Connect timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Overall deadline for one fetch
    #[serde(with = "humantime_serde")]
    pub deadline: Duration,
    /// Maximum response size accepted from the peer
    pub max_response_bytes: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            socket: String::new(),
            metric_key_prefix: String::new(),
            timeout: DEFAULT_CONNECT_TIMEOUT,
            deadline: DEFAULT_DEADLINE,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl BridgeConfig {
    /// Create a config for the given socket address with default timings.
    pub fn new(socket: impl Into<String>) -> Self {
        Self {
            socket: socket.into(),
            ..Default::default()
        }
    }

    /// Set the metric key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metric_key_prefix = prefix.into();
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the overall round-trip deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Load a config from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| BridgeError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| BridgeError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Filesystem path of the peer socket, with the scheme stripped.
    ///
    /// Fails with [`BridgeError::InvalidSocket`] unless the address starts
    /// with `unix://`.
    pub fn socket_path(&self) -> Result<PathBuf> {
        self.socket
            .strip_prefix(UNIX_SCHEME)
            .map(PathBuf::from)
            .ok_or_else(|| BridgeError::InvalidSocket {
                socket: self.socket.clone(),
            })
    }

    /// Check the config without touching the network.
    pub fn validate(&self) -> Result<()> {
        self.socket_path().map(|_| ())
    }

    /// The configured prefix, or `tcpeek` when empty.
    #[must_use]
    pub fn metric_key_prefix(&self) -> &str {
        if self.metric_key_prefix.is_empty() {
            DEFAULT_METRIC_KEY_PREFIX
        } else {
            &self.metric_key_prefix
        }
    }
}
