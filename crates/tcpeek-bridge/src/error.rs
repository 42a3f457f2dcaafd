//! Error types for the tcpeek bridge.
//!
//! Only [`BridgeError::InvalidSocket`] and the config-file variants ever reach
//! callers of the fetch operations. Peer-side failures are logged and degraded
//! to empty results inside [`crate::StatsBridge`].

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Main error type for the bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    // Configuration errors
    #[error(
        "'--socket' ({socket:?}) is neither http endpoint nor the unix domain socket, try '--help' for more information"
    )]
    InvalidSocket { socket: String },

    #[error("Failed to read config file {path:?}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    // Peer errors
    #[error("Failed to connect to tcpeek socket {path:?}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Timed out after {timeout:?} connecting to tcpeek socket {path:?}")]
    ConnectTimeout { path: PathBuf, timeout: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Output errors
    #[error("Failed to render graph definitions: {0}")]
    Render(#[from] serde_json::Error),
}

impl BridgeError {
    /// Whether this error means the peer could not be reached.
    ///
    /// These are the failures the fetch operations swallow.
    #[must_use]
    pub fn is_peer_unavailable(&self) -> bool {
        matches!(
            self,
            BridgeError::Connect { .. } | BridgeError::ConnectTimeout { .. } | BridgeError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_socket_message() {
        let err = BridgeError::InvalidSocket {
            socket: "/var/run/tcpeek.sock".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/var/run/tcpeek.sock"));
        assert!(msg.contains("neither http endpoint nor the unix domain socket"));
        assert!(msg.contains("--help"));
        assert!(!err.is_peer_unavailable());
    }

    #[test]
    fn test_peer_unavailable_classification() {
        let err = BridgeError::ConnectTimeout {
            path: PathBuf::from("/tmp/tcpeek.sock"),
            timeout: Duration::from_secs(3),
        };
        assert!(err.is_peer_unavailable());

        let err = BridgeError::Connect {
            path: PathBuf::from("/tmp/tcpeek.sock"),
            source: std::io::Error::from(std::io::ErrorKind::ConnectionRefused),
        };
        assert!(err.is_peer_unavailable());
    }
}
