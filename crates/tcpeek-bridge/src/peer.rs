//! One-shot `REFRESH` round trip against the tcpeek daemon.
//!
//! Every call opens a fresh Unix stream, writes `REFRESH\r\n`, and reads until
//! the peer has sent one complete JSON document, closes the stream, exceeds the
//! size cap, or the overall deadline elapses. The stream is dropped on every
//! exit path.

use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use serde::de::IgnoredAny;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, warn};

/// Command that asks the daemon to refresh and dump its statistics.
pub const REFRESH_COMMAND: &[u8] = b"REFRESH\r\n";

const READ_CHUNK_SIZE: usize = 8192;

/// Client for the tcpeek statistics socket.
#[derive(Debug, Clone)]
pub struct PeerClient {
    path: PathBuf,
    connect_timeout: Duration,
    deadline: Duration,
    max_response_bytes: usize,
}

impl PeerClient {
    /// Create a client for the socket at `path` using the config's timings.
    pub fn new(path: impl AsRef<Path>, config: &BridgeConfig) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            connect_timeout: config.timeout,
            deadline: config.deadline,
            max_response_bytes: config.max_response_bytes,
        }
    }

    /// Socket path this client talks to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Send `REFRESH` and return the raw response bytes.
    ///
    /// Errors only when the peer could not be reached or nothing at all was
    /// received. A partial response cut short by an I/O error or the deadline
    /// is returned as-is for best-effort decoding.
    pub async fn refresh(&self) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.deadline;
        let mut stream = self.connect().await?;
        let mut response = Vec::new();

        match timeout_at(deadline, self.exchange(&mut stream, &mut response)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) if response.is_empty() => return Err(e),
            Ok(Err(e)) => {
                warn!(
                    bytes = response.len(),
                    "tcpeek read failed mid-response, using partial data: {}", e
                );
            }
            Err(_) => {
                warn!(
                    bytes = response.len(),
                    deadline = ?self.deadline,
                    "tcpeek did not finish responding before the deadline"
                );
            }
        }

        Ok(response)
    }

    async fn connect(&self) -> Result<UnixStream> {
        let bound = self.connect_timeout.min(self.deadline);
        debug!("Connecting to tcpeek socket: {}", self.path.display());

        match timeout(bound, UnixStream::connect(&self.path)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(source)) => Err(BridgeError::Connect {
                path: self.path.clone(),
                source,
            }),
            Err(_) => Err(BridgeError::ConnectTimeout {
                path: self.path.clone(),
                timeout: bound,
            }),
        }
    }

    async fn exchange(&self, stream: &mut UnixStream, response: &mut Vec<u8>) -> Result<()> {
        stream.write_all(REFRESH_COMMAND).await?;
        stream.flush().await?;

        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                debug!(bytes = response.len(), "tcpeek closed the connection");
                return Ok(());
            }

            let first = response.is_empty();
            let room = self.max_response_bytes.saturating_sub(response.len());
            let fresh = &chunk[..n.min(room)];
            response.extend_from_slice(fresh);
            if response.len() >= self.max_response_bytes {
                warn!(
                    limit = self.max_response_bytes,
                    "tcpeek response exceeds size limit, truncating"
                );
                return Ok(());
            }

            if worth_checking(first, fresh) && document_ready(response) {
                debug!(bytes = response.len(), "Received tcpeek response");
                return Ok(());
            }
        }
    }
}

/// Whether a read could have completed the document.
///
/// The report is an array and the array never nests, so after the first chunk
/// only a chunk carrying `]` can finish it. The first chunk is always checked
/// so that garbage ends the read early.
fn worth_checking(first: bool, fresh: &[u8]) -> bool {
    first || fresh.contains(&b']')
}

/// Whether `buf` holds a complete JSON value, or something that can never
/// become one. Only an unexpected end of input means more bytes are needed.
fn document_ready(buf: &[u8]) -> bool {
    let mut values = serde_json::Deserializer::from_slice(buf).into_iter::<IgnoredAny>();
    match values.next() {
        Some(Ok(_)) => true,
        Some(Err(e)) => !e.is_eof(),
        None => false,
    }
}
