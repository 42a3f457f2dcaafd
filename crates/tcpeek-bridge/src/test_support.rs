//! In-process fake tcpeek daemon for tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;

/// How the fake daemon answers one connection.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Reply {
    /// Write the payload, then close
    Close(&'static str),
    /// Write the payload, then keep the connection open
    Hold(&'static str),
    /// Never answer
    Silent,
}

pub(crate) struct FakePeer {
    _dir: TempDir,
    pub path: PathBuf,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakePeer {
    /// `unix://` address of the fake daemon.
    pub fn address(&self) -> String {
        format!("unix://{}", self.path.display())
    }

    /// Request lines received so far.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}

/// Bind a fake daemon that answers successive connections with `replies`.
pub(crate) async fn spawn_peer(replies: Vec<Reply>) -> FakePeer {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tcpeek.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let seen = requests.clone();
    tokio::spawn(async move {
        for reply in replies {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let seen = seen.clone();
            tokio::spawn(async move { serve(stream, reply, seen).await });
        }
    });

    FakePeer {
        _dir: dir,
        path,
        requests,
    }
}

async fn serve(mut stream: UnixStream, reply: Reply, seen: Arc<Mutex<Vec<String>>>) {
    let mut request = Vec::new();
    let mut byte = [0u8; 1];
    while !request.ends_with(b"\r\n") {
        match stream.read(&mut byte).await {
            Ok(1) => request.push(byte[0]),
            _ => break,
        }
    }
    seen.lock()
        .await
        .push(String::from_utf8_lossy(&request).into_owned());

    match reply {
        Reply::Close(payload) => {
            let _ = stream.write_all(payload.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        Reply::Hold(payload) => {
            let _ = stream.write_all(payload.as_bytes()).await;
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Reply::Silent => {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
    }
}
