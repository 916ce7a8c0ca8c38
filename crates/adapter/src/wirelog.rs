//! Optional JSON-lines log of every frame sent or received
//!
//! Writes happen on a background task; recording never blocks the caller.

use serde::Serialize;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireRecord {
    pub ts: u64,
    pub dir: Direction,
    pub peer: String,
    pub line: String,
}

/// Cloneable handle to the log writer task
#[derive(Debug, Clone)]
pub struct WireLog {
    tx: mpsc::UnboundedSender<WireRecord>,
}

impl WireLog {
    /// Open `path` for appending. Must be called inside a tokio runtime.
    pub fn open(path: impl Into<String>) -> Self {
        let path = path.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<WireRecord>();

        tokio::spawn(async move {
            let mut file = match OpenOptions::new().create(true).append(true).open(&path).await {
                Ok(f) => f,
                Err(e) => {
                    log::error!("Could not open wire log {}: {}", path, e);
                    return;
                }
            };

            let mut buf: Vec<u8> = Vec::with_capacity(256);
            while let Some(rec) = rx.recv().await {
                buf.clear();
                if serde_json::to_writer(&mut buf, &rec).is_err() {
                    continue;
                }
                buf.push(b'\n');
                if let Err(e) = file.write_all(&buf).await {
                    log::error!("Wire log write failed: {}", e);
                    break;
                }
            }

            let _ = file.flush().await;
        });

        Self { tx }
    }

    /// Open the log named by `TETRECS_WIRE_LOG`, if set
    pub fn from_env() -> Option<Self> {
        std::env::var("TETRECS_WIRE_LOG")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(Self::open)
    }

    pub fn record(&self, dir: Direction, peer: &str, line: &str) {
        let _ = self.tx.send(WireRecord {
            ts: current_timestamp_ms(),
            dir,
            peer: peer.to_string(),
            line: line.to_string(),
        });
    }
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
