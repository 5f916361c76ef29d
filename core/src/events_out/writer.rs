use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::record::DecisionRecord;
use crate::config::EventsOutConfig;
use crate::errors::EventsOutError;

pub const STDOUT_PATH: &str = "stdout:";

#[derive(Clone, Debug)]
pub struct EventsOutTx {
    tx: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
    drop_when_full: bool,
}

impl EventsOutTx {
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub async fn send_record(&self, record: &DecisionRecord) {
        match serde_json::to_string(record) {
            Ok(line) => self.send_line(line).await,
            Err(e) => tracing::warn!(
                target: "phishshield.events_out",
                error = %e,
                "failed to encode decision record"
            ),
        }
    }

    pub async fn send_line(&self, line: String) {
        if self.drop_when_full {
            if self.tx.try_send(line).is_err() {
                let count = self.dropped.fetch_add(1, Ordering::Relaxed);
                // every 100th drop, to keep the log readable
                if count % 100 == 0 {
                    tracing::warn!(
                        target: "phishshield.events_out",
                        dropped_total = count + 1,
                        "events_out channel full, decision records are being dropped"
                    );
                }
            }
        } else if self.tx.send(line).await.is_err() {
            tracing::debug!(
                target: "phishshield.events_out",
                "events_out writer closed, send failed"
            );
        }
    }
}

/// Starts the background writer. The returned handle resolves to the number
/// of lines written once every [`EventsOutTx`] clone has been dropped.
pub async fn start_events_out(
    cfg: &EventsOutConfig,
) -> Result<Option<(EventsOutTx, JoinHandle<u64>)>, EventsOutError> {
    if !cfg.enabled {
        return Ok(None);
    }
    if cfg.path.trim().is_empty() {
        tracing::warn!(
            target: "phishshield.events_out",
            "events_out path is empty in config, decision log disabled"
        );
        return Ok(None);
    }

    let path = cfg.path.clone();
    let mut writer: Box<dyn tokio::io::AsyncWrite + Unpin + Send> = if path == STDOUT_PATH {
        Box::new(tokio::io::stdout())
    } else {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| EventsOutError::Open {
                path: path.clone(),
                source,
            })?;
        Box::new(file)
    };

    tracing::info!(
        target: "phishshield.events_out",
        path = %path,
        channel_capacity = cfg.channel_capacity,
        drop_when_full = cfg.drop_when_full,
        "events_out writer started"
    );

    let (tx, mut rx) = mpsc::channel::<String>(cfg.channel_capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));

    let handle = tokio::spawn(async move {
        let mut written = 0u64;
        while let Some(mut line) = rx.recv().await {
            if !line.ends_with('\n') {
                line.push('\n');
            }
            if writer.write_all(line.as_bytes()).await.is_err() {
                tracing::error!(
                    target: "phishshield.events_out",
                    "failed to write to events_out, writer task exiting"
                );
                return written;
            }
            written += 1;
            // Flush every 10 lines; the final flush happens on close.
            if written % 10 == 0 && writer.flush().await.is_err() {
                tracing::error!(
                    target: "phishshield.events_out",
                    "failed to flush events_out"
                );
                return written;
            }
        }

        let _ = writer.flush().await;
        written
    });

    Ok(Some((
        EventsOutTx {
            tx,
            dropped,
            drop_when_full: cfg.drop_when_full,
        },
        handle,
    )))
}
