use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio::sync::mpsc;
use uuid::Uuid;

use phishshield_core::api::{start_events_out, AppConfig, STDOUT_PATH};
use phishshield_plugins::factory::build_gatekeeper;
use phishshield_plugins::host::{run_stdio_bridge, StdioHost};

use crate::error::CliError;

const EVENT_CHANNEL_CAPACITY: usize = 256;
const EVENTS_OUT_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the gatekeeper over the stdio bridge until stdin closes or Ctrl-C.
pub async fn handle_watch(cfg: &AppConfig) -> Result<i32, CliError> {
    if cfg.events_out.enabled && cfg.events_out.path == STDOUT_PATH {
        return Err(CliError::InvalidArgs(
            "events_out cannot use stdout in watch mode, stdout carries host commands".into(),
        ));
    }

    let session_id = Uuid::new_v4().to_string();
    let (events_tx, writer) = match start_events_out(&cfg.events_out).await? {
        Some((tx, handle)) => (Some(tx), Some(handle)),
        None => (None, None),
    };

    let drop_counter = events_tx.clone();
    let host = Arc::new(StdioHost::stdout());
    let gatekeeper = build_gatekeeper(cfg, host.clone(), events_tx, &session_id)?;
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let handle = gatekeeper.start(rx);

    let stdin = BufReader::new(tokio::io::stdin());
    let stats = tokio::select! {
        res = run_stdio_bridge(stdin, host.clone(), tx) => {
            let summary = res?;
            tracing::info!(
                target: "phishshield.bridge",
                lines = summary.lines,
                events = summary.events,
                malformed = summary.malformed,
                "stdin closed"
            );
            handle.join().await
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(target: "phishshield.bridge", "interrupted, stopping");
            handle.stop().await
        }
    };
    stats.report();

    if let Some(tx) = drop_counter {
        let dropped = tx.dropped_count();
        if dropped > 0 {
            tracing::warn!(
                target: "phishshield.events_out",
                dropped,
                "decision records dropped because the channel was full"
            );
        }
    }

    if let Some(writer) = writer {
        match tokio::time::timeout(EVENTS_OUT_FLUSH_TIMEOUT, writer).await {
            Ok(Ok(written)) => tracing::debug!(
                target: "phishshield.events_out",
                written,
                "decision log closed"
            ),
            Ok(Err(e)) => tracing::warn!(
                target: "phishshield.events_out",
                error = %e,
                "events_out writer task failed"
            ),
            Err(_) => tracing::warn!(
                target: "phishshield.events_out",
                "timed out waiting for events_out to flush"
            ),
        }
    }

    Ok(0)
}
