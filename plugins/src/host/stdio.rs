//! Line-delimited JSON bridge to a browser-side shim.
//!
//! In: `{"type":"beforeNavigate","tabId":1,"frameId":0,"url":"..."}` and
//! `{"type":"tabRemoved","tabId":1}`.
//! Out: `{"type":"redirect","tabId":1,"url":"block.html?..."}`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use phishshield_core::api::{BrowserHost, HostError, NavigationEvent, TabId};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    BeforeNavigate(NavigationEvent),
    TabRemoved {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostCommand {
    Redirect {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        url: String,
    },
}

type BoxWriter = Box<dyn AsyncWrite + Send + Unpin>;

pub struct StdioHost {
    tabs: Mutex<HashMap<TabId, String>>,
    out: tokio::sync::Mutex<BoxWriter>,
}

impl StdioHost {
    pub fn new<W>(writer: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            tabs: Mutex::new(HashMap::new()),
            out: tokio::sync::Mutex::new(Box::new(writer)),
        }
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }

    /// Track tab locations from what the browser reports.
    pub fn observe(&self, msg: &HostMessage) {
        let mut tabs = self.tabs.lock().unwrap_or_else(PoisonError::into_inner);
        match msg {
            HostMessage::BeforeNavigate(ev) if ev.is_main_frame() => {
                tabs.insert(ev.tab_id, ev.url.clone());
            }
            HostMessage::BeforeNavigate(_) => {}
            HostMessage::TabRemoved { tab_id } => {
                tabs.remove(tab_id);
            }
        }
    }

    pub fn tracked_tabs(&self) -> usize {
        self.tabs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn send(&self, cmd: &HostCommand) -> Result<(), HostError> {
        let mut line = serde_json::to_string(cmd).map_err(HostError::Encode)?;
        line.push('\n');
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes()).await.map_err(write_error)?;
        out.flush().await.map_err(write_error)
    }
}

fn write_error(e: std::io::Error) -> HostError {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe => HostError::Closed,
        _ => HostError::Io(e),
    }
}

#[async_trait]
impl BrowserHost for StdioHost {
    fn name(&self) -> &str {
        "stdio"
    }

    async fn current_url(&self, tab_id: TabId) -> Option<String> {
        self.tabs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tab_id)
            .cloned()
    }

    async fn redirect_tab(&self, tab_id: TabId, url: &str) -> Result<(), HostError> {
        self.send(&HostCommand::Redirect {
            tab_id,
            url: url.to_string(),
        })
        .await?;
        self.tabs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tab_id, url.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeSummary {
    pub lines: u64,
    pub events: u64,
    pub malformed: u64,
}

/// Pump host messages into the gatekeeper until EOF or until the gatekeeper
/// stops accepting events.
pub async fn run_stdio_bridge<R>(
    reader: R,
    host: Arc<StdioHost>,
    tx: mpsc::Sender<NavigationEvent>,
) -> std::io::Result<BridgeSummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = BridgeSummary::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        summary.lines += 1;

        let msg = match serde_json::from_str::<HostMessage>(line) {
            Ok(msg) => msg,
            Err(e) => {
                summary.malformed += 1;
                tracing::warn!(
                    target: "phishshield.bridge",
                    error = %e,
                    "skipping malformed host message"
                );
                continue;
            }
        };

        // Tab state first, so a later verdict sees this navigation.
        host.observe(&msg);
        if let HostMessage::BeforeNavigate(ev) = msg {
            summary.events += 1;
            if tx.send(ev).await.is_err() {
                tracing::debug!(target: "phishshield.bridge", "gatekeeper closed, bridge exiting");
                break;
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, BufReader};

    #[test]
    fn parses_host_messages() {
        let nav: HostMessage = serde_json::from_str(
            r#"{"type":"beforeNavigate","tabId":4,"frameId":0,"url":"https://example.com"}"#,
        )
        .unwrap();
        assert_eq!(
            nav,
            HostMessage::BeforeNavigate(NavigationEvent::main_frame(4, "https://example.com"))
        );

        let closed: HostMessage = serde_json::from_str(r#"{"type":"tabRemoved","tabId":4}"#).unwrap();
        assert_eq!(closed, HostMessage::TabRemoved { tab_id: 4 });
    }

    #[test]
    fn redirect_command_wire_shape() {
        let cmd = HostCommand::Redirect {
            tab_id: 9,
            url: "block.html?url=a&reason=b".into(),
        };
        assert_eq!(
            serde_json::to_string(&cmd).unwrap(),
            r#"{"type":"redirect","tabId":9,"url":"block.html?url=a&reason=b"}"#
        );
    }

    #[tokio::test]
    async fn observe_tracks_main_frame_and_forgets_closed_tabs() {
        let host = StdioHost::new(tokio::io::sink());
        host.observe(&HostMessage::BeforeNavigate(NavigationEvent::main_frame(1, "https://a.test/")));
        host.observe(&HostMessage::BeforeNavigate(NavigationEvent::new(1, 5, "https://ads.test/")));
        assert_eq!(host.current_url(1).await.as_deref(), Some("https://a.test/"));

        host.observe(&HostMessage::TabRemoved { tab_id: 1 });
        assert_eq!(host.current_url(1).await, None);
        assert_eq!(host.tracked_tabs(), 0);
    }

    #[tokio::test]
    async fn redirect_writes_one_json_line() {
        let (client, mut server) = tokio::io::duplex(1024);
        let host = StdioHost::new(client);

        host.redirect_tab(2, "block.html?url=x&reason=y").await.unwrap();
        drop(host);

        let mut out = String::new();
        server.read_to_string(&mut out).await.unwrap();
        assert_eq!(
            out,
            "{\"type\":\"redirect\",\"tabId\":2,\"url\":\"block.html?url=x&reason=y\"}\n"
        );
    }

    #[tokio::test]
    async fn redirect_after_reader_is_gone_reports_closed() {
        let (client, server) = tokio::io::duplex(64);
        drop(server);
        let host = StdioHost::new(client);

        let err = host.redirect_tab(2, "block.html?url=x&reason=y").await.unwrap_err();
        assert!(matches!(err, HostError::Closed));
        assert_eq!(host.current_url(2).await, None);
    }

    #[tokio::test]
    async fn bridge_forwards_events_and_skips_garbage() {
        let input = concat!(
            "{\"type\":\"beforeNavigate\",\"tabId\":1,\"frameId\":0,\"url\":\"https://example.com\"}\n",
            "\n",
            "not json\n",
            "{\"type\":\"tabRemoved\",\"tabId\":3}\n",
            "{\"type\":\"beforeNavigate\",\"tabId\":2,\"frameId\":1,\"url\":\"https://ads.test/\"}\n",
        );
        let host = Arc::new(StdioHost::new(tokio::io::sink()));
        let (tx, mut rx) = mpsc::channel(8);

        let summary = run_stdio_bridge(BufReader::new(input.as_bytes()), host.clone(), tx)
            .await
            .unwrap();

        assert_eq!(
            summary,
            BridgeSummary {
                lines: 4,
                events: 2,
                malformed: 1
            }
        );
        assert_eq!(
            rx.recv().await,
            Some(NavigationEvent::main_frame(1, "https://example.com"))
        );
        assert_eq!(rx.recv().await, Some(NavigationEvent::new(2, 1, "https://ads.test/")));
        assert_eq!(rx.recv().await, None);
        assert_eq!(host.current_url(1).await.as_deref(), Some("https://example.com"));
    }
}
