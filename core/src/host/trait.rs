// core/src/host/trait.rs
use async_trait::async_trait;

use crate::errors::HostError;
use crate::types::TabId;

/// The browser side of the gatekeeper: where tabs live.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    fn name(&self) -> &str;

    /// Latest known main-frame location of the tab, `None` once the tab is gone.
    async fn current_url(&self, tab_id: TabId) -> Option<String>;

    /// Overwrite the tab's location.
    async fn redirect_tab(&self, tab_id: TabId, url: &str) -> Result<(), HostError>;
}
