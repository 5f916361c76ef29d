//! Builds the gatekeeper and its collaborators from config.
use std::sync::Arc;

use anyhow::Result;

use phishshield_core::api::{
    AppConfig, BrowserHost, DecisionCache, EventsOutTx, Gatekeeper, ScoringClient,
};

use crate::scoring::HttpScoringClient;

pub fn build_scorer(cfg: &AppConfig) -> Result<Arc<dyn ScoringClient>> {
    Ok(Arc::new(HttpScoringClient::from_config(&cfg.scoring)?))
}

pub fn build_cache(cfg: &AppConfig) -> DecisionCache {
    DecisionCache::from_config(&cfg.cache)
}

pub fn build_gatekeeper(
    cfg: &AppConfig,
    host: Arc<dyn BrowserHost>,
    events_out: Option<EventsOutTx>,
    session_id: &str,
) -> Result<Gatekeeper> {
    let scorer = build_scorer(cfg)?;
    Ok(Gatekeeper::builder(scorer, host)
        .rules(cfg.gatekeeper_rules())
        .cache(build_cache(cfg))
        .events_out(events_out)
        .session_id(session_id)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StdioHost;

    #[test]
    fn gatekeeper_uses_configured_rules() {
        let mut cfg = AppConfig::default();
        cfg.gatekeeper.block_page_url = "block.html".into();
        cfg.cache.capacity = 8;

        let host = Arc::new(StdioHost::new(tokio::io::sink()));
        let gk = build_gatekeeper(&cfg, host, None, "test-session").unwrap();
        assert_eq!(gk.rules().block_page_url, "block.html");
        assert_eq!(gk.cache_len(), 0);
        assert_eq!(build_cache(&cfg).capacity(), 8);
    }
}
