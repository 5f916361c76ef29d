use crate::config::{AppConfig, GatekeeperConfig};

/// Resolved filter/redirect rules the gatekeeper evaluates events against.
#[derive(Debug, Clone)]
pub struct GatekeeperRules {
    pub block_page_url: String,
    /// `block_page_url` with any query or fragment removed.
    pub block_page_base: String,
    pub internal_prefixes: Vec<String>,
    pub revalidate_tab: bool,
}

impl GatekeeperRules {
    pub fn new(block_page_url: impl Into<String>) -> Self {
        GatekeeperConfig {
            block_page_url: block_page_url.into(),
            ..GatekeeperConfig::default()
        }
        .into()
    }
}

impl Default for GatekeeperRules {
    fn default() -> Self {
        GatekeeperConfig::default().into()
    }
}

impl From<GatekeeperConfig> for GatekeeperRules {
    fn from(c: GatekeeperConfig) -> Self {
        let block_page_base = strip_query(&c.block_page_url).to_string();
        Self {
            block_page_url: c.block_page_url,
            block_page_base,
            internal_prefixes: c
                .internal_prefixes
                .into_iter()
                .filter(|p| !p.is_empty())
                .collect(),
            revalidate_tab: c.revalidate_tab,
        }
    }
}

impl AppConfig {
    pub fn gatekeeper_rules(&self) -> GatekeeperRules {
        self.gatekeeper.clone().into()
    }
}

pub(crate) fn strip_query(url: &str) -> &str {
    match url.find(['?', '#']) {
        Some(idx) => &url[..idx],
        None => url,
    }
}
