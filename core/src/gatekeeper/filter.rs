use serde::Serialize;

use super::config::{strip_query, GatekeeperRules};
use crate::types::NavigationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    SubFrame,
    EmptyUrl,
    InternalPage,
    WarningPage,
}

/// Returns why the event is passed through untouched, or `None` if it must be
/// checked.
pub fn screen(rules: &GatekeeperRules, event: &NavigationEvent) -> Option<IgnoreReason> {
    if !event.is_main_frame() {
        return Some(IgnoreReason::SubFrame);
    }

    let url = event.url.trim();
    if url.is_empty() {
        return Some(IgnoreReason::EmptyUrl);
    }

    // Checked before the internal prefixes so a bundled warning page
    // (chrome-extension://...) is reported as what it is.
    if is_warning_page(rules, url) {
        return Some(IgnoreReason::WarningPage);
    }

    if rules
        .internal_prefixes
        .iter()
        .any(|p| starts_with_ignore_ascii_case(url, p))
    {
        return Some(IgnoreReason::InternalPage);
    }

    None
}

pub fn is_warning_page(rules: &GatekeeperRules, url: &str) -> bool {
    strip_query(url) == rules.block_page_base
}

fn starts_with_ignore_ascii_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}
