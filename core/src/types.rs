// core/src/types.rs
use serde::{Deserialize, Serialize};

pub type TabId = i64;

/// Frame id the browser assigns to a tab's top-level document.
pub const MAIN_FRAME_ID: i64 = 0;

/// A "before navigate" notification from the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub tab_id: TabId,
    pub frame_id: i64,
    pub url: String,
}

impl NavigationEvent {
    pub fn new(tab_id: TabId, frame_id: i64, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            frame_id,
            url: url.into(),
        }
    }

    pub fn main_frame(tab_id: TabId, url: impl Into<String>) -> Self {
        Self::new(tab_id, MAIN_FRAME_ID, url)
    }

    pub fn is_main_frame(&self) -> bool {
        self.frame_id == MAIN_FRAME_ID
    }
}

/// Scoring result for one URL. Never mutated once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_phishing: bool,
    pub score: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl Verdict {
    pub fn benign(score: f64) -> Self {
        Self {
            is_phishing: false,
            score,
            reasons: Vec::new(),
        }
    }

    pub fn phishing<I, S>(score: f64, reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_phishing: true,
            score,
            reasons: reasons.into_iter().map(Into::into).collect(),
        }
    }

    /// Reasons as shown on the warning page.
    pub fn joined_reasons(&self) -> String {
        self.reasons.join(", ")
    }
}
