use serde::Serialize;

use crate::gatekeeper::{NavigationOutcome, VerdictSource};
use crate::types::{NavigationEvent, TabId};

/// One line of the decision log.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub ts: String,
    pub session_id: String,
    pub tab_id: TabId,
    pub url: String,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<VerdictSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DecisionRecord {
    pub fn new(session_id: &str, event: &NavigationEvent, outcome: &NavigationOutcome) -> Self {
        let verdict = outcome.verdict();
        let error = match outcome {
            NavigationOutcome::FailedOpen(e) => Some(e.to_string()),
            NavigationOutcome::RedirectFailed { error, .. } => Some(error.clone()),
            _ => None,
        };
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            session_id: session_id.to_string(),
            tab_id: event.tab_id,
            url: event.url.clone(),
            outcome: outcome.label(),
            source: outcome.source(),
            score: verdict.map(|v| v.score),
            reasons: verdict.map(|v| v.reasons.clone()).unwrap_or_default(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScoringError;
    use crate::types::Verdict;
    use std::sync::Arc;

    #[test]
    fn redirected_record_carries_verdict() {
        let ev = NavigationEvent::main_frame(3, "https://evil-example.com/login");
        let outcome = NavigationOutcome::Redirected {
            source: VerdictSource::Scored,
            verdict: Arc::new(Verdict::phishing(0.93, ["typosquat"])),
            target: "block.html?url=x&reason=typosquat".into(),
        };
        let rec = DecisionRecord::new("s-1", &ev, &outcome);
        let json = serde_json::to_value(&rec).unwrap();

        assert_eq!(json["outcome"], "redirected");
        assert_eq!(json["source"], "scored");
        assert_eq!(json["score"], 0.93);
        assert_eq!(json["reasons"][0], "typosquat");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failed_open_record_carries_error() {
        let ev = NavigationEvent::main_frame(3, "https://example.com");
        let outcome = NavigationOutcome::FailedOpen(ScoringError::timeout("deadline elapsed"));
        let json = serde_json::to_value(DecisionRecord::new("s-1", &ev, &outcome)).unwrap();

        assert_eq!(json["outcome"], "failed_open");
        assert!(json["error"].as_str().unwrap().contains("deadline elapsed"));
        assert!(json.get("score").is_none());
        assert!(json.get("reasons").is_none());
    }
}
