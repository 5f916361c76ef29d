use std::sync::Arc;

use serde::Serialize;

use super::filter::IgnoreReason;
use crate::errors::ScoringError;
use crate::types::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    Cache,
    Scored,
}

/// What the gatekeeper did with one navigation event.
#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    Ignored(IgnoreReason),
    Allowed {
        source: VerdictSource,
        verdict: Arc<Verdict>,
    },
    Redirected {
        source: VerdictSource,
        verdict: Arc<Verdict>,
        target: String,
    },
    /// Adverse verdict, but the tab had already moved elsewhere.
    Superseded {
        verdict: Arc<Verdict>,
        current_url: Option<String>,
    },
    /// Scoring failed; navigation proceeds unscored.
    FailedOpen(ScoringError),
    RedirectFailed {
        verdict: Arc<Verdict>,
        target: String,
        error: String,
    },
}

impl NavigationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            NavigationOutcome::Ignored(_) => "ignored",
            NavigationOutcome::Allowed { .. } => "allowed",
            NavigationOutcome::Redirected { .. } => "redirected",
            NavigationOutcome::Superseded { .. } => "superseded",
            NavigationOutcome::FailedOpen(_) => "failed_open",
            NavigationOutcome::RedirectFailed { .. } => "redirect_failed",
        }
    }

    pub fn verdict(&self) -> Option<&Arc<Verdict>> {
        match self {
            NavigationOutcome::Allowed { verdict, .. }
            | NavigationOutcome::Redirected { verdict, .. }
            | NavigationOutcome::Superseded { verdict, .. }
            | NavigationOutcome::RedirectFailed { verdict, .. } => Some(verdict),
            NavigationOutcome::Ignored(_) | NavigationOutcome::FailedOpen(_) => None,
        }
    }

    pub fn source(&self) -> Option<VerdictSource> {
        match self {
            NavigationOutcome::Allowed { source, .. }
            | NavigationOutcome::Redirected { source, .. } => Some(*source),
            _ => None,
        }
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            NavigationOutcome::Redirected { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn is_redirected(&self) -> bool {
        matches!(self, NavigationOutcome::Redirected { .. })
    }
}
