//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `phishshield_core::api` instead of reaching into internal modules.

pub use crate::cache::{normalize_url, CacheInsert, DecisionCache};
pub use crate::config::{
    AppConfig, CacheConfig, EventsOutConfig, GatekeeperConfig, LoggingConfig, ScoringConfig,
};
pub use crate::errors::{ConfigError, EventsOutError, HostError, ScoringError};
pub use crate::config::{load, validate};
pub use crate::events_out::writer::STDOUT_PATH;
pub use crate::events_out::{start_events_out, DecisionRecord, EventsOutTx};
pub use crate::gatekeeper::{
    screen, Gatekeeper, GatekeeperHandle, GatekeeperRules, IgnoreReason, NavigationOutcome,
    RedirectTarget, StatsSnapshot, VerdictSource,
};
pub use crate::host::BrowserHost;
pub use crate::scoring::ScoringClient;
pub use crate::types::{NavigationEvent, TabId, Verdict};
