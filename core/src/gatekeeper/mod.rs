pub mod config;
pub mod decision;
pub mod filter;
pub mod metrics;
pub mod redirect;
pub mod service;

pub use config::GatekeeperRules;
pub use decision::{NavigationOutcome, VerdictSource};
pub use filter::{is_warning_page, screen, IgnoreReason};
pub use metrics::{GatekeeperStats, StatsSnapshot};
pub use redirect::{encode_component, RedirectTarget};
pub use service::{Gatekeeper, GatekeeperBuilder, GatekeeperHandle};
