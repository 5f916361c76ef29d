pub mod config_error;
pub mod events_out_error;
pub mod host_error;
pub mod scoring_error;

pub use config_error::ConfigError;
pub use events_out_error::EventsOutError;
pub use host_error::HostError;
pub use scoring_error::ScoringError;
