pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod events_out;
pub mod gatekeeper;
pub mod host;
pub mod scoring;
pub mod types;
