pub mod factory;
pub mod host;
pub mod scoring;
