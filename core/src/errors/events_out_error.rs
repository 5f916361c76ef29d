// core/src/errors/events_out_error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventsOutError {
    #[error("failed to open events_out file {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
