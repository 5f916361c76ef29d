// core/src/errors/host_error.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host channel closed")]
    Closed,

    #[error("host i/o error")]
    Io(#[source] std::io::Error),

    #[error("host encode error")]
    Encode(#[source] serde_json::Error),
}
