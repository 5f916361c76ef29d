// core/src/scoring/trait.rs
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::errors::ScoringError;
use crate::types::Verdict;

/// One scoring exchange with the external service. No retries.
#[async_trait]
pub trait ScoringClient: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, url: &str) -> Result<Verdict, ScoringError>;
}

pub type ScoreFuture = BoxFuture<'static, Result<Arc<Verdict>, ScoringError>>;
