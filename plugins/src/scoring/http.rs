use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use phishshield_core::api::{ScoringClient, ScoringConfig, ScoringError, Verdict};

const BODY_SNIPPET_MAX: usize = 200;

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    is_phishing: bool,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    phishing_probability: Option<f64>,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    request_id: Option<String>,
}

/// POSTs `{"url": ...}` to the scoring endpoint. One attempt per call.
pub struct HttpScoringClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpScoringClient {
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config(cfg: &ScoringConfig) -> Result<Self> {
        Self::new(cfg.endpoint.clone(), cfg.timeout_ms)
    }

}

#[async_trait]
impl ScoringClient for HttpScoringClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn score(&self, url: &str) -> Result<Verdict, ScoringError> {
        let body = serde_json::to_vec(&ScoreRequest { url })
            .map_err(|e| ScoringError::Parse(format!("encode request: {e}")))?;

        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ScoringError::Service {
                status: status.as_u16(),
                body_snippet: snippet(&text),
            });
        }

        let bytes = resp.bytes().await.map_err(transport_error)?;
        let verdict = parse_verdict(&bytes)?;
        tracing::debug!(
            target: "phishshield.scoring",
            url,
            is_phishing = verdict.is_phishing,
            score = verdict.score,
            "scoring response received"
        );
        Ok(verdict)
    }
}

pub fn parse_verdict(bytes: &[u8]) -> Result<Verdict, ScoringError> {
    let raw: ScoreResponse =
        serde_json::from_slice(bytes).map_err(|e| ScoringError::Parse(e.to_string()))?;

    let score = raw
        .score
        .or(raw.phishing_probability)
        .ok_or_else(|| ScoringError::Parse("missing field `score`".into()))?;
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(ScoringError::Parse(format!(
            "score out of range [0, 1]: {score}"
        )));
    }
    if raw.is_phishing && raw.reasons.is_empty() {
        tracing::warn!(
            target: "phishshield.scoring",
            request_id = raw.request_id.as_deref().unwrap_or(""),
            "phishing verdict without reasons"
        );
    }

    Ok(Verdict {
        is_phishing: raw.is_phishing,
        score,
        reasons: raw.reasons,
    })
}

fn transport_error(e: reqwest::Error) -> ScoringError {
    if e.is_timeout() {
        ScoringError::timeout(e.to_string())
    } else {
        ScoringError::network(e.to_string())
    }
}

fn snippet(s: &str) -> String {
    if s.len() <= BODY_SNIPPET_MAX {
        return s.to_string();
    }
    let end = s
        .char_indices()
        .take_while(|(i, _)| *i < BODY_SNIPPET_MAX)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let mut out = s[..end].to_string();
    out.push('…');
    out
}
