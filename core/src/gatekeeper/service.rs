//! The navigation gatekeeper.
//!
//! One [`Gatekeeper`] per browser instance. Each navigation is screened,
//! answered from the [`DecisionCache`] when possible, otherwise scored once
//! (concurrent misses for the same URL share a single request) and, on an
//! adverse verdict, the tab is redirected to the warning page.
//!
//! Lock order is `inflight` then `cache`. Neither lock is held across an
//! `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use futures::future::{FutureExt, Shared};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};

use super::config::GatekeeperRules;
use super::decision::{NavigationOutcome, VerdictSource};
use super::filter;
use super::metrics::{GatekeeperStats, StatsSnapshot};
use super::redirect::RedirectTarget;
use crate::cache::{normalize_url, CacheInsert, DecisionCache};
use crate::errors::ScoringError;
use crate::events_out::{DecisionRecord, EventsOutTx};
use crate::host::BrowserHost;
use crate::scoring::{ScoreFuture, ScoringClient};
use crate::types::{NavigationEvent, Verdict};

type InflightScore = Shared<ScoreFuture>;

enum Lookup {
    Hit(Arc<Verdict>),
    Pending(InflightScore),
}

struct Inner {
    rules: GatekeeperRules,
    scorer: Arc<dyn ScoringClient>,
    host: Arc<dyn BrowserHost>,
    cache: Mutex<DecisionCache>,
    inflight: Mutex<HashMap<String, InflightScore>>,
    stats: GatekeeperStats,
    events_out: Option<EventsOutTx>,
    session_id: String,
}

#[derive(Clone)]
pub struct Gatekeeper {
    inner: Arc<Inner>,
}

pub struct GatekeeperBuilder {
    scorer: Arc<dyn ScoringClient>,
    host: Arc<dyn BrowserHost>,
    rules: GatekeeperRules,
    cache: Option<DecisionCache>,
    events_out: Option<EventsOutTx>,
    session_id: String,
}

impl GatekeeperBuilder {
    pub fn rules(mut self, rules: GatekeeperRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn cache(mut self, cache: DecisionCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn events_out(mut self, tx: Option<EventsOutTx>) -> Self {
        self.events_out = tx;
        self
    }

    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn build(self) -> Gatekeeper {
        let cache = self
            .cache
            .unwrap_or_else(|| DecisionCache::from_config(&Default::default()));
        Gatekeeper {
            inner: Arc::new(Inner {
                rules: self.rules,
                scorer: self.scorer,
                host: self.host,
                cache: Mutex::new(cache),
                inflight: Mutex::new(HashMap::new()),
                stats: GatekeeperStats::new(),
                events_out: self.events_out,
                session_id: self.session_id,
            }),
        }
    }
}

impl Gatekeeper {
    pub fn builder(scorer: Arc<dyn ScoringClient>, host: Arc<dyn BrowserHost>) -> GatekeeperBuilder {
        GatekeeperBuilder {
            scorer,
            host,
            rules: GatekeeperRules::default(),
            cache: None,
            events_out: None,
            session_id: String::new(),
        }
    }

    pub fn rules(&self) -> &GatekeeperRules {
        &self.inner.rules
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    pub fn report_stats(&self) {
        self.inner.stats.report();
    }

    pub fn cached_verdict(&self, url: &str) -> Option<Arc<Verdict>> {
        lock(&self.inner.cache).lookup(&normalize_url(url))
    }

    pub fn cache_len(&self) -> usize {
        lock(&self.inner.cache).len()
    }

    pub fn inflight_len(&self) -> usize {
        lock(&self.inner.inflight).len()
    }

    /// Decide one navigation. Never fails: scoring problems fail open.
    pub async fn handle_navigation(&self, event: &NavigationEvent) -> NavigationOutcome {
        let inner = &self.inner;
        inner.stats.record_navigation();

        if let Some(reason) = filter::screen(&inner.rules, event) {
            inner.stats.record_ignored();
            tracing::trace!(
                target: "phishshield.gatekeeper",
                tab_id = event.tab_id,
                url = %event.url,
                reason = ?reason,
                "navigation ignored"
            );
            return NavigationOutcome::Ignored(reason);
        }

        let key = normalize_url(&event.url);
        let outcome = match self.lookup_or_join(&key, &event.url) {
            Lookup::Hit(verdict) => {
                inner.stats.record_cache_hit();
                tracing::debug!(
                    target: "phishshield.gatekeeper",
                    tab_id = event.tab_id,
                    url = %event.url,
                    is_phishing = verdict.is_phishing,
                    "cache hit"
                );
                self.apply(event, verdict, VerdictSource::Cache).await
            }
            Lookup::Pending(pending) => match pending.await {
                Ok(verdict) => self.apply(event, verdict, VerdictSource::Scored).await,
                Err(e) => {
                    tracing::warn!(
                        target: "phishshield.gatekeeper",
                        tab_id = event.tab_id,
                        url = %event.url,
                        kind = e.kind(),
                        error = %e,
                        "scoring failed, allowing navigation"
                    );
                    NavigationOutcome::FailedOpen(e)
                }
            },
        };

        if let Some(tx) = &inner.events_out {
            tx.send_record(&DecisionRecord::new(&inner.session_id, event, &outcome))
                .await;
        }
        outcome
    }

    fn lookup_or_join(&self, key: &str, url: &str) -> Lookup {
        let inner = &self.inner;
        let mut inflight = lock(&inner.inflight);

        // Under the inflight lock a finished request is always visible in one
        // of the two maps: the fetch task fills the cache before it leaves
        // the inflight table.
        if let Some(verdict) = lock(&inner.cache).lookup(key) {
            return Lookup::Hit(verdict);
        }

        inner.stats.record_cache_miss();
        if let Some(pending) = inflight.get(key) {
            inner.stats.record_inflight_join();
            tracing::debug!(
                target: "phishshield.gatekeeper",
                url = %url,
                "joining in-flight scoring request"
            );
            return Lookup::Pending(pending.clone());
        }

        let pending = spawn_fetch(self.inner.clone(), key.to_string(), url.to_string());
        inflight.insert(key.to_string(), pending.clone());
        Lookup::Pending(pending)
    }

    async fn apply(
        &self,
        event: &NavigationEvent,
        verdict: Arc<Verdict>,
        source: VerdictSource,
    ) -> NavigationOutcome {
        let inner = &self.inner;
        if !verdict.is_phishing {
            return NavigationOutcome::Allowed { source, verdict };
        }

        let target = RedirectTarget::build(
            &inner.rules.block_page_url,
            &event.url,
            &verdict.reasons,
        )
        .to_url();

        if inner.rules.revalidate_tab {
            let current = inner.host.current_url(event.tab_id).await;
            let still_there = current
                .as_deref()
                .is_some_and(|c| normalize_url(c) == normalize_url(&event.url));
            if !still_there {
                inner.stats.record_superseded();
                tracing::info!(
                    target: "phishshield.gatekeeper",
                    tab_id = event.tab_id,
                    url = %event.url,
                    current = ?current,
                    "tab moved on before verdict, skipping redirect"
                );
                return NavigationOutcome::Superseded {
                    verdict,
                    current_url: current,
                };
            }
        }

        match inner.host.redirect_tab(event.tab_id, &target).await {
            Ok(()) => {
                inner.stats.record_redirect();
                tracing::warn!(
                    target: "phishshield.gatekeeper",
                    tab_id = event.tab_id,
                    url = %event.url,
                    score = verdict.score,
                    reasons = %verdict.joined_reasons(),
                    "phishing verdict, tab redirected to warning page"
                );
                NavigationOutcome::Redirected {
                    source,
                    verdict,
                    target,
                }
            }
            Err(e) => {
                tracing::error!(
                    target: "phishshield.gatekeeper",
                    tab_id = event.tab_id,
                    host = inner.host.name(),
                    error = %e,
                    "redirect failed"
                );
                NavigationOutcome::RedirectFailed {
                    verdict,
                    target,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Consume navigation events until the channel closes or the handle is
    /// stopped.
    pub fn start(self, events: mpsc::Receiver<NavigationEvent>) -> GatekeeperHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        tracing::info!(
            target: "phishshield.gatekeeper",
            session_id = %self.inner.session_id,
            scorer = self.inner.scorer.name(),
            host = self.inner.host.name(),
            block_page = %self.inner.rules.block_page_url,
            "gatekeeper started"
        );
        let gatekeeper = self.clone();
        let task = tokio::spawn(self.run(events, shutdown_rx));
        GatekeeperHandle {
            shutdown: Some(shutdown_tx),
            task,
            gatekeeper,
        }
    }

    async fn run(
        self,
        mut events: mpsc::Receiver<NavigationEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                ev = events.recv() => match ev {
                    Some(ev) => {
                        let gk = self.clone();
                        tasks.spawn(async move {
                            gk.handle_navigation(&ev).await;
                        });
                    }
                    None => break,
                },
                Some(res) = tasks.join_next(), if !tasks.is_empty() => log_join(res),
            }
        }

        events.close();
        while let Some(res) = tasks.join_next().await {
            log_join(res);
        }
        tracing::info!(
            target: "phishshield.gatekeeper",
            session_id = %self.inner.session_id,
            "gatekeeper stopped"
        );
    }
}

/// Running gatekeeper. Dropping the handle stops event intake.
pub struct GatekeeperHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    gatekeeper: Gatekeeper,
}

impl GatekeeperHandle {
    pub fn gatekeeper(&self) -> &Gatekeeper {
        &self.gatekeeper
    }

    /// Stop taking events and wait for navigations already being handled.
    pub async fn stop(mut self) -> StatsSnapshot {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.finish().await
    }

    /// Wait until the event channel is closed and drained.
    pub async fn join(mut self) -> StatsSnapshot {
        let _keep_running = self.shutdown.take();
        self.finish().await
    }

    async fn finish(self) -> StatsSnapshot {
        if let Err(e) = self.task.await {
            tracing::error!(target: "phishshield.gatekeeper", error = %e, "gatekeeper task failed");
        }
        self.gatekeeper.stats()
    }
}

fn spawn_fetch(inner: Arc<Inner>, key: String, url: String) -> InflightScore {
    let cleanup = inner.clone();
    let cleanup_key = key.clone();
    let handle = tokio::spawn(async move {
        inner.stats.record_scoring_request();
        let started = Instant::now();
        let result = inner.scorer.score(&url).await.map(Arc::new);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(verdict) => {
                let insert = lock(&inner.cache).insert(key.clone(), verdict.clone());
                let cache_state = match insert {
                    CacheInsert::Inserted => "inserted",
                    CacheInsert::Unchanged => "unchanged",
                    CacheInsert::Replaced => "replaced",
                };
                tracing::debug!(
                    target: "phishshield.scoring",
                    url = %url,
                    is_phishing = verdict.is_phishing,
                    score = verdict.score,
                    elapsed_ms,
                    cache = cache_state,
                    "url scored"
                );
            }
            Err(e) => {
                inner.stats.record_scoring_failure();
                tracing::debug!(
                    target: "phishshield.scoring",
                    url = %url,
                    kind = e.kind(),
                    elapsed_ms,
                    "scoring request failed"
                );
            }
        }

        lock(&inner.inflight).remove(&key);
        result
    });

    async move {
        handle.await.unwrap_or_else(|e| {
            // The task never reached its own cleanup.
            lock(&cleanup.inflight).remove(&cleanup_key);
            Err(ScoringError::network(format!("scoring task aborted: {e}")))
        })
    }
    .boxed()
    .shared()
}

fn log_join(res: Result<(), tokio::task::JoinError>) {
    if let Err(e) = res {
        tracing::error!(
            target: "phishshield.gatekeeper",
            error = %e,
            "navigation handler panicked"
        );
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
