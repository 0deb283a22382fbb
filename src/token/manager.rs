use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::token::TokenConfig;
use crate::graph::GraphClient;
use crate::helpers::time::{get_instant, now_u64};
use crate::observability::metrics::{get_metrics, Metrics};
use crate::token::credential::{Credential, Identity};
use crate::token::error::TokenError;
use crate::token::probe::probe;
use crate::token::store::EnvFileStore;
use crate::token::strategy::{AcquireContext, Strategy};

/// Phases of one `get_valid_token` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    /// cache hit inside the refresh window, not yet re-validated
    Fresh,
    /// probe of the cached token in flight
    Validating,
    /// running the strategy chain
    Acquiring,
    /// writing the new credential to the env file
    Persisting,
    /// acquisition failed, serving the last known value
    StaleFallback,
}

impl RefreshPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshPhase::Fresh => "fresh",
            RefreshPhase::Validating => "validating",
            RefreshPhase::Acquiring => "acquiring",
            RefreshPhase::Persisting => "persisting",
            RefreshPhase::StaleFallback => "stale_fallback",
        }
    }
}

/// What a resolution produced.
#[derive(Debug, Clone)]
pub enum TokenOutcome {
    /// cached credential, confirmed live
    Cached(Credential),
    /// freshly acquired credential, confirmed live
    Minted(Credential),
    /// nothing live could be obtained; best known value, possibly expired
    Stale(Option<Credential>),
}

impl TokenOutcome {
    pub fn credential(&self) -> Option<&Credential> {
        match self {
            TokenOutcome::Cached(c) | TokenOutcome::Minted(c) => Some(c),
            TokenOutcome::Stale(c) => c.as_ref(),
        }
    }

    pub fn into_credential(self) -> Option<Credential> {
        match self {
            TokenOutcome::Cached(c) | TokenOutcome::Minted(c) => Some(c),
            TokenOutcome::Stale(c) => c,
        }
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, TokenOutcome::Stale(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            TokenOutcome::Cached(_) => "cached",
            TokenOutcome::Minted(_) => "minted",
            TokenOutcome::Stale(Some(_)) => "stale",
            TokenOutcome::Stale(None) => "none",
        }
    }
}

#[derive(Debug, Default)]
struct ManagerState {
    cached: Option<Credential>,
    last_refresh_unix: u64,
    last_outcome: Option<TokenOutcome>,
}

/// Owner of the page credential.
///
/// Cache is a candidate, not the truth: inside the refresh window a cached
/// token is still probed before it is handed out, and a failed probe always
/// sends the call into acquisition. Calls are serialized; a caller that waited
/// while another call resolved takes that result instead of starting its own.
pub struct TokenManager {
    graph: GraphClient,
    identity: Identity,
    store: EnvFileStore,
    refresh_interval_seconds: u64,
    state: Mutex<ManagerState>,
    generation: AtomicU64,
}

impl TokenManager {
    pub fn new(
        graph: GraphClient,
        identity: Identity,
        store: EnvFileStore,
        refresh_interval_seconds: u64,
    ) -> Self {
        Self {
            graph,
            identity,
            store,
            refresh_interval_seconds,
            state: Mutex::new(ManagerState::default()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(graph: GraphClient, cfg: &TokenConfig) -> Self {
        Self::new(
            graph,
            Identity::from_config(cfg),
            EnvFileStore::new(&cfg.env_file, cfg.env_key.clone()),
            cfg.refresh_interval_seconds,
        )
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_seconds)
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// A credential to call the Graph API with.
    ///
    /// Returns `None` only when nothing was ever known: no cached token and no
    /// configured page token.
    pub async fn get_valid_token(&self) -> Option<Credential> {
        self.resolve(false).await.into_credential()
    }

    /// Run acquisition regardless of the cache.
    pub async fn force_refresh(&self) -> TokenOutcome {
        self.resolve(true).await
    }

    async fn resolve(&self, force: bool) -> TokenOutcome {
        let metrics = get_metrics().await;
        let start = get_instant();
        let observed = self.generation.load(Ordering::Acquire);

        let mut state = self.state.lock().await;

        if !force && self.generation.load(Ordering::Acquire) != observed {
            if let Some(outcome) = state.last_outcome.clone() {
                debug!("token resolved by a concurrent call ({})", outcome.label());
                return outcome;
            }
        }

        let outcome = self.run_pipeline(metrics, &mut state, force).await;

        state.last_outcome = Some(outcome.clone());
        self.generation.fetch_add(1, Ordering::AcqRel);
        metrics
            .token_refresh_duration
            .with_label_values(&[outcome.label()])
            .observe(start.elapsed().as_secs_f64());
        outcome
    }

    async fn run_pipeline(
        &self,
        metrics: &Metrics,
        state: &mut ManagerState,
        force: bool,
    ) -> TokenOutcome {
        let now = now_u64();

        if !force {
            if let Some(cached) = state.cached.clone() {
                if now.saturating_sub(state.last_refresh_unix) < self.refresh_interval_seconds {
                    enter(metrics, RefreshPhase::Fresh);
                    enter(metrics, RefreshPhase::Validating);
                    if probe(&self.graph, cached.secret(), "cached").await.live {
                        return TokenOutcome::Cached(cached);
                    }
                    info!("cached token failed its probe inside the refresh window");
                }
            }
        }

        enter(metrics, RefreshPhase::Acquiring);
        info!("generating fresh page token...");

        let known = state
            .cached
            .clone()
            .or_else(|| self.identity.page_token.clone());
        let ctx = AcquireContext {
            graph: &self.graph,
            identity: &self.identity,
            known_page_token: known.as_ref(),
        };

        for strategy in Strategy::ORDER {
            let candidate = match strategy.acquire(&ctx).await {
                Ok(candidate) => candidate,
                Err(TokenError::ConfigMissing(what)) => {
                    info!("{} skipped: {} not configured", strategy, what);
                    count_attempt(metrics, strategy, "skipped");
                    continue;
                }
                Err(e) => {
                    warn!("{} failed: {}", strategy, e);
                    count_attempt(metrics, strategy, e.kind());
                    continue;
                }
            };

            if !probe(&self.graph, candidate.secret(), "minted").await.live {
                warn!("token from {} failed validation", strategy);
                count_attempt(metrics, strategy, "rejected");
                return stale_fallback(metrics, state, &self.identity);
            }
            count_attempt(metrics, strategy, "minted");

            enter(metrics, RefreshPhase::Persisting);
            if let Err(e) = self.store.persist(candidate.secret()).await {
                error!("{}", e);
                metrics.token_persist_failures.inc();
            }

            state.cached = Some(candidate.clone());
            state.last_refresh_unix = now;
            metrics.token_last_refresh_unix.set(now as i64);
            info!("fresh page token {} generated and validated via {}", candidate.preview(), strategy);
            return TokenOutcome::Minted(candidate);
        }

        stale_fallback(metrics, state, &self.identity)
    }
}

fn stale_fallback(metrics: &Metrics, state: &ManagerState, identity: &Identity) -> TokenOutcome {
    enter(metrics, RefreshPhase::StaleFallback);
    let fallback = state
        .cached
        .clone()
        .or_else(|| identity.page_token.clone());
    match &fallback {
        Some(c) => warn!("failed to get valid token, serving last known {}", c.preview()),
        None => error!("failed to get valid token and no page token is known"),
    }
    TokenOutcome::Stale(fallback)
}

fn enter(metrics: &Metrics, phase: RefreshPhase) {
    debug!("token phase: {}", phase.as_str());
    metrics
        .token_refresh_phases
        .with_label_values(&[phase.as_str()])
        .inc();
}

fn count_attempt(metrics: &Metrics, strategy: Strategy, result: &str) {
    metrics
        .token_strategy_attempts
        .with_label_values(&[strategy.as_str(), result])
        .inc();
}
