//! # billtrack-server
//!
//! HTTP surface and scheduler around the sync pipeline.
//!
//! Routes: `GET /health` (always open), `GET /stats`, `GET|POST /run`
//! (both bearer-authed). A process-wide busy flag serializes runs; the
//! scheduler and `/run` share it, so overlapping passes are impossible.

pub mod error;
pub mod runner;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;

use billtrack_client::ClientStats;
use billtrack_core::Config;
use billtrack_sync::ReconciliationReport;

pub use error::ServerError;
pub use runner::run_full_pass;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Outcome summary of the most recent completed run.
#[derive(Debug, Clone, Serialize)]
pub struct LastRun {
    pub finished_at: DateTime<Utc>,
    pub new_bills: usize,
    pub history_changes: usize,
    pub dev_errors: usize,
}

impl LastRun {
    fn from_report(report: &ReconciliationReport) -> Self {
        LastRun {
            finished_at: Utc::now(),
            new_bills: report.new_bills.len(),
            history_changes: report.history_changes.len(),
            dev_errors: report.dev_errors.len(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<Config>,
    stats: Arc<ClientStats>,
    busy: Arc<AtomicBool>,
    last_run: Arc<RwLock<Option<LastRun>>>,
}

impl AppState {
    pub fn new(cfg: Config) -> Self {
        AppState {
            cfg: Arc::new(cfg),
            stats: Arc::new(ClientStats::default()),
            busy: Arc::new(AtomicBool::new(false)),
            last_run: Arc::new(RwLock::new(None)),
        }
    }

    /// Run one pass unless another is already in flight.
    async fn try_run(&self) -> Result<LastRun, StatusCode> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(StatusCode::CONFLICT);
        }
        let cfg = self.cfg.clone();
        let stats = self.stats.clone();
        let result = tokio::task::spawn_blocking(move || run_full_pass(&cfg, stats)).await;
        self.busy.store(false, Ordering::SeqCst);
        match result {
            Ok(report) => {
                let summary = LastRun::from_report(&report);
                *self.last_run.write().await = Some(summary.clone());
                Ok(summary)
            }
            Err(err) => {
                tracing::error!("run task panicked: {err}");
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Bearer-token check for the mutating/introspective routes.
fn authorized(cfg: &Config, headers: &HeaderMap) -> bool {
    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match (&cfg.api_auth_token, presented) {
        (Some(expected), Some(token)) => expected == token,
        (Some(_), None) => false,
        (None, _) => cfg.allow_anonymous_api,
    }
}

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/run", get(run).post(run))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, StatusCode> {
    if !authorized(&state.cfg, &headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    let last_run = state.last_run.read().await.clone();
    Ok(Json(json!({
        "client": state.stats.snapshot(),
        "last_run": last_run,
        "busy": state.busy.load(Ordering::SeqCst),
    })))
}

async fn run(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<LastRun>, StatusCode> {
    if !authorized(&state.cfg, &headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    state.try_run().await.map(Json)
}

// ---------------------------------------------------------------------------
// Scheduler + serve
// ---------------------------------------------------------------------------

async fn scheduler(state: AppState) {
    let mut ticker = tokio::time::interval(state.cfg.run_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; run once on startup.
    loop {
        ticker.tick().await;
        match state.try_run().await {
            Ok(summary) => tracing::info!(
                new = summary.new_bills,
                changed = summary.history_changes,
                errors = summary.dev_errors,
                "scheduled pass complete"
            ),
            Err(StatusCode::CONFLICT) => {
                tracing::warn!("scheduled pass skipped; a run is already in flight")
            }
            Err(code) => tracing::error!("scheduled pass failed with {code}"),
        }
    }
}

pub async fn serve(cfg: Config) -> Result<(), ServerError> {
    let bind = cfg.bind.clone();
    let state = AppState::new(cfg);
    tokio::spawn(scheduler(state.clone()));

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|source| ServerError::Bind { addr: bind.clone(), source })?;
    tracing::info!("listening on http://{bind}");
    axum::serve(listener, app)
        .await
        .map_err(ServerError::Runtime)?;
    Ok(())
}

/// Build a runtime and serve until shutdown; the blocking entry point the
/// CLI uses.
pub fn serve_blocking(cfg: Config) -> Result<(), ServerError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ServerError::Runtime)?;
    runtime.block_on(serve(cfg))
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
