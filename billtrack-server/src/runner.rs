//! Composition root: wires the live LegiScan client, Google Sheets stores,
//! and notification channels into one full pass over every tracked
//! worksheet, then sends the email digests.

use std::sync::Arc;
use std::time::Duration;

use billtrack_client::{ClientStats, DetailCache, LegiScanClient, ListCache, SearchCache};
use billtrack_core::{BillDetail, Config, ConfigError, RawBill};
use billtrack_notify::{BlueskyPoster, Mailer, PersistedThrottle};
use billtrack_sheets::GoogleSheets;
use billtrack_sync::{
    DetailSource, MasterSource, ReconciliationReport, SearchSource, SocialPoster, Syncer,
    RunStateStore, SnapshotStore, SyncError,
};

// ---------------------------------------------------------------------------
// Live adapters
// ---------------------------------------------------------------------------

pub struct LiveMaster<'a> {
    client: &'a LegiScanClient,
    cache: ListCache,
}

impl MasterSource for LiveMaster<'_> {
    fn master_lists(&self, year: i32) -> std::collections::BTreeMap<String, Vec<RawBill>> {
        self.cache.master_lists(self.client, year)
    }
}

pub struct LiveDetails<'a> {
    client: &'a LegiScanClient,
    cache: DetailCache,
}

impl DetailSource for LiveDetails<'_> {
    fn bill_detail(&self, bill_id: u64, change_hash: &str) -> Option<BillDetail> {
        if let Some(cached) = self.cache.get(bill_id, change_hash) {
            return Some(cached);
        }
        let detail = self.client.bill_detail(bill_id)?;
        if let Err(err) = self.cache.put(change_hash, &detail) {
            tracing::warn!("detail cache write failed for bill {bill_id}: {err}");
        }
        Some(detail)
    }
}

/// Live search backed by the TTL page cache; used by the discovery CLI.
pub struct LiveSearch<'a> {
    pub client: &'a LegiScanClient,
    pub cache: SearchCache,
}

impl SearchSource for LiveSearch<'_> {
    fn page(&self, term: &str, page: u32) -> Option<billtrack_client::SearchPage> {
        self.cache.page(self.client, term, page)
    }
}

impl<'a> LiveSearch<'a> {
    pub fn new(cfg: &Config, client: &'a LegiScanClient) -> Self {
        LiveSearch {
            client,
            cache: SearchCache::from_config(cfg),
        }
    }
}

/// Social channel selected from configuration.
pub enum SocialChannel {
    Live {
        poster: BlueskyPoster,
        throttle: PersistedThrottle,
    },
    Disabled,
}

impl SocialChannel {
    fn from_config(cfg: &Config) -> Self {
        if !cfg.social_enabled {
            return SocialChannel::Disabled;
        }
        match (&cfg.bluesky_identifier, &cfg.bluesky_password) {
            (Some(identifier), Some(password)) => SocialChannel::Live {
                poster: BlueskyPoster::new(&cfg.bluesky_service, identifier, password),
                throttle: PersistedThrottle::new(
                    cfg.data_dir.join("last_post"),
                    cfg.social_min_interval,
                ),
            },
            _ => {
                tracing::warn!("social posting enabled but Bluesky credentials are missing");
                SocialChannel::Disabled
            }
        }
    }
}

impl SocialPoster for SocialChannel {
    fn post(&self, text: &str) -> Result<(), String> {
        match self {
            SocialChannel::Disabled => Ok(()),
            SocialChannel::Live { poster, throttle } => {
                throttle.wait_and_mark().map_err(|e| e.to_string())?;
                poster.post(text).map_err(|e| e.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Full pass
// ---------------------------------------------------------------------------

/// Run one full pass over every configured year and worksheet, then send
/// the email digests. Never panics; every failure lands in the report.
pub fn run_full_pass(cfg: &Config, stats: Arc<ClientStats>) -> ReconciliationReport {
    let client = LegiScanClient::from_config(cfg, stats.clone());
    let master = LiveMaster {
        client: &client,
        cache: ListCache::from_config(cfg),
    };
    let details = LiveDetails {
        client: &client,
        cache: DetailCache::new(cfg.data_dir.join("details"), stats),
    };
    let social = SocialChannel::from_config(cfg);
    let snapshots = SnapshotStore::new(&cfg.data_dir);
    let run_states = RunStateStore::new(&cfg.data_dir);

    let syncer = Syncer {
        master: &master,
        details: &details,
        social: &social,
        snapshots: &snapshots,
        run_states: &run_states,
    };

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(60))
        .build();
    let report = syncer.run_all(&cfg.years, |year, spec| {
        let token = cfg.gsheets_token.as_deref().ok_or_else(|| {
            SyncError::Config(ConfigError::MissingEnv {
                name: "GSHEETS_TOKEN".into(),
            })
        })?;
        let key = cfg.sheet_key(year).map_err(SyncError::Config)?;
        Ok(Box::new(GoogleSheets::open(
            agent.clone(),
            token,
            key,
            spec.name,
        )))
    });

    send_digests(cfg, &report);
    report
}

fn send_digests(cfg: &Config, report: &ReconciliationReport) {
    let Some(api_key) = cfg.mailersend_api_key.as_deref() else {
        if !report.is_empty() {
            tracing::info!("email digests disabled; skipping send");
        }
        return;
    };
    let mailer = Mailer::new(api_key, "tracker@translegislation.tech");

    if !report.new_bills.is_empty() || !report.history_changes.is_empty() {
        let subject = format!(
            "Bill tracker: {} new, {} changed",
            report.new_bills.len(),
            report.history_changes.len()
        );
        let mut body = String::new();
        for alert in report.new_bills.iter().chain(&report.history_changes) {
            body.push_str(alert);
            body.push_str("\n\n");
        }
        if let Err(err) = mailer.send(&cfg.alert_recipients, &subject, &body) {
            tracing::error!("alert digest failed: {err}");
        }
    }

    if !report.dev_errors.is_empty() {
        let subject = format!("Bill tracker errors: {}", report.dev_errors.len());
        let body = report.dev_errors.join("\n");
        if let Err(err) = mailer.send(&cfg.dev_recipients, &subject, &body) {
            tracing::error!("dev digest failed: {err}");
        }
    }
}
