//! Environment-driven runtime configuration.
//!
//! Mirrors the deployment contract: credentials and tuning knobs arrive as
//! environment variables (a `.env` file is loaded by the binaries before
//! this runs). `PRODUCTION=true` moves all persisted state under `/var/data`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{Datelike, Utc};

use crate::error::ConfigError;

/// Runtime configuration shared across the workspace.
#[derive(Debug, Clone)]
pub struct Config {
    /// LegiScan API key.
    pub legiscan_key: String,
    /// Root directory for caches, snapshots, and run state.
    pub data_dir: PathBuf,
    /// Minimum interval between upstream calls (0 = disabled).
    pub upstream_min_interval: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
    /// TTL for cached discovery-search pages.
    pub search_cache_ttl: Duration,
    /// TTL for the cached session list.
    pub session_cache_ttl: Duration,
    /// TTL for cached per-session master lists.
    pub master_cache_ttl: Duration,
    /// Whether NEW/CHANGED rows trigger social posts.
    pub social_enabled: bool,
    /// Minimum interval between social posts (persisted across restarts).
    pub social_min_interval: Duration,
    /// Interval between scheduled full passes.
    pub run_interval: Duration,
    /// HTTP bind address for the server surface.
    pub bind: String,
    /// Bearer token required by `/run` and `/stats` (None = rely on
    /// `allow_anonymous_api`).
    pub api_auth_token: Option<String>,
    pub allow_anonymous_api: bool,
    /// Tracking years, explicit or discovered from `gsheet_key_<year>` vars.
    pub years: Vec<i32>,
    /// Spreadsheet key per tracking year.
    sheet_keys: HashMap<i32, String>,
    /// OAuth bearer token for the Google Sheets API.
    pub gsheets_token: Option<String>,
    pub bluesky_identifier: Option<String>,
    pub bluesky_password: Option<String>,
    pub bluesky_service: String,
    pub mailersend_api_key: Option<String>,
    /// Recipients of the new-bill / change digests.
    pub alert_recipients: Vec<String>,
    /// Recipients of the dev error report.
    pub dev_recipients: Vec<String>,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Spreadsheet key for a tracking year.
    pub fn sheet_key(&self, year: i32) -> Result<&str, ConfigError> {
        self.sheet_keys
            .get(&year)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::MissingEnv {
                name: format!("gsheet_key_{year}"),
            })
    }

    /// Read configuration from an explicit variable set; [`Config::from_env`]
    /// is the production path.
    pub fn from_vars(
        vars: impl Iterator<Item = (String, String)>,
    ) -> Result<Self, ConfigError> {
        let env: HashMap<String, String> = vars.collect();

        let legiscan_key = env
            .get("legiscan_key")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv {
                name: "legiscan_key".into(),
            })?;

        let production = parse_bool(env.get("PRODUCTION"), false);
        let data_dir = match env.get("DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None if production => PathBuf::from("/var/data"),
            None => PathBuf::from("cache"),
        };

        let mut sheet_keys = HashMap::new();
        for (key, value) in &env {
            if let Some(year) = key
                .strip_prefix("gsheet_key_")
                .and_then(|y| (y.len() == 4).then(|| y.parse::<i32>().ok()).flatten())
            {
                sheet_keys.insert(year, value.clone());
            }
        }

        let years = tracker_years(env.get("TRACKER_YEARS"), &sheet_keys);

        Ok(Config {
            legiscan_key,
            data_dir,
            upstream_min_interval: secs_f64(&env, "LEGISCAN_MIN_INTERVAL", 0.0)?,
            request_timeout: secs_f64(&env, "REQUEST_TIMEOUT", 30.0)?,
            search_cache_ttl: secs_u64(&env, "SEARCH_CACHE_TTL", 3600)?,
            session_cache_ttl: secs_u64(&env, "SESSION_CACHE_TTL", 24 * 60 * 60)?,
            master_cache_ttl: secs_u64(&env, "MASTER_CACHE_TTL", 60 * 60)?,
            social_enabled: parse_bool(env.get("SOCIAL_ENABLED"), true),
            social_min_interval: secs_u64(&env, "SOCIAL_MIN_INTERVAL", 60)?,
            run_interval: secs_u64(&env, "RUN_INTERVAL_SECS", 15 * 60)?,
            bind: env
                .get("BILLTRACK_BIND")
                .cloned()
                .unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            api_auth_token: env.get("API_AUTH_TOKEN").cloned().filter(|t| !t.is_empty()),
            allow_anonymous_api: parse_bool(env.get("API_ALLOW_ANONYMOUS"), false),
            years,
            sheet_keys,
            gsheets_token: env.get("GSHEETS_TOKEN").cloned(),
            bluesky_identifier: env.get("BSKY_IDENTIFIER").cloned(),
            bluesky_password: env.get("BSKY_PASSWORD").cloned(),
            bluesky_service: env
                .get("BSKY_SERVICE")
                .cloned()
                .unwrap_or_else(|| "https://bsky.social".to_string()),
            mailersend_api_key: env.get("MAILERSEND_API_KEY").cloned(),
            alert_recipients: recipients(env.get("ALERT_RECIPIENTS")),
            dev_recipients: recipients(env.get("DEV_RECIPIENTS")),
        })
    }
}

fn parse_bool(value: Option<&String>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
    }
}

fn secs_f64(
    env: &HashMap<String, String>,
    name: &str,
    default: f64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = env.get(name) else {
        return Ok(Duration::from_secs_f64(default));
    };
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| *v >= 0.0 && v.is_finite())
        .map(Duration::from_secs_f64)
        .ok_or_else(|| ConfigError::InvalidEnv {
            name: name.to_string(),
            value: raw.clone(),
        })
}

fn secs_u64(
    env: &HashMap<String, String>,
    name: &str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = env.get(name) else {
        return Ok(Duration::from_secs(default));
    };
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::InvalidEnv {
            name: name.to_string(),
            value: raw.clone(),
        })
}

fn tracker_years(explicit: Option<&String>, sheet_keys: &HashMap<i32, String>) -> Vec<i32> {
    if let Some(raw) = explicit {
        let mut years: Vec<i32> = raw
            .split(',')
            .filter_map(|part| part.trim().parse::<i32>().ok())
            .collect();
        if !years.is_empty() {
            years.sort_unstable();
            years.dedup();
            return years;
        }
    }
    if !sheet_keys.is_empty() {
        let mut years: Vec<i32> = sheet_keys.keys().copied().collect();
        years.sort_unstable();
        return years;
    }
    vec![Utc::now().year()]
}

fn recipients(raw: Option<&String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_vars() -> Vec<(String, String)> {
        vec![("legiscan_key".to_string(), "k".to_string())]
    }

    fn config_with(extra: &[(&str, &str)]) -> Config {
        let mut vars = base_vars();
        vars.extend(
            extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        Config::from_vars(vars.into_iter()).unwrap()
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let err = Config::from_vars(std::iter::empty()).unwrap_err();
        assert!(err.to_string().contains("legiscan_key"));
    }

    #[test]
    fn defaults_apply() {
        let cfg = config_with(&[]);
        assert_eq!(cfg.upstream_min_interval, Duration::ZERO);
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.run_interval, Duration::from_secs(900));
        assert!(cfg.social_enabled);
        assert!(!cfg.allow_anonymous_api);
        assert_eq!(cfg.data_dir, PathBuf::from("cache"));
    }

    #[test]
    fn production_moves_data_dir() {
        let cfg = config_with(&[("PRODUCTION", "true")]);
        assert_eq!(cfg.data_dir, PathBuf::from("/var/data"));
    }

    #[test]
    fn years_discovered_from_sheet_keys() {
        let cfg = config_with(&[("gsheet_key_2025", "a"), ("gsheet_key_2026", "b")]);
        assert_eq!(cfg.years, vec![2025, 2026]);
        assert_eq!(cfg.sheet_key(2025).unwrap(), "a");
        assert!(cfg.sheet_key(2024).is_err());
    }

    #[test]
    fn explicit_years_override_discovery() {
        let cfg = config_with(&[
            ("TRACKER_YEARS", "2026, 2025, 2026"),
            ("gsheet_key_2023", "x"),
        ]);
        assert_eq!(cfg.years, vec![2025, 2026]);
    }

    #[test]
    fn invalid_interval_is_rejected() {
        let mut vars = base_vars();
        vars.push(("LEGISCAN_MIN_INTERVAL".into(), "soon".into()));
        let err = Config::from_vars(vars.into_iter()).unwrap_err();
        assert!(err.to_string().contains("LEGISCAN_MIN_INTERVAL"));
    }

    #[test]
    fn recipients_parse_as_csv() {
        let cfg = config_with(&[("ALERT_RECIPIENTS", "a@x.test, b@x.test,,")]);
        assert_eq!(cfg.alert_recipients, vec!["a@x.test", "b@x.test"]);
    }
}
