//! TTL caches for session and master-list payloads.
//!
//! Sessions change rarely (24h TTL by default); master lists move with the
//! legislative day (1h). Freshness is the cache file's mtime. A stale file
//! is still used when the live fetch fails, so a flaky upstream degrades to
//! slightly old data rather than an empty pass.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use billtrack_core::{states, Config, RawBill};

use crate::api::Session;
use crate::client::LegiScanClient;
use crate::error::{io_err, ClientError};

pub struct ListCache {
    dir: PathBuf,
    session_ttl: Duration,
    master_ttl: Duration,
}

impl ListCache {
    pub fn new(dir: impl Into<PathBuf>, session_ttl: Duration, master_ttl: Duration) -> Self {
        ListCache {
            dir: dir.into(),
            session_ttl,
            master_ttl,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(
            cfg.data_dir.join("lists"),
            cfg.session_cache_ttl,
            cfg.master_cache_ttl,
        )
    }

    fn sessions_path(&self) -> PathBuf {
        self.dir.join("sessions.json")
    }

    fn master_path(&self, state: &str, year: i32) -> PathBuf {
        self.dir.join(format!("{state}-{year}.json"))
    }

    /// All known sessions, from cache when fresh.
    pub fn sessions(&self, client: &LegiScanClient) -> Vec<Session> {
        let path = self.sessions_path();
        if is_fresh(&path, self.session_ttl) {
            if let Some(cached) = read_json::<Vec<Session>>(&path) {
                return cached;
            }
        }
        match client.session_list() {
            Some(live) => {
                if let Err(err) = self.write_json(&path, &live) {
                    tracing::warn!("failed to cache session list: {err}");
                }
                live
            }
            None => {
                // Stale beats empty when upstream is down.
                read_json::<Vec<Session>>(&path).unwrap_or_default()
            }
        }
    }

    /// Master lists for every state with a regular session covering `year`,
    /// keyed by full state name. A state whose list cannot be obtained is
    /// simply absent from the map.
    pub fn master_lists(
        &self,
        client: &LegiScanClient,
        year: i32,
    ) -> BTreeMap<String, Vec<RawBill>> {
        let mut out = BTreeMap::new();
        for session in self.sessions(client) {
            if !session.covers(year) {
                continue;
            }
            let Some(state) = states::state_for_id(session.state_id) else {
                tracing::warn!("unknown state id {} in session list", session.state_id);
                continue;
            };
            if out.contains_key(state) {
                continue;
            }
            if let Some(bills) = self.master_list_for(client, &session, state, year) {
                out.insert(state.to_string(), bills);
            }
        }
        out
    }

    fn master_list_for(
        &self,
        client: &LegiScanClient,
        session: &Session,
        state: &str,
        year: i32,
    ) -> Option<Vec<RawBill>> {
        let path = self.master_path(state, year);
        if is_fresh(&path, self.master_ttl) {
            if let Some(cached) = read_json::<Vec<RawBill>>(&path) {
                return Some(cached);
            }
        }
        match client.master_list(session.session_id) {
            Some(live) => {
                // A biennial session serves both of its years.
                for cache_year in [session.year_start, session.year_end] {
                    let target = self.master_path(state, cache_year);
                    if let Err(err) = self.write_json(&target, &live) {
                        tracing::warn!("failed to cache master list for {state}: {err}");
                    }
                }
                Some(live)
            }
            None => read_json::<Vec<RawBill>>(&path),
        }
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(value)?;
        fs::write(&tmp, body).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
        Ok(())
    }
}

fn is_fresh(path: &Path, ttl: Duration) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    match metadata.modified().and_then(|m| {
        m.elapsed()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }) {
        Ok(age) => age <= ttl,
        Err(_) => false,
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let body = fs::read(path).ok()?;
    serde_json::from_slice(&body).ok()
}
