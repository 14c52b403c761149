//! Content-addressed cache of flattened bill details.
//!
//! One JSON file per bill id, keyed by the upstream change hash. A cached
//! entry is valid only while the live master list still reports the same
//! hash; any read failure is a miss, never an abort.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use billtrack_core::BillDetail;

use crate::error::{io_err, ClientError};
use crate::stats::ClientStats;

#[derive(Debug, Serialize, Deserialize)]
struct CachedDetail {
    change_hash: String,
    detail: BillDetail,
}

pub struct DetailCache {
    dir: PathBuf,
    stats: Arc<ClientStats>,
}

impl DetailCache {
    pub fn new(dir: impl Into<PathBuf>, stats: Arc<ClientStats>) -> Self {
        DetailCache {
            dir: dir.into(),
            stats,
        }
    }

    fn entry_path(&self, bill_id: u64) -> PathBuf {
        self.dir.join(format!("{bill_id}.json"))
    }

    /// Cached detail for `bill_id`, only if stored under `current_hash`.
    pub fn get(&self, bill_id: u64, current_hash: &str) -> Option<BillDetail> {
        let hit = read_entry(&self.entry_path(bill_id))
            .filter(|entry| !current_hash.is_empty() && entry.change_hash == current_hash);
        match hit {
            Some(entry) => {
                self.stats.record_cache_hit();
                Some(entry.detail)
            }
            None => {
                self.stats.record_cache_miss();
                None
            }
        }
    }

    /// Store `detail` under `change_hash`, replacing any prior entry.
    pub fn put(
        &self,
        change_hash: &str,
        detail: &BillDetail,
    ) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let entry = CachedDetail {
            change_hash: change_hash.to_string(),
            detail: detail.clone(),
        };
        let path = self.entry_path(detail.bill_id);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(&entry)?;
        fs::write(&tmp, body).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
        Ok(())
    }
}

fn read_entry(path: &Path) -> Option<CachedDetail> {
    let body = fs::read(path).ok()?;
    serde_json::from_slice(&body).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn detail(bill_id: u64) -> BillDetail {
        BillDetail {
            bill_id,
            title: "An act".into(),
            url: "https://legiscan.test/OH/HB68".into(),
            sponsors: "Rep. A".into(),
            calendar: "".into(),
            history: "H 2025-01-10 Introduced".into(),
            pdf_links: "".into(),
            latest_action: Some("Introduced".into()),
            latest_action_date: Some("2025-01-10".into()),
        }
    }

    #[test]
    fn hit_requires_matching_hash() {
        let dir = TempDir::new().unwrap();
        let stats = Arc::new(ClientStats::default());
        let cache = DetailCache::new(dir.path(), stats.clone());

        cache.put("abc", &detail(42)).unwrap();
        assert_eq!(cache.get(42, "abc"), Some(detail(42)));
        assert_eq!(cache.get(42, "def"), None);
        assert_eq!(cache.get(99, "abc"), None);

        let snap = stats.snapshot();
        assert_eq!(snap.cache_hits, 1);
        assert_eq!(snap.cache_misses, 2);
    }

    #[test]
    fn empty_hash_never_hits() {
        let dir = TempDir::new().unwrap();
        let cache = DetailCache::new(dir.path(), Arc::new(ClientStats::default()));
        cache.put("", &detail(42)).unwrap();
        assert_eq!(cache.get(42, ""), None);
    }

    #[test]
    fn put_overwrites_prior_entry() {
        let dir = TempDir::new().unwrap();
        let cache = DetailCache::new(dir.path(), Arc::new(ClientStats::default()));
        cache.put("abc", &detail(42)).unwrap();
        let mut updated = detail(42);
        updated.history = "H 2025-02-01 Passed".into();
        cache.put("def", &updated).unwrap();
        assert_eq!(cache.get(42, "abc"), None);
        assert_eq!(cache.get(42, "def"), Some(updated));
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = DetailCache::new(dir.path(), Arc::new(ClientStats::default()));
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(dir.path().join("42.json"), b"{not json").unwrap();
        assert_eq!(cache.get(42, "abc"), None);
    }
}
