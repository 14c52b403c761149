//! TTL cache for discovery-search pages.
//!
//! Pages are keyed by a digest of `term|page` so arbitrary query text maps
//! to a safe file name. Freshness is the file's mtime against the
//! configured TTL.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};

use billtrack_core::Config;

use crate::api::SearchPage;
use crate::client::LegiScanClient;
use crate::error::{io_err, ClientError};

pub struct SearchCache {
    dir: PathBuf,
    ttl: Duration,
}

impl SearchCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        SearchCache {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.data_dir.join("search"), cfg.search_cache_ttl)
    }

    fn page_path(&self, term: &str, page: u32) -> PathBuf {
        let digest = Sha256::digest(format!("{term}|{page}").as_bytes());
        self.dir.join(format!("{}.json", hex::encode(digest)))
    }

    /// One page of search results for `term`, from cache when fresh.
    /// `None` when upstream is unavailable and no cached page exists.
    pub fn page(&self, client: &LegiScanClient, term: &str, page: u32) -> Option<SearchPage> {
        let path = self.page_path(term, page);
        if is_fresh(&path, self.ttl) {
            if let Some(cached) = read_page(&path) {
                return Some(cached);
            }
        }
        match client.search_page(term, page) {
            Some(live) => {
                if let Err(err) = self.write_page(&path, &live) {
                    tracing::warn!("failed to cache search page for '{term}': {err}");
                }
                Some(live)
            }
            None => read_page(&path),
        }
    }

    fn write_page(&self, path: &Path, page: &SearchPage) -> Result<(), ClientError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(page)?;
        fs::write(&tmp, body).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
        Ok(())
    }
}

fn is_fresh(path: &Path, ttl: Duration) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    matches!(
        metadata.modified().map(|m| m.elapsed()),
        Ok(Ok(age)) if age <= ttl
    )
}

fn read_page(path: &Path) -> Option<SearchPage> {
    let body = fs::read(path).ok()?;
    serde_json::from_slice(&body).ok()
}
