//! Discovery: find untracked bills via full-text search.
//!
//! Search hits are filtered against what the tracker already knows (bill id
//! first, then state + normalized number) and against a human-maintained
//! ignore list, then deduplicated by bill id. Discovery never writes to the
//! sheet; it surfaces candidates for a human to add.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use billtrack_client::{SearchHit, SearchPage};
use billtrack_core::normalize::{normalize_bill_number, strip_session_prefix};
use billtrack_core::{states, TrackedBill};

use crate::error::{io_err, SyncError};

/// Cap on pages walked per term; LegiScan search can report thousands.
pub const MAX_SEARCH_PAGES: u32 = 20;

/// One page of search results, injected so tests stay offline.
pub trait SearchSource {
    fn page(&self, term: &str, page: u32) -> Option<SearchPage>;
}

// ---------------------------------------------------------------------------
// Known bills
// ---------------------------------------------------------------------------

/// Identity sets built from the tracked snapshots.
#[derive(Debug, Default)]
pub struct KnownBills {
    ids: HashSet<u64>,
    keys: HashSet<(String, String)>,
}

impl KnownBills {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a TrackedBill>) -> Self {
        let mut known = KnownBills::default();
        for row in rows {
            known.add(row);
        }
        known
    }

    pub fn add(&mut self, row: &TrackedBill) {
        if let Some(bill_id) = row.bill_id {
            self.ids.insert(bill_id);
        }
        let state = row.state.trim().to_string();
        if state.is_empty() {
            return;
        }
        let normalized = normalize_bill_number(&row.number);
        if normalized.is_empty() {
            return;
        }
        let stripped = strip_session_prefix(&normalized).to_string();
        self.keys.insert((state.clone(), normalized));
        self.keys.insert((state, stripped));
    }

    /// Whether a search hit matches a tracked row.
    pub fn contains(&self, hit: &SearchHit) -> bool {
        if self.ids.contains(&hit.bill_id) {
            return true;
        }
        let Some(state) = states::state_for_abbrev(&hit.state) else {
            return false;
        };
        let normalized = normalize_bill_number(&hit.bill_number);
        self.keys.contains(&(state.to_string(), normalized.clone()))
            || self
                .keys
                .contains(&(state.to_string(), strip_session_prefix(&normalized).to_string()))
    }
}

// ---------------------------------------------------------------------------
// Ignore list
// ---------------------------------------------------------------------------

/// Bills a human has decided are out of scope; persisted as JSON.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IgnoreList {
    #[serde(default)]
    bill_ids: HashSet<u64>,
}

impl IgnoreList {
    /// Load the list; a missing file is an empty list.
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        match fs::read(path) {
            Ok(body) => Ok(serde_json::from_slice(&body)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(IgnoreList::default()),
            Err(err) => Err(io_err(path, err)),
        }
    }

    pub fn default_path(data_dir: &Path) -> PathBuf {
        data_dir.join("ignore_list.json")
    }

    pub fn contains(&self, bill_id: u64) -> bool {
        self.bill_ids.contains(&bill_id)
    }

    pub fn insert(&mut self, bill_id: u64) {
        self.bill_ids.insert(bill_id);
    }

    pub fn save(&self, path: &Path) -> Result<(), SyncError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(self)?;
        fs::write(&tmp, body).map_err(|e| io_err(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Discovery walk
// ---------------------------------------------------------------------------

/// Walk the paged results for each term and return candidate hits the
/// tracker does not know yet, deduplicated by bill id.
pub fn discover(
    search: &impl SearchSource,
    terms: &[String],
    known: &KnownBills,
    ignore: &IgnoreList,
) -> Vec<SearchHit> {
    let mut seen: HashSet<u64> = HashSet::new();
    let mut candidates = Vec::new();
    for term in terms {
        let mut page_number = 1;
        loop {
            let Some(page) = search.page(term, page_number) else {
                tracing::warn!("search for '{term}' page {page_number} unavailable");
                break;
            };
            for hit in page.hits {
                if ignore.contains(hit.bill_id) || known.contains(&hit) {
                    continue;
                }
                if seen.insert(hit.bill_id) {
                    candidates.push(hit);
                }
            }
            if page_number >= page.page_total || page_number >= MAX_SEARCH_PAGES {
                break;
            }
            page_number += 1;
        }
    }
    candidates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use billtrack_core::Enrichment;
    use tempfile::TempDir;

    struct FixtureSearch {
        pages: HashMap<(String, u32), SearchPage>,
    }

    impl SearchSource for FixtureSearch {
        fn page(&self, term: &str, page: u32) -> Option<SearchPage> {
            self.pages.get(&(term.to_string(), page)).cloned()
        }
    }

    fn hit(bill_id: u64, state: &str, number: &str) -> SearchHit {
        SearchHit {
            bill_id,
            state: state.into(),
            bill_number: number.into(),
            change_hash: "h".into(),
            title: "An act".into(),
            url: "https://legiscan.test".into(),
            last_action: "Introduced".into(),
            last_action_date: Some("2025-01-10".into()),
            relevance: Some(50),
        }
    }

    fn tracked(state: &str, number: &str, bill_id: Option<u64>) -> TrackedBill {
        TrackedBill {
            state: state.into(),
            number: number.into(),
            bill_type: String::new(),
            status: String::new(),
            date: String::new(),
            summary: String::new(),
            change_hash: "abc".into(),
            bill_id,
            sponsors: Enrichment::Absent,
            calendar: Enrichment::Absent,
            history: Enrichment::Absent,
            pdf_links: Enrichment::Absent,
            url: String::new(),
        }
    }

    fn one_page(term: &str, hits: Vec<SearchHit>) -> FixtureSearch {
        let mut pages = HashMap::new();
        pages.insert(
            (term.to_string(), 1),
            SearchPage {
                hits,
                page: 1,
                page_total: 1,
            },
        );
        FixtureSearch { pages }
    }

    #[test]
    fn known_by_bill_id_is_filtered() {
        let rows = [tracked("Ohio", "HB999", Some(42))];
        let known = KnownBills::from_rows(&rows);
        let search = one_page("term", vec![hit(42, "OH", "HB68"), hit(7, "TX", "SB1")]);
        let found = discover(
            &search,
            &["term".to_string()],
            &known,
            &IgnoreList::default(),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].bill_id, 7);
    }

    #[test]
    fn known_by_state_and_number_is_filtered() {
        // Sheet row has no bill id yet; the hyperlinked number still matches.
        let rows = [tracked(
            "Ohio",
            r#"=HYPERLINK("https://x.test","HB 68")"#,
            None,
        )];
        let known = KnownBills::from_rows(&rows);
        let search = one_page("term", vec![hit(42, "OH", "HB68")]);
        let found = discover(
            &search,
            &["term".to_string()],
            &known,
            &IgnoreList::default(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn session_prefixed_hit_matches_plain_tracked_number() {
        let rows = [tracked("Ohio", "HB68", None)];
        let known = KnownBills::from_rows(&rows);
        let search = one_page("term", vec![hit(42, "OH", "X2HB68")]);
        let found = discover(
            &search,
            &["term".to_string()],
            &known,
            &IgnoreList::default(),
        );
        assert!(found.is_empty());
    }

    #[test]
    fn ignored_bills_are_dropped() {
        let known = KnownBills::default();
        let mut ignore = IgnoreList::default();
        ignore.insert(42);
        let search = one_page("term", vec![hit(42, "OH", "HB68")]);
        let found = discover(&search, &["term".to_string()], &known, &ignore);
        assert!(found.is_empty());
    }

    #[test]
    fn duplicate_hits_across_terms_collapse() {
        let mut pages = HashMap::new();
        pages.insert(
            ("a".to_string(), 1),
            SearchPage {
                hits: vec![hit(42, "OH", "HB68")],
                page: 1,
                page_total: 1,
            },
        );
        pages.insert(
            ("b".to_string(), 1),
            SearchPage {
                hits: vec![hit(42, "OH", "HB68")],
                page: 1,
                page_total: 1,
            },
        );
        let search = FixtureSearch { pages };
        let found = discover(
            &search,
            &["a".to_string(), "b".to_string()],
            &KnownBills::default(),
            &IgnoreList::default(),
        );
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn walks_all_reported_pages() {
        let mut pages = HashMap::new();
        pages.insert(
            ("term".to_string(), 1),
            SearchPage {
                hits: vec![hit(1, "OH", "HB1")],
                page: 1,
                page_total: 2,
            },
        );
        pages.insert(
            ("term".to_string(), 2),
            SearchPage {
                hits: vec![hit(2, "OH", "HB2")],
                page: 2,
                page_total: 2,
            },
        );
        let search = FixtureSearch { pages };
        let found = discover(
            &search,
            &["term".to_string()],
            &KnownBills::default(),
            &IgnoreList::default(),
        );
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn ignore_list_roundtrips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ignore_list.json");
        let mut list = IgnoreList::load(&path).unwrap();
        assert!(!list.contains(42));
        list.insert(42);
        list.save(&path).unwrap();
        let reloaded = IgnoreList::load(&path).unwrap();
        assert!(reloaded.contains(42));
    }
}
