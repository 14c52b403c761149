//! Per-state lookup over the fetched master lists.
//!
//! Rebuilt fully on every pass; immutable within one. Each bill is indexed
//! under its normalized number, with a session-prefix-stripped alias so a
//! sheet-entered `HB68` still matches an upstream `X2HB68`.

use std::collections::BTreeMap;

use billtrack_core::normalize::{normalize_bill_number, strip_session_prefix};
use billtrack_core::{MasterIndexEntry, RawBill};

#[derive(Debug, Default)]
pub struct MasterIndex {
    states: BTreeMap<String, BTreeMap<String, MasterIndexEntry>>,
}

impl MasterIndex {
    /// Build the index from per-state master lists.
    pub fn build(lists: &BTreeMap<String, Vec<RawBill>>) -> Self {
        let mut states: BTreeMap<String, BTreeMap<String, MasterIndexEntry>> = BTreeMap::new();
        for (state, bills) in lists {
            let index = states.entry(state.clone()).or_default();
            for raw in bills {
                let entry = MasterIndexEntry::from_raw(raw);
                let key = normalize_bill_number(&raw.number);
                let alias = strip_session_prefix(&key).to_string();
                // Alias never shadows a real number.
                if alias != key {
                    index.entry(alias).or_insert_with(|| entry.clone());
                }
                index.insert(key, entry);
            }
        }
        MasterIndex { states }
    }

    /// Upstream entry for a sheet row's `(state, number cell)`.
    pub fn lookup(&self, state: &str, number_cell: &str) -> Option<&MasterIndexEntry> {
        let index = self.states.get(state.trim())?;
        let normalized = normalize_bill_number(number_cell);
        index
            .get(&normalized)
            .or_else(|| index.get(strip_session_prefix(&normalized)))
    }

    /// Number of states covered.
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
