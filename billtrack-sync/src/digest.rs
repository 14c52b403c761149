//! Worksheet digest for the fast-path skip.
//!
//! The digest covers, per row, the identity key plus both the stored and
//! the live upstream change hash, sorted so row order is irrelevant. A
//! matching digest from the previous successful pass means nothing moved
//! on either side and the per-row work can be skipped.

use sha2::{Digest, Sha256};

use billtrack_core::normalize::normalize_bill_number;
use billtrack_core::TrackedBill;

use crate::master_index::MasterIndex;

pub fn sheet_digest(rows: &[TrackedBill], index: &MasterIndex) -> String {
    let mut entries: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            let upstream = index
                .lookup(&row.state, &row.number)
                .map(|entry| entry.change_hash.clone())
                .unwrap_or_default();
            [
                row.state.trim().to_string(),
                normalize_bill_number(&row.number),
                row.change_hash.trim().to_string(),
                upstream,
            ]
        })
        .collect();
    entries.sort();

    let mut hasher = Sha256::new();
    for entry in &entries {
        for field in entry {
            hasher.update(field.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
}
