//! Typed wrappers over the LegiScan operations the tracker uses.
//!
//! Every operation is soft-failing: an unavailable upstream yields `None`
//! (or an empty collection for list shapes) and a logged error, never a
//! panic or an aborted pass.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use billtrack_core::{BillDetail, RawBill};

use crate::client::LegiScanClient;

// ---------------------------------------------------------------------------
// Payload shapes
// ---------------------------------------------------------------------------

/// One entry from `getSessionList`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: u64,
    pub state_id: usize,
    pub year_start: i32,
    pub year_end: i32,
    #[serde(default)]
    pub special: u8,
}

impl Session {
    /// Regular sessions whose span touches `year`.
    pub fn covers(&self, year: i32) -> bool {
        self.special == 0 && (self.year_start == year || self.year_end == year)
    }
}

/// One hit from a `getSearch` page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub bill_id: u64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub bill_number: String,
    #[serde(default)]
    pub change_hash: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub last_action: String,
    #[serde(default)]
    pub last_action_date: Option<String>,
    #[serde(default)]
    pub relevance: Option<u32>,
}

/// One decoded page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
    pub page: u32,
    pub page_total: u32,
}

impl SearchPage {
    /// Decode the `searchresult` object: a `summary` entry plus numbered
    /// per-hit entries. Malformed hits are skipped, not fatal.
    pub fn from_envelope(body: &Value) -> Option<SearchPage> {
        let result = body.get("searchresult")?.as_object()?;
        let summary = result.get("summary");
        let page = summary
            .and_then(|s| number_field(s, "page"))
            .unwrap_or(1) as u32;
        let page_total = summary
            .and_then(|s| number_field(s, "page_total"))
            .unwrap_or(1) as u32;

        let mut hits = Vec::new();
        for (key, value) in result {
            if key == "summary" {
                continue;
            }
            match serde_json::from_value::<SearchHit>(value.clone()) {
                Ok(hit) => hits.push(hit),
                Err(err) => tracing::warn!("skipping malformed search hit '{key}': {err}"),
            }
        }
        Some(SearchPage {
            hits,
            page,
            page_total,
        })
    }
}

// LegiScan is inconsistent about numeric fields; accept both "3" and 3.
fn number_field(obj: &Value, name: &str) -> Option<u64> {
    match obj.get(name)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

impl LegiScanClient {
    /// `getSessionList`: every session LegiScan knows about, all states.
    pub fn session_list(&self) -> Option<Vec<Session>> {
        let url = self.op_url("getSessionList", "");
        let body = self.fetch_soft(&url)?;
        let sessions = body.get("sessions")?.as_array()?;
        let mut out = Vec::with_capacity(sessions.len());
        for entry in sessions {
            match serde_json::from_value::<Session>(entry.clone()) {
                Ok(session) => out.push(session),
                Err(err) => tracing::warn!("skipping malformed session entry: {err}"),
            }
        }
        Some(out)
    }

    /// `getMasterList` for one session. The payload is an object with a
    /// `session` metadata entry and numbered per-bill entries; malformed
    /// bill entries are skipped.
    pub fn master_list(&self, session_id: u64) -> Option<Vec<RawBill>> {
        let url = self.op_url("getMasterList", &format!("&id={session_id}"));
        let body = self.fetch_soft(&url)?;
        let list = body.get("masterlist")?.as_object()?;
        let mut bills = Vec::new();
        for (key, value) in list {
            if key == "session" {
                continue;
            }
            match serde_json::from_value::<RawBill>(value.clone()) {
                Ok(bill) => bills.push(bill),
                Err(err) => {
                    tracing::warn!("skipping malformed master-list entry '{key}': {err}")
                }
            }
        }
        Some(bills)
    }

    /// `getBill`: full detail for one bill, flattened to the enrichment
    /// strings a tracked row stores.
    pub fn bill_detail(&self, bill_id: u64) -> Option<BillDetail> {
        let url = self.op_url("getBill", &format!("&id={bill_id}"));
        let body = self.fetch_soft(&url)?;
        let bill = body.get("bill")?;
        Some(flatten_bill(bill_id, bill))
    }

    /// One page of `getSearch` across all states for `query`.
    pub fn search_page(&self, query: &str, page: u32) -> Option<SearchPage> {
        let encoded = encode_query(query);
        let url = self.op_url("getSearch", &format!("&state=ALL&query={encoded}&page={page}"));
        let body = self.fetch_soft(&url)?;
        SearchPage::from_envelope(&body)
    }
}

// ---------------------------------------------------------------------------
// Detail flattening
// ---------------------------------------------------------------------------

/// Flatten a `getBill` payload into the strings the worksheet stores.
pub fn flatten_bill(bill_id: u64, bill: &Value) -> BillDetail {
    let sponsors = join_array(bill, "sponsors", |s| {
        s.get("name").and_then(Value::as_str).map(str::to_string)
    });
    let pdf_links = join_array(bill, "texts", |t| {
        t.get("state_link")
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let calendar = join_array(bill, "calendar", |event| {
        let part = |name: &str| event.get(name).and_then(Value::as_str).unwrap_or("");
        let line = format!(
            "{} {} {} {}",
            part("type"),
            part("date"),
            part("time"),
            part("location")
        );
        let line = line.trim().to_string();
        (!line.is_empty()).then_some(line)
    });
    let history = join_array(bill, "history", |event| {
        let part = |name: &str| event.get(name).and_then(Value::as_str).unwrap_or("");
        let line = format!("{} {} {}", part("chamber"), part("date"), part("action"));
        let line = line.trim().to_string();
        (!line.is_empty()).then_some(line)
    });

    let last_event = bill
        .get("history")
        .and_then(Value::as_array)
        .and_then(|events| events.last());
    let latest_action = last_event
        .and_then(|e| e.get("action"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let latest_action_date = last_event
        .and_then(|e| e.get("date"))
        .and_then(Value::as_str)
        .map(str::to_string);

    BillDetail {
        bill_id,
        title: string_field(bill, "title"),
        url: string_field(bill, "url"),
        sponsors,
        calendar,
        history,
        pdf_links,
        latest_action,
        latest_action_date,
    }
}

fn string_field(obj: &Value, name: &str) -> String {
    obj.get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn join_array(bill: &Value, key: &str, mut item: impl FnMut(&Value) -> Option<String>) -> String {
    bill.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(&mut item)
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn encode_query(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for byte in query.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
