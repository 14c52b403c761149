//! Run report accumulation and alert text.
//!
//! A pass produces three buffers: new-bill alerts, status-change alerts,
//! and dev-facing errors. Alert text is built once and reused verbatim for
//! both the social post and the email digest line.

/// Outbound social channel, injected so the sync core never talks HTTP.
pub trait SocialPoster {
    fn post(&self, text: &str) -> Result<(), String>;
}

/// A poster that drops everything; used when social posting is disabled.
pub struct NullPoster;

impl SocialPoster for NullPoster {
    fn post(&self, _text: &str) -> Result<(), String> {
        Ok(())
    }
}

/// Accumulated output of one or more worksheet passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ReconciliationReport {
    /// Alert text per newly tracked bill.
    pub new_bills: Vec<String>,
    /// Alert text per observable status change.
    pub history_changes: Vec<String>,
    /// Human-readable errors for the dev digest; one entry per failure.
    pub dev_errors: Vec<String>,
}

impl ReconciliationReport {
    pub fn is_empty(&self) -> bool {
        self.new_bills.is_empty() && self.history_changes.is_empty() && self.dev_errors.is_empty()
    }

    pub fn merge(&mut self, other: ReconciliationReport) {
        self.new_bills.extend(other.new_bills);
        self.history_changes.extend(other.history_changes);
        self.dev_errors.extend(other.dev_errors);
    }
}

// ---------------------------------------------------------------------------
// Alert text
// ---------------------------------------------------------------------------

/// Alert for a bill seen for the first time.
pub fn new_bill_alert(heading: &str, state: &str, number: &str, title: &str, url: &str) -> String {
    let mut text = format!("{heading}\n{state} {number}");
    if !title.trim().is_empty() {
        text.push_str(&format!(": {}", title.trim()));
    }
    if !url.trim().is_empty() {
        text.push('\n');
        text.push_str(url.trim());
    }
    text
}

/// Alert for an observable status change on a tracked bill.
pub fn status_change_alert(
    heading: &str,
    state: &str,
    number: &str,
    action: &str,
    date: &str,
    url: &str,
) -> String {
    let mut text = format!("{heading}\n{state} {number}\n{action}");
    if !date.trim().is_empty() {
        text.push_str(&format!(" ({})", date.trim()));
    }
    if !url.trim().is_empty() {
        text.push('\n');
        text.push_str(url.trim());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_concatenates_buffers() {
        let mut a = ReconciliationReport {
            new_bills: vec!["n1".into()],
            history_changes: vec![],
            dev_errors: vec!["e1".into()],
        };
        let b = ReconciliationReport {
            new_bills: vec!["n2".into()],
            history_changes: vec!["c1".into()],
            dev_errors: vec![],
        };
        a.merge(b);
        assert_eq!(a.new_bills, vec!["n1", "n2"]);
        assert_eq!(a.history_changes, vec!["c1"]);
        assert_eq!(a.dev_errors, vec!["e1"]);
        assert!(!a.is_empty());
        assert!(ReconciliationReport::default().is_empty());
    }

    #[test]
    fn alert_text_includes_identity_and_link() {
        let alert = new_bill_alert(
            "🚨ALERT NEW BILL 🚨",
            "Ohio",
            "HB68",
            "An act",
            "https://legiscan.test/OH/HB68",
        );
        assert_eq!(
            alert,
            "🚨ALERT NEW BILL 🚨\nOhio HB68: An act\nhttps://legiscan.test/OH/HB68"
        );
    }

    #[test]
    fn change_alert_tolerates_missing_date_and_url() {
        let alert = status_change_alert("🏛 Status Change 🏛", "Ohio", "HB68", "Passed", "", "");
        assert_eq!(alert, "🏛 Status Change 🏛\nOhio HB68\nPassed");
    }
}
