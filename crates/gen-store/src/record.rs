use chrono::{DateTime, Local};
use gen_common::Transaction;

const SUMMARY_LIMIT: usize = 50;
const EMPTY_SUMMARY: &str = "[ no content ]";

/// Metadata describing one stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// 1-based position in creation order.
    pub id: usize,
    /// File name within the sessions directory.
    pub name: String,
    pub summary: String,
    pub modified: DateTime<Local>,
    pub active: bool,
}

/// Summarise a session by the opening user prompt.
pub(crate) fn summarise(transactions: &[Transaction]) -> String {
    let Some(first) = transactions.first() else {
        return EMPTY_SUMMARY.to_string();
    };

    let text = &first.input.text;
    if text.chars().count() < SUMMARY_LIMIT {
        return text.clone();
    }

    let mut summary: String = text.chars().take(SUMMARY_LIMIT).collect();
    summary.push_str("...");
    summary
}
