use chrono::{DateTime, Datelike, Utc};

use crate::models::PurchaseOrder;

/// `PO-<year>-<last six digits of the millisecond timestamp>`.
///
/// Two numbers generated within the same millisecond (or a multiple of
/// 10^6 ms apart in the same year) collide. Callers that need uniqueness must
/// check against the stored collection themselves.
pub fn generate_po_number(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().to_string();
    let suffix = &millis[millis.len().saturating_sub(6)..];
    format!("PO-{}-{}", now.year(), suffix)
}

/// Record ids are creation timestamps in milliseconds, bumped past the
/// largest existing id when the timestamp is already taken.
pub fn next_record_id(existing: &[PurchaseOrder], now: DateTime<Utc>) -> i64 {
    let candidate = now.timestamp_millis();
    if existing.iter().any(|po| po.id == Some(candidate)) {
        let max = existing.iter().filter_map(|po| po.id).max().unwrap_or(candidate);
        max.saturating_add(1)
    } else {
        candidate
    }
}
