//! JSON text for event reports.
//! - Writer: pretty-printed, struct field order (no key sorting).
//! - Reader: strict shape (unknown fields rejected, closed enums enforced,
//!   coordinates range-checked) plus the at-least-one-movement invariant.

use eer_core::EventReport;

use crate::IoResult;

/// Pretty JSON (two-space indent), fields in data-model order.
pub fn to_json_pretty(report: &EventReport) -> IoResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Compact JSON bytes, as sent in a submission body.
pub fn to_json_bytes(report: &EventReport) -> IoResult<Vec<u8>> {
    Ok(serde_json::to_vec(report)?)
}

/// Parse a report and enforce invariants the type cannot express.
pub fn from_json_str(text: &str) -> IoResult<EventReport> {
    let report: EventReport = serde_json::from_str(text)?;
    report.check_invariants()?;
    Ok(report)
}
