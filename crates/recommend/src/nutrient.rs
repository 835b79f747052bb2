//! Reading nutrient cells.
//!
//! Food composition tables are hand-assembled and full of blanks, `-`, `tr`
//! (trace) and unit suffixes. Two readings exist:
//!
//! - [`coerce`] is used for scoring: the cell must be a plain number,
//!   anything else counts as zero.
//! - [`lenient`] is used for history snapshots: it keeps only digits, `.`
//!   and `-` before parsing, so `"12.5 g"` reads as `12.5`.
//!
//! Both return values that are finite and never negative.

/// Strict numeric reading of a cell. Non-numeric, empty, non-finite and
/// negative values read as `0.0`.
pub fn coerce(raw: &str) -> f64 {
    clamp(raw.trim().parse::<f64>().ok())
}

/// Lenient reading of a cell: a plain number parses as-is, otherwise every
/// character except digits, `.` and `-` is dropped and the rest is parsed.
pub fn lenient(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return clamp(Some(v));
    }
    let digits: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if digits.is_empty() {
        return 0.0;
    }
    clamp(digits.parse::<f64>().ok())
}

fn clamp(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}
