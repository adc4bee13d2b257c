#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared key types for joining boundary geometry against incident data.
//!
//! Boundary documents and incident CSVs disagree on how ZIP codes are
//! stored (string vs. bare integer, padded vs. unpadded). Everything in
//! this workspace joins on [`ZipCode`], which normalizes both forms to
//! the fixed-width zero-padded string the boundary file uses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed width of a normalized ZIP code.
pub const ZIP_WIDTH: usize = 5;

/// A ZIP code normalized to its zero-padded 5-character string form.
///
/// Used purely as a join key between geometry and tabular data; two codes
/// compare equal iff their normalized string forms match exactly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZipCode(String);

impl ZipCode {
    /// Normalizes a raw ZIP value (e.g. `"1213"`, `"01213"`, or the string
    /// form of an integer) to its zero-padded 5-character form.
    ///
    /// Normalization is idempotent: an already-padded code is returned
    /// unchanged. Inputs longer than 5 characters are kept as-is rather
    /// than truncated, so a malformed source value never collides with a
    /// real code.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.len() >= ZIP_WIDTH {
            return Self(trimmed.to_string());
        }
        let mut padded = String::with_capacity(ZIP_WIDTH);
        for _ in trimmed.len()..ZIP_WIDTH {
            padded.push('0');
        }
        padded.push_str(trimmed);
        Self(padded)
    }

    /// Normalizes a numeric source value (boundary files sometimes store
    /// ZIPs as bare integers).
    #[must_use]
    pub fn from_numeric(value: u64) -> Self {
        Self::normalize(&value.to_string())
    }

    /// The normalized string form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ZipCode {
    fn from(raw: &str) -> Self {
        Self::normalize(raw)
    }
}

/// Parses a case-year cell into a calendar year.
///
/// Returns `None` for empty, missing, or non-numeric values; those rows
/// still count toward per-ZIP totals but are excluded from year-based
/// faceting. Accepts float-formatted years (`"2017.0"`) since CSV exports
/// of numeric columns often carry a trailing `.0`.
#[must_use]
pub fn parse_case_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let float_year = trimmed.parse::<f64>().ok()?;
    if float_year.fract() == 0.0 && (0.0..=9999.0).contains(&float_year) {
        #[allow(clippy::cast_possible_truncation)]
        return Some(float_year as i32);
    }
    None
}
