#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident aggregation: counts fatal overdose cases per ZIP code and,
//! when a year column is present, per ZIP × year.
//!
//! ZIPs are normalized through [`ZipCode`] so tabular codes join against
//! boundary codes on exact string form regardless of how the source
//! stored them. A ZIP absent from the incident data is not an error; it
//! simply counts 0, and the query methods default accordingly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use overdose_map_models::{ZipCode, parse_case_year};

/// CSV column carrying the incident ZIP code.
pub const ZIP_COLUMN: &str = "incident_zip";

/// CSV column carrying the incident year (optional).
pub const YEAR_COLUMN: &str = "case_year";

/// Errors that can occur while aggregating incident data.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// The incident file does not exist.
    #[error("CSV not found: {path}")]
    MissingInput {
        /// Path that was checked.
        path: PathBuf,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// One or more required columns are absent from the header.
    #[error("CSV missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// Names of the absent columns.
        columns: Vec<String>,
    },
}

/// Aggregated case counts, total and per year.
///
/// Built once per run from a single CSV pass. Years that failed to parse
/// are excluded from the per-year maps but still count toward totals.
#[derive(Debug, Default)]
pub struct CaseCounts {
    total: BTreeMap<ZipCode, u64>,
    by_year: BTreeMap<i32, BTreeMap<ZipCode, u64>>,
    rows: u64,
}

impl CaseCounts {
    /// Loads and aggregates an incident CSV.
    ///
    /// The `incident_zip` column is required. When `require_year` is set
    /// the `case_year` column is required too (faceted rendering);
    /// otherwise it is used opportunistically if present.
    ///
    /// # Errors
    ///
    /// Returns [`AggregateError::MissingInput`] if `path` does not
    /// exist, and [`AggregateError::MissingColumns`] listing every
    /// absent required column.
    pub fn from_csv(path: &Path, require_year: bool) -> Result<Self, AggregateError> {
        if !path.exists() {
            return Err(AggregateError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();

        let zip_idx = headers.iter().position(|h| h == ZIP_COLUMN);
        let year_idx = headers.iter().position(|h| h == YEAR_COLUMN);

        let mut missing = Vec::new();
        if zip_idx.is_none() {
            missing.push(ZIP_COLUMN.to_string());
        }
        if require_year && year_idx.is_none() {
            missing.push(YEAR_COLUMN.to_string());
        }
        let Some(zip_idx) = zip_idx else {
            return Err(AggregateError::MissingColumns { columns: missing });
        };
        if !missing.is_empty() {
            return Err(AggregateError::MissingColumns { columns: missing });
        }

        let mut counts = Self::default();
        for record in reader.records() {
            let record = record?;
            let zip = ZipCode::normalize(record.get(zip_idx).unwrap_or(""));

            *counts.total.entry(zip.clone()).or_insert(0) += 1;
            counts.rows += 1;

            if let Some(idx) = year_idx
                && let Some(year) = parse_case_year(record.get(idx).unwrap_or(""))
            {
                *counts
                    .by_year
                    .entry(year)
                    .or_default()
                    .entry(zip)
                    .or_insert(0) += 1;
            }
        }

        log::info!(
            "Aggregated {} incident rows into {} ZIPs ({} distinct years)",
            counts.rows,
            counts.total.len(),
            counts.by_year.len()
        );

        Ok(counts)
    }

    /// Total case count for a ZIP, defaulting to 0 when absent.
    #[must_use]
    pub fn count(&self, zip: &ZipCode) -> u64 {
        self.total.get(zip).copied().unwrap_or(0)
    }

    /// Case count for a ZIP within one year, defaulting to 0.
    #[must_use]
    pub fn count_in_year(&self, zip: &ZipCode, year: i32) -> u64 {
        self.by_year
            .get(&year)
            .and_then(|m| m.get(zip))
            .copied()
            .unwrap_or(0)
    }

    /// Number of incident rows aggregated.
    #[must_use]
    pub const fn rows(&self) -> u64 {
        self.rows
    }

    /// Distinct years observed in the data, ascending.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.by_year.keys().copied().collect()
    }

    /// Top-K ZIPs by total count, descending, ties broken by ZIP order.
    #[must_use]
    pub fn top_by_count(&self, k: usize) -> Vec<(ZipCode, u64)> {
        top_k(&self.total, k)
    }

    /// Top-K ZIPs by count within one year, descending.
    #[must_use]
    pub fn top_in_year(&self, year: i32, k: usize) -> Vec<(ZipCode, u64)> {
        self.by_year.get(&year).map_or_else(Vec::new, |m| top_k(m, k))
    }
}

fn top_k(map: &BTreeMap<ZipCode, u64>, k: usize) -> Vec<(ZipCode, u64)> {
    let mut entries: Vec<(ZipCode, u64)> =
        map.iter().map(|(z, &c)| (z.clone(), c)).collect();
    // BTreeMap iteration is ZIP-ordered, so a stable sort by descending
    // count leaves ties in ZIP order.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(k);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn counts_rows_per_zip() {
        let file = write_csv(
            "incident_zip,case_year\n\
             00001,2017\n\
             00001,2017\n\
             00001,2018\n",
        );
        let counts = CaseCounts::from_csv(file.path(), false).unwrap();
        assert_eq!(counts.count(&ZipCode::normalize("00001")), 3);
        assert_eq!(counts.count(&ZipCode::normalize("00002")), 0);
    }

    #[test]
    fn unpadded_zip_joins_against_padded() {
        let file = write_csv("incident_zip\n1213\n");
        let counts = CaseCounts::from_csv(file.path(), false).unwrap();
        assert_eq!(counts.count(&ZipCode::normalize("01213")), 1);
    }

    #[test]
    fn missing_zip_column_is_fatal() {
        let file = write_csv("zipcode\n15213\n");
        let err = CaseCounts::from_csv(file.path(), false).unwrap_err();
        match err {
            AggregateError::MissingColumns { columns } => {
                assert_eq!(columns, vec!["incident_zip".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn year_column_required_only_when_faceting() {
        let file = write_csv("incident_zip\n15213\n");
        assert!(CaseCounts::from_csv(file.path(), false).is_ok());
        let err = CaseCounts::from_csv(file.path(), true).unwrap_err();
        assert!(matches!(err, AggregateError::MissingColumns { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err =
            CaseCounts::from_csv(Path::new("/nonexistent/incidents.csv"), false).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/incidents.csv"));
    }

    #[test]
    fn unparseable_year_counts_toward_total_only() {
        let file = write_csv(
            "incident_zip,case_year\n\
             00001,2017\n\
             00001,unknown\n\
             00001,\n",
        );
        let counts = CaseCounts::from_csv(file.path(), true).unwrap();
        let zip = ZipCode::normalize("00001");
        assert_eq!(counts.count(&zip), 3);
        assert_eq!(counts.count_in_year(&zip, 2017), 1);
        assert_eq!(counts.years(), vec![2017]);
    }

    #[test]
    fn float_formatted_years_are_accepted() {
        let file = write_csv("incident_zip,case_year\n00001,2016.0\n");
        let counts = CaseCounts::from_csv(file.path(), true).unwrap();
        assert_eq!(counts.count_in_year(&ZipCode::normalize("00001"), 2016), 1);
    }

    #[test]
    fn top_by_count_orders_descending() {
        let file = write_csv(
            "incident_zip\n\
             00002\n00002\n00002\n\
             00001\n00001\n\
             00003\n",
        );
        let counts = CaseCounts::from_csv(file.path(), false).unwrap();
        let top = counts.top_by_count(2);
        assert_eq!(top[0].0.as_str(), "00002");
        assert_eq!(top[0].1, 3);
        assert_eq!(top[1].0.as_str(), "00001");
    }

    #[test]
    fn top_in_year_uses_only_that_year() {
        let file = write_csv(
            "incident_zip,case_year\n\
             00001,2016\n\
             00002,2017\n\
             00002,2017\n",
        );
        let counts = CaseCounts::from_csv(file.path(), true).unwrap();
        let top = counts.top_in_year(2017, 3);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].0.as_str(), "00002");
        assert_eq!(top[0].1, 2);
    }
}
