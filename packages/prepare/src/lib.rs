#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CSV cleaning and derivation passes over the raw incident export.
//!
//! Three single-pass batch transforms, each reading one CSV and writing
//! another with all unrelated columns passed through unchanged:
//!
//! - [`filter_to_county`] keeps only rows whose ZIP belongs to the
//!   county boundary set (the raw export includes out-of-county ZIPs).
//! - [`classify_drug_cases`] appends `drug_count` and `drug_case_type`
//!   columns derived from the ten `combined_od*` substance slots.
//! - [`unpivot_drugs`] melts the substance slots into long format, one
//!   row per named drug.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use overdose_map_models::ZipCode;

/// CSV column carrying the incident ZIP code.
pub const ZIP_COLUMN: &str = "incident_zip";

/// The per-incident substance slot columns, `combined_od1..combined_od10`.
#[must_use]
pub fn drug_columns() -> Vec<String> {
    (1..=10).map(|i| format!("combined_od{i}")).collect()
}

/// Errors that can occur during a preparation pass.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    /// The input file does not exist.
    #[error("CSV not found: {path}")]
    MissingInput {
        /// Path that was checked.
        path: PathBuf,
    },

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O error (file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more required columns are absent from the header.
    #[error("CSV missing required columns: {}", columns.join(", "))]
    MissingColumns {
        /// Names of the absent columns.
        columns: Vec<String>,
    },
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, PrepareError> {
    if !path.exists() {
        return Err(PrepareError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    Ok(csv::Reader::from_path(path)?)
}

/// Filters the incident export down to rows whose ZIP appears in the
/// county boundary set, writing the ZIP back in normalized form.
///
/// Returns `(kept, dropped)` row counts.
///
/// # Errors
///
/// Returns [`PrepareError`] if the input is missing, the `incident_zip`
/// column is absent, or reading/writing fails.
pub fn filter_to_county(
    input: &Path,
    county_zips: &BTreeSet<ZipCode>,
    output: &Path,
) -> Result<(u64, u64), PrepareError> {
    let mut reader = open_reader(input)?;
    let headers = reader.headers()?.clone();
    let Some(zip_idx) = headers.iter().position(|h| h == ZIP_COLUMN) else {
        return Err(PrepareError::MissingColumns {
            columns: vec![ZIP_COLUMN.to_string()],
        });
    };

    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(&headers)?;

    let mut kept = 0u64;
    let mut dropped = 0u64;
    for record in reader.records() {
        let record = record?;
        let zip = ZipCode::normalize(record.get(zip_idx).unwrap_or(""));
        if county_zips.contains(&zip) {
            let row: Vec<String> = record
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i == zip_idx {
                        zip.as_str().to_string()
                    } else {
                        cell.to_string()
                    }
                })
                .collect();
            writer.write_record(&row)?;
            kept += 1;
        } else {
            dropped += 1;
        }
    }
    writer.flush()?;

    log::info!("County filter kept {kept} rows, dropped {dropped} extraneous");
    Ok((kept, dropped))
}

/// Classification of an incident by how many substances were involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrugCaseType {
    /// No substance slots were filled.
    None,
    /// Exactly one substance.
    Single,
    /// More than one substance (polysubstance case).
    Poly,
}

impl DrugCaseType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Single => "Single",
            Self::Poly => "Poly",
        }
    }

    #[must_use]
    pub const fn from_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1 => Self::Single,
            _ => Self::Poly,
        }
    }
}

/// Appends `drug_count` and `drug_case_type` columns derived from the
/// non-empty `combined_od*` cells of each row.
///
/// # Errors
///
/// Returns [`PrepareError::MissingColumns`] if none of the substance
/// slot columns exist, or a CSV error on read/write failure.
pub fn classify_drug_cases(input: &Path, output: &Path) -> Result<u64, PrepareError> {
    let mut reader = open_reader(input)?;
    let headers = reader.headers()?.clone();

    let drug_idx: Vec<usize> = drug_columns()
        .iter()
        .filter_map(|name| headers.iter().position(|h| h == name))
        .collect();
    if drug_idx.is_empty() {
        return Err(PrepareError::MissingColumns {
            columns: drug_columns(),
        });
    }

    let mut writer = csv::Writer::from_path(output)?;
    let mut out_headers: Vec<String> = headers.iter().map(str::to_string).collect();
    out_headers.push("drug_count".to_string());
    out_headers.push("drug_case_type".to_string());
    writer.write_record(&out_headers)?;

    let mut rows = 0u64;
    for record in reader.records() {
        let record = record?;
        let count = drug_idx
            .iter()
            .filter(|&&i| !record.get(i).unwrap_or("").trim().is_empty())
            .count();

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.push(count.to_string());
        row.push(DrugCaseType::from_count(count).label().to_string());
        writer.write_record(&row)?;
        rows += 1;
    }
    writer.flush()?;

    log::info!("Classified {rows} rows by substance count");
    Ok(rows)
}

/// Melts the `combined_od*` slot columns into long format: one output
/// row per non-empty drug cell, carrying every non-slot column plus a
/// single `drug` column. Rows with no named drug produce no output.
///
/// # Errors
///
/// Returns [`PrepareError::MissingColumns`] if none of the substance
/// slot columns exist, or a CSV error on read/write failure.
pub fn unpivot_drugs(input: &Path, output: &Path) -> Result<u64, PrepareError> {
    let mut reader = open_reader(input)?;
    let headers = reader.headers()?.clone();

    let drug_names = drug_columns();
    let drug_idx: BTreeSet<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| drug_names.iter().any(|n| n == h))
        .map(|(i, _)| i)
        .collect();
    if drug_idx.is_empty() {
        return Err(PrepareError::MissingColumns {
            columns: drug_names,
        });
    }

    let id_idx: Vec<usize> = (0..headers.len()).filter(|i| !drug_idx.contains(i)).collect();

    let mut writer = csv::Writer::from_path(output)?;
    let mut out_headers: Vec<String> = id_idx
        .iter()
        .map(|&i| headers.get(i).unwrap_or("").to_string())
        .collect();
    out_headers.push("drug".to_string());
    writer.write_record(&out_headers)?;

    let mut emitted = 0u64;
    for record in reader.records() {
        let record = record?;
        let id_cells: Vec<&str> = id_idx.iter().map(|&i| record.get(i).unwrap_or("")).collect();
        for &i in &drug_idx {
            let drug = record.get(i).unwrap_or("").trim();
            if drug.is_empty() {
                continue;
            }
            let mut row: Vec<&str> = id_cells.clone();
            row.push(drug);
            writer.write_record(&row)?;
            emitted += 1;
        }
    }
    writer.flush()?;

    log::info!("Unpivoted substance slots into {emitted} long-format rows");
    Ok(emitted)
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

    fn read_output(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(path).unwrap();
        let mut rows = vec![
            reader
                .headers()
                .unwrap()
                .iter()
                .map(str::to_string)
                .collect(),
        ];
        for record in reader.records() {
            rows.push(record.unwrap().iter().map(str::to_string).collect());
        }
        rows
    }

    fn zips(codes: &[&str]) -> BTreeSet<ZipCode> {
        codes.iter().map(|c| ZipCode::normalize(c)).collect()
    }

    #[test]
    fn county_filter_drops_extraneous_zips() {
        let input = write_csv(
            "case_id,incident_zip\n\
             1,15213\n\
             2,99999\n\
             3,1213\n",
        );
        let out = tempfile::NamedTempFile::new().unwrap();
        let (kept, dropped) =
            filter_to_county(input.path(), &zips(&["15213", "01213"]), out.path()).unwrap();
        assert_eq!((kept, dropped), (2, 1));

        let rows = read_output(out.path());
        assert_eq!(rows[1], vec!["1", "15213"]);
        // Unpadded source ZIP is written back normalized.
        assert_eq!(rows[2], vec!["3", "01213"]);
    }

    #[test]
    fn county_filter_requires_zip_column() {
        let input = write_csv("case_id\n1\n");
        let out = tempfile::NamedTempFile::new().unwrap();
        let err = filter_to_county(input.path(), &zips(&["15213"]), out.path()).unwrap_err();
        assert!(matches!(err, PrepareError::MissingColumns { .. }));
    }

    #[test]
    fn classifies_single_poly_and_none() {
        let input = write_csv(
            "case_id,combined_od1,combined_od2,combined_od3\n\
             1,Fentanyl,,\n\
             2,Fentanyl,Cocaine,\n\
             3,,,\n",
        );
        let out = tempfile::NamedTempFile::new().unwrap();
        classify_drug_cases(input.path(), out.path()).unwrap();

        let rows = read_output(out.path());
        assert_eq!(rows[0].last().unwrap(), "drug_case_type");
        assert_eq!(rows[1][4..], ["1".to_string(), "Single".to_string()]);
        assert_eq!(rows[2][4..], ["2".to_string(), "Poly".to_string()]);
        assert_eq!(rows[3][4..], ["0".to_string(), "None".to_string()]);
    }

    #[test]
    fn unpivot_emits_one_row_per_named_drug() {
        let input = write_csv(
            "case_id,combined_od1,combined_od2,race\n\
             1,Fentanyl,Cocaine,W\n\
             2,,,B\n\
             3,Heroin,,W\n",
        );
        let out = tempfile::NamedTempFile::new().unwrap();
        let emitted = unpivot_drugs(input.path(), out.path()).unwrap();
        assert_eq!(emitted, 3);

        let rows = read_output(out.path());
        assert_eq!(rows[0], vec!["case_id", "race", "drug"]);
        assert_eq!(rows[1], vec!["1", "W", "Fentanyl"]);
        assert_eq!(rows[2], vec!["1", "W", "Cocaine"]);
        assert_eq!(rows[3], vec!["3", "W", "Heroin"]);
    }

    #[test]
    fn unpivot_requires_slot_columns() {
        let input = write_csv("case_id\n1\n");
        let out = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            unpivot_drugs(input.path(), out.path()),
            Err(PrepareError::MissingColumns { .. })
        ));
    }
}
