#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Augmented `GeoJSON` export.
//!
//! Serializes a copy of the original boundary document with one integer
//! `case_count` property injected into each feature, defaulting to 0
//! for ZIPs with no incidents. Feature order, geometries, and every
//! pre-existing property survive the round trip untouched.

use std::fs;
use std::path::Path;

use geojson::GeoJson;
use overdose_map_aggregate::CaseCounts;
use overdose_map_geometry::{BoundaryMap, feature_zip};

/// Property name added to each feature.
pub const CASE_COUNT_PROPERTY: &str = "case_count";

/// Errors that can occur while writing the augmented document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error (file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Writes the boundary document back out with a `case_count` property
/// per feature.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the file write fails.
pub fn write_augmented(
    map: &BoundaryMap,
    counts: &CaseCounts,
    out_path: &Path,
) -> Result<(), ExportError> {
    let mut collection = map.collection().clone();

    for feature in &mut collection.features {
        let zip = feature_zip(feature);
        let count = counts.count(&zip);
        feature.set_property(CASE_COUNT_PROPERTY, count);
    }

    let json = GeoJson::FeatureCollection(collection).to_string();
    fs::write(out_path, json)?;

    log::info!(
        "Saved augmented GeoJSON ({} features) to {}",
        map.collection().features.len(),
        out_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::FeatureCollection;
    use std::io::Write as _;

    fn boundary() -> BoundaryMap {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"ZIP": "00001", "NAME": "First"},
                    "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0], [0.0, 0.0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"ZIP": "00002", "NAME": "Second"},
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [
                            [[[10.0, 0.0], [14.0, 0.0], [10.0, 4.0], [10.0, 0.0]]],
                            [[[20.0, 0.0], [22.0, 0.0], [20.0, 2.0], [20.0, 0.0]]]
                        ]
                    }
                }
            ]
        }"#;
        let GeoJson::FeatureCollection(fc) = json.parse().unwrap() else {
            panic!("expected FeatureCollection");
        };
        BoundaryMap::from_collection(fc).unwrap()
    }

    fn counts_three_for_00001() -> CaseCounts {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"incident_zip\n00001\n00001\n1\n").unwrap();
        file.flush().unwrap();
        CaseCounts::from_csv(file.path(), false).unwrap()
    }

    fn read_back(path: &Path) -> FeatureCollection {
        let contents = fs::read_to_string(path).unwrap();
        let GeoJson::FeatureCollection(fc) = contents.parse().unwrap() else {
            panic!("expected FeatureCollection");
        };
        fc
    }

    #[test]
    fn round_trip_preserves_structure_and_adds_counts() {
        let map = boundary();
        let counts = counts_three_for_00001();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("augmented.geojson");
        write_augmented(&map, &counts, &out).unwrap();

        let fc = read_back(&out);
        assert_eq!(fc.features.len(), 2);

        // Same order, original properties preserved.
        let first = &fc.features[0];
        assert_eq!(
            first.property("ZIP").and_then(|v| v.as_str()),
            Some("00001")
        );
        assert_eq!(
            first.property("NAME").and_then(|v| v.as_str()),
            Some("First")
        );
        assert_eq!(
            first.property(CASE_COUNT_PROPERTY).and_then(serde_json::Value::as_u64),
            Some(3)
        );

        // Unmatched region defaults to 0, not omitted.
        let second = &fc.features[1];
        assert_eq!(
            second.property(CASE_COUNT_PROPERTY).and_then(serde_json::Value::as_u64),
            Some(0)
        );
        assert!(second.geometry.is_some());
    }

    #[test]
    fn geometry_survives_unchanged() {
        let map = boundary();
        let counts = counts_three_for_00001();

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("augmented.geojson");
        write_augmented(&map, &counts, &out).unwrap();

        let fc = read_back(&out);
        assert_eq!(fc.features[0].geometry, map.collection().features[0].geometry);
        assert_eq!(fc.features[1].geometry, map.collection().features[1].geometry);
    }
}
