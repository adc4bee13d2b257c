#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Boundary geometry loading for the overdose map.
//!
//! Parses a `GeoJSON` FeatureCollection of ZIP code boundaries and
//! extracts one exterior ring per Polygon feature (or per part of a
//! MultiPolygon feature). Interior rings (holes) are discarded at load
//! time, so rendered fill area may overstate true region area where
//! holes exist. The parsed document is retained so the exporter can
//! write it back out with counts injected and nothing else disturbed.

use std::fs;
use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, GeoJson, Value};
use overdose_map_models::ZipCode;

/// Errors that can occur while loading boundary geometry.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// The boundary file does not exist.
    #[error("GeoJSON not found: {path}")]
    MissingInput {
        /// Path that was checked.
        path: PathBuf,
    },

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON parse error: {0}")]
    Geojson(#[from] geojson::Error),

    /// The document is not a FeatureCollection.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// No exterior rings could be extracted from the whole document.
    #[error("No polygon exteriors extracted from GeoJSON")]
    NoRings,
}

/// A single exterior ring tagged with its source ZIP code.
///
/// A MultiPolygon feature with k parts produces k independent rings,
/// all carrying the same ZIP.
#[derive(Debug, Clone)]
pub struct RegionRing {
    /// Normalized ZIP code of the source feature.
    pub zip: ZipCode,
    /// Closed exterior ring, first and last point coincident.
    pub points: Vec<(f64, f64)>,
}

impl RegionRing {
    /// Area-weighted (shoelace) centroid of the ring.
    ///
    /// Degenerate zero-area rings fall back to the arithmetic mean of
    /// the vertices so the division by area never blows up.
    #[must_use]
    pub fn centroid(&self) -> (f64, f64) {
        polygon_centroid(&self.points)
    }

    /// Signed shoelace area of the ring (positive for counter-clockwise
    /// winding). Used to pick the dominant part of a MultiPolygon for
    /// label placement.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        shoelace_terms(&self.points).iter().sum::<f64>() / 2.0
    }
}

/// Axis-aligned bounding box over a set of rings, used to fit panel view
/// bounds exactly to the rendered content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Computes the union bounding box of the given rings.
    ///
    /// Returns `None` when the ring list is empty.
    #[must_use]
    pub fn of_rings(rings: &[RegionRing]) -> Option<Self> {
        let mut points = rings.iter().flat_map(|r| r.points.iter().copied());
        let (first_x, first_y) = points.next()?;
        let mut bbox = Self {
            min_x: first_x,
            min_y: first_y,
            max_x: first_x,
            max_y: first_y,
        };
        for (x, y) in points {
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }
        Some(bbox)
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Parsed boundary document plus the exterior rings extracted from it.
///
/// Constructed once per run; the raw [`FeatureCollection`] stays
/// available for the exporter so feature order and pre-existing
/// properties survive the round trip untouched.
pub struct BoundaryMap {
    collection: FeatureCollection,
    rings: Vec<RegionRing>,
}

impl BoundaryMap {
    /// Loads a boundary `GeoJSON` file and extracts exterior rings.
    ///
    /// Individual features with a missing geometry, a non-polygon type,
    /// empty coordinates, or non-2D points are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::MissingInput`] if `path` does not exist,
    /// a parse error if the document is malformed, and
    /// [`GeometryError::NoRings`] if zero rings were extracted across
    /// the whole document.
    pub fn from_file(path: &Path) -> Result<Self, GeometryError> {
        if !path.exists() {
            return Err(GeometryError::MissingInput {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let geojson: GeoJson = contents.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(GeometryError::NotFeatureCollection);
        };
        Self::from_collection(collection)
    }

    /// Extracts exterior rings from an already-parsed FeatureCollection.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NoRings`] if nothing could be extracted.
    pub fn from_collection(collection: FeatureCollection) -> Result<Self, GeometryError> {
        let mut rings = Vec::new();

        for feature in &collection.features {
            let zip = feature_zip(feature);
            let Some(geometry) = &feature.geometry else {
                log::warn!("Skipping feature {}: no geometry", zip.as_str());
                continue;
            };

            match &geometry.value {
                Value::Polygon(polygon) => {
                    push_exterior(&mut rings, &zip, polygon);
                }
                Value::MultiPolygon(parts) => {
                    for part in parts {
                        push_exterior(&mut rings, &zip, part);
                    }
                }
                other => {
                    log::warn!(
                        "Skipping feature {}: unsupported geometry type {}",
                        zip.as_str(),
                        geometry_type_name(other)
                    );
                }
            }
        }

        if rings.is_empty() {
            return Err(GeometryError::NoRings);
        }

        log::info!(
            "Extracted {} exterior rings from {} features",
            rings.len(),
            collection.features.len()
        );

        Ok(Self { collection, rings })
    }

    /// The exterior rings, in document order.
    #[must_use]
    pub fn rings(&self) -> &[RegionRing] {
        &self.rings
    }

    /// The parsed source document, untouched.
    #[must_use]
    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    /// Distinct ZIP codes present in the boundary document, in document
    /// order of first appearance.
    #[must_use]
    pub fn zips(&self) -> Vec<ZipCode> {
        let mut seen = std::collections::BTreeSet::new();
        let mut zips = Vec::new();
        for ring in &self.rings {
            if seen.insert(ring.zip.clone()) {
                zips.push(ring.zip.clone());
            }
        }
        zips
    }

    /// The ring with the largest absolute area for the given ZIP.
    ///
    /// Label placement anchor: for a MultiPolygon region this picks the
    /// dominant part rather than whichever part came first in the file.
    #[must_use]
    pub fn dominant_ring(&self, zip: &ZipCode) -> Option<&RegionRing> {
        self.rings
            .iter()
            .filter(|r| &r.zip == zip)
            .max_by(|a, b| {
                a.signed_area()
                    .abs()
                    .total_cmp(&b.signed_area().abs())
            })
    }
}

/// Reads and normalizes the `ZIP` property of a feature. Missing or
/// non-scalar values normalize to `"00000"`, matching how the boundary
/// source pads empty cells.
#[must_use]
pub fn feature_zip(feature: &Feature) -> ZipCode {
    let raw = match feature.property("ZIP") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    ZipCode::normalize(&raw)
}

/// Extracts the first (exterior) ring of a polygon's ring list and
/// appends it, skipping rings with no coordinates or non-2D points.
fn push_exterior(rings: &mut Vec<RegionRing>, zip: &ZipCode, polygon: &[Vec<Vec<f64>>]) {
    let Some(exterior) = polygon.first() else {
        log::warn!("Skipping part of {}: empty ring list", zip.as_str());
        return;
    };
    if exterior.is_empty() {
        log::warn!("Skipping part of {}: empty exterior ring", zip.as_str());
        return;
    }

    let mut points = Vec::with_capacity(exterior.len());
    for position in exterior {
        let [x, y] = position.as_slice() else {
            log::warn!("Skipping part of {}: non-2D position", zip.as_str());
            return;
        };
        points.push((*x, *y));
    }

    rings.push(RegionRing {
        zip: zip.clone(),
        points,
    });
}

const fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Per-edge shoelace cross terms `x[i]*y[i+1] - x[i+1]*y[i]`.
fn shoelace_terms(points: &[(f64, f64)]) -> Vec<f64> {
    points
        .windows(2)
        .map(|pair| pair[0].0 * pair[1].1 - pair[1].0 * pair[0].1)
        .collect()
}

/// Area-weighted centroid of a closed ring (planar, not geodesic).
///
/// Zero-area rings fall back to the arithmetic mean of vertices.
#[must_use]
pub fn polygon_centroid(points: &[(f64, f64)]) -> (f64, f64) {
    if points.is_empty() {
        return (0.0, 0.0);
    }

    let terms = shoelace_terms(points);
    let area = terms.iter().sum::<f64>() / 2.0;

    if area == 0.0 {
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let (sum_x, sum_y) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
        return (sum_x / n, sum_y / n);
    }

    let mut cx = 0.0;
    let mut cy = 0.0;
    for (pair, term) in points.windows(2).zip(&terms) {
        cx += (pair[0].0 + pair[1].0) * term;
        cy += (pair[0].1 + pair[1].1) * term;
    }
    (cx / (6.0 * area), cy / (6.0 * area))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;

    fn collection(json: &str) -> FeatureCollection {
        let GeoJson::FeatureCollection(fc) = json.parse().unwrap() else {
            panic!("expected FeatureCollection");
        };
        fc
    }

    const TRIANGLE: &str = "[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0], [0.0, 0.0]]";

    fn two_feature_doc() -> FeatureCollection {
        collection(&format!(
            r#"{{
                "type": "FeatureCollection",
                "features": [
                    {{
                        "type": "Feature",
                        "properties": {{"ZIP": "00001"}},
                        "geometry": {{"type": "Polygon", "coordinates": [{TRIANGLE}]}}
                    }},
                    {{
                        "type": "Feature",
                        "properties": {{"ZIP": "00002"}},
                        "geometry": {{
                            "type": "MultiPolygon",
                            "coordinates": [[{TRIANGLE}], [[[10.0, 10.0], [12.0, 10.0], [10.0, 12.0], [10.0, 10.0]]]]
                        }}
                    }}
                ]
            }}"#
        ))
    }

    #[test]
    fn multipolygon_yields_one_ring_per_part() {
        let map = BoundaryMap::from_collection(two_feature_doc()).unwrap();
        assert_eq!(map.rings().len(), 3);
        let zips: Vec<&str> = map.rings().iter().map(|r| r.zip.as_str()).collect();
        assert_eq!(zips, vec!["00001", "00002", "00002"]);
    }

    #[test]
    fn skips_non_polygon_and_missing_geometry() {
        let fc = collection(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"ZIP": "00009"},
                        "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
                    },
                    {
                        "type": "Feature",
                        "properties": {"ZIP": "00001"},
                        "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0], [0.0, 0.0]]]}
                    }
                ]
            }"#,
        );
        let map = BoundaryMap::from_collection(fc).unwrap();
        assert_eq!(map.rings().len(), 1);
        assert_eq!(map.rings()[0].zip.as_str(), "00001");
    }

    #[test]
    fn zero_extractable_rings_is_fatal() {
        let fc = collection(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"ZIP": "00009"},
                        "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
                    }
                ]
            }"#,
        );
        assert!(matches!(
            BoundaryMap::from_collection(fc),
            Err(GeometryError::NoRings)
        ));
    }

    #[test]
    fn numeric_zip_property_is_padded() {
        let fc = collection(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"ZIP": 1213},
                        "geometry": {"type": "Polygon", "coordinates": [[[0.0, 0.0], [4.0, 0.0], [0.0, 4.0], [0.0, 0.0]]]}
                    }
                ]
            }"#,
        );
        let map = BoundaryMap::from_collection(fc).unwrap();
        assert_eq!(map.rings()[0].zip.as_str(), "01213");
    }

    #[test]
    fn interior_holes_are_discarded() {
        let fc = collection(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"ZIP": "00001"},
                        "geometry": {"type": "Polygon", "coordinates": [
                            [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
                            [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
                        ]}
                    }
                ]
            }"#,
        );
        let map = BoundaryMap::from_collection(fc).unwrap();
        assert_eq!(map.rings().len(), 1);
        assert_eq!(map.rings()[0].points.len(), 5);
    }

    #[test]
    fn centroid_of_unit_square() {
        let square = vec![(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0), (0.0, 0.0)];
        let (cx, cy) = polygon_centroid(&square);
        assert!((cx - 1.0).abs() < 1e-12);
        assert!((cy - 1.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_ring_falls_back_to_vertex_mean() {
        let line = vec![(0.0, 0.0), (2.0, 0.0), (0.0, 0.0)];
        let (cx, cy) = polygon_centroid(&line);
        assert!((cx - 2.0 / 3.0).abs() < 1e-12);
        assert!(cy.abs() < 1e-12);
    }

    #[test]
    fn bounding_box_covers_all_rings() {
        let map = BoundaryMap::from_collection(two_feature_doc()).unwrap();
        let bbox = BoundingBox::of_rings(map.rings()).unwrap();
        assert!((bbox.min_x - 0.0).abs() < f64::EPSILON);
        assert!((bbox.max_x - 12.0).abs() < f64::EPSILON);
        assert!((bbox.max_y - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dominant_ring_prefers_largest_part() {
        let map = BoundaryMap::from_collection(two_feature_doc()).unwrap();
        let ring = map.dominant_ring(&ZipCode::normalize("00002")).unwrap();
        // First part is the 4x4 triangle (area 8), second the 2x2 (area 2).
        assert!((ring.signed_area().abs() - 8.0).abs() < 1e-12);
    }
}
