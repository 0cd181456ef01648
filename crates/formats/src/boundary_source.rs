use foundation::ids::RegionId;
use foundation::math::{Geodetic, Vec3, geodetic_to_ecef};
use serde_json::{Map, Value};
use tracing::debug;

/// CRS name marking a collection whose coordinates are already Cartesian.
pub const NO_REPROJECTION_CRS: &str = "noReprojection";

/// How source coordinates map into scene space.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordinateSpace {
    /// `[lon_deg, lat_deg, height_m?]` on the WGS84 ellipsoid.
    Geographic,
    /// `[x, y, z]` used as-is.
    Unprojected,
}

/// One polygon part of a boundary feature, before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRegion {
    pub id: RegionId,
    pub outer_ring: Vec<Vec3>,
    pub holes: Vec<Vec<Vec3>>,
}

/// A parsed boundary layer: every polygon part of every usable feature.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySource {
    pub space: CoordinateSpace,
    pub regions: Vec<RawRegion>,
    /// Features without an id or without polygonal geometry.
    pub skipped_features: usize,
}

#[derive(Debug)]
pub enum BoundarySourceError {
    Json(String),
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for BoundarySourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundarySourceError::Json(e) => write!(f, "JSON parse error: {e}"),
            BoundarySourceError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            BoundarySourceError::InvalidFeature { index, reason } => {
                write!(f, "invalid feature at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for BoundarySourceError {}

impl BoundarySource {
    pub fn from_geojson_str(payload: &str) -> Result<Self, BoundarySourceError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| BoundarySourceError::Json(e.to_string()))?;
        Self::from_geojson_value(&value)
    }

    pub fn from_geojson_value(value: &Value) -> Result<Self, BoundarySourceError> {
        let obj = value
            .as_object()
            .ok_or(BoundarySourceError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(BoundarySourceError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(BoundarySourceError::NotAFeatureCollection);
        }

        let features = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(BoundarySourceError::NotAFeatureCollection)?;

        let space = coordinate_space(obj);
        let mut out = BoundarySource {
            space,
            regions: Vec::new(),
            skipped_features: 0,
        };

        for (index, feat_val) in features.iter().enumerate() {
            let feat = feat_val
                .as_object()
                .ok_or(BoundarySourceError::InvalidFeature {
                    index,
                    reason: "feature must be an object".to_string(),
                })?;

            let feat_type = feat.get("type").and_then(|v| v.as_str()).ok_or(
                BoundarySourceError::InvalidFeature {
                    index,
                    reason: "feature missing type".to_string(),
                },
            )?;
            if feat_type != "Feature" {
                return Err(BoundarySourceError::InvalidFeature {
                    index,
                    reason: format!("unexpected feature type: {feat_type}"),
                });
            }

            let Some(id) = region_id(feat) else {
                out.skipped_features += 1;
                continue;
            };

            let parts = match feat.get("geometry") {
                Some(Value::Null) | None => None,
                Some(geometry) => parse_polygons(geometry, space)
                    .map_err(|reason| BoundarySourceError::InvalidFeature { index, reason })?,
            };
            let Some(parts) = parts else {
                out.skipped_features += 1;
                continue;
            };

            for mut rings in parts {
                if rings.is_empty() {
                    continue;
                }
                let outer_ring = rings.remove(0);
                out.regions.push(RawRegion {
                    id: id.clone(),
                    outer_ring,
                    holes: rings,
                });
            }
        }

        debug!(
            regions = out.regions.len(),
            skipped = out.skipped_features,
            "parsed boundary source"
        );
        Ok(out)
    }
}

fn coordinate_space(obj: &Map<String, Value>) -> CoordinateSpace {
    let crs_name = obj
        .get("crs")
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(|name| name.as_str());
    match crs_name {
        Some(NO_REPROJECTION_CRS) => CoordinateSpace::Unprojected,
        _ => CoordinateSpace::Geographic,
    }
}

/// `properties.id` first, then the feature-level `id`.
fn region_id(feat: &Map<String, Value>) -> Option<RegionId> {
    let from_props = feat.get("properties").and_then(|p| p.get("id"));
    id_value(from_props).or_else(|| id_value(feat.get("id")))
}

fn id_value(value: Option<&Value>) -> Option<RegionId> {
    match value {
        Some(Value::String(s)) => Some(RegionId::new(s.clone())),
        Some(Value::Number(n)) => Some(RegionId::new(n.to_string())),
        _ => None,
    }
}

/// Polygon parts of a geometry; `None` for non-polygonal geometry.
fn parse_polygons(
    value: &Value,
    space: CoordinateSpace,
) -> Result<Option<Vec<Vec<Vec<Vec3>>>>, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    match ty {
        "Polygon" => {
            let coords = coordinates(obj)?;
            Ok(Some(vec![parse_polygon(coords, space)?]))
        }
        "MultiPolygon" => {
            let coords = coordinates(obj)?;
            let polys = coords
                .as_array()
                .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
            let mut out = Vec::with_capacity(polys.len());
            for poly in polys {
                out.push(parse_polygon(poly, space)?);
            }
            Ok(Some(out))
        }
        _ => Ok(None),
    }
}

fn coordinates(obj: &Map<String, Value>) -> Result<&Value, String> {
    obj.get("coordinates")
        .ok_or("geometry missing coordinates".to_string())
}

fn parse_polygon(coords: &Value, space: CoordinateSpace) -> Result<Vec<Vec<Vec3>>, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring, space)?);
    }
    Ok(out)
}

fn parse_ring(coords: &Value, space: CoordinateSpace) -> Result<Vec<Vec3>, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item, space)?);
    }
    Ok(out)
}

fn parse_position(value: &Value, space: CoordinateSpace) -> Result<Vec3, String> {
    let arr = value
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have at least two components".to_string());
    }
    let mut c = [0.0f64; 3];
    for (slot, item) in c.iter_mut().zip(arr.iter()) {
        *slot = item
            .as_f64()
            .ok_or("position components must be numbers".to_string())?;
    }
    Ok(match space {
        CoordinateSpace::Unprojected => Vec3::new(c[0], c[1], c[2]),
        CoordinateSpace::Geographic => geodetic_to_ecef(Geodetic::from_degrees(c[0], c[1], c[2])),
    })
}

#[cfg(test)]
mod tests {
    use super::{BoundarySource, BoundarySourceError, CoordinateSpace};
    use foundation::ids::RegionId;
    use foundation::math::{Vec3, WGS84_A};
    use pretty_assertions::assert_eq;

    const UNPROJECTED: &str = r#"{
        "type": "FeatureCollection",
        "crs": { "type": "name", "properties": { "name": "noReprojection" } },
        "features": [
            {
                "type": "Feature",
                "properties": { "id": "1" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[0, 0, 0], [4, 0, 0], [4, 4, 0], [0, 4, 0], [0, 0, 0]],
                        [[1, 1, 0], [2, 1, 0], [2, 2, 0], [1, 1, 0]]
                    ]
                }
            },
            {
                "type": "Feature",
                "id": 2,
                "properties": {},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[10, 0, 0], [11, 0, 0], [11, 1, 0], [10, 0, 0]]],
                        [[[20, 0, 0], [21, 0, 0], [21, 1, 0], [20, 0, 0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "no id" },
                "geometry": { "type": "Polygon", "coordinates": [] }
            },
            {
                "type": "Feature",
                "properties": { "id": "pt" },
                "geometry": { "type": "Point", "coordinates": [1, 2] }
            }
        ]
    }"#;

    #[test]
    fn parses_unprojected_polygons_and_parts() {
        let src = BoundarySource::from_geojson_str(UNPROJECTED).expect("parse");
        assert_eq!(src.space, CoordinateSpace::Unprojected);
        assert_eq!(src.skipped_features, 2);

        let ids: Vec<&str> = src.regions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "2"]);

        let first = &src.regions[0];
        assert_eq!(first.id, RegionId::from("1"));
        assert_eq!(first.outer_ring.len(), 5);
        assert_eq!(first.outer_ring[1], Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(first.holes.len(), 1);
        assert!(src.regions[1].holes.is_empty());
    }

    #[test]
    fn geographic_coordinates_become_ecef() {
        let payload = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "id": 7 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
                }
            }]
        }"#;
        let src = BoundarySource::from_geojson_str(payload).expect("parse");
        assert_eq!(src.space, CoordinateSpace::Geographic);
        assert_eq!(src.regions[0].id.as_str(), "7");
        let p = src.regions[0].outer_ring[0];
        assert!((p.x - WGS84_A).abs() < 1e-6);
    }

    #[test]
    fn rejects_non_collections_and_bad_positions() {
        let err = BoundarySource::from_geojson_str(r#"{"type": "Feature"}"#).unwrap_err();
        assert!(matches!(err, BoundarySourceError::NotAFeatureCollection));

        let bad = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "id": "x" },
                "geometry": { "type": "Polygon", "coordinates": [[["a", 0]]] }
            }]
        }"#;
        let err = BoundarySource::from_geojson_str(bad).unwrap_err();
        assert!(matches!(err, BoundarySourceError::InvalidFeature { index: 0, .. }));

        let err = BoundarySource::from_geojson_str("{ not json").unwrap_err();
        assert!(matches!(err, BoundarySourceError::Json(_)));
    }
}
