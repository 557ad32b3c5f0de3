//! Path collision scanning against indexed obstacles.

use crate::error::GeometryError;
use crate::geometry::{BoundingBox, Point};
use crate::index::ObstacleIndex;
use crate::intersection::{first_hit_with_rect, Intersection};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};

/// Route geometry as returned by a routing provider, in `(lon, lat)` order.
#[derive(Debug, Clone, PartialEq)]
pub enum PathGeometry {
    LineString(Vec<Point>),
    MultiLineString(Vec<Vec<Point>>),
}

/// Earliest entry of one path segment into any obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionHit {
    pub rect_id: u64,
    /// Which line of a MultiLineString the segment belongs to (always 0 for a
    /// LineString).
    pub part_index: usize,
    pub segment_index: usize,
    pub hit_point: Point,
    pub t: f64,
}

impl PathGeometry {
    pub fn kind(&self) -> &'static str {
        match self {
            PathGeometry::LineString(_) => "LineString",
            PathGeometry::MultiLineString(_) => "MultiLineString",
        }
    }

    pub fn parts(&self) -> Vec<&[Point]> {
        match self {
            PathGeometry::LineString(points) => vec![points.as_slice()],
            PathGeometry::MultiLineString(parts) => parts.iter().map(Vec::as_slice).collect(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.parts().iter().map(|part| part.len()).sum()
    }

    /// Parse a GeoJSON geometry object.
    pub fn from_geojson(geometry: &Value) -> Result<Self, GeometryError> {
        let kind = geometry
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GeometryError::MalformedGeometry("missing \"type\"".to_string()))?;
        let coords = geometry
            .get("coordinates")
            .ok_or_else(|| GeometryError::MalformedGeometry("missing \"coordinates\"".to_string()))?;

        match kind {
            "LineString" => Ok(PathGeometry::LineString(parse_line(coords)?)),
            "MultiLineString" => {
                let parts = coords.as_array().ok_or_else(|| {
                    GeometryError::MalformedGeometry("coordinates must be an array".to_string())
                })?;
                let parts = parts.iter().map(parse_line).collect::<Result<Vec<_>, _>>()?;
                Ok(PathGeometry::MultiLineString(parts))
            }
            other => Err(GeometryError::UnsupportedGeometry(other.to_string())),
        }
    }

    pub fn to_geojson(&self) -> Value {
        fn line(points: &[Point]) -> Value {
            Value::Array(points.iter().map(|p| json!([p.x, p.y])).collect())
        }
        match self {
            PathGeometry::LineString(points) => json!({
                "type": "LineString",
                "coordinates": line(points),
            }),
            PathGeometry::MultiLineString(parts) => json!({
                "type": "MultiLineString",
                "coordinates": parts.iter().map(|part| line(part)).collect::<Vec<_>>(),
            }),
        }
    }
}

fn parse_line(coords: &Value) -> Result<Vec<Point>, GeometryError> {
    let positions = coords
        .as_array()
        .ok_or_else(|| GeometryError::MalformedGeometry("line must be an array".to_string()))?;
    if positions.len() < 2 {
        return Err(GeometryError::MalformedGeometry(format!(
            "line needs at least 2 positions, got {}",
            positions.len()
        )));
    }
    positions.iter().map(parse_position).collect()
}

fn parse_position(position: &Value) -> Result<Point, GeometryError> {
    let pair = position
        .as_array()
        .filter(|pair| pair.len() >= 2)
        .ok_or_else(|| {
            GeometryError::MalformedGeometry(format!("position must be [lon, lat], got {position}"))
        })?;
    let lon = pair[0]
        .as_f64()
        .ok_or_else(|| GeometryError::MalformedGeometry(format!("bad longitude {}", pair[0])))?;
    let lat = pair[1]
        .as_f64()
        .ok_or_else(|| GeometryError::MalformedGeometry(format!("bad latitude {}", pair[1])))?;
    Ok(Point::new(
        crate::error::ensure_finite("longitude", lon)?,
        crate::error::ensure_finite("latitude", lat)?,
    ))
}

impl Serialize for PathGeometry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_geojson().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PathGeometry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        PathGeometry::from_geojson(&value).map_err(serde::de::Error::custom)
    }
}

/// Collision hits for a path, one per colliding segment, in path order.
///
/// Each line of a MultiLineString is scanned on its own; segment indices
/// restart at 0 for every line and nothing is inferred across the gap.
pub fn scan(path: &PathGeometry, index: &ObstacleIndex) -> Vec<CollisionHit> {
    path.parts()
        .into_iter()
        .enumerate()
        .flat_map(|(part_index, points)| scan_line(points, index, part_index))
        .collect()
}

/// [`scan`] for a raw GeoJSON geometry.
pub fn scan_geojson(
    geometry: &Value,
    index: &ObstacleIndex,
) -> Result<Vec<CollisionHit>, GeometryError> {
    Ok(scan(&PathGeometry::from_geojson(geometry)?, index))
}

fn scan_line(points: &[Point], index: &ObstacleIndex, part_index: usize) -> Vec<CollisionHit> {
    points
        .windows(2)
        .enumerate()
        .filter_map(|(segment_index, pair)| {
            let (a, b) = (pair[0], pair[1]);
            let (rect_id, hit) = earliest_candidate_hit(a, b, index)?;
            Some(CollisionHit {
                rect_id,
                part_index,
                segment_index,
                hit_point: hit.point,
                t: hit.t,
            })
        })
        .collect()
}

fn earliest_candidate_hit(a: Point, b: Point, index: &ObstacleIndex) -> Option<(u64, Intersection)> {
    index
        .query(&BoundingBox::of_segment(a, b))
        .into_iter()
        .filter_map(|rect| first_hit_with_rect(a, b, rect).map(|hit| (rect.id, hit)))
        .fold(None, |best, (id, hit)| match best {
            Some((_, current)) if current.t <= hit.t => best,
            _ => Some((id, hit)),
        })
}
