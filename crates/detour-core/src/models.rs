//! Obstacle and route data shared by the planner and its callers.

use crate::error::{ensure_range, GeometryError};
use crate::geometry::{Point, Rectangle};
use crate::index::ObstacleIndex;
use crate::scanner::PathGeometry;
use crate::sizing::{scale_rect, RectScaling};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// A geographic position as callers usually write it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn validate(&self) -> Result<(), GeometryError> {
        ensure_range("latitude", self.lat, -90.0, 90.0)?;
        ensure_range("longitude", self.lon, -180.0, 180.0)?;
        Ok(())
    }
}

impl From<LatLon> for Point {
    fn from(value: LatLon) -> Self {
        Point::new(value.lon, value.lat)
    }
}

impl std::str::FromStr for LatLon {
    type Err = String;

    /// Parse `"lat,lon"`, e.g. `23.777176,90.399452`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("use 'lat,lon' like 23.777176,90.399452, got {s:?}"))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| format!("invalid latitude {:?}", lat.trim()))?;
        let lon: f64 = lon
            .trim()
            .parse()
            .map_err(|_| format!("invalid longitude {:?}", lon.trim()))?;
        let value = LatLon::new(lat, lon);
        value.validate().map_err(|err| err.to_string())?;
        Ok(value)
    }
}

/// A caller-supplied obstacle: `[minLon, minLat, maxLon, maxLat]` with an
/// optional id as a fifth element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSpec {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
    pub id: Option<u64>,
}

impl ObstacleSpec {
    /// Parse the array form; `index` is the 0-based position in the request.
    pub fn from_values(index: usize, values: &[f64]) -> Result<Self, GeometryError> {
        if values.len() != 4 && values.len() != 5 {
            return Err(GeometryError::ObstacleArity {
                index,
                len: values.len(),
            });
        }
        let id = match values.get(4).copied() {
            Some(raw) if raw.is_finite() && raw >= 0.0 && raw.fract() == 0.0 => Some(raw as u64),
            Some(raw) => return Err(GeometryError::InvalidObstacleId { index, value: raw }),
            None => None,
        };
        Ok(Self {
            min_lon: ensure_range("obstacle longitude", values[0], -180.0, 180.0)?,
            min_lat: ensure_range("obstacle latitude", values[1], -90.0, 90.0)?,
            max_lon: ensure_range("obstacle longitude", values[2], -180.0, 180.0)?,
            max_lat: ensure_range("obstacle latitude", values[3], -90.0, 90.0)?,
            id,
        })
    }

    /// The rectangle this obstacle covers; without an explicit id the 1-based
    /// `position` is used.
    pub fn to_rectangle(&self, position: usize) -> Rectangle {
        Rectangle::new(
            self.min_lon,
            self.min_lat,
            self.max_lon,
            self.max_lat,
            self.id.unwrap_or(position as u64),
        )
    }
}

/// An obstacle after sizing, keeping the caller's original bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    pub raw: Rectangle,
    pub scaled: Rectangle,
}

/// Every obstacle of one planning request, scaled once and addressable by id.
#[derive(Debug, Clone, Default)]
pub struct ObstacleSet {
    obstacles: Vec<Obstacle>,
    by_id: HashMap<u64, usize>,
}

impl ObstacleSet {
    /// Every obstacle latitude must lie within `scaling.lat_limit_deg`.
    pub fn from_specs(specs: &[ObstacleSpec], scaling: &RectScaling) -> Result<Self, GeometryError> {
        let limit = scaling.lat_limit_deg.abs();
        let mut set = Self::default();
        for (position, spec) in specs.iter().enumerate() {
            ensure_range("obstacle latitude", spec.min_lat, -limit, limit)?;
            ensure_range("obstacle latitude", spec.max_lat, -limit, limit)?;
            let raw = spec.to_rectangle(position + 1);
            if set.by_id.insert(raw.id, set.obstacles.len()).is_some() {
                return Err(GeometryError::DuplicateObstacleId(raw.id));
            }
            set.obstacles.push(Obstacle {
                id: raw.id,
                raw,
                scaled: scale_rect(&raw, scaling),
            });
        }
        Ok(set)
    }

    /// Parse and scale the raw array form.
    pub fn from_arrays(raw: &[Vec<f64>], scaling: &RectScaling) -> Result<Self, GeometryError> {
        let specs = raw
            .iter()
            .enumerate()
            .map(|(index, values)| ObstacleSpec::from_values(index, values))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_specs(&specs, scaling)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }

    pub fn get(&self, id: u64) -> Option<&Obstacle> {
        self.by_id.get(&id).map(|&slot| &self.obstacles[slot])
    }

    /// Spatial index over the scaled rectangles.
    pub fn build_index(&self) -> ObstacleIndex {
        ObstacleIndex::build(self.obstacles.iter().map(|o| o.scaled).collect())
    }
}

/// Travel summary reported by the routing provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub length_m: f64,
    pub travel_time_s: f64,
}

impl RouteSummary {
    pub fn length_km(&self) -> f64 {
        self.length_m / 1000.0
    }

    pub fn travel_time_min(&self) -> f64 {
        self.travel_time_s / 60.0
    }
}

/// A route geometry paired with its summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub summary: RouteSummary,
    pub geometry: PathGeometry,
}

impl Route {
    /// A FeatureCollection holding the route as its only Feature, with the
    /// summary as properties.
    pub fn to_feature_collection(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {
                    "lengthInMeters": self.summary.length_m,
                    "travelTimeInSeconds": self.summary.travel_time_s,
                },
                "geometry": self.geometry.to_geojson(),
            }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_ids_default_to_one_based_position() {
        let set = ObstacleSet::from_arrays(
            &[
                vec![1.0, 1.0, 1.0, 1.0],
                vec![90.399345, 23.791977, 90.401485, 23.793821, 42.0],
                vec![90.0, 23.0, 90.1, 23.1],
            ],
            &RectScaling::default(),
        )
        .expect("valid obstacles");
        let ids: Vec<u64> = set.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 42, 3]);
        assert_eq!(set.get(42).map(|o| o.raw.xmin), Some(90.399345));
        assert!(set.get(2).is_none());
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = ObstacleSet::from_arrays(&[vec![1.0, 2.0, 3.0]], &RectScaling::default())
            .unwrap_err();
        assert_eq!(err, GeometryError::ObstacleArity { index: 0, len: 3 });

        let err = ObstacleSpec::from_values(2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap_err();
        assert_eq!(err, GeometryError::ObstacleArity { index: 2, len: 6 });
    }

    #[test]
    fn non_finite_and_out_of_range_values_are_rejected() {
        assert!(matches!(
            ObstacleSpec::from_values(0, &[f64::NAN, 0.0, 1.0, 1.0]),
            Err(GeometryError::NonFinite { .. })
        ));
        assert!(matches!(
            ObstacleSpec::from_values(0, &[0.0, 95.0, 1.0, 1.0]),
            Err(GeometryError::OutOfRange { .. })
        ));
        assert!(matches!(
            ObstacleSpec::from_values(0, &[0.0, 0.0, 1.0, 1.0, 1.5]),
            Err(GeometryError::InvalidObstacleId { .. })
        ));
    }

    #[test]
    fn obstacles_beyond_latitude_limit_are_rejected() {
        let err = ObstacleSet::from_arrays(&[vec![0.0, 89.999, 0.001, 90.0]], &RectScaling::default())
            .unwrap_err();
        assert!(matches!(
            err,
            GeometryError::OutOfRange { value, max, .. } if value == 89.999 && max == 80.0
        ));
        assert!(ObstacleSet::from_arrays(
            &[vec![0.0, -80.5, 0.001, -79.5]],
            &RectScaling::default()
        )
        .is_err());

        let set = ObstacleSet::from_arrays(&[vec![0.0, 79.0, 0.001, 79.5]], &RectScaling::default())
            .expect("inside limit");
        let scaled = set.get(1).expect("present").scaled;
        assert!(scaled.ymax <= 80.0);
        assert!(scaled.xmax - scaled.xmin < 0.1);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = ObstacleSet::from_arrays(
            &[vec![0.0, 0.0, 1.0, 1.0, 2.0], vec![2.0, 2.0, 3.0, 3.0]],
            &RectScaling::default(),
        )
        .unwrap_err();
        assert_eq!(err, GeometryError::DuplicateObstacleId(2));
    }

    #[test]
    fn scaled_rectangles_contain_raw_ones() {
        let set = ObstacleSet::from_arrays(
            &[vec![90.401485, 23.793821, 90.399345, 23.791977]],
            &RectScaling::default(),
        )
        .expect("valid");
        let obstacle = set.get(1).expect("present");
        assert!(obstacle.scaled.xmin < obstacle.raw.xmin);
        assert!(obstacle.scaled.ymax > obstacle.raw.ymax);
        assert_eq!(set.build_index().len(), 1);
    }

    #[test]
    fn lat_lon_parses_from_text() {
        let value: LatLon = "23.7767759, 90.3996056".parse().expect("parse");
        assert_eq!(value, LatLon::new(23.7767759, 90.3996056));
        assert!("23.7".parse::<LatLon>().is_err());
        assert!("123.0,90.0".parse::<LatLon>().is_err());
        assert_eq!(Point::from(value), Point::new(90.3996056, 23.7767759));
    }

    #[test]
    fn route_renders_as_feature_collection() {
        let route = Route {
            summary: RouteSummary {
                length_m: 4200.0,
                travel_time_s: 600.0,
            },
            geometry: PathGeometry::LineString(vec![Point::new(90.0, 23.0), Point::new(90.1, 23.1)]),
        };
        let value = route.to_feature_collection();
        assert_eq!(value["features"][0]["properties"]["lengthInMeters"], 4200.0);
        assert_eq!(value["features"][0]["geometry"]["type"], "LineString");
        assert_eq!(route.summary.length_km(), 4.2);
        assert_eq!(route.summary.travel_time_min(), 10.0);
    }
}
