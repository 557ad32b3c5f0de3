//! Detour core: collision detection between routes and rectangular
//! obstacles.
//!
//! Everything here is synchronous and free of I/O. The avoidance loop that
//! talks to a routing provider lives in `detour-server`.

pub mod error;
pub mod geometry;
pub mod index;
pub mod intersection;
pub mod models;
pub mod scanner;
pub mod sizing;

pub use error::GeometryError;
pub use geometry::{BoundingBox, Point, Rectangle, EPS};
pub use index::ObstacleIndex;
pub use intersection::{first_hit_with_rect, segment_intersection, Intersection};
pub use models::{LatLon, Obstacle, ObstacleSet, ObstacleSpec, Route, RouteSummary};
pub use scanner::{scan, scan_geojson, CollisionHit, PathGeometry};
pub use sizing::{meters_per_deg_lat, meters_per_deg_lon, scale_rect, RectScaling};
