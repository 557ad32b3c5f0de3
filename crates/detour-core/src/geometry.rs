//! Planar primitives in longitude/latitude degrees.
//!
//! Coordinates are treated as a flat plane: `x` is longitude and `y` is
//! latitude. The only projection anywhere in the crate is the meters/degrees
//! conversion in [`crate::sizing`].

use serde::{Deserialize, Serialize};

/// Absolute tolerance shared by the containment and intersection tests.
pub const EPS: f64 = 1e-12;

/// A position with `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "lon")]
    pub x: f64,
    #[serde(rename = "lat")]
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lon(&self) -> f64 {
        self.x
    }

    pub fn lat(&self) -> f64 {
        self.y
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub(crate) fn sub(self, other: Point) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

/// 2-D cross product of two direction vectors.
pub(crate) fn cross(a: (f64, f64), b: (f64, f64)) -> f64 {
    a.0 * b.1 - a.1 * b.0
}

/// Axis-aligned bounding box used for index queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Bounding box of the segment `a -> b`.
    pub fn of_segment(a: Point, b: Point) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }
}

/// An axis-aligned obstacle rectangle tagged with the id of its source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    pub id: u64,
}

impl Rectangle {
    /// Build from two opposite corners given in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64, id: u64) -> Self {
        Self {
            xmin: x1.min(x2),
            ymin: y1.min(y2),
            xmax: x1.max(x2),
            ymax: y1.max(y2),
            id,
        }
    }

    pub fn bbox(&self) -> BoundingBox {
        BoundingBox {
            min_x: self.xmin,
            min_y: self.ymin,
            max_x: self.xmax,
            max_y: self.ymax,
        }
    }

    pub fn south_west(&self) -> Point {
        Point::new(self.xmin, self.ymin)
    }

    pub fn north_east(&self) -> Point {
        Point::new(self.xmax, self.ymax)
    }

    /// Containment test; points on the boundary (within [`EPS`]) are inside.
    pub fn contains(&self, p: Point) -> bool {
        self.xmin - EPS <= p.x
            && p.x <= self.xmax + EPS
            && self.ymin - EPS <= p.y
            && p.y <= self.ymax + EPS
    }

    /// Boundary segments in fixed order: bottom, top, left, right.
    pub fn edges(&self) -> [(Point, Point); 4] {
        let sw = Point::new(self.xmin, self.ymin);
        let se = Point::new(self.xmax, self.ymin);
        let nw = Point::new(self.xmin, self.ymax);
        let ne = Point::new(self.xmax, self.ymax);
        [(sw, se), (nw, ne), (sw, nw), (se, ne)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_normalizes_corner_order() {
        let corners = [
            (1.0, 2.0, 3.0, 4.0),
            (3.0, 4.0, 1.0, 2.0),
            (3.0, 2.0, 1.0, 4.0),
            (1.0, 4.0, 3.0, 2.0),
        ];
        for (x1, y1, x2, y2) in corners {
            let rect = Rectangle::new(x1, y1, x2, y2, 7);
            assert!(rect.xmin <= rect.xmax);
            assert!(rect.ymin <= rect.ymax);
            assert_eq!((rect.xmin, rect.ymin, rect.xmax, rect.ymax), (1.0, 2.0, 3.0, 4.0));
            assert_eq!(rect.id, 7);
        }
    }

    #[test]
    fn corners_follow_normalized_bounds() {
        let rect = Rectangle::new(90.1, 23.2, 90.0, 23.0, 3);
        assert_eq!(rect.south_west(), Point::new(90.0, 23.0));
        assert_eq!(rect.north_east(), Point::new(90.1, 23.2));
    }

    #[test]
    fn boundary_points_count_as_inside() {
        let rect = Rectangle::new(0.0, 0.0, 1.0, 1.0, 1);
        assert!(rect.contains(Point::new(0.0, 0.5)));
        assert!(rect.contains(Point::new(1.0, 1.0)));
        assert!(rect.contains(Point::new(1.0 + 1e-13, 0.5)));
        assert!(!rect.contains(Point::new(1.0 + 1e-9, 0.5)));
        assert!(!rect.contains(Point::new(-0.5, 0.5)));
    }

    #[test]
    fn edges_follow_bottom_top_left_right() {
        let rect = Rectangle::new(0.0, 0.0, 2.0, 1.0, 1);
        let [bottom, top, left, right] = rect.edges();
        assert_eq!(bottom, (Point::new(0.0, 0.0), Point::new(2.0, 0.0)));
        assert_eq!(top, (Point::new(0.0, 1.0), Point::new(2.0, 1.0)));
        assert_eq!(left, (Point::new(0.0, 0.0), Point::new(0.0, 1.0)));
        assert_eq!(right, (Point::new(2.0, 0.0), Point::new(2.0, 1.0)));
    }

    #[test]
    fn segment_bbox_covers_both_endpoints() {
        let bbox = BoundingBox::of_segment(Point::new(3.0, -1.0), Point::new(1.0, 2.0));
        assert_eq!(bbox.min_x, 1.0);
        assert_eq!(bbox.max_x, 3.0);
        assert_eq!(bbox.min_y, -1.0);
        assert_eq!(bbox.max_y, 2.0);
        assert!(bbox.intersects(&Rectangle::new(2.5, 1.5, 5.0, 5.0, 1).bbox()));
        assert!(!bbox.intersects(&Rectangle::new(4.0, 4.0, 5.0, 5.0, 1).bbox()));
    }
}
