//! Meter-based sizing of obstacle rectangles.
//!
//! Uses a flat-Earth approximation that holds for obstacles tens to a few
//! hundred meters across at city scale.

use crate::geometry::Rectangle;
use serde::{Deserialize, Serialize};

pub const METERS_PER_DEG: f64 = 111_320.0;

/// Meters per degree of longitude at `lat_deg`.
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    METERS_PER_DEG * lat_deg.to_radians().cos()
}

/// Meters per degree of latitude (constant in this approximation).
pub fn meters_per_deg_lat() -> f64 {
    METERS_PER_DEG
}

/// Targets applied to every raw obstacle before it is indexed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectScaling {
    pub min_width_m: f64,
    pub min_height_m: f64,
    /// Added on every side after the minimum size is reached.
    pub safety_pad_m: f64,
    /// Rectangles are kept within `[-lat_limit_deg, lat_limit_deg]`.
    pub lat_limit_deg: f64,
}

impl Default for RectScaling {
    fn default() -> Self {
        Self {
            min_width_m: 120.0,
            min_height_m: 120.0,
            safety_pad_m: 60.0,
            lat_limit_deg: 80.0,
        }
    }
}

impl RectScaling {
    /// Only clamps latitude; sizes are left alone.
    pub fn none() -> Self {
        Self {
            min_width_m: 0.0,
            min_height_m: 0.0,
            safety_pad_m: 0.0,
            ..Self::default()
        }
    }
}

pub fn center(rect: &Rectangle) -> (f64, f64) {
    ((rect.xmin + rect.xmax) / 2.0, (rect.ymin + rect.ymax) / 2.0)
}

/// Width and height in meters, measured at the center latitude.
pub fn dimensions_m(rect: &Rectangle) -> (f64, f64) {
    let (_, lat) = center(rect);
    let width = (rect.xmax - rect.xmin) * meters_per_deg_lon(lat);
    let height = (rect.ymax - rect.ymin) * meters_per_deg_lat();
    (width, height)
}

/// Grow each side by the given meters (east/west by `add_w_m`, north/south by
/// `add_h_m`).
pub fn inflate_m(rect: &Rectangle, add_w_m: f64, add_h_m: f64) -> Rectangle {
    let (_, lat) = center(rect);
    let dlon = add_w_m / meters_per_deg_lon(lat).max(1e-9);
    let dlat = add_h_m / meters_per_deg_lat();
    Rectangle {
        xmin: rect.xmin - dlon,
        ymin: rect.ymin - dlat,
        xmax: rect.xmax + dlon,
        ymax: rect.ymax + dlat,
        id: rect.id,
    }
}

/// Inflate symmetrically only by whatever is missing to reach the minimums.
pub fn ensure_min_dimensions(rect: &Rectangle, min_width_m: f64, min_height_m: f64) -> Rectangle {
    let (width, height) = dimensions_m(rect);
    let add_w = ((min_width_m - width) / 2.0).max(0.0);
    let add_h = ((min_height_m - height) / 2.0).max(0.0);
    inflate_m(rect, add_w, add_h)
}

/// Shift the rectangle north or south so its span fits the bounds; the height
/// never changes.
pub fn clamp_latitude(rect: &Rectangle, lat_min: f64, lat_max: f64) -> Rectangle {
    let (_, cy) = center(rect);
    let half_h = (rect.ymax - rect.ymin) / 2.0;
    let cy = cy.min(lat_max - half_h).max(lat_min + half_h);
    Rectangle {
        ymin: cy - half_h,
        ymax: cy + half_h,
        ..*rect
    }
}

/// Minimum size, then safety pad, then latitude clamp.
pub fn scale_rect(rect: &Rectangle, scaling: &RectScaling) -> Rectangle {
    let sized = ensure_min_dimensions(rect, scaling.min_width_m, scaling.min_height_m);
    let padded = inflate_m(&sized, scaling.safety_pad_m, scaling.safety_pad_m);
    let limit = scaling.lat_limit_deg.abs();
    clamp_latitude(&padded, -limit, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "{a} vs {b}");
    }

    #[test]
    fn longitude_degrees_shrink_with_latitude() {
        assert_close(meters_per_deg_lon(0.0), 111_320.0, 1e-6);
        assert_close(meters_per_deg_lon(60.0), 55_660.0, 1e-6);
        assert_eq!(meters_per_deg_lat(), 111_320.0);
    }

    #[test]
    fn zero_scaling_is_a_no_op() {
        let rect = Rectangle::new(90.399345, 23.791977, 90.401485, 23.793821, 2);
        let scaled = scale_rect(&rect, &RectScaling::none());
        assert_close(scaled.xmin, rect.xmin, 1e-12);
        assert_close(scaled.xmax, rect.xmax, 1e-12);
        assert_close(scaled.ymin, rect.ymin, 1e-12);
        assert_close(scaled.ymax, rect.ymax, 1e-12);
        assert_eq!(scaled.id, 2);
    }

    #[test]
    fn degenerate_rectangle_reaches_minimum_plus_pad() {
        let rect = Rectangle::new(1.0, 1.0, 1.0, 1.0, 1);
        let scaled = scale_rect(&rect, &RectScaling::default());
        let (width, height) = dimensions_m(&scaled);
        assert_close(width, 240.0, 1e-6);
        assert_close(height, 240.0, 1e-6);
        assert_close(center(&scaled).0, 1.0, 1e-12);
        assert_close(center(&scaled).1, 1.0, 1e-12);
    }

    #[test]
    fn large_rectangle_only_gets_the_pad() {
        let rect = Rectangle::new(90.0, 23.0, 90.01, 23.01, 1);
        let (width, height) = dimensions_m(&rect);
        assert!(width > 120.0 && height > 120.0);

        let scaled = scale_rect(
            &rect,
            &RectScaling {
                safety_pad_m: 0.0,
                ..RectScaling::default()
            },
        );
        assert_eq!(scaled.xmin, rect.xmin);
        assert_eq!(scaled.xmax, rect.xmax);
        assert_close(scaled.ymin, rect.ymin, 1e-12);
        assert_close(scaled.ymax, rect.ymax, 1e-12);
    }

    #[test]
    fn safety_pad_strictly_grows_both_dimensions() {
        let rect = Rectangle::new(90.399345, 23.791977, 90.401485, 23.793821, 1);
        let scaling = RectScaling {
            min_width_m: 0.0,
            min_height_m: 0.0,
            safety_pad_m: 10.0,
            lat_limit_deg: 80.0,
        };
        let scaled = scale_rect(&rect, &scaling);
        let (w0, h0) = dimensions_m(&rect);
        let (w1, h1) = dimensions_m(&scaled);
        assert!(w1 > w0);
        assert!(h1 > h0);
        assert_close(w1 - w0, 20.0, 1e-6);
        assert_close(h1 - h0, 20.0, 1e-6);
    }

    #[test]
    fn latitude_clamp_recenters_without_changing_height() {
        let rect = Rectangle::new(10.0, 79.9, 10.1, 80.5, 1);
        let clamped = clamp_latitude(&rect, -80.0, 80.0);
        assert_close(clamped.ymax, 80.0, 1e-12);
        assert_close(clamped.ymax - clamped.ymin, rect.ymax - rect.ymin, 1e-12);
        assert_eq!(clamped.xmin, rect.xmin);

        let south = Rectangle::new(10.0, -81.0, 10.1, -79.0, 1);
        let clamped = clamp_latitude(&south, -80.0, 80.0);
        assert_close(clamped.ymin, -80.0, 1e-12);
        assert_close(clamped.ymax, -78.0, 1e-12);
    }

    #[test]
    fn configured_latitude_limit_is_respected() {
        let rect = Rectangle::new(0.0, 59.99, 0.01, 60.0, 1);
        let scaling = RectScaling {
            lat_limit_deg: 60.0,
            ..RectScaling::default()
        };
        let scaled = scale_rect(&rect, &scaling);
        assert!(scaled.ymax <= 60.0 + 1e-12);
    }
}
