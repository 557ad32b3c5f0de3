//! Parametric segment intersection and first entry into a rectangle.

use crate::geometry::{cross, Point, Rectangle, EPS};

/// Where a query segment `p -> q` meets something, as a fraction `t` of the
/// way from `p` to `q`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub point: Point,
}

fn in_unit_range(value: f64) -> bool {
    (-EPS..=1.0 + EPS).contains(&value)
}

/// Earliest point along `p -> q` where it meets the segment `a -> b`.
///
/// Parallel, non-collinear segments never meet. Collinear segments report
/// the earliest projected endpoint of `a -> b`; the projection uses the axis
/// with the larger direction component, so a zero-length query segment
/// reports nothing.
pub fn segment_intersection(p: Point, q: Point, a: Point, b: Point) -> Option<Intersection> {
    let r = q.sub(p);
    let s = b.sub(a);
    let rxs = cross(r, s);
    let ap = a.sub(p);
    let apxs = cross(ap, s);
    let apxr = cross(ap, r);

    if rxs.abs() <= EPS {
        if apxr.abs() > EPS {
            return None;
        }
        return collinear_entry(p, r, a, b);
    }

    let t = apxs / rxs;
    let u = apxr / rxs;
    if !(in_unit_range(t) && in_unit_range(u)) {
        return None;
    }
    Some(Intersection {
        t: t.clamp(0.0, 1.0),
        point: Point::new(p.x + t * r.0, p.y + t * r.1),
    })
}

fn collinear_entry(p: Point, r: (f64, f64), a: Point, b: Point) -> Option<Intersection> {
    let use_x = r.0.abs() >= r.1.abs();
    [a, b]
        .into_iter()
        .filter_map(|w| {
            let t = if use_x {
                if r.0.abs() <= EPS {
                    return None;
                }
                (w.x - p.x) / r.0
            } else {
                if r.1.abs() <= EPS {
                    return None;
                }
                (w.y - p.y) / r.1
            };
            in_unit_range(t).then(|| Intersection {
                t: t.clamp(0.0, 1.0),
                point: w,
            })
        })
        .fold(None, earliest)
}

/// Keep the smaller `t`; on a tie the hit already held wins.
pub(crate) fn earliest(best: Option<Intersection>, next: Intersection) -> Option<Intersection> {
    match best {
        Some(current) if current.t <= next.t => Some(current),
        _ => Some(next),
    }
}

/// First entry of the segment `a -> b` into `rect`.
///
/// A segment that already starts inside the rectangle enters at `t = 0`.
pub fn first_hit_with_rect(a: Point, b: Point, rect: &Rectangle) -> Option<Intersection> {
    if rect.contains(a) {
        return Some(Intersection { t: 0.0, point: a });
    }
    rect.edges()
        .into_iter()
        .filter_map(|(e0, e1)| segment_intersection(a, b, e0, e1))
        .fold(None, earliest)
}
