//! R-tree over obstacle rectangles for candidate filtering.

use crate::geometry::{BoundingBox, Rectangle};
use rstar::{RTree, RTreeObject, AABB};

#[derive(Debug, Clone, Copy)]
struct IndexedRect {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRect {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn to_aabb(bbox: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners([bbox.min_x, bbox.min_y], [bbox.max_x, bbox.max_y])
}

/// Bulk-loaded spatial index over a fixed set of rectangles.
///
/// Queries return a superset of the rectangles a segment can touch; exact
/// tests happen in [`crate::intersection`].
pub struct ObstacleIndex {
    rects: Vec<Rectangle>,
    tree: RTree<IndexedRect>,
}

impl std::fmt::Debug for ObstacleIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObstacleIndex")
            .field("rects", &self.rects)
            .finish_non_exhaustive()
    }
}

impl ObstacleIndex {
    pub fn build(rects: Vec<Rectangle>) -> Self {
        let entries: Vec<IndexedRect> = rects
            .iter()
            .enumerate()
            .map(|(slot, rect)| IndexedRect {
                slot,
                envelope: to_aabb(&rect.bbox()),
            })
            .collect();
        Self {
            rects,
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rects
    }

    /// Rectangles whose bounds overlap `bbox`, in the order they were built.
    pub fn query(&self, bbox: &BoundingBox) -> Vec<&Rectangle> {
        let mut slots: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&to_aabb(bbox))
            .map(|entry| entry.slot)
            .collect();
        slots.sort_unstable();
        slots.into_iter().map(|slot| &self.rects[slot]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn grid(n: usize) -> Vec<Rectangle> {
        let mut rects = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let x = i as f64 * 10.0;
                let y = j as f64 * 10.0;
                rects.push(Rectangle::new(x, y, x + 5.0, y + 5.0, (i * n + j + 1) as u64));
            }
        }
        rects
    }

    #[test]
    fn query_matches_brute_force_overlap() {
        let index = ObstacleIndex::build(grid(8));
        let queries = [
            BoundingBox::of_segment(Point::new(-1.0, -1.0), Point::new(12.0, 3.0)),
            BoundingBox::of_segment(Point::new(33.0, 7.0), Point::new(6.0, 48.0)),
            BoundingBox::of_segment(Point::new(100.0, 100.0), Point::new(120.0, 130.0)),
        ];
        for query in queries {
            let found: Vec<u64> = index.query(&query).iter().map(|r| r.id).collect();
            let expected: Vec<u64> = index
                .rectangles()
                .iter()
                .filter(|r| r.bbox().intersects(&query))
                .map(|r| r.id)
                .collect();
            assert_eq!(found, expected);
        }
    }

    #[test]
    fn touching_boxes_are_candidates() {
        let index = ObstacleIndex::build(vec![Rectangle::new(0.0, 0.0, 1.0, 1.0, 1)]);
        let query = BoundingBox::of_segment(Point::new(1.0, 1.0), Point::new(2.0, 2.0));
        assert_eq!(index.query(&query).len(), 1);
    }

    #[test]
    fn empty_index_has_no_candidates() {
        let index = ObstacleIndex::build(Vec::new());
        assert!(index.is_empty());
        let query = BoundingBox::of_segment(Point::new(0.0, 0.0), Point::new(1.0, 1.0));
        assert!(index.query(&query).is_empty());
    }
}
