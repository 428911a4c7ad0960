//! Spatial neighbor index.
//!
//! A bucketed k-d tree over a fixed point set. Nodes split at the median of the axis with
//! the widest extent and keep their bounding box, so a ball query prunes whole subtrees
//! whose box lies farther than the radius.

use glam::DVec3;

/// Maximum number of points stored in a leaf.
const LEAF_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { start: usize, end: usize },
    Split { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy)]
struct KdNode {
    min: DVec3,
    max: DVec3,
    kind: NodeKind,
}

impl KdNode {
    /// Squared distance from `p` to this node's bounding box (zero inside).
    #[inline]
    fn box_distance_squared(&self, p: DVec3) -> f64 {
        let below = (self.min - p).max(DVec3::ZERO);
        let above = (p - self.max).max(DVec3::ZERO);
        (below + above).length_squared()
    }
}

/// Exact radius queries over an immutable point cloud.
#[derive(Debug, Clone)]
pub struct NeighborIndex {
    points: Vec<DVec3>,
    /// Point ids, permuted so each leaf owns a contiguous range.
    order: Vec<usize>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

impl NeighborIndex {
    /// Builds the index. An empty slice yields an empty index.
    pub fn build(points: &[DVec3]) -> Self {
        let mut index = Self {
            points: points.to_vec(),
            order: (0..points.len()).collect(),
            nodes: Vec::with_capacity(2 * points.len() / LEAF_SIZE + 1),
            root: None,
        };
        if !points.is_empty() {
            index.root = Some(index.build_recursive(0, points.len()));
        }
        index
    }

    fn build_recursive(&mut self, start: usize, end: usize) -> usize {
        let (min, max) = self.order[start..end].iter().fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(lo, hi), &id| (lo.min(self.points[id]), hi.max(self.points[id])),
        );

        if end - start <= LEAF_SIZE {
            self.nodes.push(KdNode {
                min,
                max,
                kind: NodeKind::Leaf { start, end },
            });
            return self.nodes.len() - 1;
        }

        let extent = max - min;
        let axis = if extent.x >= extent.y && extent.x >= extent.z {
            0
        } else if extent.y >= extent.z {
            1
        } else {
            2
        };

        let half = (end - start) / 2;
        let points = &self.points;
        self.order[start..end].select_nth_unstable_by(half, |&a, &b| {
            points[a][axis].total_cmp(&points[b][axis])
        });

        let mid = start + half;
        let left = self.build_recursive(start, mid);
        let right = self.build_recursive(mid, end);
        self.nodes.push(KdNode {
            min,
            max,
            kind: NodeKind::Split { left, right },
        });
        self.nodes.len() - 1
    }

    /// Returns the number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the index holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the indexed points.
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Returns the ids of all points within `radius` of point `i`, `i` included,
    /// in ascending id order.
    ///
    /// # Panics
    /// Panics if `i` is out of range.
    pub fn query_ball(&self, i: usize, radius: f64) -> Vec<usize> {
        self.query_point(self.points[i], radius)
    }

    /// Returns the ids of all points with `distance(p, point) <= radius`, in ascending
    /// id order. A negative or NaN radius matches nothing.
    pub fn query_point(&self, p: DVec3, radius: f64) -> Vec<usize> {
        let mut found = Vec::new();
        self.for_each_within(p, radius, |id, _| found.push(id));
        found.sort_unstable();
        found
    }

    /// Calls `visit(id, distance_squared)` for every point within `radius` of `p`,
    /// in tree order.
    pub fn for_each_within<F>(&self, p: DVec3, radius: f64, mut visit: F)
    where
        F: FnMut(usize, f64),
    {
        let Some(root) = self.root else {
            return;
        };
        if radius.is_nan() || radius < 0.0 {
            return;
        }
        let radius_sq = radius * radius;

        let mut stack = vec![root];
        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx];
            if node.box_distance_squared(p) > radius_sq {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, end } => {
                    for &id in &self.order[start..end] {
                        let d2 = self.points[id].distance_squared(p);
                        if d2 <= radius_sq {
                            visit(id, d2);
                        }
                    }
                }
                NodeKind::Split { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn brute_force(points: &[DVec3], p: DVec3, radius: f64) -> Vec<usize> {
        points
            .iter()
            .enumerate()
            .filter(|(_, q)| q.distance_squared(p) <= radius * radius)
            .map(|(i, _)| i)
            .collect()
    }

    fn grid(n: usize) -> Vec<DVec3> {
        let mut points = Vec::with_capacity(n * n * n);
        for x in 0..n {
            for y in 0..n {
                for z in 0..n {
                    points.push(DVec3::new(x as f64, y as f64, z as f64) * 0.5);
                }
            }
        }
        points
    }

    #[test]
    fn test_empty_index() {
        let index = NeighborIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.query_point(DVec3::ZERO, 10.0).is_empty());
    }

    #[test]
    fn test_query_includes_self() {
        let points = grid(4);
        let index = NeighborIndex::build(&points);
        for i in 0..points.len() {
            assert!(index.query_ball(i, 0.1).contains(&i));
        }
    }

    #[test]
    fn test_grid_matches_brute_force() {
        let points = grid(7);
        let index = NeighborIndex::build(&points);
        for (i, p) in points.iter().enumerate().step_by(5) {
            for radius in [0.0, 0.49, 0.5, 0.75, 1.2] {
                assert_eq!(
                    index.query_ball(i, radius),
                    brute_force(&points, *p, radius),
                    "point {i} radius {radius}"
                );
            }
        }
    }

    #[test]
    fn test_duplicate_points() {
        let points = vec![DVec3::ONE; 100];
        let index = NeighborIndex::build(&points);
        assert_eq!(index.query_ball(0, 0.0).len(), 100);
        assert!(index.query_point(DVec3::ZERO, 1.0).is_empty());
    }

    #[test]
    fn test_rings_sharing_a_coordinate() {
        // Tessellated spheres put whole latitude rings at one exact z.
        let mut points = Vec::new();
        for ring in 0..3 {
            let z = f64::from(ring) * 0.25;
            for k in 0..120 {
                let theta = std::f64::consts::TAU * f64::from(k) / 120.0;
                points.push(DVec3::new(theta.cos(), theta.sin(), z));
            }
        }
        let index = NeighborIndex::build(&points);
        for (i, p) in points.iter().enumerate().step_by(17) {
            for radius in [0.05, 0.3, 1.0] {
                assert_eq!(index.query_ball(i, radius), brute_force(&points, *p, radius));
            }
        }
    }

    #[test]
    fn test_invalid_radius() {
        let points = grid(3);
        let index = NeighborIndex::build(&points);
        assert!(index.query_ball(0, -1.0).is_empty());
        assert!(index.query_ball(0, f64::NAN).is_empty());
    }

    proptest! {
        #[test]
        fn prop_ball_query_is_exact(
            coords in prop::collection::vec((-5.0f64..5.0, -5.0f64..5.0, -5.0f64..5.0), 1..300),
            query in (-6.0f64..6.0, -6.0f64..6.0, -6.0f64..6.0),
            radius in 0.0f64..4.0,
        ) {
            let points: Vec<DVec3> = coords.iter().map(|&(x, y, z)| DVec3::new(x, y, z)).collect();
            let index = NeighborIndex::build(&points);
            let p = DVec3::new(query.0, query.1, query.2);
            prop_assert_eq!(index.query_point(p, radius), brute_force(&points, p, radius));
        }
    }
}
