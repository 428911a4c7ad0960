//! Proximity triangulation of surface sample points.
//!
//! Every vertex is connected to nearby vertices of the same atomic sphere, and a triangle
//! `{i, j, k}` is kept when the patches it spans plausibly touch: the distance between two
//! points must stay below `neighbors_threshold` times the sum of their effective patch
//! radii. Candidate triangles come from a two-hop walk, `i -> j ∈ N(i) -> k ∈ N(j)`.

#[cfg(not(feature = "parallel"))]
use std::collections::HashSet;

use glam::DVec3;

use crate::error::{CosmoError, Result};
use crate::options::MeshOptions;
use crate::samples::{patch_radius, SurfaceSamples};
use crate::spatial::NeighborIndex;

/// Number of vertices between two progress reports.
#[cfg(not(feature = "parallel"))]
const PROGRESS_INTERVAL: usize = 100;

/// A triangle as an unordered triple of vertex ids, stored sorted ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Face([usize; 3]);

impl Face {
    /// Creates a face from three ids in any order.
    #[must_use]
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        let mut ids = [a, b, c];
        ids.sort_unstable();
        Self(ids)
    }

    /// Returns the ids in ascending order.
    #[must_use]
    pub fn indices(&self) -> [usize; 3] {
        self.0
    }

    /// Returns true if the three ids are pairwise different.
    #[must_use]
    pub fn has_distinct_ids(&self) -> bool {
        self.0[0] != self.0[1] && self.0[1] != self.0[2]
    }
}

/// A duplicate-free set of faces, iterated in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceSet {
    faces: Vec<Face>,
}

impl FaceSet {
    /// Returns the number of faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if the set holds no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Returns true if the triangle with these ids (in any order) is in the set.
    pub fn contains(&self, a: usize, b: usize, c: usize) -> bool {
        self.faces.binary_search(&Face::new(a, b, c)).is_ok()
    }

    /// Returns the faces in ascending order.
    pub fn as_slice(&self) -> &[Face] {
        &self.faces
    }

    /// Iterates over the faces in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, Face> {
        self.faces.iter()
    }

    /// Consumes the set, returning its sorted faces.
    pub fn into_vec(self) -> Vec<Face> {
        self.faces
    }
}

impl FromIterator<Face> for FaceSet {
    fn from_iter<I: IntoIterator<Item = Face>>(iter: I) -> Self {
        let mut faces: Vec<Face> = iter.into_iter().collect();
        faces.sort_unstable();
        faces.dedup();
        Self { faces }
    }
}

impl<'a> IntoIterator for &'a FaceSet {
    type Item = &'a Face;
    type IntoIter = std::slice::Iter<'a, Face>;

    fn into_iter(self) -> Self::IntoIter {
        self.faces.iter()
    }
}

/// Summary of the per-vertex neighbor sets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NeighborStats {
    /// Mean neighbor set size (the vertex itself included).
    pub mean: f64,
    /// Largest neighbor set size.
    pub max: usize,
}

impl NeighborStats {
    fn from_sets(sets: &[Vec<usize>]) -> Self {
        if sets.is_empty() {
            return Self::default();
        }
        let total: usize = sets.iter().map(Vec::len).sum();
        Self {
            mean: total as f64 / sets.len() as f64,
            max: sets.iter().map(Vec::len).max().unwrap_or(0),
        }
    }
}

/// Observer for diagnostics emitted while building faces.
///
/// All methods default to no-ops. The face set does not depend on the observer.
pub trait MeshEvents {
    /// Called once the neighbor sets of all vertices are known.
    fn neighbors_computed(&mut self, _stats: &NeighborStats) {}

    /// Called periodically during triangle formation.
    fn progress(&mut self, _done: usize, _total: usize) {}

    /// Called with the final number of faces.
    fn faces_built(&mut self, _count: usize) {}
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvents;

impl MeshEvents for NoEvents {}

/// Forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEvents;

impl MeshEvents for LogEvents {
    fn neighbors_computed(&mut self, stats: &NeighborStats) {
        log::debug!(
            "neighbor counts: mean={:.2} max={}",
            stats.mean,
            stats.max
        );
    }

    fn progress(&mut self, done: usize, total: usize) {
        log::debug!("building faces: {done}/{total}");
    }

    fn faces_built(&mut self, count: usize) {
        log::info!("faces built: {count}");
    }
}

/// Computes the neighbor set of every vertex.
///
/// Set `i` holds the vertices within `radius` of `i` that share its owner, `i` included.
/// When there are more than `max_neighbors` candidates only the closest are kept; equal
/// distances are ordered by vertex id. Each set is sorted by distance.
pub fn neighbor_sets(
    index: &NeighborIndex,
    owners: &[i64],
    radius: f64,
    max_neighbors: usize,
) -> Vec<Vec<usize>> {
    let collect = |i: usize| {
        let center = index.points()[i];
        let mut candidates: Vec<(f64, usize)> = Vec::new();
        index.for_each_within(center, radius, |j, d2| {
            if owners[j] == owners[i] {
                candidates.push((d2, j));
            }
        });
        candidates.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        candidates.truncate(max_neighbors);
        candidates.into_iter().map(|(_, j)| j).collect::<Vec<usize>>()
    };

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..index.len()).into_par_iter().map(collect).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..index.len()).map(collect).collect()
    }
}

/// Read-only inputs of the triangle formation step.
struct FaceContext<'a> {
    points: &'a [DVec3],
    radii: Vec<f64>,
    neighbors: Vec<Vec<usize>>,
    threshold: f64,
}

impl<'a> FaceContext<'a> {
    fn new(points: &'a [DVec3], areas: &[f64], owners: &[i64], options: &MeshOptions) -> Self {
        let index = NeighborIndex::build(points);
        Self {
            points,
            radii: areas.iter().map(|&a| patch_radius(a)).collect(),
            neighbors: neighbor_sets(
                &index,
                owners,
                options.neighbor_radius,
                options.max_neighbors,
            ),
            threshold: options.neighbors_threshold,
        }
    }

    #[inline]
    fn touches(&self, a: usize, b: usize) -> bool {
        self.points[a].distance(self.points[b]) < self.threshold * (self.radii[a] + self.radii[b])
    }

    /// Emits every triangle accepted from the two-hop walk starting at `i`.
    fn faces_around(&self, i: usize, mut accept: impl FnMut(Face)) {
        for &j in &self.neighbors[i] {
            if j == i {
                continue;
            }
            let ij = self.touches(i, j);
            for &k in &self.neighbors[j] {
                if k == i || k == j || !self.touches(i, k) {
                    continue;
                }
                // Either i-j or j-k closes the triangle next to the i-k edge.
                if ij || self.touches(j, k) {
                    accept(Face::new(i, j, k));
                }
            }
        }
    }

    /// Collects the triangles found from `i` on their own, for partition-and-merge.
    #[cfg(any(feature = "parallel", test))]
    fn faces_of(&self, i: usize) -> Vec<Face> {
        let mut local = Vec::new();
        self.faces_around(i, |face| local.push(face));
        local
    }
}

/// Builds the triangle faces of a sample cloud. See [`build_faces_with_events`].
pub fn build_faces(
    points: &[DVec3],
    areas: &[f64],
    owners: &[i64],
    options: &MeshOptions,
) -> Result<FaceSet> {
    build_faces_with_events(points, areas, owners, options, &mut NoEvents)
}

/// Builds the triangle faces of a sample cloud, reporting diagnostics to `events`.
///
/// `points`, `areas` and `owners` are parallel arrays. The caller is expected to pass
/// options that satisfy [`MeshOptions::validate`]. Fewer than three points, or points that
/// never satisfy the threshold, produce an empty set.
///
/// # Errors
/// Returns [`CosmoError::SizeMismatch`] if `areas` or `owners` are not parallel to `points`.
pub fn build_faces_with_events(
    points: &[DVec3],
    areas: &[f64],
    owners: &[i64],
    options: &MeshOptions,
    events: &mut dyn MeshEvents,
) -> Result<FaceSet> {
    log::debug!(
        "build_faces: neighbor_radius={}, max_neighbors={}, neighbors_threshold={}",
        options.neighbor_radius,
        options.max_neighbors,
        options.neighbors_threshold
    );
    for (what, actual) in [("areas", areas.len()), ("owners", owners.len())] {
        if actual != points.len() {
            return Err(CosmoError::SizeMismatch {
                what,
                expected: points.len(),
                actual,
            });
        }
    }

    let ctx = FaceContext::new(points, areas, owners, options);
    events.neighbors_computed(&NeighborStats::from_sets(&ctx.neighbors));
    let total = points.len();

    #[cfg(feature = "parallel")]
    let faces: FaceSet = {
        use rayon::prelude::*;
        let per_vertex: Vec<Vec<Face>> = (0..total)
            .into_par_iter()
            .map(|i| ctx.faces_of(i))
            .collect();
        events.progress(total, total);
        per_vertex.into_iter().flatten().collect()
    };

    #[cfg(not(feature = "parallel"))]
    let faces: FaceSet = {
        let mut set: HashSet<Face> = HashSet::new();
        for i in 0..total {
            if i % PROGRESS_INTERVAL == 0 {
                events.progress(i + 1, total);
            }
            ctx.faces_around(i, |face| {
                set.insert(face);
            });
        }
        set.into_iter().collect()
    };

    events.faces_built(faces.len());
    Ok(faces)
}

/// Builds the faces of a parsed sample set.
pub fn build_sample_faces(
    samples: &SurfaceSamples,
    options: &MeshOptions,
    events: &mut dyn MeshEvents,
) -> Result<FaceSet> {
    build_faces_with_events(
        &samples.points,
        &samples.areas,
        &samples.owners,
        options,
        events,
    )
}
