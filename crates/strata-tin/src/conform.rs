//! Boundary conforming: splitting tile-edge triangles so that required
//! boundary vertices exist and neighboring meshes meet without T-junctions.
//!
//! A triangle edge lying on one of the four boundary lines may skip several
//! grid cells. A neighbor (another tile, or another level of this tile) can
//! have a vertex at one of those cells, which leaves a crack. The conformer
//! walks each such edge, inserts a vertex at every skipped cell its
//! acceptance predicate asks for, and fans the triangle into a strip.
//!
//! Three configurations are provided:
//!
//! | Preset | Accepts | Passes | Corners |
//! |---|---|---|---|
//! | [`stitcher`](BoundaryConformer::stitcher) | every cell | until empty | reclassify |
//! | [`cutter`](BoundaryConformer::cutter) | predicate | at most [`CUTTER_PASSES`](BoundaryConformer::CUTTER_PASSES) | reclassify |
//! | [`fitter`](BoundaryConformer::fitter) | predicate | until empty | requeue |

use std::collections::VecDeque;

use glam::IVec2;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::mesh::LodMesh;

/// One of the four lines bounding the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoundaryLine {
    /// `x == 0`.
    West,
    /// `x == width - 1`.
    East,
    /// `y == 0`.
    South,
    /// `y == height - 1`.
    North,
}

/// The boundary line containing the edge `a -> b`, if any.
#[must_use]
pub fn boundary_line(a: IVec2, b: IVec2, size: IVec2) -> Option<BoundaryLine> {
    let max = size - IVec2::ONE;
    if a.x == b.x {
        if a.x == 0 {
            return Some(BoundaryLine::West);
        }
        if a.x == max.x {
            return Some(BoundaryLine::East);
        }
    }
    if a.y == b.y {
        if a.y == 0 {
            return Some(BoundaryLine::South);
        }
        if a.y == max.y {
            return Some(BoundaryLine::North);
        }
    }
    None
}

/// Number of grid cells strictly between the ends of an axis-aligned edge.
#[must_use]
pub fn skipped_cells(a: IVec2, b: IVec2) -> i32 {
    ((b - a).abs().max_element() - 1).max(0)
}

/// Predicate accepting every boundary cell.
#[must_use]
pub fn accept_all(_: IVec2) -> bool {
    true
}

/// How many rounds of re-queued triangles are processed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassPolicy {
    /// Stop after this many passes and emit leftovers unchanged.
    Bounded(usize),
    /// Drain the work queue until no triangle requests a split.
    UntilEmpty,
}

/// What happens to the fan produced by splitting a triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CornerPolicy {
    /// Every fan triangle is classified again and queued for the next pass
    /// if it still has a splittable edge.
    Reclassify,
    /// Fans of single-edge triangles are emitted directly. A triangle at a
    /// grid corner, with splittable edges on two boundary lines, has the fan
    /// triangle that still carries the second edge pushed back onto the
    /// current queue.
    Requeue,
}

/// Counters describing one conforming run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConformStats {
    /// Triangles that were split.
    pub splits: usize,
    /// Vertices added to the mesh.
    pub inserted: usize,
    /// Passes executed.
    pub passes: usize,
    /// Triangles emitted unchanged after the pass budget ran out while they
    /// still had a splittable edge.
    pub unresolved: usize,
}

/// Splits boundary triangles of a [`LodMesh`] at accepted grid cells.
pub struct BoundaryConformer<F> {
    size: IVec2,
    accept: F,
    passes: PassPolicy,
    corners: CornerPolicy,
}

impl BoundaryConformer<fn(IVec2) -> bool> {
    /// Fill every skipped boundary cell, producing a vertex at each grid
    /// position along all four tile edges that a boundary edge spans.
    #[must_use]
    pub fn stitcher(size: IVec2) -> Self {
        Self {
            size,
            accept: accept_all,
            passes: PassPolicy::UntilEmpty,
            corners: CornerPolicy::Reclassify,
        }
    }
}

impl<F: Fn(IVec2) -> bool> BoundaryConformer<F> {
    /// Pass budget of the [`cutter`](Self::cutter) preset.
    pub const CUTTER_PASSES: usize = 3;

    /// Materialize only the boundary cells `accept` asks for, within
    /// [`CUTTER_PASSES`](Self::CUTTER_PASSES) passes.
    pub fn cutter(size: IVec2, accept: F) -> Self {
        Self {
            size,
            accept,
            passes: PassPolicy::Bounded(Self::CUTTER_PASSES),
            corners: CornerPolicy::Reclassify,
        }
    }

    /// Materialize the boundary cells `accept` asks for, draining the queue
    /// and handling corner triangles explicitly.
    pub fn fitter(size: IVec2, accept: F) -> Self {
        Self {
            size,
            accept,
            passes: PassPolicy::UntilEmpty,
            corners: CornerPolicy::Requeue,
        }
    }

    /// A conformer with explicit policies.
    pub fn with_policies(
        size: IVec2,
        accept: F,
        passes: PassPolicy,
        corners: CornerPolicy,
    ) -> Self {
        Self {
            size,
            accept,
            passes,
            corners,
        }
    }

    /// Rewrite `mesh` in place. Interior triangles keep their relative order
    /// ahead of the split boundary triangles.
    pub fn conform(&self, mesh: &mut LodMesh) -> ConformStats {
        let mut stats = ConformStats::default();
        let mut lookup: FxHashMap<IVec2, u32> = mesh
            .points
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, i as u32))
            .collect();

        let mut output = Vec::with_capacity(mesh.triangles.len());
        let mut queue = VecDeque::new();
        for tri in mesh.triangles.drain(..) {
            if self.splittable_edge(&mesh.points, tri).is_some() {
                queue.push_back(tri);
            } else {
                output.push(tri);
            }
        }

        while !queue.is_empty() {
            if matches!(self.passes, PassPolicy::Bounded(limit) if stats.passes >= limit) {
                stats.unresolved = queue.len();
                output.extend(queue.drain(..));
                break;
            }
            stats.passes += 1;

            let mut next = VecDeque::new();
            while let Some(tri) = queue.pop_front() {
                let Some(edge) = self.splittable_edge(&mesh.points, tri) else {
                    output.push(tri);
                    continue;
                };
                let corner = self.is_corner(&mesh.points, tri);
                let fan = self.split(&mut mesh.points, &mut lookup, tri, edge, &mut stats);
                stats.splits += 1;

                match self.corners {
                    CornerPolicy::Reclassify => {
                        for t in fan {
                            if self.splittable_edge(&mesh.points, t).is_some() {
                                next.push_back(t);
                            } else {
                                output.push(t);
                            }
                        }
                    }
                    CornerPolicy::Requeue if corner => {
                        for t in fan {
                            if self.splittable_edge(&mesh.points, t).is_some() {
                                queue.push_back(t);
                            } else {
                                output.push(t);
                            }
                        }
                    }
                    CornerPolicy::Requeue => output.extend(fan),
                }
            }
            queue = next;
        }

        mesh.triangles = output;
        debug!(
            splits = stats.splits,
            inserted = stats.inserted,
            passes = stats.passes,
            unresolved = stats.unresolved,
            "conformed tile boundary"
        );
        stats
    }

    /// Whether the edge `a -> b` lies on a boundary line and skips at least
    /// one cell the predicate accepts.
    fn edge_needs_split(&self, a: IVec2, b: IVec2) -> bool {
        if boundary_line(a, b, self.size).is_none() || skipped_cells(a, b) == 0 {
            return false;
        }
        let step = (b - a).signum();
        (1..=skipped_cells(a, b)).any(|k| (self.accept)(a + step * k))
    }

    /// First edge of `tri`, in corner order, that needs splitting.
    fn splittable_edge(&self, points: &[IVec2], tri: [u32; 3]) -> Option<usize> {
        (0..3).find(|&i| {
            let a = points[tri[i] as usize];
            let b = points[tri[(i + 1) % 3] as usize];
            self.edge_needs_split(a, b)
        })
    }

    /// Whether `tri` has splittable edges on two different boundary lines.
    fn is_corner(&self, points: &[IVec2], tri: [u32; 3]) -> bool {
        let mut lines = (0..3).filter_map(|i| {
            let a = points[tri[i] as usize];
            let b = points[tri[(i + 1) % 3] as usize];
            self.edge_needs_split(a, b)
                .then(|| boundary_line(a, b, self.size))
                .flatten()
        });
        match (lines.next(), lines.next()) {
            (Some(first), Some(second)) => first != second,
            _ => false,
        }
    }

    /// Fan `tri` across the accepted cells of its edge `edge`, preserving
    /// winding. Cells the predicate rejects are stepped over.
    fn split(
        &self,
        points: &mut Vec<IVec2>,
        lookup: &mut FxHashMap<IVec2, u32>,
        tri: [u32; 3],
        edge: usize,
        stats: &mut ConformStats,
    ) -> Vec<[u32; 3]> {
        let p = tri[edge];
        let q = tri[(edge + 1) % 3];
        let r = tri[(edge + 2) % 3];
        let a = points[p as usize];
        let b = points[q as usize];
        let step = (b - a).signum();

        let mut fan = Vec::new();
        let mut previous = p;
        for k in 1..=skipped_cells(a, b) {
            let cell = a + step * k;
            if !(self.accept)(cell) {
                continue;
            }
            let m = *lookup.entry(cell).or_insert_with(|| {
                points.push(cell);
                stats.inserted += 1;
                (points.len() - 1) as u32
            });
            fan.push([previous, m, r]);
            previous = m;
        }
        fan.push([previous, q, r]);
        fan
    }
}
