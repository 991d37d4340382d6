//! Incremental greedy-insertion Delaunay triangulator.
//!
//! The mesh is an arena of triangles addressed by index. Triangle `t` owns
//! the vertex slots `triangles[3t..3t + 3]` and the directed half-edges
//! `3t..3t + 3`; half-edge `e` runs from `triangles[e]` to the next vertex of
//! the same triangle, and `halfedges[e]` is the opposite half-edge in the
//! adjacent triangle or [`NO_EDGE`] on the grid boundary.
//!
//! Local edits overwrite the slots of the triangles they destroy instead of
//! freeing them, so the arena only grows by the net number of new triangles.

use glam::IVec2;
use strata_heightfield::HeightOracle;
use tracing::trace;

use crate::error_queue::ErrorQueue;
use crate::predicates::{collinear, in_circle};

/// Sentinel half-edge for edges without a neighbor.
pub const NO_EDGE: usize = usize::MAX;

/// Termination parameters of a triangulator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangulatorParams {
    /// Refinement stops once the worst remaining error is at or below this.
    pub min_error: f32,
    /// Stop once this many triangles exist. `None` disables the cap.
    pub max_triangles: Option<usize>,
    /// Stop once this many points exist. `None` disables the cap.
    pub max_points: Option<usize>,
}

impl Default for TriangulatorParams {
    fn default() -> Self {
        Self {
            min_error: 0.0,
            max_triangles: None,
            max_points: None,
        }
    }
}

/// Greedy-insertion TIN builder bound to one height oracle.
pub struct Triangulator<O> {
    pub(crate) oracle: O,
    pub(crate) params: TriangulatorParams,
    points: Vec<IVec2>,
    triangles: Vec<usize>,
    halfedges: Vec<usize>,
    candidates: Vec<IVec2>,
    queue: ErrorQueue,
    pending: Vec<usize>,
    flips: u64,
}

impl<O: HeightOracle> Triangulator<O> {
    /// Create a triangulator over `oracle`. Call [`initialize`](Self::initialize)
    /// (or [`run`](Self::run)) before stepping.
    pub fn new(oracle: O, params: TriangulatorParams) -> Self {
        Self {
            oracle,
            params,
            points: Vec::new(),
            triangles: Vec::new(),
            halfedges: Vec::new(),
            candidates: Vec::new(),
            queue: ErrorQueue::new(),
            pending: Vec::new(),
            flips: 0,
        }
    }

    /// Reset all state and seed two triangles spanning the grid corners.
    pub fn initialize(&mut self) {
        self.points.clear();
        self.triangles.clear();
        self.halfedges.clear();
        self.candidates.clear();
        self.queue.clear();
        self.pending.clear();
        self.flips = 0;

        let x1 = self.oracle.width() as i32 - 1;
        let y1 = self.oracle.height() as i32 - 1;
        let p0 = self.add_point(IVec2::new(0, 0));
        let p1 = self.add_point(IVec2::new(x1, 0));
        let p2 = self.add_point(IVec2::new(0, y1));
        let p3 = self.add_point(IVec2::new(x1, y1));

        let t0 = self.add_triangle(p3, p0, p2, NO_EDGE, NO_EDGE, NO_EDGE, None);
        self.add_triangle(p0, p3, p1, t0, NO_EDGE, NO_EDGE, None);
        self.flush();
    }

    /// Initialize and refine until the configured parameters are met.
    pub fn run(&mut self) {
        self.initialize();
        let min_error = self.params.min_error;
        while !self.is_done(min_error, self.params.max_triangles) {
            self.step();
        }
    }

    /// Whether refinement should stop at `max_error` with an optional
    /// triangle budget tighter than the configured cap.
    pub(crate) fn is_done(&self, max_error: f32, max_triangles: Option<usize>) -> bool {
        let Some(error) = self.queue.peek_error() else {
            return true;
        };
        if error <= max_error {
            return true;
        }
        let triangle_cap = match (max_triangles, self.params.max_triangles) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        if triangle_cap.is_some_and(|cap| self.num_triangles() >= cap) {
            return true;
        }
        if self
            .params
            .max_points
            .is_some_and(|cap| self.num_points() >= cap)
        {
            return true;
        }
        error == 0.0
    }

    /// Insert the candidate point of the worst triangle and restore the
    /// Delaunay property around it.
    ///
    /// Does nothing once the worst triangle already fits the surface
    /// exactly, since its candidate would be one of its own vertices.
    pub fn step(&mut self) {
        if self.queue.peek_error().is_none_or(|error| error <= 0.0) {
            return;
        }
        let Some(t) = self.queue.pop() else {
            return;
        };
        let e0 = t * 3;
        let e1 = e0 + 1;
        let e2 = e0 + 2;

        let p0 = self.triangles[e0];
        let p1 = self.triangles[e1];
        let p2 = self.triangles[e2];

        let a = self.points[p0];
        let b = self.points[p1];
        let c = self.points[p2];
        let p = self.candidates[t];
        let pn = self.add_point(p);

        if collinear(a, b, p) {
            self.split_edge(pn, e0);
        } else if collinear(b, c, p) {
            self.split_edge(pn, e1);
        } else if collinear(c, a, p) {
            self.split_edge(pn, e2);
        } else {
            let h0 = self.halfedges[e0];
            let h1 = self.halfedges[e1];
            let h2 = self.halfedges[e2];

            let t0 = self.add_triangle(p0, p1, pn, h0, NO_EDGE, NO_EDGE, Some(e0));
            let t1 = self.add_triangle(p1, p2, pn, h1, NO_EDGE, t0 + 1, None);
            let t2 = self.add_triangle(p2, p0, pn, h2, t0 + 2, t1 + 1, None);

            self.legalize(t0);
            self.legalize(t1);
            self.legalize(t2);
        }

        self.flush();
    }

    /// Worst remaining error, or zero for an empty mesh.
    #[must_use]
    pub fn error(&self) -> f32 {
        self.queue.peek_error().unwrap_or(0.0)
    }

    /// Number of inserted points.
    #[must_use]
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Number of active triangles.
    #[must_use]
    pub fn num_triangles(&self) -> usize {
        self.queue.len() + self.pending.len()
    }

    /// Number of edge flips performed since the last initialization.
    #[must_use]
    pub fn num_flips(&self) -> u64 {
        self.flips
    }

    /// Inserted points, indexed by point id.
    #[must_use]
    pub fn points(&self) -> &[IVec2] {
        &self.points
    }

    /// Raw vertex slots of the triangle arena, three per slot, including
    /// slots no longer active.
    #[must_use]
    pub fn triangle_slots(&self) -> &[usize] {
        &self.triangles
    }

    /// Half-edge links parallel to [`triangle_slots`](Self::triangle_slots).
    #[must_use]
    pub fn halfedges(&self) -> &[usize] {
        &self.halfedges
    }

    /// Indices of the active triangles, in queue order.
    pub fn active_triangles(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter()
    }

    /// Vertex ids of the active triangles, in queue order.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.queue.iter().map(|t| {
            let e = t * 3;
            [
                self.triangles[e],
                self.triangles[e + 1],
                self.triangles[e + 2],
            ]
        })
    }

    /// Check half-edge symmetry over the active triangles.
    #[must_use]
    pub fn check_halfedges(&self) -> bool {
        self.active_triangles().all(|t| {
            (t * 3..t * 3 + 3).all(|e| {
                let f = self.halfedges[e];
                f == NO_EDGE || self.halfedges[f] == e
            })
        })
    }

    /// Check the empty-circumcircle property: no active vertex lies strictly
    /// inside the circumcircle of any active triangle.
    ///
    /// Quadratic in the mesh size; intended for tests and debugging.
    #[must_use]
    pub fn is_delaunay(&self) -> bool {
        self.triangles().all(|[a, b, c]| {
            let (pa, pb, pc) = (self.points[a], self.points[b], self.points[c]);
            self.points.iter().all(|&p| !in_circle(pa, pb, pc, p))
        })
    }

    fn add_point(&mut self, point: IVec2) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Write triangle `(a, b, c)` with outer half-edges `(ab, bc, ca)` into the
    /// slot starting at half-edge `reuse`, or into a new slot, link the
    /// neighbors back, and mark it pending. Returns its first half-edge.
    #[allow(clippy::too_many_arguments)]
    fn add_triangle(
        &mut self,
        a: usize,
        b: usize,
        c: usize,
        ab: usize,
        bc: usize,
        ca: usize,
        reuse: Option<usize>,
    ) -> usize {
        let e = match reuse {
            Some(e) => {
                self.triangles[e..e + 3].copy_from_slice(&[a, b, c]);
                self.halfedges[e..e + 3].copy_from_slice(&[ab, bc, ca]);
                e
            }
            None => {
                let e = self.triangles.len();
                self.triangles.extend_from_slice(&[a, b, c]);
                self.halfedges.extend_from_slice(&[ab, bc, ca]);
                self.candidates.push(IVec2::ZERO);
                e
            }
        };

        if ab != NO_EDGE {
            self.halfedges[ab] = e;
        }
        if bc != NO_EDGE {
            self.halfedges[bc] = e + 1;
        }
        if ca != NO_EDGE {
            self.halfedges[ca] = e + 2;
        }

        self.pending.push(e / 3);
        e
    }

    /// Insert `pn`, which lies on half-edge `a`, splitting the one or two
    /// triangles sharing that edge.
    fn split_edge(&mut self, pn: usize, a: usize) {
        let a0 = a - a % 3;
        let al = a0 + (a + 1) % 3;
        let ar = a0 + (a + 2) % 3;
        let p0 = self.triangles[ar];
        let pr = self.triangles[a];
        let pl = self.triangles[al];
        let hal = self.halfedges[al];
        let har = self.halfedges[ar];

        let b = self.halfedges[a];
        if b == NO_EDGE {
            let t0 = self.add_triangle(pn, p0, pr, NO_EDGE, har, NO_EDGE, Some(a0));
            let t1 = self.add_triangle(p0, pn, pl, t0, NO_EDGE, hal, None);
            self.legalize(t0 + 1);
            self.legalize(t1 + 2);
            return;
        }

        let b0 = b - b % 3;
        let bl = b0 + (b + 2) % 3;
        let br = b0 + (b + 1) % 3;
        let p1 = self.triangles[bl];
        let hbl = self.halfedges[bl];
        let hbr = self.halfedges[br];

        self.remove_triangle(b / 3);

        let t0 = self.add_triangle(p0, pr, pn, har, NO_EDGE, NO_EDGE, Some(a0));
        let t1 = self.add_triangle(pr, p1, pn, hbr, NO_EDGE, t0 + 1, Some(b0));
        let t2 = self.add_triangle(p1, pl, pn, hbl, NO_EDGE, t1 + 1, None);
        let t3 = self.add_triangle(pl, p0, pn, hal, t0 + 2, t2 + 1, None);

        self.legalize(t0);
        self.legalize(t1);
        self.legalize(t2);
        self.legalize(t3);
    }

    /// Flip half-edge `a` if the vertex across it lies inside the
    /// circumcircle of `a`'s triangle, then recurse on the two edges of the
    /// new pair that face away from the inserted point.
    ///
    /// ```text
    ///           pl                    pl
    ///          /||\                  /  \
    ///       al/ || \bl            al/    \a
    ///        /  ||  \              /      \
    ///       /  a||b  \    flip    /___ar___\
    ///     p0\   ||   /p1   =>   p0\---bl---/p1
    ///        \  ||  /              \      /
    ///       ar\ || /br             b\    /br
    ///          \||/                  \  /
    ///           pr                    pr
    /// ```
    fn legalize(&mut self, a: usize) {
        let b = self.halfedges[a];
        if b == NO_EDGE {
            return;
        }

        let a0 = a - a % 3;
        let b0 = b - b % 3;
        let al = a0 + (a + 1) % 3;
        let ar = a0 + (a + 2) % 3;
        let bl = b0 + (b + 2) % 3;
        let br = b0 + (b + 1) % 3;

        let p0 = self.triangles[ar];
        let pr = self.triangles[a];
        let pl = self.triangles[al];
        let p1 = self.triangles[bl];

        if !in_circle(
            self.points[p0],
            self.points[pr],
            self.points[pl],
            self.points[p1],
        ) {
            return;
        }

        let hal = self.halfedges[al];
        let har = self.halfedges[ar];
        let hbl = self.halfedges[bl];
        let hbr = self.halfedges[br];

        self.remove_triangle(a / 3);
        self.remove_triangle(b / 3);
        self.flips += 1;

        let t0 = self.add_triangle(p0, p1, pl, NO_EDGE, hbl, hal, Some(a0));
        let t1 = self.add_triangle(p1, p0, pr, t0, har, hbr, Some(b0));

        self.legalize(t0 + 1);
        self.legalize(t1 + 2);
    }

    /// Take triangle `t` out of the active set before its slot is rewritten.
    ///
    /// # Panics
    ///
    /// Panics if `t` is neither queued nor pending, which means the half-edge
    /// links and the active set have diverged.
    fn remove_triangle(&mut self, t: usize) {
        if self.queue.remove(t) {
            return;
        }
        match self.pending.iter().position(|&p| p == t) {
            Some(i) => {
                self.pending.swap_remove(i);
            }
            None => panic!("triangle {t} is neither queued nor pending"),
        }
    }

    /// Score every pending triangle with the oracle and queue it.
    fn flush(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for &t in &pending {
            let e = t * 3;
            let corners = [
                self.points[self.triangles[e]],
                self.points[self.triangles[e + 1]],
                self.points[self.triangles[e + 2]],
            ];
            let (candidate, error) = self.oracle.find_max_error_point(corners);
            self.candidates[t] = candidate;
            self.queue.push(t, error);
        }
        if !pending.is_empty() {
            trace!(
                scored = pending.len(),
                points = self.points.len(),
                error = self.error(),
                "flushed pending triangles"
            );
        }
        self.pending = pending;
        self.pending.clear();
    }
}
