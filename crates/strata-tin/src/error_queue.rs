//! Max-error priority queue over triangle indices.
//!
//! A binary heap keyed by per-triangle error, plus a slot table mapping each
//! triangle to its heap position. The slot table lets a triangle invalidated
//! by a later mesh edit be removed from anywhere in the heap in `O(log n)`,
//! which `std::collections::BinaryHeap` cannot do.

/// Binary max-heap of triangle indices ordered by descending error.
#[derive(Clone, Debug, Default)]
pub struct ErrorQueue {
    /// Heap of triangle indices; `heap[0]` has the largest error.
    heap: Vec<usize>,
    /// Triangle index -> heap slot, `None` when not queued.
    slots: Vec<Option<usize>>,
    /// Triangle index -> error key.
    errors: Vec<f32>,
}

impl ErrorQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert triangle `t` with the given error.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `t` is already queued.
    pub fn push(&mut self, t: usize, error: f32) {
        if t >= self.slots.len() {
            self.slots.resize(t + 1, None);
            self.errors.resize(t + 1, 0.0);
        }
        debug_assert!(self.slots[t].is_none(), "triangle {t} queued twice");

        let i = self.heap.len();
        self.errors[t] = error;
        self.slots[t] = Some(i);
        self.heap.push(t);
        self.sift_up(i);
    }

    /// Remove and return the triangle with the largest error.
    pub fn pop(&mut self) -> Option<usize> {
        let n = self.heap.len().checked_sub(1)?;
        self.swap(0, n);
        self.sift_down(0, n);
        self.pop_back()
    }

    /// Remove triangle `t` from wherever it sits in the heap.
    ///
    /// Returns `false` if `t` was not queued.
    pub fn remove(&mut self, t: usize) -> bool {
        let Some(i) = self.slots.get(t).copied().flatten() else {
            return false;
        };
        let n = self.heap.len() - 1;
        if i != n {
            self.swap(i, n);
            if !self.sift_down(i, n) {
                self.sift_up(i);
            }
        }
        self.pop_back();
        true
    }

    /// The largest queued error, or `None` when empty.
    #[must_use]
    pub fn peek_error(&self) -> Option<f32> {
        self.heap.first().map(|&t| self.errors[t])
    }

    /// The triangle with the largest error, or `None` when empty.
    #[must_use]
    pub fn peek(&self) -> Option<usize> {
        self.heap.first().copied()
    }

    /// Whether `t` is currently queued.
    #[must_use]
    pub fn contains(&self, t: usize) -> bool {
        self.slots.get(t).is_some_and(Option::is_some)
    }

    /// Error key last pushed for `t`.
    #[must_use]
    pub fn error_of(&self, t: usize) -> Option<f32> {
        self.contains(t).then(|| self.errors[t])
    }

    /// Number of queued triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Queued triangles in heap order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.heap.iter().copied()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
        self.errors.clear();
    }

    fn pop_back(&mut self) -> Option<usize> {
        let t = self.heap.pop()?;
        self.slots[t] = None;
        Some(t)
    }

    /// Heap order: slot `i` should sit above slot `j`.
    fn higher(&self, i: usize, j: usize) -> bool {
        self.errors[self.heap[i]] > self.errors[self.heap[j]]
    }

    fn swap(&mut self, i: usize, j: usize) {
        let ti = self.heap[i];
        let tj = self.heap[j];
        self.heap[i] = tj;
        self.heap[j] = ti;
        self.slots[ti] = Some(j);
        self.slots[tj] = Some(i);
    }

    fn sift_up(&mut self, mut j: usize) {
        while j > 0 {
            let i = (j - 1) / 2;
            if !self.higher(j, i) {
                break;
            }
            self.swap(i, j);
            j = i;
        }
    }

    /// Sift slot `start` down within the first `n` slots; returns whether it moved.
    fn sift_down(&mut self, start: usize, n: usize) -> bool {
        let mut i = start;
        loop {
            let left = 2 * i + 1;
            if left >= n {
                break;
            }
            let right = left + 1;
            let child = if right < n && self.higher(right, left) {
                right
            } else {
                left
            };
            if !self.higher(child, i) {
                break;
            }
            self.swap(i, child);
            i = child;
        }
        i > start
    }
}
