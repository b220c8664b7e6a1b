/**
 * Candidate Selection
 *
 * After every diffusion step the engine needs the unresolved pixel with the
 * largest residual. Rescanning the whole field each time is quadratic in the
 * pixel count, so the canonical selector is a binary heap with lazy
 * invalidation: when a window is about to change, its entries are marked
 * stale instead of removed, fresh entries are pushed once the values have
 * changed, and stale entries are skipped when they surface at the top.
 *
 * Staleness is tracked with one generation stamp per cell. An entry is live
 * while its stamp matches the cell's current stamp; invalidating a window
 * bumps the stamps of its cells.
 */

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;

use crate::field::{Candidate, ResidualField, Window};

/**
 * Strategy for picking the next pixel to resolve
 *
 * `pop` must return the minimum candidate (see `Candidate`'s ordering) over
 * all unresolved cells of the field as it currently stands, provided that
 * `invalidate` was called before each change to a window and `refresh` after
 * it.
 */
pub trait Selector {
    /// Prepare for a freshly built field
    fn seed(&mut self, field: &ResidualField);

    /// Next pixel to resolve, or `None` when nothing is left
    fn pop(&mut self, field: &ResidualField) -> Option<Candidate>;

    /// `window` is about to change
    fn invalidate(&mut self, field: &ResidualField, window: Window);

    /// `window` has changed
    fn refresh(&mut self, field: &ResidualField, window: Window);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Entry {
    candidate: Candidate,
    stamp: u32,
}

/// Heap of candidates with lazy invalidation
#[derive(Debug, Default)]
pub struct SelectionQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    stamps: Vec<u32>,
    width: usize,
    pushed: usize,
    skipped: usize,
}

impl SelectionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries currently held, live or stale
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the heap holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total entries ever pushed
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    /// Stale entries discarded by `pop` so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    fn push_window(&mut self, field: &ResidualField, window: Window) {
        for candidate in field.enumerate(window) {
            let stamp = self.stamps[self.index(candidate.row, candidate.col)];
            self.heap.push(Reverse(Entry { candidate, stamp }));
            self.pushed += 1;
        }
    }
}

impl Selector for SelectionQueue {
    fn seed(&mut self, field: &ResidualField) {
        self.heap.clear();
        self.stamps = vec![0; field.len()];
        self.width = field.width();
        self.pushed = 0;
        self.skipped = 0;

        self.push_window(field, field.whole());
        trace!("seeded selection queue with {} candidates", self.heap.len());
    }

    fn pop(&mut self, _field: &ResidualField) -> Option<Candidate> {
        while let Some(Reverse(entry)) = self.heap.pop() {
            let idx = self.index(entry.candidate.row, entry.candidate.col);
            if entry.stamp != self.stamps[idx] {
                self.skipped += 1;
                continue;
            }

            // The popped cell is about to be resolved; nothing it left behind
            // in the heap may surface again.
            self.stamps[idx] = self.stamps[idx].wrapping_add(1);
            return Some(entry.candidate);
        }

        None
    }

    fn invalidate(&mut self, _field: &ResidualField, window: Window) {
        for row in window.rows() {
            for col in window.cols() {
                let idx = self.index(row, col);
                self.stamps[idx] = self.stamps[idx].wrapping_add(1);
            }
        }
    }

    fn refresh(&mut self, field: &ResidualField, window: Window) {
        self.push_window(field, window);
    }
}

/**
 * Selector that rescans the whole field on every pop
 *
 * Quadratic overall, but needs no bookkeeping. Uses the same ordering as
 * `SelectionQueue`, so both produce identical output.
 */
#[derive(Debug, Default, Clone, Copy)]
pub struct FullScan;

impl FullScan {
    /// Create the selector
    pub fn new() -> Self {
        Self
    }
}

impl Selector for FullScan {
    fn seed(&mut self, _field: &ResidualField) {}

    fn pop(&mut self, field: &ResidualField) -> Option<Candidate> {
        field.enumerate(field.whole()).min()
    }

    fn invalidate(&mut self, _field: &ResidualField, _window: Window) {}

    fn refresh(&mut self, _field: &ResidualField, _window: Window) {}
}
