// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Shared instrumentation counters.
//!
//! Every worker records into the same `SearchCounters` with relaxed atomic
//! increments. The counters never influence the search; they are read back
//! once at the end of the run (or by a monitor, as an approximate live view).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use waypoint_search::stats::{SearchStatistics, SearchStatisticsBuilder};

/// Relaxed atomic counters shared by all workers of a run.
#[derive(Debug)]
pub struct SearchCounters {
    nodes_explored: AtomicU64,
    paths_verified: AtomicU64,
    improvements: AtomicU64,
    pruned_by_bound: AtomicU64,
    pruned_infeasible: AtomicU64,
    prunes_per_depth: Vec<AtomicU64>,
    max_depth: AtomicUsize,
}

impl SearchCounters {
    /// Creates zeroed counters for a tree over `order` vertices.
    ///
    /// Every branch decides at least one of the `order * (order - 1) / 2`
    /// edges, which bounds the depth of the tree.
    pub fn new(order: usize) -> Self {
        let depth_bound = order.saturating_mul(order.saturating_sub(1)) / 2;
        Self::with_depth_buckets(depth_bound.saturating_add(1))
    }

    /// Creates zeroed counters with `buckets` per-depth prune buckets.
    /// Deeper prunes are accumulated in the last bucket.
    pub fn with_depth_buckets(buckets: usize) -> Self {
        Self {
            nodes_explored: AtomicU64::new(0),
            paths_verified: AtomicU64::new(0),
            improvements: AtomicU64::new(0),
            pruned_by_bound: AtomicU64::new(0),
            pruned_infeasible: AtomicU64::new(0),
            prunes_per_depth: (0..buckets.max(1)).map(|_| AtomicU64::new(0)).collect(),
            max_depth: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn on_node_explored(&self, depth: usize) {
        self.nodes_explored.fetch_add(1, Ordering::Relaxed);
        self.max_depth.fetch_max(depth, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_path_verified(&self) {
        self.paths_verified.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn on_improvement(&self) {
        self.improvements.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a child discarded because its bound exceeded the incumbent.
    #[inline]
    pub fn on_prune_bound(&self, depth: usize) {
        self.pruned_by_bound.fetch_add(1, Ordering::Relaxed);
        self.on_prune_at(depth);
    }

    /// Records a child discarded because it cannot be completed to a tour.
    #[inline]
    pub fn on_prune_infeasible(&self, depth: usize) {
        self.pruned_infeasible.fetch_add(1, Ordering::Relaxed);
        self.on_prune_at(depth);
    }

    #[inline(always)]
    fn on_prune_at(&self, depth: usize) {
        let last = self.prunes_per_depth.len() - 1;
        self.prunes_per_depth[depth.min(last)].fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn nodes_explored(&self) -> u64 {
        self.nodes_explored.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn paths_verified(&self) -> u64 {
        self.paths_verified.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn improvements(&self) -> u64 {
        self.improvements.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn pruned_by_bound(&self) -> u64 {
        self.pruned_by_bound.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn pruned_infeasible(&self) -> u64 {
        self.pruned_infeasible.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth.load(Ordering::Relaxed)
    }

    /// Reads every counter into a `SearchStatistics` value.
    ///
    /// Exact once all workers have been joined.
    pub fn snapshot(&self, workers_used: usize, solve_duration: Duration) -> SearchStatistics {
        SearchStatisticsBuilder::new()
            .nodes_explored(self.nodes_explored())
            .paths_verified(self.paths_verified())
            .improvements(self.improvements())
            .pruned_by_bound(self.pruned_by_bound())
            .pruned_infeasible(self.pruned_infeasible())
            .prunes_per_depth(
                self.prunes_per_depth
                    .iter()
                    .map(|c| c.load(Ordering::Relaxed))
                    .collect(),
            )
            .max_depth(self.max_depth())
            .workers_used(workers_used)
            .solve_duration(solve_duration)
            .build()
    }
}

impl std::fmt::Display for SearchCounters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchCounters(nodes: {}, paths: {}, improvements: {}, pruned: {}/{})",
            self.nodes_explored(),
            self.paths_verified(),
            self.improvements(),
            self.pruned_by_bound(),
            self.pruned_infeasible()
        )
    }
}
