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

use crate::{
    monitor::search_monitor::{PruneReason, SearchMonitor},
    state::TourState,
    stats::SearchCounters,
};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use waypoint_model::{matrix::DistanceMatrix, tour::Tour};
use waypoint_search::num::TourNumeric;

/// Periodic progress reporting through `tracing`.
///
/// The clock is only consulted every `clock_check_mask + 1` nodes seen by the
/// owning worker, so the hot path costs one increment and one mask test.
#[derive(Debug, Clone)]
pub struct LogMonitor<T> {
    worker: usize,
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    nodes_seen: u64,
    lines_emitted: u64,
    best_cost: Option<T>,
}

impl<T> LogMonitor<T>
where
    T: TourNumeric,
{
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        let now = Instant::now();
        Self {
            worker: 0,
            start_time: now,
            last_log_time: now,
            log_interval,
            clock_check_mask,
            nodes_seen: 0,
            lines_emitted: 0,
            best_cost: None,
        }
    }

    /// Returns the number of progress lines emitted so far.
    #[inline]
    pub fn lines_emitted(&self) -> u64 {
        self.lines_emitted
    }

    /// Returns the best cost this worker has installed, if any.
    #[inline]
    pub fn best_cost(&self) -> Option<T> {
        self.best_cost
    }

    fn log_line(&mut self, state: &TourState<'_, T>, counters: &SearchCounters) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start_time).as_secs_f32();
        let best = match self.best_cost {
            Some(cost) => cost.to_string(),
            None => "inf".to_string(),
        };

        info!(
            worker = self.worker,
            elapsed = format_args!("{:.1}s", elapsed),
            nodes = counters.nodes_explored(),
            depth = state.depth(),
            lower_bound = %state.lower_bound(),
            local_best = %best,
            pruned_bound = counters.pruned_by_bound(),
            pruned_infeasible = counters.pruned_infeasible(),
            "search progress"
        );

        self.last_log_time = now;
        self.lines_emitted += 1;
    }
}

impl<T> Default for LogMonitor<T>
where
    T: TourNumeric,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl<T> std::fmt::Display for LogMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogMonitor(log_interval: {}s, clock_check_mask: {})",
            self.log_interval.as_secs(),
            self.clock_check_mask
        )
    }
}

impl<T> SearchMonitor<T> for LogMonitor<T>
where
    T: TourNumeric,
{
    fn name(&self) -> &str {
        "LogMonitor"
    }

    fn on_enter_search(&mut self, matrix: &DistanceMatrix<T>, worker: usize) {
        self.worker = worker;
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.nodes_seen = 0;
        self.best_cost = None;
        debug!(worker, order = matrix.order(), "worker entered search");
    }

    fn on_node(&mut self, state: &TourState<'_, T>, counters: &SearchCounters) {
        self.nodes_seen = self.nodes_seen.wrapping_add(1);
        if (self.nodes_seen & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_line(state, counters);
        }
    }

    fn on_prune(
        &mut self,
        _state: &TourState<'_, T>,
        _reason: PruneReason,
        _counters: &SearchCounters,
    ) {
    }

    fn on_solution_found(&mut self, tour: &Tour<T>, _counters: &SearchCounters) {
        self.best_cost = Some(tour.cost());
    }

    fn on_exit_search(&mut self, counters: &SearchCounters) {
        info!(
            worker = self.worker,
            nodes_seen = self.nodes_seen,
            nodes_total = counters.nodes_explored(),
            "worker finished search"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type IntegerType = i64;

    fn triangle() -> DistanceMatrix<IntegerType> {
        DistanceMatrix::from_rows(&[[0, 1, 2], [1, 0, 3], [2, 3, 0]]).expect("valid")
    }

    #[test]
    fn test_logs_every_node_without_throttling() {
        let matrix = triangle();
        let counters = SearchCounters::new(3);
        let state = TourState::root(&matrix);

        let mut monitor = LogMonitor::<IntegerType>::new(Duration::ZERO, 0);
        monitor.on_enter_search(&matrix, 3);
        for _ in 0..5 {
            monitor.on_node(&state, &counters);
        }
        assert_eq!(monitor.lines_emitted(), 5);
    }

    #[test]
    fn test_mask_throttles_clock_checks() {
        let matrix = triangle();
        let counters = SearchCounters::new(3);
        let state = TourState::root(&matrix);

        let mut monitor = LogMonitor::<IntegerType>::new(Duration::ZERO, 3);
        monitor.on_enter_search(&matrix, 0);
        for _ in 0..8 {
            monitor.on_node(&state, &counters);
        }
        assert_eq!(monitor.lines_emitted(), 2);
    }

    #[test]
    fn test_long_interval_suppresses_lines() {
        let matrix = triangle();
        let counters = SearchCounters::new(3);
        let state = TourState::root(&matrix);

        let mut monitor = LogMonitor::<IntegerType>::new(Duration::from_secs(3600), 0);
        monitor.on_enter_search(&matrix, 0);
        monitor.on_node(&state, &counters);
        assert_eq!(monitor.lines_emitted(), 0);
    }

    #[test]
    fn test_tracks_best_cost_and_display() {
        let counters = SearchCounters::new(3);
        let mut monitor = LogMonitor::<IntegerType>::default();
        assert_eq!(monitor.best_cost(), None);
        monitor.on_solution_found(&Tour::new(vec![0, 1, 2, 0], 6), &counters);
        assert_eq!(monitor.best_cost(), Some(6));
        assert_eq!(monitor.name(), "LogMonitor");
        assert_eq!(
            monitor.to_string(),
            "LogMonitor(log_interval: 1s, clock_check_mask: 4095)"
        );
    }
}
