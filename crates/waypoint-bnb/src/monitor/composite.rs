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

//! Monitoring combinators for the search
//!
//! Provides `CompositeMonitor`, a fan‑out monitor that forwards every event to
//! its children in insertion order. This lets a worker carry logging and
//! custom instrumentation side by side without the coordinator knowing.

use crate::{
    monitor::search_monitor::{PruneReason, SearchMonitor},
    state::TourState,
    stats::SearchCounters,
};
use waypoint_model::{matrix::DistanceMatrix, tour::Tour};
use waypoint_search::num::TourNumeric;

/// A monitor that aggregates multiple monitors and forwards events to all of them.
pub struct CompositeMonitor<'a, T>
where
    T: TourNumeric,
{
    monitors: Vec<Box<dyn SearchMonitor<T> + 'a>>,
}

impl<'a, T> Default for CompositeMonitor<'a, T>
where
    T: TourNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> CompositeMonitor<'a, T>
where
    T: TourNumeric,
{
    /// Creates a new empty `CompositeMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    /// Creates a new `CompositeMonitor` with room for `capacity` monitors.
    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Adds a new monitor to the composite monitor.
    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: SearchMonitor<T> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Adds a boxed monitor to the composite monitor.
    #[inline(always)]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn SearchMonitor<T> + 'a>) {
        self.monitors.push(monitor);
    }

    /// Returns a slice of the monitors contained in the composite monitor.
    #[inline(always)]
    pub fn monitors(&self) -> &[Box<dyn SearchMonitor<T> + 'a>] {
        &self.monitors
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, T> FromIterator<Box<dyn SearchMonitor<T> + 'a>> for CompositeMonitor<'a, T>
where
    T: TourNumeric,
{
    #[inline(always)]
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn SearchMonitor<T> + 'a>>,
    {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl<T> std::fmt::Debug for CompositeMonitor<'_, T>
where
    T: TourNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeMonitor")
            .field("monitors", &self.monitors)
            .finish()
    }
}

impl<'a, T> SearchMonitor<T> for CompositeMonitor<'a, T>
where
    T: TourNumeric,
{
    #[inline(always)]
    fn name(&self) -> &str {
        "CompositeMonitor"
    }

    #[inline(always)]
    fn on_enter_search(&mut self, matrix: &DistanceMatrix<T>, worker: usize) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(matrix, worker);
        }
    }

    #[inline(always)]
    fn on_node(&mut self, state: &TourState<'_, T>, counters: &SearchCounters) {
        for monitor in &mut self.monitors {
            monitor.on_node(state, counters);
        }
    }

    #[inline(always)]
    fn on_prune(&mut self, state: &TourState<'_, T>, reason: PruneReason, counters: &SearchCounters) {
        for monitor in &mut self.monitors {
            monitor.on_prune(state, reason, counters);
        }
    }

    #[inline(always)]
    fn on_solution_found(&mut self, tour: &Tour<T>, counters: &SearchCounters) {
        for monitor in &mut self.monitors {
            monitor.on_solution_found(tour, counters);
        }
    }

    #[inline(always)]
    fn on_exit_search(&mut self, counters: &SearchCounters) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(counters);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::no_op::NoOperationMonitor;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    type IntegerType = i64;

    #[derive(Clone, Default)]
    struct Calls {
        enter: Arc<AtomicUsize>,
        node: Arc<AtomicUsize>,
        prune: Arc<AtomicUsize>,
        solution: Arc<AtomicUsize>,
        exit: Arc<AtomicUsize>,
    }

    struct CountingMonitor {
        calls: Calls,
    }

    impl SearchMonitor<IntegerType> for CountingMonitor {
        fn name(&self) -> &str {
            "CountingMonitor"
        }

        fn on_enter_search(&mut self, _matrix: &DistanceMatrix<IntegerType>, _worker: usize) {
            self.calls.enter.fetch_add(1, Ordering::Relaxed);
        }

        fn on_node(&mut self, _state: &TourState<'_, IntegerType>, _counters: &SearchCounters) {
            self.calls.node.fetch_add(1, Ordering::Relaxed);
        }

        fn on_prune(
            &mut self,
            _state: &TourState<'_, IntegerType>,
            _reason: PruneReason,
            _counters: &SearchCounters,
        ) {
            self.calls.prune.fetch_add(1, Ordering::Relaxed);
        }

        fn on_solution_found(&mut self, _tour: &Tour<IntegerType>, _counters: &SearchCounters) {
            self.calls.solution.fetch_add(1, Ordering::Relaxed);
        }

        fn on_exit_search(&mut self, _counters: &SearchCounters) {
            self.calls.exit.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_fans_out_to_every_monitor() {
        let calls = Calls::default();
        let mut composite = CompositeMonitor::with_capacity(3);
        composite.add_monitor(CountingMonitor {
            calls: calls.clone(),
        });
        composite.add_monitor(NoOperationMonitor::new());
        composite.add_monitor_boxed(Box::new(CountingMonitor {
            calls: calls.clone(),
        }));
        assert_eq!(composite.len(), 3);
        assert!(!composite.is_empty());

        let matrix = DistanceMatrix::from_rows(&[[0 as IntegerType, 1, 1], [1, 0, 1], [1, 1, 0]])
            .expect("valid");
        let counters = SearchCounters::new(3);
        let state = TourState::root(&matrix);
        let tour = Tour::new(vec![0, 1, 2, 0], 3);

        composite.on_enter_search(&matrix, 0);
        composite.on_node(&state, &counters);
        composite.on_prune(&state, PruneReason::BoundDominated, &counters);
        composite.on_solution_found(&tour, &counters);
        composite.on_exit_search(&counters);

        assert_eq!(calls.enter.load(Ordering::Relaxed), 2);
        assert_eq!(calls.node.load(Ordering::Relaxed), 2);
        assert_eq!(calls.prune.load(Ordering::Relaxed), 2);
        assert_eq!(calls.solution.load(Ordering::Relaxed), 2);
        assert_eq!(calls.exit.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_from_iterator_and_debug() {
        let composite: CompositeMonitor<'_, IntegerType> = vec![
            Box::new(NoOperationMonitor::new()) as Box<dyn SearchMonitor<IntegerType>>,
        ]
        .into_iter()
        .collect();
        assert_eq!(composite.len(), 1);
        assert_eq!(composite.monitors()[0].name(), "NoOperationMonitor");
        assert_eq!(
            format!("{:?}", composite),
            "CompositeMonitor { monitors: [SearchMonitor(NoOperationMonitor)] }"
        );
    }

    #[test]
    fn test_empty_composite() {
        let composite = CompositeMonitor::<IntegerType>::default();
        assert!(composite.is_empty());
        assert_eq!(composite.name(), "CompositeMonitor");
    }
}
