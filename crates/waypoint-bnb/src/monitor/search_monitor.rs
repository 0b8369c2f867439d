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

//! Search monitoring interface
//!
//! Declares the `SearchMonitor` trait and `PruneReason` for observing the
//! parallel branch‑and‑bound. Every worker owns its own monitor instance, so
//! callbacks take `&mut self` and need no synchronization; the shared
//! `SearchCounters` are handed to each callback as a read‑only live view.
//!
//! Lifecycle per worker
//! - enter → {node → prune*}* → solution* → exit
//!
//! Monitors observe only. They cannot stop or steer the search.

use crate::{state::TourState, stats::SearchCounters};
use waypoint_model::{matrix::DistanceMatrix, tour::Tour};
use waypoint_search::num::TourNumeric;

/// Reasons for pruning a child state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PruneReason {
    /// The child cannot be completed to a tour.
    Infeasible,
    /// The child's lower bound exceeds the incumbent's cost.
    BoundDominated,
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::Infeasible => write!(f, "Infeasible"),
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
        }
    }
}

/// Trait for observing the search from inside a single worker.
pub trait SearchMonitor<T>: Send
where
    T: TourNumeric,
{
    /// Returns the name of the monitor.
    fn name(&self) -> &str;
    /// Called once when `worker` starts, before its first pop.
    fn on_enter_search(&mut self, matrix: &DistanceMatrix<T>, worker: usize);
    /// Called for every state the worker takes from the frontier.
    fn on_node(&mut self, state: &TourState<'_, T>, counters: &SearchCounters);
    /// Called for every child the worker discards instead of pushing.
    fn on_prune(&mut self, state: &TourState<'_, T>, reason: PruneReason, counters: &SearchCounters);
    /// Called when this worker installs a new incumbent.
    fn on_solution_found(&mut self, tour: &Tour<T>, counters: &SearchCounters);
    /// Called once when the worker leaves its loop.
    fn on_exit_search(&mut self, counters: &SearchCounters);
}

impl<T, M> SearchMonitor<T> for Box<M>
where
    T: TourNumeric,
    M: SearchMonitor<T> + ?Sized,
{
    #[inline(always)]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline(always)]
    fn on_enter_search(&mut self, matrix: &DistanceMatrix<T>, worker: usize) {
        (**self).on_enter_search(matrix, worker)
    }

    #[inline(always)]
    fn on_node(&mut self, state: &TourState<'_, T>, counters: &SearchCounters) {
        (**self).on_node(state, counters)
    }

    #[inline(always)]
    fn on_prune(&mut self, state: &TourState<'_, T>, reason: PruneReason, counters: &SearchCounters) {
        (**self).on_prune(state, reason, counters)
    }

    #[inline(always)]
    fn on_solution_found(&mut self, tour: &Tour<T>, counters: &SearchCounters) {
        (**self).on_solution_found(tour, counters)
    }

    #[inline(always)]
    fn on_exit_search(&mut self, counters: &SearchCounters) {
        (**self).on_exit_search(counters)
    }
}

impl<T> std::fmt::Debug for dyn SearchMonitor<T> + '_
where
    T: TourNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

impl<T> std::fmt::Display for dyn SearchMonitor<T> + '_
where
    T: TourNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SearchMonitor({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::PruneReason;

    #[test]
    fn test_prune_reason_display() {
        assert_eq!(PruneReason::Infeasible.to_string(), "Infeasible");
        assert_eq!(PruneReason::BoundDominated.to_string(), "BoundDominated");
    }
}
