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
use waypoint_model::{matrix::DistanceMatrix, tour::Tour};
use waypoint_search::num::TourNumeric;

/// A no-operation monitor that implements the `SearchMonitor` trait
/// but does nothing on any of the events.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct NoOperationMonitor<T> {
    _phantom: std::marker::PhantomData<fn() -> T>,
}

impl<T> NoOperationMonitor<T> {
    /// Creates a new `NoOperationMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T> SearchMonitor<T> for NoOperationMonitor<T>
where
    T: TourNumeric,
{
    #[inline(always)]
    fn name(&self) -> &str {
        "NoOperationMonitor"
    }

    #[inline(always)]
    fn on_enter_search(&mut self, _matrix: &DistanceMatrix<T>, _worker: usize) {}

    #[inline(always)]
    fn on_node(&mut self, _state: &TourState<'_, T>, _counters: &SearchCounters) {}

    #[inline(always)]
    fn on_prune(
        &mut self,
        _state: &TourState<'_, T>,
        _reason: PruneReason,
        _counters: &SearchCounters,
    ) {
    }

    #[inline(always)]
    fn on_solution_found(&mut self, _tour: &Tour<T>, _counters: &SearchCounters) {}

    #[inline(always)]
    fn on_exit_search(&mut self, _counters: &SearchCounters) {}
}

impl<T> std::fmt::Display for NoOperationMonitor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NoOperationMonitor")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_display() {
        let monitor = NoOperationMonitor::<i64>::new();
        assert_eq!(monitor.name(), "NoOperationMonitor");
        assert_eq!(monitor.to_string(), "NoOperationMonitor");
    }
}
