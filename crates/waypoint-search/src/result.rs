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

use crate::{num::TourNumeric, stats::SearchStatistics};
use waypoint_model::tour::Tour;

/// The result of an exhaustive search.
///
/// The search either proves a tour optimal or proves that no tour exists.
/// There is no "feasible but unproven" outcome because the search always
/// runs to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult<T> {
    /// No Hamiltonian cycle exists.
    Infeasible,
    /// The tour is optimal.
    Optimal(Tour<T>),
}

impl<T> SolverResult<T> {
    /// Returns the tour if one was found.
    #[inline]
    pub fn tour(&self) -> Option<&Tour<T>> {
        match self {
            SolverResult::Optimal(tour) => Some(tour),
            SolverResult::Infeasible => None,
        }
    }
}

impl<T> From<Option<Tour<T>>> for SolverResult<T> {
    fn from(tour: Option<Tour<T>>) -> Self {
        match tour {
            Some(tour) => SolverResult::Optimal(tour),
            None => SolverResult::Infeasible,
        }
    }
}

impl<T> std::fmt::Display for SolverResult<T>
where
    T: TourNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(tour) => write!(f, "Optimal(cost={})", tour.cost()),
        }
    }
}

/// The outcome of a solver run: the result plus the statistics of the search
/// that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverOutcome<T> {
    pub result: SolverResult<T>,
    pub statistics: SearchStatistics,
}

impl<T> SolverOutcome<T>
where
    T: TourNumeric,
{
    #[inline]
    pub fn new(result: SolverResult<T>, statistics: SearchStatistics) -> Self {
        Self { result, statistics }
    }

    /// Returns the optimal route `[0, ..., 0]`, if a tour exists.
    #[inline]
    pub fn route(&self) -> Option<&[usize]> {
        self.result.tour().map(Tour::route)
    }

    /// Returns the optimal cost, or `None` if no tour exists.
    #[inline]
    pub fn cost(&self) -> Option<T> {
        self.result.tour().map(Tour::cost)
    }

    /// Returns the wall-clock duration of the run.
    #[inline]
    pub fn elapsed(&self) -> std::time::Duration {
        self.statistics.solve_duration
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }
}

impl<T> std::fmt::Display for SolverOutcome<T>
where
    T: TourNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        if let Some(tour) = self.result.tour() {
            writeln!(f, "{}", tour)?;
        }
        write!(f, "{}", self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::SearchStatisticsBuilder;
    use std::time::Duration;

    #[test]
    fn test_optimal_outcome_accessors() {
        let stats = SearchStatisticsBuilder::new()
            .solve_duration(Duration::from_millis(5))
            .build();
        let outcome = SolverOutcome::new(
            SolverResult::Optimal(Tour::new(vec![0, 2, 1, 0], 11i64)),
            stats,
        );

        assert!(outcome.is_optimal());
        assert!(!outcome.is_infeasible());
        assert_eq!(outcome.route(), Some(&[0, 2, 1, 0][..]));
        assert_eq!(outcome.cost(), Some(11));
        assert_eq!(outcome.elapsed(), Duration::from_millis(5));

        let rendered = outcome.to_string();
        assert!(rendered.starts_with("Result: Optimal(cost=11)"));
        assert!(rendered.contains("Tour (cost 11): 0 -> 2 -> 1 -> 0"));
        assert!(rendered.contains("Search Statistics:"));
    }

    #[test]
    fn test_infeasible_outcome() {
        let outcome: SolverOutcome<i64> =
            SolverOutcome::new(SolverResult::from(None), SearchStatisticsBuilder::new().build());
        assert!(outcome.is_infeasible());
        assert_eq!(outcome.route(), None);
        assert_eq!(outcome.cost(), None);
        assert_eq!(outcome.result.to_string(), "Infeasible");
    }
}
