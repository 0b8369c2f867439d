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

//! # Shared Incumbent (Best Tour Holder)
//!
//! A lock-free container for the best complete tour discovered so far. The
//! current `BestRecord` lives in a `PublishedCell`; improving it is a
//! read-compare-publish cycle that re-validates against the freshest record
//! whenever another worker wins the race.
//!
//! ## Ordering of candidates
//!
//! Lower cost wins. Between two tours of equal cost, the one whose canonical
//! route is lexicographically smaller wins. This makes the final tour
//! independent of how many workers ran and in which order they found their
//! tours.
//!
//! ## Usage
//!
//! ```rust
//! use waypoint_model::tour::Tour;
//! use waypoint_search::incumbent::SharedIncumbent;
//!
//! let inc: SharedIncumbent<i64> = SharedIncumbent::new();
//! assert_eq!(inc.upper_bound(), None);
//!
//! assert!(inc.try_install(&Tour::new(vec![0, 2, 1, 0], 12)));
//! assert!(inc.admits(12));
//! assert!(!inc.admits(13));
//!
//! // Same cost, lexicographically smaller route.
//! assert!(inc.try_install(&Tour::new(vec![0, 1, 2, 0], 12)));
//! assert_eq!(inc.snapshot().tour().map(|t| t.route().to_vec()), Some(vec![0, 1, 2, 0]));
//! ```

use crate::num::TourNumeric;
use waypoint_core::sync::published::PublishedCell;
use waypoint_model::tour::Tour;

/// The best complete tour known at some instant.
///
/// A record is never mutated; improvements replace it wholesale. The empty
/// record stands for an infinite cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestRecord<T> {
    tour: Option<Tour<T>>,
}

impl<T> Default for BestRecord<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> BestRecord<T> {
    /// Returns the record with no tour (cost +∞).
    #[inline]
    pub fn empty() -> Self {
        Self { tour: None }
    }

    /// Returns the tour held by this record, if any.
    #[inline]
    pub fn tour(&self) -> Option<&Tour<T>> {
        self.tour.as_ref()
    }

    /// Consumes the record and returns its tour.
    #[inline]
    pub fn into_tour(self) -> Option<Tour<T>> {
        self.tour
    }
}

impl<T> BestRecord<T>
where
    T: TourNumeric,
{
    /// Creates a record holding `tour`.
    #[inline]
    pub fn with_tour(tour: Tour<T>) -> Self {
        Self { tour: Some(tour) }
    }

    /// Returns the record's cost, or `None` for the empty record.
    #[inline]
    pub fn cost(&self) -> Option<T> {
        self.tour.as_ref().map(Tour::cost)
    }

    /// Returns `true` if `candidate` should replace this record.
    #[inline]
    pub fn is_improved_by(&self, candidate: &Tour<T>) -> bool {
        match &self.tour {
            None => true,
            Some(current) => {
                candidate.cost() < current.cost()
                    || (candidate.cost() == current.cost() && candidate.route() < current.route())
            }
        }
    }
}

/// A concurrent holder for the incumbent tour.
///
/// All reads go through the published cell, so every bound check observes a
/// complete record that some worker installed.
#[derive(Debug)]
pub struct SharedIncumbent<T> {
    record: PublishedCell<BestRecord<T>>,
}

impl<T> Default for SharedIncumbent<T>
where
    T: TourNumeric,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Display for SharedIncumbent<T>
where
    T: TourNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.upper_bound() {
            Some(cost) => write!(f, "Incumbent(upper_bound: {})", cost),
            None => write!(f, "Incumbent(upper_bound: inf)"),
        }
    }
}

impl<T> SharedIncumbent<T>
where
    T: TourNumeric,
{
    /// Creates a new shared incumbent with no tour installed.
    #[inline]
    pub fn new() -> Self {
        Self {
            record: PublishedCell::new(BestRecord::empty()),
        }
    }

    /// Returns the cost of the current incumbent, or `None` if there is none.
    #[inline]
    pub fn upper_bound(&self) -> Option<T> {
        self.record.read(BestRecord::cost)
    }

    /// Returns `true` if a subtree with lower bound `bound` may still contain
    /// a tour at least as good as the incumbent.
    ///
    /// Equality is admitted so that equal-cost tours remain reachable for the
    /// tie-break.
    #[inline]
    pub fn admits(&self, bound: T) -> bool {
        self.upper_bound().is_none_or(|best| bound <= best)
    }

    /// Returns a snapshot of the current record.
    #[inline]
    pub fn snapshot(&self) -> BestRecord<T> {
        self.record.get()
    }

    /// Attempts to install `candidate` as the new incumbent.
    ///
    /// Returns `true` if the candidate was installed.
    pub fn try_install(&self, candidate: &Tour<T>) -> bool {
        self.record
            .update(|current| {
                current
                    .is_improved_by(candidate)
                    .then(|| BestRecord::with_tour(candidate.clone()))
            })
            .is_some()
    }

    /// Returns the number of installs since construction.
    #[inline]
    pub fn improvements(&self) -> u64 {
        self.record.version()
    }

    /// Consumes the holder and returns the final record.
    #[inline]
    pub fn into_record(self) -> BestRecord<T> {
        self.record.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::{BestRecord, SharedIncumbent};
    use std::sync::Arc;
    use std::thread;
    use waypoint_model::tour::Tour;

    fn make_tour(cost: i64, route: &[usize]) -> Tour<i64> {
        Tour::new(route.to_vec(), cost)
    }

    #[test]
    fn test_initial_state() {
        let inc: SharedIncumbent<i64> = SharedIncumbent::new();
        assert_eq!(inc.upper_bound(), None);
        assert!(inc.admits(i64::MAX));
        assert_eq!(inc.snapshot(), BestRecord::empty());
        assert_eq!(inc.improvements(), 0);
        assert_eq!(inc.to_string(), "Incumbent(upper_bound: inf)");
    }

    #[test]
    fn test_install_better_tour() {
        let inc: SharedIncumbent<i64> = SharedIncumbent::new();
        assert!(inc.try_install(&make_tour(100, &[0, 1, 2, 0])));
        assert_eq!(inc.upper_bound(), Some(100));

        assert!(inc.try_install(&make_tour(90, &[0, 2, 1, 0])));
        assert_eq!(inc.upper_bound(), Some(90));
        assert_eq!(inc.improvements(), 2);

        let snap = inc.snapshot();
        assert_eq!(snap.tour().map(|t| t.route()), Some(&[0, 2, 1, 0][..]));
    }

    #[test]
    fn test_reject_worse_and_equal_larger_route() {
        let inc: SharedIncumbent<i64> = SharedIncumbent::new();
        assert!(inc.try_install(&make_tour(100, &[0, 1, 2, 3, 0])));

        assert!(!inc.try_install(&make_tour(150, &[0, 1, 3, 2, 0])));
        assert!(!inc.try_install(&make_tour(100, &[0, 2, 1, 3, 0])));
        assert!(!inc.try_install(&make_tour(100, &[0, 1, 2, 3, 0])));

        assert_eq!(inc.upper_bound(), Some(100));
        assert_eq!(inc.improvements(), 1);
    }

    #[test]
    fn test_equal_cost_smaller_route_wins() {
        let inc: SharedIncumbent<i64> = SharedIncumbent::new();
        assert!(inc.try_install(&make_tour(100, &[0, 3, 2, 1, 0])));
        assert!(inc.try_install(&make_tour(100, &[0, 1, 2, 3, 0])));
        assert_eq!(
            inc.into_record().into_tour().map(Tour::into_route),
            Some(vec![0, 1, 2, 3, 0])
        );
    }

    #[test]
    fn test_admits_is_inclusive() {
        let inc: SharedIncumbent<i64> = SharedIncumbent::new();
        inc.try_install(&make_tour(10, &[0, 1, 0]));
        assert!(inc.admits(9));
        assert!(inc.admits(10));
        assert!(!inc.admits(11));
    }

    #[test]
    fn test_concurrent_installs_minimum_wins() {
        let inc = Arc::new(SharedIncumbent::<i64>::new());
        let objectives = vec![300, 200, 400, 50, 120, 75, 500, 60, 90];

        let mut handles = Vec::new();
        for obj in objectives.iter().cloned() {
            let inc_cloned = Arc::clone(&inc);
            handles.push(thread::spawn(move || {
                inc_cloned.try_install(&make_tour(obj, &[0, 1, 2, 3, 0]))
            }));
        }

        let results = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        assert!(results.iter().any(|&r| r));

        let min_obj = *objectives.iter().min().unwrap();
        assert_eq!(inc.upper_bound(), Some(min_obj));
    }

    #[test]
    fn test_concurrent_equal_costs_are_deterministic() {
        let routes: Vec<Vec<usize>> = vec![
            vec![0, 3, 1, 2, 0],
            vec![0, 2, 3, 1, 0],
            vec![0, 1, 3, 2, 0],
            vec![0, 2, 1, 3, 0],
        ];
        let inc = SharedIncumbent::<i64>::new();
        thread::scope(|scope| {
            for route in &routes {
                let inc = &inc;
                scope.spawn(move || inc.try_install(&Tour::new(route.clone(), 42)));
            }
        });
        assert_eq!(
            inc.snapshot().tour().map(|t| t.route().to_vec()),
            Some(vec![0, 1, 3, 2, 0])
        );
    }

    #[test]
    fn test_incumbent_with_i16() {
        let inc: SharedIncumbent<i16> = SharedIncumbent::new();
        assert!(inc.try_install(&Tour::new(vec![0, 1, 0], 50i16)));
        assert!(!inc.try_install(&Tour::new(vec![0, 1, 0], 120i16)));
        assert_eq!(inc.upper_bound(), Some(50i16));
        assert_eq!(inc.to_string(), "Incumbent(upper_bound: 50)");
    }
}
