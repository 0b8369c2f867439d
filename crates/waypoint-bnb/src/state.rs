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

//! Search states of the edge-selection branch-and-bound.
//!
//! A `TourState` is a node of the search tree: an `EdgeMarks` table plus the
//! properties `eval::evaluate` derives from it. States are immutable values.
//! Branching never edits a state; it builds two new ones, so a state can be
//! moved into the shared work queue and out again on another thread without
//! any synchronization beyond the queue itself.
//!
//! The distance matrix is borrowed for the lifetime of the run, which keeps
//! states small (one table, a few scalars, and a route only at the leaves).

use crate::{
    eval::{Evaluation, evaluate},
    marks::EdgeMarks,
};
use waypoint_model::{matrix::DistanceMatrix, tour::Tour};
use waypoint_search::num::TourNumeric;

/// A node of the search tree.
///
/// Invariants:
/// - `marks.order() == matrix.order()`.
/// - The derived fields always describe `marks`; they are computed once in
///   `TourState::new` and never change.
#[derive(Debug, Clone)]
pub struct TourState<'a, T> {
    matrix: &'a DistanceMatrix<T>,
    marks: EdgeMarks,
    depth: usize,
    evaluation: Evaluation<T>,
}

impl<'a, T> TourState<'a, T>
where
    T: TourNumeric,
{
    /// Creates a state for `marks` at the given tree `depth`.
    ///
    /// # Panics
    ///
    /// Panics if the orders of `marks` and `matrix` differ.
    pub fn new(matrix: &'a DistanceMatrix<T>, marks: EdgeMarks, depth: usize) -> Self {
        let evaluation = evaluate(&marks, matrix);
        Self {
            matrix,
            marks,
            depth,
            evaluation,
        }
    }

    /// Creates the root state: every edge undecided, depth zero.
    #[inline]
    pub fn root(matrix: &'a DistanceMatrix<T>) -> Self {
        Self::new(matrix, EdgeMarks::new(matrix.order()), 0)
    }

    /// Returns the distance matrix this state is evaluated against.
    #[inline]
    pub fn matrix(&self) -> &'a DistanceMatrix<T> {
        self.matrix
    }

    /// Returns the edge marks.
    #[inline]
    pub fn marks(&self) -> &EdgeMarks {
        &self.marks
    }

    /// Returns the number of branch operations between the root and this state.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.evaluation.valid
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.evaluation.complete
    }

    #[inline]
    pub fn is_route(&self) -> bool {
        self.evaluation.is_route()
    }

    /// Returns the lower bound on any tour extending this state.
    ///
    /// Invalid states report `T::max_value()`.
    #[inline]
    pub fn lower_bound(&self) -> T {
        self.evaluation.lower_bound
    }

    /// Returns the tour cost, or `None` unless this state is a route.
    #[inline]
    pub fn cost(&self) -> Option<T> {
        self.evaluation.cost
    }

    /// Returns the canonical route `[0, ..., 0]`, or `None` unless this state
    /// is a route.
    #[inline]
    pub fn route(&self) -> Option<&[usize]> {
        self.evaluation.route.as_deref()
    }

    /// Returns an owned snapshot of the tour this state describes.
    pub fn tour(&self) -> Option<Tour<T>> {
        match (&self.evaluation.route, self.evaluation.cost) {
            (Some(route), Some(cost)) => Some(Tour::new(route.clone(), cost)),
            _ => None,
        }
    }

    /// Consumes the state and returns its marks.
    #[inline]
    pub fn into_marks(self) -> EdgeMarks {
        self.marks
    }
}

impl<T> PartialEq for TourState<'_, T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.matrix, other.matrix)
            && self.depth == other.depth
            && self.marks == other.marks
            && self.evaluation == other.evaluation
    }
}

impl<T> Eq for TourState<'_, T> where T: Eq {}

impl<T> std::fmt::Display for TourState<'_, T>
where
    T: TourNumeric,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TourState(depth: {}, valid: {}, complete: {}, lower_bound: ",
            self.depth, self.evaluation.valid, self.evaluation.complete
        )?;
        if self.evaluation.valid {
            write!(f, "{}", self.evaluation.lower_bound)?;
        } else {
            write!(f, "inf")?;
        }
        match self.evaluation.cost {
            Some(cost) => write!(f, ", cost: {})", cost),
            None => write!(f, ")"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::EdgeMark;

    type IntegerType = i64;

    fn five_vertex() -> DistanceMatrix<IntegerType> {
        DistanceMatrix::from_rows(&[
            [0, 3, 4, 2, 7],
            [3, 0, 4, 6, 3],
            [4, 4, 0, 5, 8],
            [2, 6, 5, 0, 6],
            [7, 3, 8, 6, 0],
        ])
        .expect("valid matrix")
    }

    #[test]
    fn test_root_state() {
        let m = five_vertex();
        let root = TourState::root(&m);
        assert_eq!(root.depth(), 0);
        assert!(root.is_valid());
        assert!(!root.is_complete());
        assert!(!root.is_route());
        assert_eq!(root.cost(), None);
        assert_eq!(root.route(), None);
        assert!(root.tour().is_none());
        assert_eq!(root.marks().num_undecided(), 10);
    }

    #[test]
    fn test_route_state_snapshot() {
        let m = five_vertex();
        let marks = EdgeMarks::from_route(5, &[0, 1, 4, 3, 2, 0]);
        let state = TourState::new(&m, marks.clone(), 7);
        assert!(state.is_route());
        assert_eq!(state.depth(), 7);

        let tour = state.tour().expect("route state has a tour");
        assert_eq!(tour.route(), &[0, 1, 4, 3, 2, 0]);
        assert_eq!(tour.cost(), 3 + 3 + 6 + 5 + 4);
        assert_eq!(state.cost(), Some(tour.cost()));
        assert!(state.lower_bound() <= tour.cost());
        assert_eq!(state.into_marks(), marks);
    }

    #[test]
    fn test_field_equal_states_compare_equal() {
        let m = five_vertex();
        let mut a = EdgeMarks::new(5);
        a.set(0, 2, EdgeMark::Included);
        let b = a.clone();
        assert_eq!(TourState::new(&m, a, 1), TourState::new(&m, b, 1));
    }

    #[test]
    fn test_display() {
        let m = five_vertex();
        let root = TourState::root(&m);
        assert_eq!(
            root.to_string(),
            "TourState(depth: 0, valid: true, complete: false, lower_bound: 17)"
        );
    }

    #[test]
    #[should_panic(expected = "mismatched orders")]
    fn test_mismatched_orders_panic() {
        let m = five_vertex();
        let _ = TourState::new(&m, EdgeMarks::new(4), 0);
    }
}
