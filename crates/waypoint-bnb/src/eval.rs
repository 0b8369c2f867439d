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

//! Bound and feasibility evaluation of edge-selection states.
//!
//! `evaluate` derives everything the search needs to know about a set of
//! edge marks in one pass over the table:
//!
//! - **valid**: no vertex has more than two included edges, every vertex
//!   keeps at least two edges that are not excluded, and following included
//!   edges from vertex `0` does not close a cycle before all vertices are on
//!   it.
//! - **complete**: no off-diagonal edge is undecided.
//! - **lower bound**: every vertex needs exactly two tour edges. Included
//!   edges fill those slots first, the cheapest undecided edges fill the
//!   rest; half the sum over all vertices (floored) never exceeds the cost of
//!   any tour that extends the state. If some vertex cannot fill both slots
//!   the bound degrades to zero. Invalid states get `T::max_value()`.
//! - **route** and **cost**: when the included edges form a single cycle
//!   through every vertex, the canonical route `[0, v1, ..., 0]` (starting
//!   toward the lower-indexed neighbor of `0`) and the sum of its weights.

use crate::marks::{EdgeMark, EdgeMarks};
use fixedbitset::FixedBitSet;
use smallvec::SmallVec;
use waypoint_model::matrix::DistanceMatrix;
use waypoint_search::num::TourNumeric;

/// The derived properties of an edge-mark table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation<T> {
    /// The state can still be completed to a tour as far as the local
    /// degree and cycle checks can tell.
    pub valid: bool,
    /// Every off-diagonal edge is decided.
    pub complete: bool,
    /// Admissible lower bound on any completion, `T::max_value()` if invalid.
    pub lower_bound: T,
    /// The canonical closed route, if the included edges form a tour.
    pub route: Option<Vec<usize>>,
    /// The route's cost, if the included edges form a tour.
    pub cost: Option<T>,
}

impl<T> Evaluation<T> {
    /// Returns `true` if the included edges form a Hamiltonian cycle.
    #[inline]
    pub fn is_route(&self) -> bool {
        self.route.is_some()
    }
}

type Neighbors = SmallVec<[usize; 2]>;

/// Outcome of following included edges away from vertex `0`.
enum Walk {
    /// The walk ran into a vertex with no further included edge.
    Open,
    /// The walk returned to `0`; the route includes both endpoints.
    Closed(Vec<usize>),
}

/// Evaluates `marks` against `matrix`.
///
/// # Panics
///
/// Panics if the orders of `marks` and `matrix` differ.
pub fn evaluate<T>(marks: &EdgeMarks, matrix: &DistanceMatrix<T>) -> Evaluation<T>
where
    T: TourNumeric,
{
    assert_eq!(
        marks.order(),
        matrix.order(),
        "called `eval::evaluate` with mismatched orders: marks {} vs matrix {}",
        marks.order(),
        matrix.order()
    );

    let order = marks.order();
    let mut included: Vec<Neighbors> = Vec::with_capacity(order);
    let mut degrees_ok = true;
    let mut complete = true;

    for v in 0..order {
        let mut neighbors = Neighbors::new();
        let mut open = 0usize;
        for (u, mark) in marks.incident(v) {
            match mark {
                EdgeMark::Included => {
                    neighbors.push(u);
                    open += 1;
                }
                EdgeMark::Undecided => {
                    complete = false;
                    open += 1;
                }
                EdgeMark::Excluded => {}
            }
        }
        degrees_ok &= neighbors.len() <= 2 && open >= 2;
        included.push(neighbors);
    }

    let walk = if degrees_ok {
        walk_from_origin(&included)
    } else {
        Walk::Open
    };

    let premature_cycle = matches!(&walk, Walk::Closed(route) if route.len() - 1 < order);
    let valid = degrees_ok && !premature_cycle;

    if !valid {
        return Evaluation {
            valid,
            complete,
            lower_bound: T::max_value(),
            route: None,
            cost: None,
        };
    }

    let route = match walk {
        Walk::Closed(route) if is_hamiltonian(&route, order, &included) => Some(route),
        _ => None,
    };
    let cost = route.as_ref().map(|r| matrix.route_cost(r));

    Evaluation {
        valid,
        complete,
        lower_bound: lower_bound(marks, matrix, &included),
        route,
        cost,
    }
}

/// Follows included edges from vertex `0`, leaving each vertex by the edge
/// it did not arrive on. The first step goes to the lower-indexed neighbor.
fn walk_from_origin(included: &[Neighbors]) -> Walk {
    let order = included.len();
    let mut route = Vec::with_capacity(order + 1);
    route.push(0);

    let mut previous = usize::MAX;
    let mut current = 0;
    for _ in 0..order {
        let next = included[current]
            .iter()
            .copied()
            .filter(|&u| u != previous)
            .min();
        let Some(next) = next else {
            return Walk::Open;
        };

        route.push(next);
        if next == 0 {
            return Walk::Closed(route);
        }
        previous = current;
        current = next;
    }

    // Unreachable while every degree is at most two.
    Walk::Open
}

fn is_hamiltonian(route: &[usize], order: usize, included: &[Neighbors]) -> bool {
    if route.len() != order + 1 || included.iter().any(|n| n.len() != 2) {
        return false;
    }

    let mut visited = FixedBitSet::with_capacity(order);
    for &v in &route[..order] {
        if visited.put(v) {
            return false;
        }
    }
    visited.count_ones(..) == order
}

fn lower_bound<T>(marks: &EdgeMarks, matrix: &DistanceMatrix<T>, included: &[Neighbors]) -> T
where
    T: TourNumeric,
{
    let mut total = T::zero();
    for (v, neighbors) in included.iter().enumerate() {
        let mut slots = T::zero();
        for &u in neighbors {
            slots = slots.saturating_add(matrix.distance(v, u));
        }

        let needed = 2 - neighbors.len();
        if needed > 0 {
            let (cheapest, second) = two_cheapest_undecided(marks, matrix, v);
            let filled = match (needed, cheapest, second) {
                (1, Some(a), _) => Some(a),
                (2, Some(a), Some(b)) => Some(a.saturating_add(b)),
                _ => None,
            };
            match filled {
                Some(weight) => slots = slots.saturating_add(weight),
                None => return T::zero(),
            }
        }

        total = total.saturating_add(slots);
    }

    total / (T::one() + T::one())
}

fn two_cheapest_undecided<T>(
    marks: &EdgeMarks,
    matrix: &DistanceMatrix<T>,
    v: usize,
) -> (Option<T>, Option<T>)
where
    T: TourNumeric,
{
    let mut first: Option<T> = None;
    let mut second: Option<T> = None;
    for (u, mark) in marks.incident(v) {
        if !mark.is_undecided() {
            continue;
        }
        let d = matrix.distance(v, u);
        match first {
            Some(f) if d >= f => {
                if second.is_none_or(|s| d < s) {
                    second = Some(d);
                }
            }
            _ => {
                second = first;
                first = Some(d);
            }
        }
    }
    (first, second)
}
