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

//! Binary branching on edges with degree propagation.
//!
//! `Brancher::branch` picks the first undecided edge `(i, j)` in row-major
//! order and produces two children that partition the parent's completions:
//! the left child includes the edge, the right child excludes it.
//!
//! Each child then runs one propagation pass over the vertices in index
//! order, applying the degree-two rule of a tour:
//!
//! | included | undecided | action                          |
//! |----------|-----------|---------------------------------|
//! | 2        | any       | exclude every undecided edge    |
//! | 1        | 1         | include the undecided edge      |
//! | 0        | 2         | include both undecided edges    |
//!
//! Updates made for a vertex are visible to the vertices after it in the same
//! pass. The pass does not iterate to a fixed point; whatever it leaves
//! undecided is resolved by later branching.

use crate::{
    marks::{EdgeMark, EdgeMarks},
    state::TourState,
};
use smallvec::SmallVec;
use waypoint_search::num::TourNumeric;

/// The error type for branching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchError {
    /// The state claims to be incomplete but has no undecided edge left.
    Exhausted {
        /// Depth of the offending state.
        depth: usize,
    },
    /// The state is invalid or already complete and must not be branched.
    NotBranchable {
        /// Whether the state was valid.
        valid: bool,
        /// Whether the state was complete.
        complete: bool,
    },
}

impl std::fmt::Display for BranchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted { depth } => write!(
                f,
                "State at depth {} is incomplete but has no undecided edge",
                depth
            ),
            Self::NotBranchable { valid, complete } => write!(
                f,
                "State cannot be branched (valid: {}, complete: {})",
                valid, complete
            ),
        }
    }
}

impl std::error::Error for BranchError {}

/// Splits incomplete states into an include/exclude pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Brancher;

impl Brancher {
    /// Creates a new `Brancher`.
    #[inline]
    pub fn new() -> Self {
        Self
    }

    /// Returns the edge `branch` would split `state` on, if any.
    #[inline]
    pub fn select_edge<T>(&self, state: &TourState<'_, T>) -> Option<(usize, usize)>
    where
        T: TourNumeric,
    {
        state.marks().first_undecided()
    }

    /// Branches `state` into `(left, right)`: the selected edge included and
    /// excluded, respectively, each followed by one propagation pass. Both
    /// children sit one level deeper than `state`.
    pub fn branch<'a, T>(
        &self,
        state: &TourState<'a, T>,
    ) -> Result<(TourState<'a, T>, TourState<'a, T>), BranchError>
    where
        T: TourNumeric,
    {
        if !state.is_valid() || state.is_complete() {
            return Err(BranchError::NotBranchable {
                valid: state.is_valid(),
                complete: state.is_complete(),
            });
        }

        let (i, j) = self
            .select_edge(state)
            .ok_or(BranchError::Exhausted {
                depth: state.depth(),
            })?;

        let child = |mark: EdgeMark| {
            let mut marks = state.marks().clone();
            marks.set(i, j, mark);
            propagate(&mut marks);
            TourState::new(state.matrix(), marks, state.depth() + 1)
        };

        Ok((child(EdgeMark::Included), child(EdgeMark::Excluded)))
    }
}

/// Applies one pass of degree-two propagation to `marks`.
pub fn propagate(marks: &mut EdgeMarks) {
    for v in 0..marks.order() {
        let mut included = 0usize;
        let mut undecided: SmallVec<[usize; 8]> = SmallVec::new();
        for (u, mark) in marks.incident(v) {
            match mark {
                EdgeMark::Included => included += 1,
                EdgeMark::Undecided => undecided.push(u),
                EdgeMark::Excluded => {}
            }
        }

        match (included, undecided.len()) {
            (2, _) => {
                for &u in &undecided {
                    marks.set(v, u, EdgeMark::Excluded);
                }
            }
            (1, 1) | (0, 2) => {
                for &u in &undecided {
                    marks.set(v, u, EdgeMark::Included);
                }
            }
            _ => {}
        }
    }
}
