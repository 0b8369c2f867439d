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

//! Edge decisions of a partial tour.
//!
//! Every unordered vertex pair carries an `EdgeMark`: the edge is either
//! forced into the tour, forced out of it, or not yet decided. `EdgeMarks`
//! stores these in a dense `order × order` table and keeps it symmetric by
//! writing both `(i, j)` and `(j, i)` on every update. The diagonal is
//! stored for indexing convenience only; it is never an edge.

/// The decision recorded for a single edge.
#[repr(i8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EdgeMark {
    /// Not decided yet.
    #[default]
    Undecided = 0,
    /// The edge is part of every completion of this state.
    Included = 1,
    /// The edge is part of no completion of this state.
    Excluded = -1,
}

impl EdgeMark {
    /// Converts a raw mark (`0`, `1` or `-1`) into an `EdgeMark`.
    ///
    /// Returns `None` for any other value.
    #[inline]
    pub fn from_raw(raw: i8) -> Option<Self> {
        match raw {
            0 => Some(EdgeMark::Undecided),
            1 => Some(EdgeMark::Included),
            -1 => Some(EdgeMark::Excluded),
            _ => None,
        }
    }

    /// Returns the raw representation of this mark.
    #[inline(always)]
    pub fn as_raw(self) -> i8 {
        self as i8
    }

    #[inline(always)]
    pub fn is_included(self) -> bool {
        self == EdgeMark::Included
    }

    #[inline(always)]
    pub fn is_excluded(self) -> bool {
        self == EdgeMark::Excluded
    }

    #[inline(always)]
    pub fn is_undecided(self) -> bool {
        self == EdgeMark::Undecided
    }
}

impl std::fmt::Display for EdgeMark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeMark::Undecided => write!(f, "Undecided"),
            EdgeMark::Included => write!(f, "Included"),
            EdgeMark::Excluded => write!(f, "Excluded"),
        }
    }
}

/// The error type for building `EdgeMarks` from raw values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeMarksError {
    /// The raw buffer does not hold `order * order` entries.
    DimensionMismatch { expected: usize, found: usize },
    /// A raw value is not `0`, `1` or `-1`.
    IllegalMark { row: usize, col: usize, raw: i8 },
    /// `mark(row, col) != mark(col, row)`.
    Asymmetric { row: usize, col: usize },
}

impl std::fmt::Display for EdgeMarksError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { expected, found } => write!(
                f,
                "Edge mark buffer has {} entries, expected {}",
                found, expected
            ),
            Self::IllegalMark { row, col, raw } => {
                write!(f, "Illegal edge mark {} at ({}, {})", raw, row, col)
            }
            Self::Asymmetric { row, col } => write!(
                f,
                "Edge marks are not symmetric at ({}, {}) and ({}, {})",
                row, col, col, row
            ),
        }
    }
}

impl std::error::Error for EdgeMarksError {}

/// A symmetric `order × order` table of edge decisions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeMarks {
    order: usize,
    marks: Vec<EdgeMark>,
}

impl EdgeMarks {
    /// Creates a table with every edge `Undecided`.
    #[inline]
    pub fn new(order: usize) -> Self {
        Self {
            order,
            marks: vec![EdgeMark::Undecided; order * order],
        }
    }

    /// Builds a table from raw row-major marks, validating every value and
    /// the symmetry of the off-diagonal entries.
    pub fn from_raw(order: usize, raw: &[i8]) -> Result<Self, EdgeMarksError> {
        let expected = order * order;
        if raw.len() != expected {
            return Err(EdgeMarksError::DimensionMismatch {
                expected,
                found: raw.len(),
            });
        }

        let mut marks = Vec::with_capacity(expected);
        for (k, &value) in raw.iter().enumerate() {
            let (row, col) = (k / order, k % order);
            let mark = EdgeMark::from_raw(value).ok_or(EdgeMarksError::IllegalMark {
                row,
                col,
                raw: value,
            })?;
            if col < row && marks[col * order + row] != mark {
                return Err(EdgeMarksError::Asymmetric { row: col, col: row });
            }
            marks.push(mark);
        }

        Ok(Self { order, marks })
    }

    /// Builds the fully decided table of a closed route: the route's edges
    /// are `Included`, every other edge is `Excluded`.
    ///
    /// # Panics
    ///
    /// Panics if a vertex in `route` is out of bounds.
    pub fn from_route(order: usize, route: &[usize]) -> Self {
        let mut marks = Self::new(order);
        for i in 0..order {
            for j in (i + 1)..order {
                marks.set(i, j, EdgeMark::Excluded);
            }
        }
        for w in route.windows(2) {
            if w[0] != w[1] {
                marks.set(w[0], w[1], EdgeMark::Included);
            }
        }
        marks
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline(always)]
    fn flat_index(&self, i: usize, j: usize) -> usize {
        debug_assert!(
            i < self.order && j < self.order,
            "called `EdgeMarks::flat_index` with index out of bounds: the order is {} but the index is ({}, {})",
            self.order,
            i,
            j
        );
        i * self.order + j
    }

    /// Returns the mark of edge `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> EdgeMark {
        self.marks[self.flat_index(i, j)]
    }

    /// Sets the mark of edge `(i, j)` and its mirror `(j, i)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, mark: EdgeMark) {
        debug_assert_ne!(
            i, j,
            "called `EdgeMarks::set` on the diagonal entry ({}, {})",
            i, j
        );
        let ij = self.flat_index(i, j);
        let ji = self.flat_index(j, i);
        self.marks[ij] = mark;
        self.marks[ji] = mark;
    }

    /// Iterates over the edges incident to `v` as `(neighbor, mark)`,
    /// skipping the diagonal.
    #[inline]
    pub fn incident(&self, v: usize) -> impl Iterator<Item = (usize, EdgeMark)> + '_ {
        let start = self.flat_index(v, 0);
        self.marks[start..start + self.order]
            .iter()
            .copied()
            .enumerate()
            .filter(move |&(j, _)| j != v)
    }

    /// Returns the number of edges incident to `v` carrying `mark`.
    #[inline]
    pub fn count(&self, v: usize, mark: EdgeMark) -> usize {
        self.incident(v).filter(|&(_, m)| m == mark).count()
    }

    /// Returns the first `Undecided` edge `(i, j)` in row-major order.
    ///
    /// Because the table is symmetric, the returned pair always has `i < j`.
    pub fn first_undecided(&self) -> Option<(usize, usize)> {
        (0..self.order).find_map(|i| {
            ((i + 1)..self.order)
                .find(|&j| self.get(i, j).is_undecided())
                .map(|j| (i, j))
        })
    }

    /// Returns the number of undecided unordered edges.
    pub fn num_undecided(&self) -> usize {
        (0..self.order)
            .map(|i| ((i + 1)..self.order).filter(|&j| self.get(i, j).is_undecided()).count())
            .sum()
    }

    /// Returns the raw row-major marks.
    pub fn to_raw(&self) -> Vec<i8> {
        self.marks.iter().map(|m| m.as_raw()).collect()
    }
}

impl std::fmt::Display for EdgeMarks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.order {
            for j in 0..self.order {
                if j > 0 {
                    write!(f, " ")?;
                }
                if i == j {
                    write!(f, " .")?;
                } else {
                    write!(f, "{:>2}", self.get(i, j).as_raw())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_mark_values() {
        assert_eq!(EdgeMark::from_raw(0), Some(EdgeMark::Undecided));
        assert_eq!(EdgeMark::from_raw(1), Some(EdgeMark::Included));
        assert_eq!(EdgeMark::from_raw(-1), Some(EdgeMark::Excluded));
        assert_eq!(EdgeMark::from_raw(2), None);
        assert_eq!(EdgeMark::from_raw(-2), None);
        assert_eq!(EdgeMark::Excluded.as_raw(), -1);
    }

    #[test]
    fn test_set_is_symmetric() {
        let mut marks = EdgeMarks::new(4);
        marks.set(1, 3, EdgeMark::Included);
        marks.set(2, 0, EdgeMark::Excluded);
        assert_eq!(marks.get(3, 1), EdgeMark::Included);
        assert_eq!(marks.get(0, 2), EdgeMark::Excluded);
        assert_eq!(marks.get(0, 1), EdgeMark::Undecided);
    }

    #[test]
    fn test_incident_skips_diagonal() {
        let mut marks = EdgeMarks::new(3);
        marks.set(0, 1, EdgeMark::Included);
        let incident: Vec<_> = marks.incident(1).collect();
        assert_eq!(
            incident,
            vec![(0, EdgeMark::Included), (2, EdgeMark::Undecided)]
        );
        assert_eq!(marks.count(1, EdgeMark::Included), 1);
        assert_eq!(marks.count(1, EdgeMark::Undecided), 1);
    }

    #[test]
    fn test_first_undecided_row_major() {
        let mut marks = EdgeMarks::new(4);
        assert_eq!(marks.first_undecided(), Some((0, 1)));
        marks.set(0, 1, EdgeMark::Included);
        marks.set(0, 2, EdgeMark::Excluded);
        marks.set(0, 3, EdgeMark::Excluded);
        assert_eq!(marks.first_undecided(), Some((1, 2)));
        assert_eq!(marks.num_undecided(), 3);
    }

    #[test]
    fn test_from_raw_validates() {
        assert_eq!(
            EdgeMarks::from_raw(2, &[0, 1, 1]),
            Err(EdgeMarksError::DimensionMismatch {
                expected: 4,
                found: 3
            })
        );
        assert_eq!(
            EdgeMarks::from_raw(2, &[0, 3, 3, 0]),
            Err(EdgeMarksError::IllegalMark {
                row: 0,
                col: 1,
                raw: 3
            })
        );
        assert_eq!(
            EdgeMarks::from_raw(3, &[0, 1, 0, 1, 0, -1, 0, 1, 0]),
            Err(EdgeMarksError::Asymmetric { row: 1, col: 2 })
        );

        let marks = EdgeMarks::from_raw(3, &[0, 1, -1, 1, 0, 0, -1, 0, 0]).expect("valid");
        assert_eq!(marks.get(2, 0), EdgeMark::Excluded);
        assert_eq!(marks.to_raw(), vec![0, 1, -1, 1, 0, 0, -1, 0, 0]);
    }

    #[test]
    fn test_from_route() {
        let marks = EdgeMarks::from_route(4, &[0, 2, 1, 3, 0]);
        assert_eq!(marks.num_undecided(), 0);
        for v in 0..4 {
            assert_eq!(marks.count(v, EdgeMark::Included), 2);
        }
        assert_eq!(marks.get(0, 1), EdgeMark::Excluded);
        assert_eq!(marks.get(1, 3), EdgeMark::Included);
    }

    #[test]
    fn test_display_grid() {
        let mut marks = EdgeMarks::new(2);
        marks.set(0, 1, EdgeMark::Excluded);
        assert_eq!(marks.to_string(), " . -1\n-1  .\n");
    }
}
