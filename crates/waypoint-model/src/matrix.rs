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

//! Distance matrices for the symmetric traveling-salesman problem.
//!
//! A `DistanceMatrix<T>` is an `order × order` table of non-negative, symmetric
//! integer weights. The diagonal is stored but never treated as an edge by the
//! solver. Matrices are built either from rows (`DistanceMatrix::from_rows`),
//! from a flat row-major buffer (`DistanceMatrix::new`), or incrementally via
//! `DistanceMatrixBuilder`.

use num_traits::{PrimInt, Signed};

/// The error type for distance matrix construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// The matrix has no vertices.
    Empty,
    /// A row (or the flat buffer) does not have the expected length.
    NotSquare {
        /// The row that was malformed, or `None` for a flat buffer.
        row: Option<usize>,
        /// The expected number of entries.
        expected: usize,
        /// The number of entries found.
        found: usize,
    },
    /// A distance is negative.
    Negative {
        /// The row of the offending entry.
        row: usize,
        /// The column of the offending entry.
        col: usize,
    },
    /// `d(row, col) != d(col, row)`.
    Asymmetric {
        /// The row of the offending entry.
        row: usize,
        /// The column of the offending entry.
        col: usize,
    },
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Distance matrix must contain at least one vertex"),
            Self::NotSquare {
                row: Some(row),
                expected,
                found,
            } => write!(
                f,
                "Distance matrix is not square: row {} has {} entries, expected {}",
                row, found, expected
            ),
            Self::NotSquare {
                row: None,
                expected,
                found,
            } => write!(
                f,
                "Distance matrix is not square: got {} entries, expected {}",
                found, expected
            ),
            Self::Negative { row, col } => {
                write!(f, "Distance ({}, {}) is negative", row, col)
            }
            Self::Asymmetric { row, col } => write!(
                f,
                "Distance matrix is not symmetric at ({}, {}) and ({}, {})",
                row, col, col, row
            ),
        }
    }
}

impl std::error::Error for MatrixError {}

/// An immutable, validated, symmetric distance matrix.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DistanceMatrix<T> {
    order: usize,
    distances: Vec<T>,
}

impl<T> DistanceMatrix<T>
where
    T: PrimInt + Signed,
{
    /// Creates a matrix of the given `order` from a flat row-major buffer.
    pub fn new(order: usize, distances: Vec<T>) -> Result<Self, MatrixError> {
        if order == 0 {
            return Err(MatrixError::Empty);
        }
        let expected = order * order;
        if distances.len() != expected {
            return Err(MatrixError::NotSquare {
                row: None,
                expected,
                found: distances.len(),
            });
        }

        let matrix = Self { order, distances };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Creates a matrix from its rows.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, MatrixError>
    where
        R: AsRef<[T]>,
    {
        let order = rows.len();
        if order == 0 {
            return Err(MatrixError::Empty);
        }

        let mut distances = Vec::with_capacity(order * order);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != order {
                return Err(MatrixError::NotSquare {
                    row: Some(i),
                    expected: order,
                    found: row.len(),
                });
            }
            distances.extend_from_slice(row);
        }

        Self::new(order, distances)
    }

    fn validate(&self) -> Result<(), MatrixError> {
        for row in 0..self.order {
            for col in 0..self.order {
                let d = self.distance(row, col);
                if d < T::zero() {
                    return Err(MatrixError::Negative { row, col });
                }
                if col > row && d != self.distance(col, row) {
                    return Err(MatrixError::Asymmetric { row, col });
                }
            }
        }
        Ok(())
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
            "called `DistanceMatrix::flat_index` with index out of bounds: the order is {} but the index is ({}, {})",
            self.order,
            i,
            j
        );
        i * self.order + j
    }

    /// Returns the distance between `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> T {
        self.distances[self.flat_index(i, j)]
    }

    /// Returns row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[T] {
        let start = self.flat_index(i, 0);
        &self.distances[start..start + self.order]
    }

    /// Returns the flat row-major distances.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.distances
    }

    /// Returns the cost of the closed walk `route` (consecutive pairs summed,
    /// saturating at `T::max_value()`).
    ///
    /// The route is not checked for being a Hamiltonian cycle.
    pub fn route_cost(&self, route: &[usize]) -> T {
        route
            .windows(2)
            .fold(T::zero(), |acc, w| acc.saturating_add(self.distance(w[0], w[1])))
    }
}

impl<T> std::fmt::Display for DistanceMatrix<T>
where
    T: PrimInt + Signed + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .distances
            .iter()
            .map(|d| d.to_string().len())
            .max()
            .unwrap_or(1);

        writeln!(f, "Distance Matrix ({} vertices)", self.order)?;
        for i in 0..self.order {
            write!(f, "  ")?;
            for (j, d) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{:>width$}", d, width = width)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A mutable builder for `DistanceMatrix`.
///
/// All distances start at zero. `set_distance` writes both directions, so the
/// only check left for `build` is non-negativity.
#[derive(Clone, Debug)]
pub struct DistanceMatrixBuilder<T> {
    order: usize,
    distances: Vec<T>,
}

impl<T> DistanceMatrixBuilder<T>
where
    T: PrimInt + Signed,
{
    /// Creates a builder for a matrix with `order` vertices.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            distances: vec![T::zero(); order * order],
        }
    }

    /// Sets `d(i, j)` and `d(j, i)` to `distance`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    pub fn set_distance(&mut self, i: usize, j: usize, distance: T) -> &mut Self {
        assert!(
            i < self.order && j < self.order,
            "called `DistanceMatrixBuilder::set_distance` with index out of bounds: the order is {} but the index is ({}, {})",
            self.order,
            i,
            j
        );
        self.distances[i * self.order + j] = distance;
        self.distances[j * self.order + i] = distance;
        self
    }

    /// Validates and builds the matrix.
    pub fn build(self) -> Result<DistanceMatrix<T>, MatrixError> {
        DistanceMatrix::new(self.order, self.distances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_from_rows_and_accessors() {
        let m = five_vertex();
        assert_eq!(m.order(), 5);
        assert_eq!(m.distance(0, 3), 2);
        assert_eq!(m.distance(3, 0), 2);
        assert_eq!(m.row(4), &[7, 3, 8, 6, 0]);
        assert_eq!(m.as_slice().len(), 25);
    }

    #[test]
    fn test_empty_rejected() {
        let rows: [[IntegerType; 0]; 0] = [];
        assert_eq!(DistanceMatrix::from_rows(&rows), Err(MatrixError::Empty));
        assert_eq!(
            DistanceMatrix::<IntegerType>::new(0, vec![]),
            Err(MatrixError::Empty)
        );
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows: Vec<Vec<IntegerType>> = vec![vec![0, 1], vec![1]];
        assert_eq!(
            DistanceMatrix::from_rows(&rows),
            Err(MatrixError::NotSquare {
                row: Some(1),
                expected: 2,
                found: 1
            })
        );
        assert!(matches!(
            DistanceMatrix::<IntegerType>::new(2, vec![0, 1, 1]),
            Err(MatrixError::NotSquare { row: None, .. })
        ));
    }

    #[test]
    fn test_negative_and_asymmetric_rejected() {
        assert_eq!(
            DistanceMatrix::from_rows(&[[0 as IntegerType, -1], [-1, 0]]),
            Err(MatrixError::Negative { row: 0, col: 1 })
        );
        assert_eq!(
            DistanceMatrix::from_rows(&[[0 as IntegerType, 1, 2], [1, 0, 3], [2, 4, 0]]),
            Err(MatrixError::Asymmetric { row: 1, col: 2 })
        );
    }

    #[test]
    fn test_builder_is_symmetric() {
        let mut b = DistanceMatrixBuilder::<IntegerType>::new(3);
        b.set_distance(0, 1, 5).set_distance(2, 1, 7);
        let m = b.build().expect("valid");
        assert_eq!(m.distance(1, 0), 5);
        assert_eq!(m.distance(1, 2), 7);
        assert_eq!(m.distance(0, 2), 0);
    }

    #[test]
    fn test_builder_negative_fails() {
        let mut b = DistanceMatrixBuilder::<IntegerType>::new(2);
        b.set_distance(0, 1, -3);
        assert!(matches!(b.build(), Err(MatrixError::Negative { .. })));
    }

    #[test]
    #[should_panic(expected = "called `DistanceMatrixBuilder::set_distance` with index out of bounds")]
    fn test_builder_out_of_bounds_panics() {
        let mut b = DistanceMatrixBuilder::<IntegerType>::new(2);
        b.set_distance(0, 2, 1);
    }

    #[test]
    fn test_route_cost() {
        let m = five_vertex();
        assert_eq!(m.route_cost(&[0, 3, 2, 1, 4, 0]), 2 + 5 + 4 + 3 + 7);
        assert_eq!(m.route_cost(&[0]), 0);
    }

    #[test]
    fn test_route_cost_saturates() {
        let big = IntegerType::MAX / 2 + 1;
        let m = DistanceMatrix::from_rows(&[[0, big], [big, 0]]).expect("valid");
        assert_eq!(m.route_cost(&[0, 1, 0]), IntegerType::MAX);
    }

    #[test]
    fn test_display_lists_rows() {
        let m = DistanceMatrix::from_rows(&[[0 as IntegerType, 12], [12, 0]]).expect("valid");
        let text = m.to_string();
        assert!(text.starts_with("Distance Matrix (2 vertices)"));
        assert!(text.contains(" 0 12"));
        assert!(text.contains("12  0"));
    }
}
