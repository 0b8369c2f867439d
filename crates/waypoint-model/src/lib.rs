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

//! # Waypoint Model
//!
//! **The problem and solution types of the waypoint TSP solver.**
//!
//! This crate is the data interchange layer between whoever defines an
//! instance and the search engine (`waypoint_bnb`). It knows nothing about
//! threads or search trees.
//!
//! ## Architecture
//!
//! * **`matrix`**: `DistanceMatrix` (immutable, validated, flat row-major
//!   storage) and `DistanceMatrixBuilder` (mutable, symmetric setter).
//! * **`tour`**: `Tour`, an ordered closed route together with its cost.
//! * **`loading`**: `MatrixLoader`, which reads whitespace-delimited text with
//!   `#` comments into a `DistanceMatrix`.
//!
//! ## Design Philosophy
//!
//! 1.  **Fail-Fast**: matrices are validated once on construction (non-empty,
//!     square, non-negative, symmetric), so the solver never re-checks them.
//! 2.  **Flat Layout**: distances live in a single `Vec<T>` indexed by
//!     `i * order + j`, which keeps the per-vertex scans in the bound
//!     computation cache friendly.

pub mod loading;
pub mod matrix;
pub mod tour;
