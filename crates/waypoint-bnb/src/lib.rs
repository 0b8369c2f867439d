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

//! # Waypoint Branch-and-Bound
//!
//! An exact, parallel branch-and-bound for the symmetric traveling-salesman
//! problem over edge-selection states.
//!
//! A search state assigns every vertex pair an `EdgeMark` (included,
//! excluded or undecided). The root leaves every edge undecided; each branch
//! decides one edge both ways and propagates the degree-two rule of a tour.
//! States are scored by a half-sum-of-two-cheapest-edges lower bound and
//! pruned against a shared incumbent.
//!
//! ## Modules
//!
//! - `marks`: `EdgeMark` and the symmetric `EdgeMarks` table.
//! - `eval`: feasibility, completeness, lower bound and route extraction.
//! - `state`: `TourState`, an immutable search-tree node.
//! - `branching`: `Brancher` and the propagation pass.
//! - `status`: the published `RunStatus` record (keep-running flag and slot
//!   table).
//! - `stats`: `SearchCounters`, relaxed atomic instrumentation.
//! - `monitor`: per-worker observation hooks.
//! - `coordinator`: `SearchCoordinator`, the worker pool and its
//!   termination protocol.
//!
//! ## Concurrency
//!
//! Workers share exactly three things besides the read-only matrix: the
//! frontier (`waypoint_core::sync::stack::ConcurrentStack`), the incumbent
//! (`waypoint_search::incumbent::SharedIncumbent`) and the run status
//! (`waypoint_core::sync::published::PublishedCell`). None of them takes a
//! lock.

pub mod branching;
pub mod coordinator;
pub mod eval;
pub mod marks;
pub mod monitor;
pub mod state;
pub mod stats;
pub mod status;
