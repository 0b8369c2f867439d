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

//! # Parallel TSP Solver
//!
//! The configuration surface and entry point of the waypoint solver. A
//! `Solver` validates its settings once, answers trivial instances directly
//! and hands everything else to `waypoint_bnb::coordinator::SearchCoordinator`.
//!
//! ## Highlights
//!
//! - Builder pattern:
//!   - `SolverBuilder` sets the worker count, the size of the status table,
//!     an optional per-worker monitor factory and whether the worker count is
//!     clamped to the machine's available parallelism.
//!   - `build()` rejects invalid settings before any thread starts.
//! - Trivial instances:
//!   - One vertex yields the route `[0, 0]` with cost zero.
//!   - Two vertices yield `[0, 1, 0]` with cost `d(0, 1) + d(1, 0)`.
//! - Convenience:
//!   - `run(&matrix, worker_count)` solves with default settings.
//!
//! ## Usage
//!
//! ```rust
//! use waypoint_model::matrix::DistanceMatrix;
//! use waypoint_solver::solver::SolverBuilder;
//!
//! let matrix = DistanceMatrix::from_rows(&[
//!     [0i64, 3, 4, 2],
//!     [3, 0, 4, 6],
//!     [4, 4, 0, 5],
//!     [2, 6, 5, 0],
//! ])
//! .expect("valid matrix");
//!
//! let solver = SolverBuilder::<i64>::new()
//!     .with_num_workers(2)
//!     .build()
//!     .expect("valid configuration");
//! let outcome = solver.solve(&matrix).expect("search succeeds");
//! assert_eq!(outcome.cost(), Some(14));
//! ```

use std::time::Instant;
use tracing::info;
use waypoint_bnb::{
    coordinator::{SearchCoordinator, SearchError},
    monitor::search_monitor::SearchMonitor,
};
use waypoint_model::{matrix::DistanceMatrix, tour::Tour};
use waypoint_search::{
    num::TourNumeric,
    result::{SolverOutcome, SolverResult},
    stats::SearchStatisticsBuilder,
};

/// Default size of the status table.
pub const DEFAULT_MAX_WORKERS: usize = 256;

/// Builds the monitor for the worker in the given slot.
pub type MonitorFactory<T> = Box<dyn Fn(usize) -> Box<dyn SearchMonitor<T>> + Send + Sync>;

/// The error type for invalid solver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The worker count is zero.
    ZeroWorkers,
    /// The status table has no slot.
    ZeroMaxWorkers,
    /// More workers were requested than the status table holds.
    MaxWorkersExceeded { requested: usize, max: usize },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroWorkers => write!(f, "At least one worker is required"),
            Self::ZeroMaxWorkers => write!(f, "The maximum worker count must be positive"),
            Self::MaxWorkersExceeded { requested, max } => write!(
                f,
                "Requested {} workers but at most {} are allowed",
                requested, max
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The error type for a solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    Config(ConfigError),
    Search(SearchError),
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Invalid solver configuration: {}", e),
            Self::Search(e) => write!(f, "Search failed: {}", e),
        }
    }
}

impl std::error::Error for SolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Search(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SolverError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SearchError> for SolverError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

/// A validated solver configuration.
pub struct Solver<T> {
    num_workers: usize,
    max_workers: usize,
    clamp_to_available_parallelism: bool,
    monitor_factory: Option<MonitorFactory<T>>,
}

impl<T> std::fmt::Debug for Solver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("num_workers", &self.num_workers)
            .field("max_workers", &self.max_workers)
            .field(
                "clamp_to_available_parallelism",
                &self.clamp_to_available_parallelism,
            )
            .field("has_monitor_factory", &self.monitor_factory.is_some())
            .finish()
    }
}

impl<T> Solver<T>
where
    T: TourNumeric,
{
    /// Returns the requested worker count.
    #[inline]
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Returns the size of the status table.
    #[inline]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Returns the number of workers a run will actually start.
    pub fn effective_workers(&self) -> usize {
        if !self.clamp_to_available_parallelism {
            return self.num_workers;
        }
        match std::thread::available_parallelism() {
            Ok(available) => self.num_workers.min(available.get()),
            Err(_) => self.num_workers,
        }
    }

    /// Solves `matrix` to optimality.
    pub fn solve(&self, matrix: &DistanceMatrix<T>) -> Result<SolverOutcome<T>, SolverError> {
        if let Some(outcome) = solve_trivial(matrix) {
            return Ok(outcome);
        }

        let workers = self.effective_workers();
        if workers < self.num_workers {
            info!(
                requested = self.num_workers,
                workers, "clamped worker count to available parallelism"
            );
        }

        let coordinator =
            SearchCoordinator::new(matrix, workers).with_slot_capacity(self.max_workers);
        let outcome = match &self.monitor_factory {
            Some(factory) => coordinator.run_with_monitors(|worker| factory(worker))?,
            None => coordinator.run()?,
        };
        Ok(outcome)
    }
}

/// Answers instances with fewer than three vertices, which have exactly one
/// closed route.
fn solve_trivial<T>(matrix: &DistanceMatrix<T>) -> Option<SolverOutcome<T>>
where
    T: TourNumeric,
{
    let start = Instant::now();
    let route = match matrix.order() {
        1 => vec![0, 0],
        2 => vec![0, 1, 0],
        _ => return None,
    };
    let cost = matrix.route_cost(&route);
    let statistics = SearchStatisticsBuilder::new()
        .workers_used(0)
        .solve_duration(start.elapsed())
        .build();
    info!(order = matrix.order(), %cost, "answered trivial instance");
    Some(SolverOutcome::new(
        SolverResult::Optimal(Tour::new(route, cost)),
        statistics,
    ))
}

/// Builder for `Solver`.
pub struct SolverBuilder<T> {
    num_workers: usize,
    max_workers: usize,
    clamp_to_available_parallelism: bool,
    monitor_factory: Option<MonitorFactory<T>>,
}

impl<T> Default for SolverBuilder<T>
where
    T: TourNumeric,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SolverBuilder<T>
where
    T: TourNumeric,
{
    /// Creates a builder for one worker, a status table of
    /// `DEFAULT_MAX_WORKERS` slots and clamping enabled.
    #[inline]
    pub fn new() -> Self {
        Self {
            num_workers: 1,
            max_workers: DEFAULT_MAX_WORKERS,
            clamp_to_available_parallelism: true,
            monitor_factory: None,
        }
    }

    #[inline]
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    #[inline]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    #[inline]
    pub fn clamp_to_available_parallelism(mut self, clamp: bool) -> Self {
        self.clamp_to_available_parallelism = clamp;
        self
    }

    /// Gives every worker its own monitor, built by `factory(worker)`.
    #[inline]
    pub fn with_monitor_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(usize) -> Box<dyn SearchMonitor<T>> + Send + Sync + 'static,
    {
        self.monitor_factory = Some(Box::new(factory));
        self
    }

    /// Validates the settings and builds the solver.
    pub fn build(self) -> Result<Solver<T>, ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::ZeroMaxWorkers);
        }
        if self.num_workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.num_workers > self.max_workers {
            return Err(ConfigError::MaxWorkersExceeded {
                requested: self.num_workers,
                max: self.max_workers,
            });
        }

        Ok(Solver {
            num_workers: self.num_workers,
            max_workers: self.max_workers,
            clamp_to_available_parallelism: self.clamp_to_available_parallelism,
            monitor_factory: self.monitor_factory,
        })
    }
}

/// Solves `matrix` with `worker_count` workers and default settings.
pub fn run<T>(
    matrix: &DistanceMatrix<T>,
    worker_count: usize,
) -> Result<SolverOutcome<T>, SolverError>
where
    T: TourNumeric,
{
    SolverBuilder::new()
        .with_num_workers(worker_count)
        .build()?
        .solve(matrix)
}
