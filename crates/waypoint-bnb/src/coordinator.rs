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

//! Parallel search coordinator
//!
//! `SearchCoordinator` runs a fixed pool of scoped worker threads over one
//! shared frontier (`ConcurrentStack<TourState>`), one shared incumbent
//! (`SharedIncumbent`) and one published `RunStatus`.
//!
//! Worker loop
//! - Check keep‑running; leave once it is cleared.
//! - An idle worker polls the frontier with backoff and only republishes
//!   itself `Busy` once the frontier looks non‑empty. The claim happens
//!   before the pop, so a worker holding a state is always `Busy` in the
//!   published record.
//! - An empty pop republishes the worker `Idle`. If that record shows no
//!   `Busy` slot, the same update clears keep‑running.
//! - A popped route is offered to the incumbent. A popped valid, incomplete
//!   state is branched; each child is pushed unless it is infeasible or its
//!   bound exceeds a fresh read of the incumbent.
//!
//! Termination
//! - Only `Busy` workers push. A worker is `Idle` in the record only after its
//!   own pop came back empty, and a claim published after the stop is
//!   refused. The worker whose `Idle` update leaves zero `Busy` slots
//!   therefore stops a run whose frontier is empty and stays empty.
//!
//! Faults
//! - A `BranchError` stops the run with the worker's slot recorded as the
//!   fault and is returned as `SearchError::InvariantViolation`.
//! - A panicking worker stops the run on unwind; the panic is resumed on
//!   the calling thread after all workers have been joined.

use crate::{
    branching::{BranchError, Brancher},
    monitor::{
        no_op::NoOperationMonitor,
        search_monitor::{PruneReason, SearchMonitor},
    },
    state::TourState,
    stats::SearchCounters,
    status::{RunStatus, SlotStatus},
};
use crossbeam_utils::Backoff;
use std::time::Instant;
use tracing::{debug, info};
use waypoint_core::sync::{published::PublishedCell, stack::ConcurrentStack};
use waypoint_model::matrix::DistanceMatrix;
use waypoint_search::{
    incumbent::SharedIncumbent,
    num::TourNumeric,
    result::{SolverOutcome, SolverResult},
};

/// The error type for a failed search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A worker observed a state that breaks an internal invariant.
    InvariantViolation {
        /// Slot of the worker that aborted the run.
        worker: usize,
        /// The branching failure.
        source: BranchError,
    },
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvariantViolation { worker, source } => {
                write!(f, "Worker {} aborted the search: {}", worker, source)
            }
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvariantViolation { source, .. } => Some(source),
        }
    }
}

/// Runs the parallel branch-and-bound over one distance matrix.
///
/// Orders below three have no edge to branch on; the root of such a matrix
/// is infeasible as far as the search is concerned. Front ends answer those
/// instances directly.
#[derive(Debug, Clone)]
pub struct SearchCoordinator<'a, T> {
    matrix: &'a DistanceMatrix<T>,
    num_workers: usize,
    slot_capacity: usize,
    brancher: Brancher,
}

impl<'a, T> SearchCoordinator<'a, T>
where
    T: TourNumeric,
{
    /// Creates a coordinator running `num_workers` workers, with a status
    /// table of exactly that many slots.
    ///
    /// # Panics
    ///
    /// Panics if `num_workers` is zero.
    pub fn new(matrix: &'a DistanceMatrix<T>, num_workers: usize) -> Self {
        assert!(
            num_workers > 0,
            "called `SearchCoordinator::new` with zero workers"
        );
        Self {
            matrix,
            num_workers,
            slot_capacity: num_workers,
            brancher: Brancher::new(),
        }
    }

    /// Sets the size of the status table. Slots beyond the worker count stay
    /// `NotSpawned` for the whole run.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is smaller than the worker count.
    pub fn with_slot_capacity(mut self, capacity: usize) -> Self {
        assert!(
            capacity >= self.num_workers,
            "called `SearchCoordinator::with_slot_capacity` with capacity {} below the worker count {}",
            capacity,
            self.num_workers
        );
        self.slot_capacity = capacity;
        self
    }

    #[inline]
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    #[inline]
    pub fn slot_capacity(&self) -> usize {
        self.slot_capacity
    }

    /// Runs the search without monitors.
    pub fn run(&self) -> Result<SolverOutcome<T>, SearchError> {
        self.run_with_monitors(|_| NoOperationMonitor::new())
    }

    /// Runs the search, giving each worker the monitor `factory(worker)`.
    pub fn run_with_monitors<F, M>(&self, factory: F) -> Result<SolverOutcome<T>, SearchError>
    where
        F: Fn(usize) -> M + Sync,
        M: SearchMonitor<T>,
    {
        let start = Instant::now();
        let order = self.matrix.order();
        info!(
            order,
            workers = self.num_workers,
            slots = self.slot_capacity,
            "starting branch-and-bound search"
        );

        let shared = Shared::new(
            self.matrix,
            self.brancher,
            self.num_workers,
            self.slot_capacity,
        );

        let outcomes: Vec<Result<(), SearchError>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.num_workers)
                .map(|worker| {
                    let shared = &shared;
                    let factory = &factory;
                    scope.spawn(move || {
                        let mut monitor = factory(worker);
                        shared.run_worker(worker, &mut monitor)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        let elapsed = start.elapsed();
        let Shared {
            incumbent,
            counters,
            ..
        } = shared;

        if let Some(error) = outcomes.into_iter().find_map(Result::err) {
            info!(%error, "search aborted");
            return Err(error);
        }

        let statistics = counters.snapshot(self.num_workers, elapsed);
        let result = SolverResult::from(incumbent.into_record().into_tour());
        info!(
            %result,
            nodes = statistics.nodes_explored,
            improvements = statistics.improvements,
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );

        Ok(SolverOutcome::new(result, statistics))
    }
}

/// State shared by all workers of one run.
struct Shared<'a, T> {
    matrix: &'a DistanceMatrix<T>,
    brancher: Brancher,
    frontier: ConcurrentStack<TourState<'a, T>>,
    incumbent: SharedIncumbent<T>,
    status: PublishedCell<RunStatus>,
    counters: SearchCounters,
}

/// Stops the run if the owning worker unwinds.
struct StopOnPanic<'s> {
    status: &'s PublishedCell<RunStatus>,
    worker: usize,
}

impl Drop for StopOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let worker = self.worker;
            self.status.update(|current| {
                let mut next = current.clone();
                next.stop_with_fault(worker);
                Some(next)
            });
        }
    }
}

impl<'a, T> Shared<'a, T>
where
    T: TourNumeric,
{
    /// Creates the shared state of a run whose frontier holds the root.
    fn new(
        matrix: &'a DistanceMatrix<T>,
        brancher: Brancher,
        num_workers: usize,
        slot_capacity: usize,
    ) -> Self {
        let frontier = ConcurrentStack::new();
        frontier.push(TourState::root(matrix));
        Self {
            matrix,
            brancher,
            frontier,
            incumbent: SharedIncumbent::new(),
            status: PublishedCell::new(RunStatus::new(num_workers, slot_capacity)),
            counters: SearchCounters::new(matrix.order()),
        }
    }

    fn run_worker<M>(&self, worker: usize, monitor: &mut M) -> Result<(), SearchError>
    where
        M: SearchMonitor<T>,
    {
        let _stop_on_panic = StopOnPanic {
            status: &self.status,
            worker,
        };
        monitor.on_enter_search(self.matrix, worker);

        let backoff = Backoff::new();
        let mut idle = false;
        let outcome = loop {
            if !self.status.read(RunStatus::keep_running) {
                break Ok(());
            }

            if idle {
                if self.frontier.is_empty() {
                    backoff.snooze();
                    continue;
                }
                if !self.claim(worker) {
                    break Ok(());
                }
                idle = false;
            }

            match self.frontier.pop() {
                Some(state) => {
                    backoff.reset();
                    if let Err(error) = self.expand(worker, state, monitor) {
                        break Err(error);
                    }
                }
                None => {
                    self.release(worker);
                    idle = true;
                }
            }
        };

        monitor.on_exit_search(&self.counters);
        debug!(worker, failed = outcome.is_err(), "worker left search loop");
        outcome
    }

    /// Republishes `worker` as `Busy`. Returns `false` if the run has
    /// already been stopped.
    fn claim(&self, worker: usize) -> bool {
        self.status
            .update(|current| {
                if !current.keep_running() {
                    return None;
                }
                let mut next = current.clone();
                next.set_slot(worker, SlotStatus::Busy);
                Some(next)
            })
            .is_some()
    }

    /// Republishes `worker` as `Idle` and stops the run if no slot is left
    /// `Busy`.
    fn release(&self, worker: usize) {
        let published = self.status.update(|current| {
            let mut next = current.clone();
            next.set_slot(worker, SlotStatus::Idle);
            if next.busy_count() == 0 {
                next.stop();
            }
            Some(next)
        });
        if published.is_some_and(|status| !status.keep_running()) {
            debug!(worker, "last busy worker went idle, stopping the run");
        }
    }

    fn abort(&self, worker: usize) {
        self.status.update(|current| {
            let mut next = current.clone();
            next.stop_with_fault(worker);
            Some(next)
        });
    }

    fn expand<M>(
        &self,
        worker: usize,
        state: TourState<'a, T>,
        monitor: &mut M,
    ) -> Result<(), SearchError>
    where
        M: SearchMonitor<T>,
    {
        self.counters.on_node_explored(state.depth());
        monitor.on_node(&state, &self.counters);

        if let Some(tour) = state.tour() {
            self.counters.on_path_verified();
            if self.incumbent.admits(tour.cost()) && self.incumbent.try_install(&tour) {
                self.counters.on_improvement();
                debug!(worker, cost = %tour.cost(), depth = state.depth(), "incumbent improved");
                monitor.on_solution_found(&tour, &self.counters);
            }
            return Ok(());
        }

        if !state.is_valid() || state.is_complete() {
            return Ok(());
        }

        let (left, right) = self.brancher.branch(&state).map_err(|source| {
            self.abort(worker);
            SearchError::InvariantViolation { worker, source }
        })?;

        // LIFO: the include branch is explored first.
        self.offer(right, monitor);
        self.offer(left, monitor);
        Ok(())
    }

    fn offer<M>(&self, child: TourState<'a, T>, monitor: &mut M)
    where
        M: SearchMonitor<T>,
    {
        if !child.is_valid() {
            self.counters.on_prune_infeasible(child.depth());
            monitor.on_prune(&child, PruneReason::Infeasible, &self.counters);
        } else if self.incumbent.admits(child.lower_bound()) {
            self.frontier.push(child);
        } else {
            self.counters.on_prune_bound(child.depth());
            monitor.on_prune(&child, PruneReason::BoundDominated, &self.counters);
        }
    }
}
