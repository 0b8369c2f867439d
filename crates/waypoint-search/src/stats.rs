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

/// Statistics collected over a complete search.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchStatistics {
    /// Number of states popped from the frontier and evaluated.
    pub nodes_explored: u64,
    /// Number of complete routes evaluated against the incumbent.
    pub paths_verified: u64,
    /// Number of times the incumbent was replaced.
    pub improvements: u64,
    /// Number of children discarded because their bound exceeded the incumbent.
    pub pruned_by_bound: u64,
    /// Number of children discarded because they cannot be completed to a tour.
    pub pruned_infeasible: u64,
    /// Prunes (of either kind) per depth in the search tree.
    pub prunes_per_depth: Vec<u64>,
    /// Deepest state evaluated.
    pub max_depth: usize,
    /// Number of worker threads that ran.
    pub workers_used: usize,
    /// Wall-clock duration of the search.
    pub solve_duration: std::time::Duration,
}

impl SearchStatistics {
    /// Returns the total number of pruned children.
    #[inline]
    pub fn total_prunes(&self) -> u64 {
        self.pruned_by_bound.saturating_add(self.pruned_infeasible)
    }
}

impl std::fmt::Display for SearchStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Search Statistics:")?;
        writeln!(f, "  Nodes Explored: {}", self.nodes_explored)?;
        writeln!(f, "  Paths Verified: {}", self.paths_verified)?;
        writeln!(f, "  Improvements: {}", self.improvements)?;
        writeln!(f, "  Pruned (bound): {}", self.pruned_by_bound)?;
        writeln!(f, "  Pruned (infeasible): {}", self.pruned_infeasible)?;
        writeln!(f, "  Max Depth: {}", self.max_depth)?;
        writeln!(f, "  Workers Used: {}", self.workers_used)?;
        writeln!(
            f,
            "  Solve Duration (secs): {:.3}",
            self.solve_duration.as_secs_f64()
        )?;

        let deepest = self.prunes_per_depth.iter().rposition(|&c| c > 0);
        if let Some(deepest) = deepest {
            writeln!(f, "  Prunes per Depth:")?;
            for (depth, count) in self.prunes_per_depth[..=deepest].iter().enumerate() {
                writeln!(f, "    {:>4}: {}", depth, count)?;
            }
        }
        Ok(())
    }
}

/// Builder for `SearchStatistics`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchStatisticsBuilder {
    stats: SearchStatistics,
}

impl Default for SearchStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchStatisticsBuilder {
    /// Creates a new builder with all counters at zero and one worker.
    #[inline]
    pub fn new() -> Self {
        Self {
            stats: SearchStatistics {
                workers_used: 1,
                ..SearchStatistics::default()
            },
        }
    }

    /// Sets the number of explored nodes.
    #[inline]
    pub fn nodes_explored(mut self, nodes_explored: u64) -> Self {
        self.stats.nodes_explored = nodes_explored;
        self
    }

    /// Sets the number of verified complete routes.
    #[inline]
    pub fn paths_verified(mut self, paths_verified: u64) -> Self {
        self.stats.paths_verified = paths_verified;
        self
    }

    /// Sets the number of incumbent improvements.
    #[inline]
    pub fn improvements(mut self, improvements: u64) -> Self {
        self.stats.improvements = improvements;
        self
    }

    /// Sets the number of bound prunes.
    #[inline]
    pub fn pruned_by_bound(mut self, pruned_by_bound: u64) -> Self {
        self.stats.pruned_by_bound = pruned_by_bound;
        self
    }

    /// Sets the number of infeasibility prunes.
    #[inline]
    pub fn pruned_infeasible(mut self, pruned_infeasible: u64) -> Self {
        self.stats.pruned_infeasible = pruned_infeasible;
        self
    }

    /// Sets the per-depth prune histogram.
    #[inline]
    pub fn prunes_per_depth(mut self, prunes_per_depth: Vec<u64>) -> Self {
        self.stats.prunes_per_depth = prunes_per_depth;
        self
    }

    /// Sets the deepest evaluated depth.
    #[inline]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.stats.max_depth = max_depth;
        self
    }

    /// Sets the number of workers used.
    #[inline]
    pub fn workers_used(mut self, workers_used: usize) -> Self {
        self.stats.workers_used = workers_used;
        self
    }

    /// Sets the total solve duration.
    #[inline]
    pub fn solve_duration(mut self, solve_duration: std::time::Duration) -> Self {
        self.stats.solve_duration = solve_duration;
        self
    }

    /// Builds the `SearchStatistics` instance.
    #[inline]
    pub fn build(self) -> SearchStatistics {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::{SearchStatistics, SearchStatisticsBuilder};
    use std::time::Duration;

    #[test]
    fn test_builder_constructs_expected_struct() {
        let stats = SearchStatisticsBuilder::new()
            .nodes_explored(40)
            .paths_verified(6)
            .improvements(2)
            .pruned_by_bound(9)
            .pruned_infeasible(3)
            .prunes_per_depth(vec![0, 4, 8])
            .max_depth(7)
            .workers_used(4)
            .solve_duration(Duration::from_millis(1234))
            .build();

        assert_eq!(stats.nodes_explored, 40);
        assert_eq!(stats.paths_verified, 6);
        assert_eq!(stats.improvements, 2);
        assert_eq!(stats.total_prunes(), 12);
        assert_eq!(stats.prunes_per_depth, vec![0, 4, 8]);
        assert_eq!(stats.max_depth, 7);
        assert_eq!(stats.workers_used, 4);
        assert_eq!(stats.solve_duration, Duration::from_millis(1234));
    }

    #[test]
    fn test_display_formats_all_fields() {
        let stats = SearchStatistics {
            nodes_explored: 12,
            paths_verified: 3,
            improvements: 1,
            pruned_by_bound: 5,
            pruned_infeasible: 2,
            prunes_per_depth: vec![0, 3, 4, 0, 0],
            max_depth: 4,
            workers_used: 2,
            solve_duration: Duration::from_millis(1234),
        };

        let rendered = format!("{}", stats);
        assert!(rendered.contains("Search Statistics:"));
        assert!(rendered.contains("Nodes Explored: 12"));
        assert!(rendered.contains("Paths Verified: 3"));
        assert!(rendered.contains("Improvements: 1"));
        assert!(rendered.contains("Pruned (bound): 5"));
        assert!(rendered.contains("Pruned (infeasible): 2"));
        assert!(rendered.contains("Max Depth: 4"));
        assert!(rendered.contains("Workers Used: 2"));
        assert!(rendered.contains("Solve Duration (secs): 1.234"));
        assert!(rendered.contains("       2: 4"));
        // Trailing zero buckets are omitted.
        assert!(!rendered.contains("       3: 0"));
    }

    #[test]
    fn test_display_without_prunes_omits_histogram() {
        let rendered = SearchStatisticsBuilder::new().build().to_string();
        assert!(rendered.contains("Workers Used: 1"));
        assert!(rendered.contains("Solve Duration (secs): 0.000"));
        assert!(!rendered.contains("Prunes per Depth"));
    }
}
