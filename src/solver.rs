use std::time::Instant;

use tracing::info;

use crate::config::SolverConfig;
use crate::cover::{exact_k_poset_cover_with, minimum_poset_cover_with, PosetCover, Search};
use crate::error::{CoverError, Result};
use crate::order::{common_labels, OrderSet};

/// The configured entry point: label limit, time limit and parallelism from a [`SolverConfig`].
///
/// The free functions [`minimum_poset_cover`](crate::minimum_poset_cover) and
/// [`exact_k_poset_cover`](crate::exact_k_poset_cover) run the same search single-threaded with no limits.
#[derive(Clone, Debug, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// A solver bound to `config`.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The configuration this solver runs with.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Find a minimum poset cover of `upsilon`.
    ///
    /// The legs come out in the same order whether or not the search runs in parallel.
    pub fn solve(&self, upsilon: &OrderSet) -> Result<PosetCover> {
        self.check_labels(upsilon)?;
        let started = Instant::now();
        info!(event = "solve_start", orders = upsilon.len(), parallel = self.config.parallel);

        let legs = minimum_poset_cover_with(upsilon, &self.search())?;

        info!(
            event = "solve_end",
            posets = legs.len(),
            duration_ms = started.elapsed().as_millis() as u64,
        );
        PosetCover::from_legs(legs)
    }

    /// Look for a cover of `upsilon` by exactly `k` posets. See [`exact_k_poset_cover`](crate::exact_k_poset_cover)
    /// for what happens when `k` is not the minimum.
    pub fn exact_k(&self, upsilon: &OrderSet, k: usize) -> Result<Option<PosetCover>> {
        self.check_labels(upsilon)?;
        let started = Instant::now();
        info!(event = "exact_k_start", orders = upsilon.len(), k);

        let legs = exact_k_poset_cover_with(upsilon, k, &self.search())?;

        info!(
            event = "exact_k_end",
            found = legs.is_some(),
            duration_ms = started.elapsed().as_millis() as u64,
        );
        legs.map(PosetCover::from_legs).transpose()
    }

    fn search(&self) -> Search {
        Search::new(self.config.time_limit(), self.config.parallel)
    }

    fn check_labels(&self, upsilon: &OrderSet) -> Result<()> {
        let labels = common_labels(upsilon)?.len();
        if labels > self.config.max_labels {
            return Err(CoverError::TooManyLabels { labels, limit: self.config.max_labels });
        }
        Ok(())
    }
}
