//! # Multi-Restart Binning Pipeline
//!
//! EM converges to a local optimum that depends on its random bootstrap,
//! so the pipeline runs several independently seeded restarts and keeps
//! the one with the highest final log-likelihood.
//!
//! Restarts share nothing mutable — each owns its centroids,
//! responsibilities and cluster sizes, while the feature matrix is read
//! only — so they execute across the rayon worker pool and synchronize
//! only at the final max-by-likelihood reduction.

use rayon::prelude::*;
use tracing::debug;

use crate::binning::{em, CancelToken, Clustering};
use crate::config::EmConfig;
use crate::data::FeatureMatrix;
use crate::error::{EmbinError, Result};
use crate::model::ClusterModel;

/// Odd 64-bit constant from splitmix64; spreads restart indices across the
/// seed space so neighboring restarts draw unrelated random streams.
const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Multi-restart EM orchestrator.
pub struct BinningPipeline<'a, M: ClusterModel> {
    model: &'a M,
    config: EmConfig,
}

impl<'a, M: ClusterModel> BinningPipeline<'a, M> {
    pub fn new(model: &'a M, config: EmConfig) -> Self {
        Self { model, config }
    }

    pub fn config(&self) -> &EmConfig {
        &self.config
    }

    /// Run all restarts and return the best clustering by final
    /// log-likelihood.
    ///
    /// `initial_centroids` must be `None`: fixed-centroid starts are the
    /// same unsupported mode as in the single EM run and fail identically,
    /// before any restart is spawned. Ties between restarts are broken in
    /// favor of the first-found maximum, so results are deterministic for
    /// a fixed base seed.
    ///
    /// Cancelled restarts are simply excluded from the reduction; if every
    /// restart was cancelled the pipeline reports `Cancelled`. Any other
    /// restart failure propagates.
    pub fn run(
        &self,
        x: &FeatureMatrix,
        initial_centroids: Option<Vec<M::Params>>,
        cancel: Option<&CancelToken>,
    ) -> Result<Clustering<M::Params>> {
        if initial_centroids.is_some() {
            return Err(EmbinError::unsupported_mode(
                "the multi-restart pipeline cannot start from fixed centroids",
            ));
        }
        self.config.validate(x)?;

        let results: Vec<Result<Clustering<M::Params>>> = (0..self.config.restarts)
            .into_par_iter()
            .map(|restart| {
                let seed = restart_seed(self.config.seed, restart);
                em::cluster(x, self.model, &self.config, None, seed, cancel)
            })
            .collect();

        let mut best: Option<Clustering<M::Params>> = None;
        for (restart, result) in results.into_iter().enumerate() {
            match result {
                Ok(run) => {
                    debug!(
                        restart,
                        log_likelihood = run.log_likelihood,
                        iterations = run.iterations,
                        converged = run.converged,
                        "restart finished"
                    );
                    // Strictly-greater keeps the first-found maximum on ties
                    if best
                        .as_ref()
                        .map_or(true, |b| run.log_likelihood > b.log_likelihood)
                    {
                        best = Some(run);
                    }
                }
                Err(EmbinError::Cancelled) => {
                    debug!(restart, "restart cancelled, excluded from reduction");
                }
                Err(e) => return Err(e),
            }
        }
        best.ok_or(EmbinError::Cancelled)
    }
}

/// Seed for one restart: the configured base seed plus a stride that keeps
/// the per-restart generators independent.
fn restart_seed(base: u64, restart: usize) -> u64 {
    base.wrapping_add(SEED_STRIDE.wrapping_mul(restart as u64 + 1))
}
