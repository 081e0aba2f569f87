//! # Model Module
//!
//! The pluggable cluster-model contract and its reference implementation.
//!
//! A cluster model answers two questions for the binning engine:
//! how likely is this feature vector under these cluster parameters
//! (`log_probability`), and what parameters best explain these rows under
//! these weights (`fit_nonzero_parameters`). Everything else — bootstrap,
//! expectation, maximization, restarts — is model-agnostic.

pub mod gaussian;

pub use gaussian::{GaussianParams, IsotropicGaussian};

use crate::data::FeatureMatrix;
use crate::error::Result;

/// Contract every pluggable cluster model must satisfy.
///
/// Implementations must be cheap to share across the restart worker pool
/// (`Sync`), and their parameters must travel between workers
/// (`Send + Sync`).
pub trait ClusterModel: Sync {
    /// Per-cluster parameter set (the "centroid" in the widest sense)
    type Params: Clone + Send + Sync;

    /// Log-likelihood of a feature vector under one cluster's parameters.
    ///
    /// Must be finite for valid inputs and have no side effects.
    fn log_probability(&self, x: &[f64], theta: &Self::Params) -> f64;

    /// Weighted maximum-likelihood parameter estimate over the rows of `x`.
    ///
    /// `weights == None` means uniform weight 1 per row (the unweighted
    /// single-cluster MLE). When `Some`, the slice must have one entry per
    /// row; zero-weight rows are allowed and must not produce NaN in the
    /// weighted sums. The caller guarantees the weight sum is non-zero.
    fn fit_nonzero_parameters(
        &self,
        x: &FeatureMatrix,
        weights: Option<&[f64]>,
    ) -> Result<Self::Params>;

    /// Optional model-specific seeding for K-means-style initialization.
    ///
    /// Models with richer per-cluster structure than an isotropic variance
    /// can override this to produce one parameter set per seed row. The
    /// default `None` makes the bootstrap fall back to one-row MLE fits.
    fn hard_cluster_bootstrap(
        &self,
        _x: &FeatureMatrix,
        _seed_rows: &[usize],
    ) -> Option<Vec<Self::Params>> {
        None
    }
}
