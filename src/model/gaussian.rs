//! # Isotropic Gaussian Model
//!
//! Reference implementation of the cluster-model contract: each cluster is
//! a spherical Gaussian with a mean vector and a single pooled scalar
//! variance shared across all dimensions.

use crate::data::FeatureMatrix;
use crate::error::{EmbinError, Result};
use crate::model::ClusterModel;

const LN_2PI: f64 = 1.8378770664093453;

/// Pooled variance this close to zero is treated as degenerate.
const VARIANCE_FLOOR: f64 = 1e-12;

/// Parameters of one isotropic Gaussian cluster.
#[derive(Debug, Clone)]
pub struct GaussianParams {
    /// Mean vector, one entry per feature dimension
    pub mean: Vec<f64>,
    /// Single pooled variance shared by all dimensions
    pub variance: f64,
}

/// Isotropic (spherical-covariance) Gaussian cluster model.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsotropicGaussian;

impl ClusterModel for IsotropicGaussian {
    type Params = GaussianParams;

    /// Sum over dimensions of independent Gaussian log-densities with a
    /// shared scalar variance:
    ///
    /// ```text
    /// log Q(x|theta) = -D/2 * ln(2 pi sigma^2) - ||x - mu||^2 / (2 sigma^2)
    /// ```
    fn log_probability(&self, x: &[f64], theta: &Self::Params) -> f64 {
        debug_assert_eq!(x.len(), theta.mean.len());
        let mut sq_dist = 0.0;
        for (xi, mi) in x.iter().zip(theta.mean.iter()) {
            let d = xi - mi;
            sq_dist += d * d;
        }
        let d = x.len() as f64;
        -0.5 * d * (LN_2PI + theta.variance.ln()) - sq_dist / (2.0 * theta.variance)
    }

    /// Weighted MLE: weighted mean, then pooled spherical variance
    /// `sum_i w_i * ||x_i - mu||^2 / sum_i w_i`.
    ///
    /// When the effective weighted sample count collapses to 1 (a
    /// single-row fit, or responsibilities concentrated on one contig) or
    /// the pooled variance degenerates, the variance defaults to 1 rather
    /// than 0 so the cluster never becomes singular.
    fn fit_nonzero_parameters(
        &self,
        x: &FeatureMatrix,
        weights: Option<&[f64]>,
    ) -> Result<Self::Params> {
        let n = x.n_rows();
        let d = x.n_cols();
        if let Some(w) = weights {
            if w.len() != n {
                return Err(EmbinError::invalid_input(format!(
                    "weight vector length {} does not match {} rows",
                    w.len(),
                    n
                )));
            }
        }
        let weight_of = |i: usize| weights.map_or(1.0, |w| w[i]);

        let mut weight_sum = 0.0;
        let mut mean = vec![0.0; d];
        for i in 0..n {
            let w = weight_of(i);
            if w == 0.0 {
                continue;
            }
            weight_sum += w;
            for (m, xi) in mean.iter_mut().zip(x.row(i)) {
                *m += w * xi;
            }
        }
        // The caller guarantees a non-zero weight sum; the clamp keeps a
        // dead cluster finite instead of poisoning the run with NaN.
        let denom = weight_sum.max(f64::MIN_POSITIVE);
        for m in mean.iter_mut() {
            *m /= denom;
        }

        let variance = if weight_sum <= 1.0 + VARIANCE_FLOOR {
            1.0
        } else {
            let mut sq_sum = 0.0;
            for i in 0..n {
                let w = weight_of(i);
                if w == 0.0 {
                    continue;
                }
                let mut sq_dist = 0.0;
                for (xi, mi) in x.row(i).iter().zip(mean.iter()) {
                    let diff = xi - mi;
                    sq_dist += diff * diff;
                }
                sq_sum += w * sq_dist;
            }
            let variance = sq_sum / weight_sum;
            if variance.is_finite() && variance > VARIANCE_FLOOR {
                variance
            } else {
                1.0
            }
        };

        Ok(GaussianParams { mean, variance })
    }
}
