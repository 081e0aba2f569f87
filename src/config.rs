//! # Engine Configuration
//!
//! Parameters for a clustering run and their fail-fast validation.
//! The engine is a library; loading these values from a CLI or a file
//! is the embedding application's concern.

use crate::data::FeatureMatrix;
use crate::error::{EmbinError, Result};

/// Configuration for an EM clustering run.
///
/// `cluster_count` has no sensible default and must be supplied; the
/// remaining fields default to the values the binner has always used
/// (100 iterations, 10 restarts, epsilon 1e-7).
#[derive(Debug, Clone)]
pub struct EmConfig {
    /// Number of bins K to partition the contigs into
    pub cluster_count: usize,
    /// Iteration budget per EM run
    pub max_iterations: usize,
    /// Number of independently seeded EM restarts
    pub restarts: usize,
    /// Convergence threshold on the log-likelihood improvement
    pub epsilon: f64,
    /// Base random seed; each restart derives its own seed from it
    pub seed: u64,
}

impl EmConfig {
    /// Create a configuration with default budget, restarts and epsilon
    pub fn new(cluster_count: usize) -> Self {
        Self {
            cluster_count,
            max_iterations: 100,
            restarts: 10,
            epsilon: 1e-7,
            seed: 0,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the configuration against a feature matrix.
    ///
    /// Runs before any computation so that invalid inputs never reach
    /// the iteration loops.
    pub fn validate(&self, x: &FeatureMatrix) -> Result<()> {
        if x.n_rows() == 0 || x.n_cols() == 0 {
            return Err(EmbinError::invalid_input("empty feature matrix"));
        }
        if self.cluster_count == 0 {
            return Err(EmbinError::invalid_input("cluster count must be >= 1"));
        }
        if self.cluster_count > x.n_rows() {
            return Err(EmbinError::invalid_input(format!(
                "cluster count {} exceeds number of contigs {}",
                self.cluster_count,
                x.n_rows()
            )));
        }
        if self.max_iterations == 0 {
            return Err(EmbinError::invalid_input("iteration budget must be >= 1"));
        }
        if self.restarts == 0 {
            return Err(EmbinError::invalid_input("restart count must be >= 1"));
        }
        if !(self.epsilon > 0.0) {
            return Err(EmbinError::invalid_input("epsilon must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(n: usize, d: usize) -> FeatureMatrix {
        FeatureMatrix::from_vec(n, d, vec![0.0; n * d]).unwrap()
    }

    #[test]
    fn test_valid_config() {
        let config = EmConfig::new(2);
        assert!(config.validate(&matrix(4, 3)).is_ok());
    }

    #[test]
    fn test_k_larger_than_n() {
        let config = EmConfig::new(5);
        assert!(config.validate(&matrix(4, 3)).is_err());
    }

    #[test]
    fn test_zero_k() {
        let config = EmConfig::new(0);
        assert!(config.validate(&matrix(4, 3)).is_err());
    }

    #[test]
    fn test_bad_epsilon() {
        let config = EmConfig::new(2).with_epsilon(0.0);
        assert!(config.validate(&matrix(4, 3)).is_err());
        let config = EmConfig::new(2).with_epsilon(f64::NAN);
        assert!(config.validate(&matrix(4, 3)).is_err());
    }

    #[test]
    fn test_zero_budget_and_restarts() {
        assert!(EmConfig::new(2)
            .with_max_iterations(0)
            .validate(&matrix(4, 3))
            .is_err());
        assert!(EmConfig::new(2)
            .with_restarts(0)
            .validate(&matrix(4, 3))
            .is_err());
    }
}
