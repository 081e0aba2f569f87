//! # Binning Module
//!
//! The probabilistic clustering engine: a hard-assignment K-means bootstrap
//! and the soft-assignment EM refinement it seeds. Both run against any
//! [`ClusterModel`](crate::model::ClusterModel) and report their progress
//! through structured [`RunEvent`]s so callers (and tests) can observe
//! iteration counts, likelihood deltas and recovery actions without
//! scraping process output.

pub mod em;
pub mod kmeans;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Structured, non-fatal diagnostic emitted during a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// One E/M/evaluation cycle completed
    Iteration {
        /// 1-based iteration index within the run
        index: usize,
        /// Total log-likelihood after this iteration
        log_likelihood: f64,
        /// Improvement over the previous iteration
        delta: f64,
    },
    /// A K-means cluster lost all members and was re-seeded from a random
    /// contig
    EmptyClusterReseeded {
        cluster: usize,
        seed_row: usize,
    },
    /// The total log-likelihood decreased between iterations; the run
    /// restored the previous (better) state
    MonotonicityViolation {
        delta: f64,
    },
}

/// Output of a hard-assignment K-means run.
#[derive(Debug, Clone)]
pub struct HardClustering<P> {
    /// Cluster index of each contig, in row order
    pub assignments: Vec<usize>,
    /// Total log-likelihood under the final parameters
    pub log_likelihood: f64,
    /// Final per-cluster parameters
    pub centroids: Vec<P>,
    /// Number of iterations executed
    pub iterations: usize,
    /// Whether the improvement dropped below epsilon within the budget
    pub converged: bool,
    /// Diagnostics emitted during the run
    pub events: Vec<RunEvent>,
}

/// Immutable result of a single EM run (or of the best restart).
#[derive(Debug, Clone)]
pub struct Clustering<P> {
    /// Bin index of each contig, in row order; covers every contig exactly
    /// once
    pub assignments: Vec<usize>,
    /// Final total log-likelihood
    pub log_likelihood: f64,
    /// Final per-cluster parameters
    pub centroids: Vec<P>,
    /// Number of EM iterations executed
    pub iterations: usize,
    /// False when the iteration budget ran out before convergence
    /// (informational, not an error)
    pub converged: bool,
    /// True when a monotonicity violation forced a rollback to the
    /// previous iterate
    pub anomaly: bool,
    /// Diagnostics emitted during the run
    pub events: Vec<RunEvent>,
}

impl<P> Clustering<P> {
    /// Number of clusters K
    pub fn n_clusters(&self) -> usize {
        self.centroids.len()
    }

    /// Derive the partition: K disjoint sets of contig row indices.
    pub fn bins(&self) -> Vec<Vec<usize>> {
        let mut bins = vec![Vec::new(); self.centroids.len()];
        for (row, &cluster) in self.assignments.iter().enumerate() {
            bins[cluster].push(row);
        }
        bins
    }
}

/// Cooperative cancellation flag, checked between EM iterations.
///
/// Cancelling aborts a run with [`EmbinError::Cancelled`] without
/// corrupting any other restart's state; the orchestrator simply excludes
/// cancelled runs from its reduction.
///
/// [`EmbinError::Cancelled`]: crate::error::EmbinError::Cancelled
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that in-flight runs stop at their next iteration boundary
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
