//! # K-means Bootstrap
//!
//! Hard-assignment clustering over a pluggable cluster model. Used for a
//! few iterations to seed an EM run, and usable standalone as a cheap
//! clustering method in its own right.
//!
//! Each iteration assigns every contig to its maximum-likelihood cluster,
//! refits every cluster over its members, and scores the clustering as the
//! sum of each contig's log-likelihood under its assigned cluster. Empty
//! clusters are re-seeded from a random contig instead of being left empty.

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::binning::{HardClustering, RunEvent};
use crate::data::FeatureMatrix;
use crate::error::{EmbinError, Result};
use crate::model::ClusterModel;

/// Run hard-assignment K-means until the likelihood improvement drops to
/// `epsilon` or the iteration budget runs out.
///
/// # Arguments
/// * `x` - Feature matrix, one row per contig
/// * `model` - Cluster model providing likelihood and fitting
/// * `cluster_count` - Number of clusters K
/// * `max_iterations` - Iteration budget
/// * `epsilon` - Convergence threshold on the likelihood improvement
/// * `rng` - Seeded generator owned by the enclosing run
pub fn cluster<M: ClusterModel>(
    x: &FeatureMatrix,
    model: &M,
    cluster_count: usize,
    max_iterations: usize,
    epsilon: f64,
    rng: &mut StdRng,
) -> Result<HardClustering<M::Params>> {
    let n = x.n_rows();
    if n == 0 || x.n_cols() == 0 {
        return Err(EmbinError::invalid_input("empty feature matrix"));
    }
    if cluster_count == 0 || cluster_count > n {
        return Err(EmbinError::invalid_input(format!(
            "cluster count {cluster_count} out of range for {n} contigs"
        )));
    }

    let mut events = Vec::new();
    let mut weight_buf = vec![0.0f64; n];

    // Seed each cluster from a random contig chosen with replacement.
    // Every seed row gets a full one-row fit of its own, so each cluster
    // starts with its own mean and its own variance slot.
    let seed_rows: Vec<usize> = (0..cluster_count).map(|_| rng.gen_range(0..n)).collect();
    let mut params = match model.hard_cluster_bootstrap(x, &seed_rows) {
        Some(bootstrap) => {
            if bootstrap.len() != cluster_count {
                return Err(EmbinError::invalid_input(format!(
                    "model bootstrap produced {} parameter sets for {} clusters",
                    bootstrap.len(),
                    cluster_count
                )));
            }
            bootstrap
        }
        None => seed_rows
            .iter()
            .map(|&row| fit_single_row(model, x, row, &mut weight_buf))
            .collect::<Result<Vec<_>>>()?,
    };

    let mut prev_ll = f64::NEG_INFINITY;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        // E-step: hard assignment to the maximum-likelihood cluster
        let assignments = assign(x, model, &params);

        // M-step: refit each cluster over its members; re-seed empties
        let mut new_params = Vec::with_capacity(cluster_count);
        for k in 0..cluster_count {
            weight_buf.fill(0.0);
            let mut members = 0usize;
            for (i, &a) in assignments.iter().enumerate() {
                if a == k {
                    weight_buf[i] = 1.0;
                    members += 1;
                }
            }
            if members == 0 {
                let seed_row = rng.gen_range(0..n);
                debug!(cluster = k, seed_row, "empty cluster re-seeded");
                events.push(RunEvent::EmptyClusterReseeded { cluster: k, seed_row });
                new_params.push(fit_single_row(model, x, seed_row, &mut weight_buf)?);
            } else {
                new_params.push(model.fit_nonzero_parameters(x, Some(&weight_buf))?);
            }
        }

        // Evaluation: total log-likelihood of the hard clustering
        let mut curr = 0.0;
        for (i, &a) in assignments.iter().enumerate() {
            curr += model.log_probability(x.row(i), &new_params[a]);
        }
        if !curr.is_finite() {
            return Err(EmbinError::numerical_anomaly(format!(
                "non-finite k-means log-likelihood at iteration {}",
                iterations + 1
            )));
        }

        let delta = curr - prev_ll;
        iterations += 1;
        trace!(iteration = iterations, log_likelihood = curr, delta, "k-means iteration");
        events.push(RunEvent::Iteration {
            index: iterations,
            log_likelihood: curr,
            delta,
        });

        if delta < 0.0 {
            // The previous state was better; keep it.
            warn!(delta, "k-means log-likelihood decreased, keeping previous state");
            events.push(RunEvent::MonotonicityViolation { delta });
            converged = true;
            break;
        }

        params = new_params;
        prev_ll = curr;
        if delta <= epsilon {
            converged = true;
            break;
        }
    }

    // Final hard partition under the final parameters
    let assignments = assign(x, model, &params);

    Ok(HardClustering {
        assignments,
        log_likelihood: prev_ll,
        centroids: params,
        iterations,
        converged,
        events,
    })
}

/// Assign each contig to the cluster with the highest log-likelihood.
/// Ties go to the lowest cluster index.
fn assign<M: ClusterModel>(
    x: &FeatureMatrix,
    model: &M,
    params: &[M::Params],
) -> Vec<usize> {
    (0..x.n_rows())
        .map(|i| {
            let row = x.row(i);
            let mut best = 0;
            let mut best_lq = f64::NEG_INFINITY;
            for (k, theta) in params.iter().enumerate() {
                let lq = model.log_probability(row, theta);
                if lq > best_lq {
                    best_lq = lq;
                    best = k;
                }
            }
            best
        })
        .collect()
}

/// One-row MLE fit via a 0/1 weight vector
fn fit_single_row<M: ClusterModel>(
    model: &M,
    x: &FeatureMatrix,
    row: usize,
    weight_buf: &mut [f64],
) -> Result<M::Params> {
    weight_buf.fill(0.0);
    weight_buf[row] = 1.0;
    model.fit_nonzero_parameters(x, Some(weight_buf))
}
