//! # Single EM Run
//!
//! Soft-assignment refinement of a K-means-seeded clustering. One run owns
//! all of its mutable state (centroids, responsibilities, cluster sizes),
//! so independent restarts can execute in parallel against the same
//! read-only feature matrix.
//!
//! ## Numerical stability
//! All exponentiated likelihoods are expressed relative to each contig's
//! row maximum: for the N×K log-likelihood table `L` with row maxima `M`,
//! the engine works with `exp(L - M)` and adds `M` back when the true
//! aggregate log-likelihood is needed. This keeps `exp` away from overflow
//! and underflow for any realistic likelihood magnitudes.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{trace, warn};

use crate::binning::{kmeans, CancelToken, Clustering, RunEvent};
use crate::config::EmConfig;
use crate::data::FeatureMatrix;
use crate::error::{EmbinError, Result};
use crate::model::ClusterModel;

/// Number of K-means iterations used to seed an EM run
const BOOTSTRAP_ITERATIONS: usize = 3;

/// Run one EM clustering to convergence (or budget exhaustion).
///
/// `initial_centroids` must be `None`: the fixed-centroid start is a
/// deliberately unimplemented mode and fails with `UnsupportedMode` before
/// any computation. Each run seeds its own `StdRng` from `seed`, so two
/// runs with identical inputs and seeds produce identical results.
///
/// The returned clustering carries `converged` (budget vs. epsilon
/// termination — informational) and `anomaly` (a monotonicity violation
/// forced a rollback to the previous iterate) flags alongside the
/// structured per-iteration events.
pub fn cluster<M: ClusterModel>(
    x: &FeatureMatrix,
    model: &M,
    config: &EmConfig,
    initial_centroids: Option<Vec<M::Params>>,
    seed: u64,
    cancel: Option<&CancelToken>,
) -> Result<Clustering<M::Params>> {
    if initial_centroids.is_some() {
        return Err(EmbinError::unsupported_mode(
            "EM cannot start from fixed centroids; pass None for a random bootstrap",
        ));
    }
    config.validate(x)?;

    let k = config.cluster_count;
    let mut rng = StdRng::seed_from_u64(seed);

    // Bootstrap: a short K-means run provides the initial hard clustering
    // and centroid set.
    let bootstrap = kmeans::cluster(x, model, k, BOOTSTRAP_ITERATIONS, config.epsilon, &mut rng)?;
    let mut params = bootstrap.centroids;

    // Keep the bootstrap's recovery diagnostics; its iteration events are
    // internal to the seeding phase.
    let mut events: Vec<RunEvent> = bootstrap
        .events
        .into_iter()
        .filter(|e| !matches!(e, RunEvent::Iteration { .. }))
        .collect();

    // Initial cluster-size vector from the hard cluster sizes
    let mut n_k = vec![0.0f64; k];
    for &a in &bootstrap.assignments {
        n_k[a] += 1.0;
    }

    let (mut elq, _) = exp_log_qs(x, model, &params);
    let mut z = expectation(&elq, &n_k, k);

    let mut prev_ll = f64::NEG_INFINITY;
    let mut iterations = 0;
    let mut converged = false;
    let mut anomaly = false;

    while iterations < config.max_iterations {
        if cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(EmbinError::Cancelled);
        }

        // Maximization: full weighted MLE per cluster, weighted by the
        // responsibility column
        let new_params = maximization(x, model, &z, k)?;

        // Evaluation under the new parameters
        let (new_elq, new_row_max) = exp_log_qs(x, model, &new_params);
        let curr = evaluate(&z, &new_elq, &new_row_max, k);
        if !curr.is_finite() {
            return Err(EmbinError::numerical_anomaly(format!(
                "non-finite EM log-likelihood at iteration {}",
                iterations + 1
            )));
        }

        let delta = curr - prev_ll;
        iterations += 1;
        trace!(iteration = iterations, log_likelihood = curr, delta, "EM iteration");
        events.push(RunEvent::Iteration {
            index: iterations,
            log_likelihood: curr,
            delta,
        });

        if delta < 0.0 {
            // EM's monotonicity guarantee was violated; keep the previous
            // (better) iterate and surface the anomaly to the caller.
            warn!(delta, "EM log-likelihood decreased, returning previous iterate");
            events.push(RunEvent::MonotonicityViolation { delta });
            anomaly = true;
            converged = true;
            break;
        }

        params = new_params;
        elq = new_elq;

        // Cluster-size prior for the next expectation: column sums of the
        // responsibilities that produced the accepted parameters
        n_k = column_sums(&z, k);
        z = expectation(&elq, &n_k, k);

        prev_ll = curr;
        if delta <= config.epsilon {
            converged = true;
            break;
        }
    }

    // Hard partition: per-row argmax of the final responsibilities
    let assignments = argmax_rows(&z, k);

    Ok(Clustering {
        assignments,
        log_likelihood: prev_ll,
        centroids: params,
        iterations,
        converged,
        anomaly,
        events,
    })
}

/// Compute the row-max-shifted likelihood table.
///
/// Returns `(exp(L - M), M)` where `L[i][k] = log_probability(x_i, theta_k)`
/// and `M[i]` is the maximum of row i. The shifted table lives in `[0, 1]`
/// with at least one exact 1.0 per row.
fn exp_log_qs<M: ClusterModel>(
    x: &FeatureMatrix,
    model: &M,
    params: &[M::Params],
) -> (Vec<f64>, Vec<f64>) {
    let n = x.n_rows();
    let k = params.len();
    let mut table = vec![0.0f64; n * k];
    let mut row_max = vec![f64::NEG_INFINITY; n];

    for i in 0..n {
        let row = x.row(i);
        let offset = i * k;
        for (j, theta) in params.iter().enumerate() {
            let lq = model.log_probability(row, theta);
            table[offset + j] = lq;
            if lq > row_max[i] {
                row_max[i] = lq;
            }
        }
        for j in 0..k {
            table[offset + j] = (table[offset + j] - row_max[i]).exp();
        }
    }
    (table, row_max)
}

/// Expectation step: `z[i][k] ∝ exp_log_qs[i][k] * n[k]`, rows normalized
/// to sum to 1.
fn expectation(elq: &[f64], n_k: &[f64], k: usize) -> Vec<f64> {
    let n = elq.len() / k;
    let mut z = vec![0.0f64; elq.len()];
    for i in 0..n {
        let offset = i * k;
        let mut sum = 0.0;
        for j in 0..k {
            let v = elq[offset + j] * n_k[j];
            z[offset + j] = v;
            sum += v;
        }
        if sum > 0.0 {
            for j in 0..k {
                z[offset + j] /= sum;
            }
        } else {
            // Every live cluster underflowed for this row; fall back to a
            // uniform posterior rather than dividing by zero.
            let uniform = 1.0 / k as f64;
            for j in 0..k {
                z[offset + j] = uniform;
            }
        }
    }
    z
}

/// Maximization step: refit each cluster with its responsibility column as
/// per-row weights.
fn maximization<M: ClusterModel>(
    x: &FeatureMatrix,
    model: &M,
    z: &[f64],
    k: usize,
) -> Result<Vec<M::Params>> {
    let n = x.n_rows();
    let mut weights = vec![0.0f64; n];
    let mut params = Vec::with_capacity(k);
    for j in 0..k {
        for i in 0..n {
            weights[i] = z[i * k + j];
        }
        params.push(model.fit_nonzero_parameters(x, Some(&weights))?);
    }
    Ok(params)
}

/// Aggregate log-likelihood of the clustering:
/// `Σ_i (M_i + ln(Σ_k z[i][k] * exp_log_qs[i][k]))`.
///
/// The inner sum reduces over the cluster axis per contig before the log;
/// the row maxima `M` compensate for the shift applied in [`exp_log_qs`].
fn evaluate(z: &[f64], elq: &[f64], row_max: &[f64], k: usize) -> f64 {
    let mut total = 0.0;
    for (i, &max) in row_max.iter().enumerate() {
        let offset = i * k;
        let mut row_sum = 0.0;
        for j in 0..k {
            row_sum += z[offset + j] * elq[offset + j];
        }
        total += max + row_sum.ln();
    }
    total
}

/// Column sums of the responsibility matrix: the expected occupancy of
/// each cluster.
fn column_sums(z: &[f64], k: usize) -> Vec<f64> {
    let mut sums = vec![0.0f64; k];
    for row in z.chunks_exact(k) {
        for (s, &v) in sums.iter_mut().zip(row) {
            *s += v;
        }
    }
    sums
}

/// Per-row argmax: the hard cluster of each contig. Ties go to the lowest
/// cluster index.
fn argmax_rows(z: &[f64], k: usize) -> Vec<usize> {
    z.chunks_exact(k)
        .map(|row| {
            let mut best = 0;
            let mut best_v = f64::NEG_INFINITY;
            for (j, &v) in row.iter().enumerate() {
                if v > best_v {
                    best_v = v;
                    best = j;
                }
            }
            best
        })
        .collect()
}
