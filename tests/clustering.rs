//! End-to-end tests for the binning engine: raw sequences in, bins out,
//! plus the clustering properties the engine guarantees.

use embin::{
    BinningPipeline, CancelToken, ClusterModel, Contig, EmConfig, EmbinError, FeatureMatrix,
    IsotropicGaussian, KmerIndex, RunEvent,
};

// --- Helpers ---

/// Deterministic synthetic "genome": repeats of a short motif with a
/// little positional variation, long enough for a stable k-mer profile.
fn synthetic_contig(id: &str, motif: &str, copies: usize, index: &KmerIndex) -> Contig {
    let mut seq = String::with_capacity(motif.len() * copies);
    for i in 0..copies {
        seq.push_str(motif);
        // sprinkle a second base pattern so contigs from the same motif
        // are similar but not identical
        if i % 7 == 0 {
            seq.push('A');
        }
    }
    Contig::new(id, &seq, index)
}

fn two_blob_matrix() -> FeatureMatrix {
    FeatureMatrix::from_rows(vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![10.0, 10.0],
        vec![10.0, 11.0],
    ])
    .unwrap()
}

// --- Reference scenario ---

#[test]
fn reference_scenario_two_clusters() {
    let x = two_blob_matrix();
    let config = EmConfig::new(2)
        .with_max_iterations(20)
        .with_epsilon(1e-7)
        .with_restarts(4)
        .with_seed(2);
    let pipeline = BinningPipeline::new(&IsotropicGaussian, config);
    let best = pipeline.run(&x, None, None).unwrap();

    // First two rows in one bin, last two in the other
    assert_eq!(best.assignments[0], best.assignments[1]);
    assert_eq!(best.assignments[2], best.assignments[3]);
    assert_ne!(best.assignments[0], best.assignments[2]);
    assert!(best.log_likelihood.is_finite());

    // Partition covers every contig exactly once
    let bins = best.bins();
    let total: usize = bins.iter().map(|b| b.len()).sum();
    assert_eq!(total, x.n_rows());
    let mut seen = vec![false; x.n_rows()];
    for bin in &bins {
        for &row in bin {
            assert!(!seen[row], "contig {row} assigned twice");
            seen[row] = true;
        }
    }
    assert!(seen.iter().all(|&s| s));
}

#[test]
fn likelihood_is_monotone_within_tolerance() {
    let x = two_blob_matrix();
    let config = EmConfig::new(2)
        .with_max_iterations(20)
        .with_epsilon(1e-9)
        .with_restarts(1)
        .with_seed(31);
    let pipeline = BinningPipeline::new(&IsotropicGaussian, config);
    let result = pipeline.run(&x, None, None).unwrap();

    assert!(!result.anomaly);
    let mut prev = f64::NEG_INFINITY;
    for event in &result.events {
        if let RunEvent::Iteration { log_likelihood, .. } = event {
            assert!(*log_likelihood >= prev - 1e-9 * prev.abs().max(1.0));
            prev = *log_likelihood;
        }
    }
}

// --- Determinism ---

#[test]
fn fixed_seed_single_restart_is_reproducible() {
    let x = two_blob_matrix();
    let make = || {
        let config = EmConfig::new(2).with_restarts(1).with_seed(1234);
        BinningPipeline::new(&IsotropicGaussian, config)
            .run(&x, None, None)
            .unwrap()
    };
    let a = make();
    let b = make();
    assert_eq!(a.assignments, b.assignments);
    assert_eq!(a.log_likelihood, b.log_likelihood);
    assert_eq!(a.iterations, b.iterations);
}

#[test]
fn parallel_restarts_are_reproducible() {
    let x = two_blob_matrix();
    let make = || {
        let config = EmConfig::new(2).with_restarts(8).with_seed(55);
        BinningPipeline::new(&IsotropicGaussian, config)
            .run(&x, None, None)
            .unwrap()
    };
    let a = make();
    let b = make();
    assert_eq!(a.assignments, b.assignments);
    assert_eq!(a.log_likelihood, b.log_likelihood);
}

// --- K = 1 reduction ---

#[test]
fn k1_matches_unweighted_single_cluster_fit() {
    let x = two_blob_matrix();
    let config = EmConfig::new(1).with_restarts(1).with_seed(0);
    let pipeline = BinningPipeline::new(&IsotropicGaussian, config);
    let result = pipeline.run(&x, None, None).unwrap();

    let mle = IsotropicGaussian.fit_nonzero_parameters(&x, None).unwrap();
    for (a, b) in result.centroids[0].mean.iter().zip(mle.mean.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
    assert!((result.centroids[0].variance - mle.variance).abs() < 1e-9);
    assert!(result.assignments.iter().all(|&a| a == 0));
}

// --- Error taxonomy ---

#[test]
fn invalid_inputs_fail_fast() {
    let x = two_blob_matrix();

    let too_many = BinningPipeline::new(&IsotropicGaussian, EmConfig::new(5));
    assert!(matches!(
        too_many.run(&x, None, None),
        Err(EmbinError::InvalidInput { .. })
    ));

    let empty = FeatureMatrix::from_rows(Vec::new()).unwrap();
    let pipeline = BinningPipeline::new(&IsotropicGaussian, EmConfig::new(1));
    assert!(matches!(
        pipeline.run(&empty, None, None),
        Err(EmbinError::InvalidInput { .. })
    ));
}

#[test]
fn fixed_centroids_are_an_unsupported_mode() {
    let x = two_blob_matrix();
    let pipeline = BinningPipeline::new(&IsotropicGaussian, EmConfig::new(2));
    let centroids = vec![embin::GaussianParams {
        mean: vec![0.0, 0.0],
        variance: 1.0,
    }];
    assert!(matches!(
        pipeline.run(&x, Some(centroids), None),
        Err(EmbinError::UnsupportedMode { .. })
    ));
}

#[test]
fn cancellation_aborts_cleanly() {
    let x = two_blob_matrix();
    let pipeline = BinningPipeline::new(&IsotropicGaussian, EmConfig::new(2).with_restarts(4));
    let token = CancelToken::new();
    token.cancel();
    assert!(matches!(
        pipeline.run(&x, None, Some(&token)),
        Err(EmbinError::Cancelled)
    ));
}

// --- End-to-end: DNA in, bins out ---

#[test]
fn bins_at_rich_and_gc_rich_contigs() {
    let index = KmerIndex::new(3).unwrap();
    // ATTA and TTAA are the same cyclic word, as are GCCG and CCGG, so
    // each group shares one k-mer profile at slightly different depths
    let contigs = vec![
        synthetic_contig("at_1", "ATTA", 60, &index),
        synthetic_contig("at_2", "TTAA", 55, &index),
        synthetic_contig("at_3", "ATTA", 50, &index),
        synthetic_contig("gc_1", "GCCG", 60, &index),
        synthetic_contig("gc_2", "CCGG", 55, &index),
        synthetic_contig("gc_3", "GCCG", 50, &index),
    ];
    let matrix = FeatureMatrix::from_contigs(&contigs, &index).unwrap();
    assert_eq!(matrix.n_cols(), index.n_classes());

    let config = EmConfig::new(2)
        .with_max_iterations(50)
        .with_restarts(6)
        .with_seed(13);
    let pipeline = BinningPipeline::new(&IsotropicGaussian, config);
    let clustering = pipeline.run(&matrix, None, None).unwrap();

    let at_bin = clustering.assignments[0];
    let gc_bin = clustering.assignments[3];
    assert_ne!(at_bin, gc_bin, "AT-rich and GC-rich contigs share a bin");
    assert!(clustering.assignments[..3].iter().all(|&a| a == at_bin));
    assert!(clustering.assignments[3..].iter().all(|&a| a == gc_bin));
}
