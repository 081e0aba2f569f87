//! # Embin Library Root
//!
//! EM-based metagenomic binning: partition assembled DNA fragments
//! ("contigs") into K bins by the statistical similarity of their canonical
//! k-mer frequency signatures. A multi-restart Expectation-Maximization
//! engine, seeded by a short K-means bootstrap, runs against a pluggable
//! cluster model (an isotropic Gaussian by default).
//!
//! ## Module Structure
//! ```text
//! embin
//! ├── config     # Engine parameters + fail-fast validation
//! ├── error      # Typed error taxonomy
//! ├── data       # K-mer index, contigs, feature matrix
//! ├── model      # Cluster-model contract + isotropic Gaussian
//! ├── binning    # K-means bootstrap and single EM run
//! └── pipelines  # Multi-restart orchestration
//! ```
//!
//! ## Example
//! ```
//! use embin::{BinningPipeline, Contig, EmConfig, FeatureMatrix, IsotropicGaussian, KmerIndex};
//!
//! let index = KmerIndex::new(2)?;
//! let contigs = vec![
//!     Contig::new("a", "ATATATATATAT", &index),
//!     Contig::new("b", "TATATATATATA", &index),
//!     Contig::new("c", "GCGCGCGCGCGC", &index),
//!     Contig::new("d", "CGCGCGCGCGCG", &index),
//! ];
//! let matrix = FeatureMatrix::from_contigs(&contigs, &index)?;
//!
//! let config = EmConfig::new(2).with_restarts(3).with_seed(7);
//! let pipeline = BinningPipeline::new(&IsotropicGaussian, config);
//! let clustering = pipeline.run(&matrix, None, None)?;
//!
//! assert_eq!(clustering.assignments.len(), 4);
//! # Ok::<(), embin::EmbinError>(())
//! ```

pub mod binning;
pub mod config;
pub mod data;
pub mod error;
pub mod model;
pub mod pipelines;

// Re-export commonly used types
pub use binning::{CancelToken, Clustering, HardClustering, RunEvent};
pub use config::EmConfig;
pub use data::{Contig, FeatureMatrix, KmerIndex};
pub use error::{EmbinError, Result};
pub use model::{ClusterModel, GaussianParams, IsotropicGaussian};
pub use pipelines::BinningPipeline;
