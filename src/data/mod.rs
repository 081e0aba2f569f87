//! # Data Module
//!
//! Input-side representations: the canonical k-mer index, contigs with
//! their derived signatures, and the feature matrix the clustering engine
//! consumes.
//!
//! ## Design notes
//! - The k-mer index is an immutable value built by a factory call and
//!   passed by reference everywhere; there is no global table.
//! - A contig's signature is computed once at construction and read-only
//!   afterwards.
//! - The feature matrix is flat row-major storage; the engine treats it as
//!   opaque numeric rows and never mutates it.

pub mod contig;
pub mod kmer;
pub mod matrix;

// Re-export commonly used types
pub use contig::Contig;
pub use kmer::KmerIndex;
pub use matrix::FeatureMatrix;
