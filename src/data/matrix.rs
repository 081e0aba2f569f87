//! # Feature Matrix
//!
//! The N×D matrix the clustering engine consumes: one row per contig, one
//! column per feature (canonical k-mer class for DNA input, or any numeric
//! feature for other models). Row-major flat storage; the engine only ever
//! reads it.

use crate::data::contig::Contig;
use crate::data::kmer::KmerIndex;
use crate::error::{EmbinError, Result};

/// Read-only N×D feature matrix with row-major flat storage.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Build from a flat row-major buffer.
    pub fn from_vec(n_rows: usize, n_cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != n_rows * n_cols {
            return Err(EmbinError::invalid_input(format!(
                "buffer length {} does not match {}x{} matrix",
                data.len(),
                n_rows,
                n_cols
            )));
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    /// Build from per-contig rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut data = Vec::with_capacity(n_rows * n_cols);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_cols {
                return Err(EmbinError::invalid_input(format!(
                    "row {} has {} features, expected {}",
                    i,
                    row.len(),
                    n_cols
                )));
            }
            data.extend_from_slice(&row);
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    /// Assemble the matrix from contig signatures. Row order defines
    /// contig identity for the rest of the run.
    pub fn from_contigs(contigs: &[Contig], index: &KmerIndex) -> Result<Self> {
        let n_cols = index.n_classes();
        let mut data = Vec::with_capacity(contigs.len() * n_cols);
        for contig in contigs {
            if contig.signature().len() != n_cols {
                return Err(EmbinError::invalid_input(format!(
                    "contig {} signature length {} does not match index with {} classes",
                    contig.id(),
                    contig.signature().len(),
                    n_cols
                )));
            }
            data.extend(contig.signature().iter().map(|&c| c as f64));
        }
        Ok(Self {
            data,
            n_rows: contigs.len(),
            n_cols,
        })
    }

    /// Number of contigs N
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Feature dimensionality D
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Feature vector of one contig
    pub fn row(&self, i: usize) -> &[f64] {
        let start = i * self.n_cols;
        &self.data[start..start + self.n_cols]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(result, Err(EmbinError::InvalidInput { .. })));
    }

    #[test]
    fn test_from_vec_length_mismatch() {
        assert!(FeatureMatrix::from_vec(2, 3, vec![0.0; 5]).is_err());
    }

    #[test]
    fn test_from_contigs() {
        let index = KmerIndex::new(1).unwrap();
        let contigs = vec![
            Contig::new("a", "AAAA", &index),
            Contig::new("b", "CCCC", &index),
        ];
        let m = FeatureMatrix::from_contigs(&contigs, &index).unwrap();
        assert_eq!(m.n_rows(), 2);
        assert_eq!(m.n_cols(), index.n_classes());
        // Each row holds 4 counts in one class, 0 in the other
        assert_eq!(m.row(0).iter().sum::<f64>(), 4.0);
        assert_eq!(m.row(1).iter().sum::<f64>(), 4.0);
        assert_ne!(m.row(0), m.row(1));
    }
}
