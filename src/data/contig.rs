//! # Contig
//!
//! One assembled DNA fragment: an identifier plus a compositional signature
//! derived once from the raw sequence. Contigs are read-only after
//! construction.

use tracing::debug;

use crate::data::kmer::{encode_base, KmerIndex};

/// A contig with its canonical k-mer count signature.
#[derive(Debug, Clone)]
pub struct Contig {
    id: String,
    signature: Vec<u32>,
}

impl Contig {
    /// Build a contig from its raw sequence, deriving the signature.
    ///
    /// The signature is a dense count vector over the index's canonical
    /// classes. Any non-ACGT base (including `N`) breaks the current k-mer
    /// window; windows lost this way are counted and reported as a
    /// non-fatal diagnostic.
    pub fn new(id: impl Into<String>, sequence: &str, index: &KmerIndex) -> Self {
        let id = id.into();
        let k = index.kmer_len();
        let mask = (1usize << (2 * k)) - 1;

        let mut signature = vec![0u32; index.n_classes()];
        let mut code = 0usize;
        let mut run = 0usize; // valid bases since the last break
        let mut counted = 0usize;

        for base in sequence.bytes() {
            match encode_base(base) {
                Some(bits) => {
                    code = ((code << 2) | bits) & mask;
                    run += 1;
                    if run >= k {
                        signature[index.class_of(code) as usize] += 1;
                        counted += 1;
                    }
                }
                None => {
                    code = 0;
                    run = 0;
                }
            }
        }

        let possible = sequence.len().saturating_sub(k - 1);
        let skipped = possible.saturating_sub(counted);
        if skipped > 0 {
            debug!(
                contig = %id,
                skipped,
                "skipped k-mer windows containing non-ACGT bases"
            );
        }

        Self { id, signature }
    }

    /// Contig identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Canonical k-mer count signature (length = `KmerIndex::n_classes`)
    pub fn signature(&self) -> &[u32] {
        &self.signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_signature() {
        let index = KmerIndex::new(2).unwrap();
        // ACGT has windows AC, CG, GT; AC and GT are reverse complements
        let contig = Contig::new("c1", "ACGT", &index);
        let total: u32 = contig.signature().iter().sum();
        assert_eq!(total, 3);
        let ac = index.class_of(0b0001) as usize; // AC
        let cg = index.class_of(0b0110) as usize; // CG
        assert_eq!(contig.signature()[ac], 2);
        assert_eq!(contig.signature()[cg], 1);
    }

    #[test]
    fn test_lowercase_sequence() {
        let index = KmerIndex::new(2).unwrap();
        let upper = Contig::new("u", "ACGTACGT", &index);
        let lower = Contig::new("l", "acgtacgt", &index);
        assert_eq!(upper.signature(), lower.signature());
    }

    #[test]
    fn test_n_breaks_window() {
        let index = KmerIndex::new(2).unwrap();
        // AANCC: windows AA and CC survive; AN and NC are dropped
        let contig = Contig::new("c1", "AANCC", &index);
        let total: u32 = contig.signature().iter().sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_short_fragment_has_empty_signature() {
        let index = KmerIndex::new(4).unwrap();
        let contig = Contig::new("c1", "ACG", &index);
        assert!(contig.signature().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_strand_symmetry() {
        let index = KmerIndex::new(3).unwrap();
        let fwd = Contig::new("f", "ACGGTCAGTT", &index);
        // reverse complement of the sequence above
        let rev = Contig::new("r", "AACTGACCGT", &index);
        assert_eq!(fwd.signature(), rev.signature());
    }
}
