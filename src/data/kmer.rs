//! # Canonical K-mer Index
//!
//! Maps every k-mer of a fixed length to a canonical class shared with its
//! reverse complement, so that a fragment and its opposite strand produce
//! the same compositional signature.
//!
//! The index is an immutable value built once by [`KmerIndex::new`] and
//! passed by reference to every signature computation. There is no global
//! state to initialize or reset.

use crate::error::{EmbinError, Result};

/// Largest supported k-mer length. 2-bit packed codes for k = 15 still fit
/// comfortably in a `usize` table index on 32-bit targets.
pub const MAX_KMER_LEN: usize = 15;

/// Immutable canonical k-mer index.
///
/// Bases are 2-bit coded (A=0, C=1, G=2, T=3; complement is `3 - base`),
/// so a k-mer is a `2k`-bit integer. The `canonical` table maps each of the
/// `4^k` codes to a dense class id, with a code and its reverse complement
/// sharing one id.
#[derive(Debug, Clone)]
pub struct KmerIndex {
    kmer_len: usize,
    canonical: Vec<u32>,
    n_classes: usize,
}

impl KmerIndex {
    /// Build the index for a given k-mer length.
    ///
    /// Returns `InvalidInput` for `kmer_len == 0` or
    /// `kmer_len > MAX_KMER_LEN`.
    pub fn new(kmer_len: usize) -> Result<Self> {
        if kmer_len == 0 || kmer_len > MAX_KMER_LEN {
            return Err(EmbinError::invalid_input(format!(
                "k-mer length must be in 1..={MAX_KMER_LEN}, got {kmer_len}"
            )));
        }

        let size = 1usize << (2 * kmer_len);
        let mut canonical = vec![u32::MAX; size];
        let mut next = 0u32;
        for code in 0..size {
            if canonical[code] != u32::MAX {
                continue;
            }
            canonical[code] = next;
            canonical[reverse_complement(code, kmer_len)] = next;
            next += 1;
        }

        Ok(Self {
            kmer_len,
            canonical,
            n_classes: next as usize,
        })
    }

    /// K-mer length this index was built for
    pub fn kmer_len(&self) -> usize {
        self.kmer_len
    }

    /// Number of canonical k-mer classes (the feature dimensionality D)
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Canonical class of a 2-bit packed k-mer code
    pub fn class_of(&self, code: usize) -> u32 {
        self.canonical[code]
    }
}

/// Reverse complement of a 2-bit packed k-mer code
fn reverse_complement(code: usize, kmer_len: usize) -> usize {
    let mut rc = 0usize;
    for i in 0..kmer_len {
        let base = (code >> (2 * i)) & 0b11;
        rc = (rc << 2) | (0b11 - base);
    }
    rc
}

/// 2-bit code of a nucleotide byte, or `None` for anything outside ACGT
/// (case-insensitive). `N` and other ambiguity codes break the current
/// k-mer window.
pub fn encode_base(base: u8) -> Option<usize> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}
