use serde::{Deserialize, Serialize};
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

use crate::core::kmer::{CanonicalKmers, MAX_KMER_LENGTH};
use crate::core::types::{max_hash_for_scale, KMER_LENGTH};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SketchError {
    #[error("Invalid k-mer length {0}: must be between 1 and {MAX_KMER_LENGTH}")]
    InvalidKmerLength(usize),

    #[error("Invalid scale: must be at least 1")]
    InvalidScale,

    #[error("Invalid sketch '{name}': {reason}")]
    InvalidSketch { name: String, reason: String },
}

/// Fractional MinHash signature of one sequence.
///
/// Hashes are strictly ascending and all at or below `u64::MAX / scale`.
/// A sketch is never modified after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sketch {
    hashes: Vec<u64>,
    length: u64,
    name: String,
    scale: u64,
}

impl Sketch {
    /// Assemble a sketch from already-selected hashes.
    ///
    /// The hashes are sorted and deduplicated here, so callers may pass them
    /// in any order.
    ///
    /// # Errors
    ///
    /// Returns `SketchError::InvalidSketch` if the scale is 0 or a hash lies
    /// above `u64::MAX / scale`.
    pub fn new(
        mut hashes: Vec<u64>,
        length: u64,
        name: impl Into<String>,
        scale: u64,
    ) -> Result<Self, SketchError> {
        hashes.sort_unstable();
        hashes.dedup();
        let sketch = Self {
            hashes,
            length,
            name: name.into(),
            scale,
        };
        sketch
            .check_invariants()
            .map_err(|reason| SketchError::InvalidSketch {
                name: sketch.name.clone(),
                reason,
            })?;
        Ok(sketch)
    }

    /// Sorted, duplicate-free hash values
    pub fn hashes(&self) -> &[u64] {
        &self.hashes
    }

    /// Length of the sketched sequence in bases
    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// Number of retained hashes
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Check the ordering and threshold invariants.
    ///
    /// Sketches built by [`Sketcher`] always pass; this guards sketches read
    /// back from disk.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.scale == 0 {
            return Err("scale is 0".to_string());
        }
        if let Some(pair) = self.hashes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "hashes not strictly ascending ({} then {})",
                pair[0], pair[1]
            ));
        }
        let max_hash = max_hash_for_scale(self.scale);
        if let Some(&last) = self.hashes.last() {
            if last > max_hash {
                return Err(format!("hash {last} exceeds threshold {max_hash}"));
            }
        }
        Ok(())
    }
}

/// Turns sequences into fractional MinHash sketches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sketcher {
    kmer_length: usize,
    scale: u64,
    max_hash: u64,
}

impl Sketcher {
    /// # Errors
    ///
    /// Returns `SketchError::InvalidKmerLength` unless `1 <= kmer_length <= 32`
    /// and `SketchError::InvalidScale` for a scale of 0.
    pub fn new(kmer_length: usize, scale: u64) -> Result<Self, SketchError> {
        if !(1..=MAX_KMER_LENGTH).contains(&kmer_length) {
            return Err(SketchError::InvalidKmerLength(kmer_length));
        }
        if scale == 0 {
            return Err(SketchError::InvalidScale);
        }
        Ok(Self {
            kmer_length,
            scale,
            max_hash: max_hash_for_scale(scale),
        })
    }

    /// Sketcher with the tool's fixed k-mer length
    ///
    /// # Errors
    ///
    /// Returns `SketchError::InvalidScale` for a scale of 0.
    pub fn with_scale(scale: u64) -> Result<Self, SketchError> {
        Self::new(KMER_LENGTH, scale)
    }

    pub fn kmer_length(&self) -> usize {
        self.kmer_length
    }

    pub fn scale(&self) -> u64 {
        self.scale
    }

    /// Selected hashes of a sequence, sorted and deduplicated
    #[must_use]
    pub fn hashes(&self, sequence: &[u8]) -> Vec<u64> {
        let mut hashes: Vec<u64> = CanonicalKmers::new(sequence, self.kmer_length)
            .map(|kmer| xxh3_64(&kmer.to_le_bytes()))
            .filter(|&hash| hash <= self.max_hash)
            .collect();
        hashes.sort_unstable();
        hashes.dedup();
        hashes
    }

    /// Sketch a named sequence
    #[must_use]
    pub fn sketch(&self, name: impl Into<String>, sequence: &[u8]) -> Sketch {
        Sketch {
            hashes: self.hashes(sequence),
            length: sequence.len() as u64,
            name: name.into(),
            scale: self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kmer::reverse_complement;
    use crate::utils::simulate::{random_sequence, test_rng};

    #[test]
    fn test_sketcher_rejects_bad_parameters() {
        assert_eq!(Sketcher::new(0, 10), Err(SketchError::InvalidKmerLength(0)));
        assert_eq!(
            Sketcher::new(33, 10),
            Err(SketchError::InvalidKmerLength(33))
        );
        assert_eq!(Sketcher::new(21, 0), Err(SketchError::InvalidScale));
        assert!(Sketcher::with_scale(1).is_ok());
    }

    #[test]
    fn test_sketch_is_deterministic() {
        let mut rng = test_rng(1);
        let seq = random_sequence(&mut rng, 5000);
        let sketcher = Sketcher::with_scale(10).unwrap();

        assert_eq!(sketcher.sketch("a", &seq), sketcher.sketch("a", &seq));
    }

    #[test]
    fn test_sketch_strand_symmetry() {
        let mut rng = test_rng(2);
        let seq = random_sequence(&mut rng, 5000);
        let rc = reverse_complement(&seq);
        let sketcher = Sketcher::with_scale(10).unwrap();

        let forward = sketcher.sketch("fwd", &seq);
        let reverse = sketcher.sketch("rev", &rc);
        assert!(!forward.is_empty());
        assert_eq!(forward.hashes(), reverse.hashes());
    }

    #[test]
    fn test_sketch_sorted_unique_and_bounded() {
        let mut rng = test_rng(3);
        let mut seq = random_sequence(&mut rng, 3000);
        // Repeat the sequence so every k-mer occurs twice
        seq.extend_from_slice(&seq.clone());
        let sketcher = Sketcher::with_scale(4).unwrap();
        let sketch = sketcher.sketch("rep", &seq);

        assert!(sketch.hashes().windows(2).all(|w| w[0] < w[1]));
        assert!(sketch
            .hashes()
            .iter()
            .all(|&h| h <= max_hash_for_scale(4)));
        assert!(sketch.check_invariants().is_ok());
        assert_eq!(sketch.length(), 6000);
        assert_eq!(sketch.scale(), 4);
    }

    #[test]
    fn test_scale_one_keeps_every_kmer() {
        // 7 windows, but CGGG is the reverse complement of CCCG
        let sketcher = Sketcher::new(4, 1).unwrap();
        let sketch = sketcher.sketch("s", b"AAACCCGGGA");
        assert_eq!(sketch.len(), 6);
    }

    #[test]
    fn test_short_or_invalid_sequences_give_empty_sketch() {
        let sketcher = Sketcher::with_scale(1).unwrap();
        assert!(sketcher.sketch("short", b"ACGTACGT").is_empty());
        assert!(sketcher.sketch("empty", b"").is_empty());

        let broken: Vec<u8> = b"ACGTACGTAC"
            .iter()
            .chain(b"NNN")
            .chain(b"ACGTACGTACG")
            .copied()
            .collect();
        assert!(sketcher.sketch("broken", &broken).is_empty());
    }

    #[test]
    fn test_case_does_not_matter() {
        let mut rng = test_rng(4);
        let seq = random_sequence(&mut rng, 2000);
        let lower = seq.to_ascii_lowercase();
        let sketcher = Sketcher::with_scale(5).unwrap();
        assert_eq!(
            sketcher.sketch("x", &seq).hashes(),
            sketcher.sketch("x", &lower).hashes()
        );
    }

    #[test]
    fn test_larger_scale_is_subset() {
        let mut rng = test_rng(5);
        let seq = random_sequence(&mut rng, 8000);
        let fine = Sketcher::with_scale(10).unwrap().sketch("s", &seq);
        let coarse = Sketcher::with_scale(50).unwrap().sketch("s", &seq);

        assert!(coarse.len() < fine.len());
        assert!(coarse
            .hashes()
            .iter()
            .all(|h| fine.hashes().binary_search(h).is_ok()));
    }

    #[test]
    fn test_check_invariants_rejects_bad_sketches() {
        let unsorted = Sketch {
            hashes: vec![5, 3],
            length: 10,
            name: "bad".to_string(),
            scale: 1,
        };
        assert!(unsorted.check_invariants().is_err());

        let over = Sketch {
            hashes: vec![u64::MAX],
            length: 10,
            name: "bad".to_string(),
            scale: 2,
        };
        assert!(over.check_invariants().is_err());

        let zero_scale = Sketch {
            hashes: vec![],
            length: 10,
            name: "bad".to_string(),
            scale: 0,
        };
        assert!(zero_scale.check_invariants().is_err());
    }

    #[test]
    fn test_new_sorts_and_dedups() {
        let sketch = Sketch::new(vec![9, 1, 5, 1], 100, "s", 1).unwrap();
        assert_eq!(sketch.hashes(), &[1, 5, 9]);
    }

    #[test]
    fn test_new_rejects_hash_above_threshold() {
        let result = Sketch::new(vec![u64::MAX], 10, "x", 200);
        assert!(matches!(result, Err(SketchError::InvalidSketch { ref name, .. }) if name == "x"));
        assert!(Sketch::new(vec![1], 10, "x", 0).is_err());
        assert!(Sketch::new(vec![max_hash_for_scale(200)], 10, "x", 200).is_ok());
    }
}
