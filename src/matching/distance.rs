use serde::{Deserialize, Serialize};

use crate::core::sketch::Sketch;
use crate::core::types::{ContainmentMode, Metric, KMER_LENGTH};

/// Safely convert usize to f64 for ratio calculations
///
/// Sketch sizes are far below 2^53, so the conversion is exact in practice.
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Number of values present in both sorted slices.
///
/// Walks both slices once with two cursors; no set is built.
#[must_use]
pub fn common_count(a: &[u64], b: &[u64]) -> usize {
    let (mut i, mut j, mut common) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                common += 1;
                i += 1;
                j += 1;
            }
        }
    }
    common
}

/// Jaccard similarity: |A ∩ B| / |A ∪ B|
///
/// Returns 0.0 when both sketches are empty.
#[must_use]
pub fn jaccard(a: &[u64], b: &[u64]) -> f64 {
    let common = common_count(a, b);
    let union = a.len() + b.len() - common;
    if union == 0 {
        0.0
    } else {
        count_to_f64(common) / count_to_f64(union)
    }
}

/// Containment of `a` in `b`.
///
/// In compensated mode each hash of `a` missing from `b` is counted twice in
/// the denominator, so partial containment scores below the plain ratio.
/// Returns 0.0 when `a` is empty.
#[must_use]
pub fn containment(a: &[u64], b: &[u64], mode: ContainmentMode) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let common = common_count(a, b);
    let denominator = match mode {
        ContainmentMode::Plain => a.len(),
        ContainmentMode::Compensated => a.len() + (a.len() - common),
    };
    count_to_f64(common) / count_to_f64(denominator)
}

/// Mash distance: estimated per-base divergence from an overlap estimate.
///
/// `d = -(1/k) * ln(2j / (1 + j))`. No overlap maps to the maximal distance 1.
#[must_use]
pub fn mash_distance(j: f64, kmer_length: usize) -> f64 {
    if j <= 0.0 {
        return 1.0;
    }
    if j >= 1.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let k = kmer_length as f64;
    (-(2.0 * j / (1.0 + j)).ln() / k).min(1.0)
}

/// Blend a distance with the length ratio of the two sequences.
///
/// With `r = shorter / longer`, returns `d * r + (1 - r)`: identical lengths
/// keep `d`, and a short sequence against a much longer one tends to 1.
#[must_use]
pub fn length_penalty(distance: f64, a_length: u64, b_length: u64) -> f64 {
    let (short, long) = if a_length <= b_length {
        (a_length, b_length)
    } else {
        (b_length, a_length)
    };
    if long == 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = short as f64 / long as f64;
    distance * ratio + (1.0 - ratio)
}

/// Selects which estimator turns two sketches into a distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceConfig {
    /// Base overlap estimator
    pub metric: Metric,
    /// Containment flavour, used by containment and length compensation
    pub containment_mode: ContainmentMode,
    /// Penalize differing sequence lengths
    pub length_compensated: bool,
    pub kmer_length: usize,
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            metric: Metric::Containment,
            containment_mode: ContainmentMode::Compensated,
            length_compensated: true,
            kmer_length: KMER_LENGTH,
        }
    }
}

impl DistanceConfig {
    /// Overlap estimate of `a` against `b` under the configured metric
    #[must_use]
    pub fn overlap(&self, a: &[u64], b: &[u64]) -> f64 {
        match self.metric {
            Metric::Jaccard => jaccard(a, b),
            Metric::Containment => containment(a, b, self.containment_mode),
        }
    }

    /// Distance between two hash sets with their sequence lengths.
    ///
    /// When length compensation is on, the pair is first ordered so the
    /// shorter sequence is `a`, and the distance always comes from the
    /// containment of the shorter sequence within the longer one; `metric`
    /// only selects the estimator of the plain distance.
    #[must_use]
    pub fn distance(&self, a: &[u64], b: &[u64], a_length: u64, b_length: u64) -> f64 {
        if self.length_compensated {
            let (a, b, a_length, b_length) = if a_length > b_length {
                (b, a, b_length, a_length)
            } else {
                (a, b, a_length, b_length)
            };
            let d = mash_distance(containment(a, b, self.containment_mode), self.kmer_length);
            length_penalty(d, a_length, b_length)
        } else {
            mash_distance(self.overlap(a, b), self.kmer_length)
        }
    }

    /// Similarity in `[0, 1]`: one minus the distance
    #[must_use]
    pub fn similarity(&self, a: &[u64], b: &[u64], a_length: u64, b_length: u64) -> f64 {
        (1.0 - self.distance(a, b, a_length, b_length)).clamp(0.0, 1.0)
    }

    /// Similarity between two sketches using their recorded lengths
    #[must_use]
    pub fn sketch_similarity(&self, a: &Sketch, b: &Sketch) -> f64 {
        self.similarity(a.hashes(), b.hashes(), a.length(), b.length())
    }
}
