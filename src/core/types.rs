use serde::{Deserialize, Serialize};

/// k-mer length used by the command-line tool
pub const KMER_LENGTH: usize = 21;

/// Default subsampling denominator: keep roughly 1/200 of all k-mers
pub const DEFAULT_SCALE: u64 = 200;

/// The index keeps 1/`INDEX_SCALE_FACTOR` of the hashes a sketch keeps
pub const INDEX_SCALE_FACTOR: u64 = 5;

/// Default minimum similarity for a match or cluster membership
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.9;

/// Reference column value for queries with no match
pub const UNMATCHED_REFERENCE: &str = "(unmatched)";

/// File suffix of persisted sketch collections
pub const SKETCH_FILE_SUFFIX: &str = ".sketch";

/// Position of a sketch in its collection
pub type SketchId = usize;

/// Largest hash retained at the given scale.
///
/// A scale of 0 is treated like 1 (keep everything); callers validate scales
/// before they get here.
#[must_use]
pub fn max_hash_for_scale(scale: u64) -> u64 {
    u64::MAX / scale.max(1)
}

/// Base set-overlap estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Symmetric overlap: |A ∩ B| / |A ∪ B|
    Jaccard,
    /// Overlap of the shorter sequence within the longer one
    #[default]
    Containment,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Jaccard => write!(f, "jaccard"),
            Self::Containment => write!(f, "containment"),
        }
    }
}

/// How containment treats hashes of `a` that are missing from `b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentMode {
    /// `common / |a|`
    Plain,
    /// `common / (|a| + missing)`, penalizing small noisy sketches
    #[default]
    Compensated,
}

/// One row of search output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Similarity in `[0, 1]`
    pub similarity: f64,

    /// Query sequence name
    pub query: String,

    /// Reference sequence name, or [`UNMATCHED_REFERENCE`]
    pub reference: String,
}

impl MatchRecord {
    pub fn new(similarity: f64, query: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            similarity,
            query: query.into(),
            reference: reference.into(),
        }
    }

    /// Sentinel row for a query without any qualifying reference
    pub fn unmatched(query: impl Into<String>) -> Self {
        Self::new(0.0, query, UNMATCHED_REFERENCE)
    }

    #[must_use]
    pub fn is_unmatched(&self) -> bool {
        self.reference == UNMATCHED_REFERENCE && self.similarity == 0.0
    }

    /// Similarity as a whole percentage, e.g. `"98%"`
    #[must_use]
    pub fn similarity_percent(&self) -> String {
        format!("{:.0}%", self.similarity * 100.0)
    }
}
