use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::core::types::{max_hash_for_scale, SketchId};

/// Inverted index from hash value to the sketches containing it.
///
/// Only hashes at or below `u64::MAX / scale` are indexed. The index scale is
/// normally a multiple of the sketch scale, so the index holds a fixed
/// fraction of each sketch's hashes.
#[derive(Debug, Clone)]
pub struct HashIndex {
    /// Index: hash -> ids of sketches containing it, in insertion order
    buckets: HashMap<u64, Vec<SketchId>>,
    max_hash: u64,
    cleaned: bool,
}

impl HashIndex {
    /// Create an empty index that keeps 1/`scale` of the hash space
    pub fn new(scale: u64) -> Self {
        Self {
            buckets: HashMap::new(),
            max_hash: max_hash_for_scale(scale),
            cleaned: false,
        }
    }

    /// Largest hash value the index stores
    pub fn max_hash(&self) -> u64 {
        self.max_hash
    }

    /// Register sketch `id` under each of its qualifying hashes.
    ///
    /// `hashes` must be sorted ascending, as every [`Sketch`] is.
    ///
    /// [`Sketch`]: crate::core::sketch::Sketch
    pub fn add(&mut self, hashes: &[u64], id: SketchId) {
        debug_assert!(!self.cleaned, "insertion into a cleaned index");
        for &hash in hashes {
            if hash > self.max_hash {
                break;
            }
            self.buckets.entry(hash).or_default().push(id);
        }
    }

    /// Ids of all sketches sharing at least one indexed hash with `hashes`.
    ///
    /// Each id appears once; the order carries no meaning.
    pub fn search(&self, hashes: &[u64]) -> Vec<SketchId> {
        let mut found: HashSet<SketchId> = HashSet::new();
        for &hash in hashes {
            if hash > self.max_hash {
                break;
            }
            if let Some(ids) = self.buckets.get(&hash) {
                found.extend(ids.iter().copied());
            }
        }
        found.into_iter().collect()
    }

    /// Drop every bucket with a single member.
    ///
    /// A singleton bucket can only ever return the sketch that created it, so
    /// it never yields a pair. Use only for clustering, after all insertions.
    pub fn clean(&mut self) {
        let before = self.buckets.len();
        self.buckets.retain(|_, ids| ids.len() > 1);
        self.buckets.shrink_to_fit();
        self.cleaned = true;

        let after = self.buckets.len();
        #[allow(clippy::cast_precision_loss)]
        let kept = if before == 0 {
            0.0
        } else {
            after as f64 / before as f64 * 100.0
        };
        debug!("Cleaned index: {before} ==> {after} buckets ({kept:.0}%)");
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned
    }

    /// Number of distinct indexed hashes
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
