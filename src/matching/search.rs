use tracing::info;

use crate::catalog::index::HashIndex;
use crate::catalog::store::{CatalogError, SketchCollection};
use crate::core::sketch::{Sketch, Sketcher};
use crate::core::types::{MatchRecord, DEFAULT_MIN_SIMILARITY, INDEX_SCALE_FACTOR};
use crate::matching::distance::DistanceConfig;
use crate::parsing::fasta::SequenceRecord;

/// Configuration for the search engine
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Minimum similarity for reporting a match
    pub min_similarity: f64,
    /// Distance estimator
    pub distance: DistanceConfig,
    /// Emit one placeholder row for queries without matches
    pub include_unmatched: bool,
    /// Index keeps 1/`index_scale_factor` of the reference hashes
    pub index_scale_factor: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            distance: DistanceConfig::default(),
            include_unmatched: false,
            index_scale_factor: INDEX_SCALE_FACTOR,
        }
    }
}

/// Searches queries against an indexed reference collection
pub struct SearchEngine<'a> {
    references: &'a SketchCollection,
    index: HashIndex,
    config: SearchConfig,
}

impl<'a> SearchEngine<'a> {
    /// Index every reference sketch.
    ///
    /// The index is complete once this returns and is never modified again.
    pub fn new(references: &'a SketchCollection, config: SearchConfig) -> Self {
        let scale = references.scale().unwrap_or(1);
        let mut index = HashIndex::new(scale.saturating_mul(config.index_scale_factor));
        for (id, sketch) in references.iter().enumerate() {
            index.add(sketch.hashes(), id);
        }
        info!(
            "Indexed {} references ({} distinct hashes)",
            references.len(),
            index.len()
        );

        Self {
            references,
            index,
            config,
        }
    }

    /// Scale that query sketches must use
    pub fn scale(&self) -> Option<u64> {
        self.references.scale()
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find the references similar to one query sketch.
    ///
    /// Matches come in index order, not ranked by similarity. A query with no
    /// match yields a single placeholder row when `include_unmatched` is set,
    /// and nothing otherwise.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ScaleMismatch` if the query was sketched at a
    /// different scale than the references.
    pub fn search(&self, query: &Sketch) -> Result<Vec<MatchRecord>, CatalogError> {
        if let Some(expected) = self.references.scale() {
            if expected != query.scale() {
                return Err(CatalogError::ScaleMismatch {
                    expected,
                    found: query.scale(),
                });
            }
        }

        let mut matches = Vec::new();
        for id in self.index.search(query.hashes()) {
            let reference = &self.references[id];
            let similarity = self.config.distance.sketch_similarity(query, reference);
            if similarity >= self.config.min_similarity {
                matches.push(MatchRecord::new(similarity, query.name(), reference.name()));
            }
        }
        Ok(self.with_placeholder(query.name(), matches))
    }

    fn with_placeholder(&self, query: &str, mut matches: Vec<MatchRecord>) -> Vec<MatchRecord> {
        if matches.is_empty() && self.config.include_unmatched {
            matches.push(MatchRecord::unmatched(query));
        }
        matches
    }

    /// Sketch a raw query at the reference scale, then search it
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Sketch` if the engine's k-mer length is unusable.
    pub fn search_sequence(&self, record: &SequenceRecord) -> Result<Vec<MatchRecord>, CatalogError> {
        // Nothing to match against, so skip sketching
        let Some(scale) = self.references.scale() else {
            return Ok(self.with_placeholder(&record.name, Vec::new()));
        };
        let sketcher = Sketcher::new(self.config.distance.kmer_length, scale)?;
        self.search(&sketcher.sketch(record.name.as_str(), &record.sequence))
    }
}
