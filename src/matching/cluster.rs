//! Greedy star clustering over an inverted hash index.
//!
//! Sequences are visited longest first. Each unclaimed sequence seeds a new
//! cluster and pulls in every unclaimed index candidate whose similarity to
//! the seed reaches the threshold. Members are only compared with their
//! seed, never with each other, so two members of one cluster may be less
//! similar to each other than either is to the seed.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::index::HashIndex;
use crate::catalog::store::SketchCollection;
use crate::core::sketch::Sketch;
use crate::core::types::{SketchId, DEFAULT_MIN_SIMILARITY, INDEX_SCALE_FACTOR};
use crate::matching::distance::DistanceConfig;

/// Configuration for the cluster engine
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Minimum similarity between a member and its seed
    pub min_similarity: f64,
    /// Distance estimator
    pub distance: DistanceConfig,
    /// Index keeps 1/`index_scale_factor` of the sketch hashes
    pub index_scale_factor: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            min_similarity: DEFAULT_MIN_SIMILARITY,
            distance: DistanceConfig::default(),
            index_scale_factor: INDEX_SCALE_FACTOR,
        }
    }
}

/// A group of sketch ids; the first one is the seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cluster {
    members: Vec<SketchId>,
}

impl Cluster {
    fn seeded(seed: SketchId) -> Self {
        Self {
            members: vec![seed],
        }
    }

    /// The sequence that opened the cluster
    pub fn representative(&self) -> SketchId {
        self.members[0]
    }

    /// Seed first, then the other members
    pub fn members(&self) -> &[SketchId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The result of one clustering run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clustering {
    /// Clusters sorted by seed id
    pub clusters: Vec<Cluster>,
    /// Sequence names by id
    names: Vec<String>,
}

/// JSON shape of a clustering: the same partition by id and by name
#[derive(Debug, Serialize)]
pub struct ClusteringOutput {
    #[serde(rename = "byNumber")]
    pub by_number: Vec<Vec<SketchId>>,
    #[serde(rename = "byName")]
    pub by_name: Vec<Vec<String>>,
}

impl Clustering {
    /// Clusters as lists of ids
    pub fn by_number(&self) -> Vec<Vec<SketchId>> {
        self.clusters.iter().map(|c| c.members.clone()).collect()
    }

    /// Clusters as lists of sequence names
    pub fn by_name(&self) -> Vec<Vec<String>> {
        self.clusters
            .iter()
            .map(|c| c.members.iter().map(|&id| self.names[id].clone()).collect())
            .collect()
    }

    /// Seed ids in cluster order (ascending)
    pub fn representatives(&self) -> Vec<SketchId> {
        self.clusters.iter().map(Cluster::representative).collect()
    }

    pub fn name(&self, id: SketchId) -> &str {
        &self.names[id]
    }

    pub fn output(&self) -> ClusteringOutput {
        ClusteringOutput {
            by_number: self.by_number(),
            by_name: self.by_name(),
        }
    }

    /// Serialize as `{"byNumber": [...], "byName": [...]}`
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.output())
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}

/// Greedy clustering engine
pub struct ClusterEngine {
    config: ClusterConfig,
}

impl ClusterEngine {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Partition a collection into clusters, consuming it.
    ///
    /// # Panics
    ///
    /// Panics if the produced clusters do not partition the input ids, which
    /// can only happen through a bug in this function.
    pub fn run(&self, collection: SketchCollection) -> Clustering {
        let index = self.build_index(&collection);
        let sketches = collection.into_sketches();

        let mut claimed = vec![false; sketches.len()];
        let mut clusters: Vec<Cluster> = Vec::new();
        let mut candidates_seen = 0usize;

        for seed in visiting_order(&sketches) {
            if claimed[seed] {
                continue;
            }
            claimed[seed] = true;

            let seed_sketch = &sketches[seed];
            let candidates = index.search(seed_sketch.hashes());
            candidates_seen += candidates.len();

            let mut cluster = Cluster::seeded(seed);
            for candidate in candidates {
                if claimed[candidate] {
                    continue;
                }
                let similarity = self
                    .config
                    .distance
                    .sketch_similarity(&sketches[candidate], seed_sketch);
                if similarity >= self.config.min_similarity {
                    cluster.members.push(candidate);
                    claimed[candidate] = true;
                }
            }
            clusters.push(cluster);
        }

        for cluster in &mut clusters {
            cluster.members[1..].sort_unstable();
        }
        clusters.sort_by_key(Cluster::representative);

        assert_partition(&clusters, sketches.len());
        info!(
            "Formed {} clusters from {} sequences",
            clusters.len(),
            sketches.len()
        );
        debug!("Examined {candidates_seen} candidates");

        let names = sketches
            .into_iter()
            .map(|sketch| sketch.name().to_string())
            .collect();
        Clustering { clusters, names }
    }

    fn build_index(&self, collection: &SketchCollection) -> HashIndex {
        let scale = collection.scale().unwrap_or(1);
        let mut index = HashIndex::new(scale.saturating_mul(self.config.index_scale_factor));
        for (id, sketch) in collection.iter().enumerate() {
            index.add(sketch.hashes(), id);
        }
        index.clean();
        index
    }
}

/// Ids ordered by descending sequence length, ties by ascending id
fn visiting_order(sketches: &[Sketch]) -> Vec<SketchId> {
    let mut order: Vec<SketchId> = (0..sketches.len()).collect();
    order.sort_by(|&a, &b| {
        sketches[b]
            .length()
            .cmp(&sketches[a].length())
            .then(a.cmp(&b))
    });
    order
}

/// Every id in `0..n` appears in exactly one cluster
fn assert_partition(clusters: &[Cluster], n: usize) {
    let total: usize = clusters.iter().map(Cluster::len).sum();
    let distinct: HashSet<SketchId> = clusters
        .iter()
        .flat_map(|c| c.members.iter().copied())
        .collect();
    assert_eq!(total, distinct.len(), "a sequence was assigned to two clusters");
    assert_eq!(distinct.len(), n, "clusters do not cover every sequence");
    assert!(
        distinct.iter().all(|&id| id < n),
        "cluster contains an unknown id"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sketch::Sketcher;
    use crate::utils::simulate::{mutate_percent, random_sequence, test_rng};

    const SCALE: u64 = 50;

    fn collection_from(named: &[(String, Vec<u8>)]) -> SketchCollection {
        let sketcher = Sketcher::with_scale(SCALE).unwrap();
        let mut collection = SketchCollection::new();
        for (name, seq) in named {
            collection.push(sketcher.sketch(name.as_str(), seq)).unwrap();
        }
        collection
    }

    /// 3 sources of 8000 bases, each followed by 3 copies with 1% mutations,
    /// then shuffled deterministically
    fn family_dataset(seed: u64) -> Vec<(String, Vec<u8>)> {
        let mut rng = test_rng(seed);
        let mut named = Vec::new();
        for i in 1..=3 {
            let source = random_sequence(&mut rng, 8000);
            for j in 1..=3 {
                named.push((format!("ref{i}.{j}"), mutate_percent(&mut rng, &source, 1)));
            }
            named.push((format!("ref{i}"), source));
        }
        // Interleave families so ids do not follow family order
        let order = [4, 0, 9, 5, 1, 11, 2, 7, 10, 3, 8, 6];
        order.iter().map(|&i| named[i].clone()).collect()
    }

    fn family_of(name: &str) -> &str {
        name.split('.').next().unwrap()
    }

    #[test]
    fn test_families_form_three_clusters_of_four() {
        let dataset = family_dataset(41);
        let clustering = ClusterEngine::new(ClusterConfig::default()).run(collection_from(&dataset));

        assert_eq!(clustering.len(), 3);
        for names in clustering.by_name() {
            assert_eq!(names.len(), 4, "cluster {names:?}");
            let family = family_of(&names[0]);
            assert!(names.iter().all(|n| family_of(n) == family), "mixed cluster {names:?}");
        }
    }

    #[test]
    fn test_clusters_partition_ids() {
        let mut rng = test_rng(42);
        let mut named: Vec<(String, Vec<u8>)> = family_dataset(43);
        // Unrelated singletons and sequences too short to sketch
        named.push(("lonely".to_string(), random_sequence(&mut rng, 6000)));
        named.push(("tiny".to_string(), b"ACGTACGT".to_vec()));
        named.push(("empty".to_string(), Vec::new()));

        let n = named.len();
        let clustering = ClusterEngine::new(ClusterConfig::default()).run(collection_from(&named));

        let mut all: Vec<SketchId> = clustering.by_number().into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..n).collect::<Vec<_>>());
        assert_eq!(clustering.len(), 6);
    }

    #[test]
    fn test_output_ordering() {
        let clustering =
            ClusterEngine::new(ClusterConfig::default()).run(collection_from(&family_dataset(44)));

        let seeds = clustering.representatives();
        assert!(seeds.windows(2).all(|w| w[0] < w[1]));
        for cluster in &clustering.clusters {
            assert!(cluster.members()[1..].windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_longest_sequence_seeds_cluster() {
        let mut rng = test_rng(45);
        let source = random_sequence(&mut rng, 8000);
        let mut longer = source.clone();
        longer.extend_from_slice(&source[..40]);
        let named = vec![
            ("short".to_string(), source.clone()),
            ("long".to_string(), longer),
            ("copy".to_string(), source),
        ];

        let clustering = ClusterEngine::new(ClusterConfig::default()).run(collection_from(&named));
        assert_eq!(clustering.by_number(), vec![vec![1, 0, 2]]);
        assert_eq!(clustering.representatives(), vec![1]);
    }

    #[test]
    fn test_equal_lengths_seed_lowest_id() {
        let mut rng = test_rng(46);
        let source = random_sequence(&mut rng, 8000);
        let named = vec![
            ("a".to_string(), mutate_percent(&mut rng, &source, 1)),
            ("b".to_string(), source),
        ];
        let clustering = ClusterEngine::new(ClusterConfig::default()).run(collection_from(&named));
        assert_eq!(clustering.by_number(), vec![vec![0, 1]]);
    }

    #[test]
    fn test_clustering_is_deterministic() {
        let dataset = family_dataset(47);
        let engine = ClusterEngine::new(ClusterConfig::default());
        let first = engine.run(collection_from(&dataset));
        let second = engine.run(collection_from(&dataset));

        assert_eq!(first, second);
        assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }

    #[test]
    fn test_threshold_of_one_keeps_mutants_apart() {
        let dataset = family_dataset(48);
        let config = ClusterConfig {
            min_similarity: 1.0,
            ..ClusterConfig::default()
        };
        let clustering = ClusterEngine::new(config).run(collection_from(&dataset));
        assert_eq!(clustering.len(), dataset.len());
    }

    #[test]
    fn test_empty_collection() {
        let clustering = ClusterEngine::new(ClusterConfig::default()).run(SketchCollection::new());
        assert!(clustering.is_empty());
        assert_eq!(clustering.to_json().unwrap(), "{\n  \"byNumber\": [],\n  \"byName\": []\n}");
    }

    #[test]
    fn test_json_shape() {
        let clustering = Clustering {
            clusters: vec![
                Cluster {
                    members: vec![0, 2],
                },
                Cluster { members: vec![1] },
            ],
            names: vec!["x".to_string(), "y".to_string(), "z".to_string()],
        };
        let value: serde_json::Value = serde_json::from_str(&clustering.to_json().unwrap()).unwrap();
        assert_eq!(value["byNumber"], serde_json::json!([[0, 2], [1]]));
        assert_eq!(value["byName"], serde_json::json!([["x", "z"], ["y"]]));
    }

    #[test]
    #[should_panic(expected = "two clusters")]
    fn test_partition_check_catches_duplicates() {
        let clusters = vec![
            Cluster {
                members: vec![0, 1],
            },
            Cluster {
                members: vec![1, 2],
            },
        ];
        assert_partition(&clusters, 3);
    }

    #[test]
    #[should_panic(expected = "cover every")]
    fn test_partition_check_catches_omissions() {
        let clusters = vec![Cluster { members: vec![0] }];
        assert_partition(&clusters, 2);
    }
}
