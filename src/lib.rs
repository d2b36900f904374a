//! # seqsketch
//!
//! Fast approximate comparison of DNA sequences with fractional MinHash
//! sketches.
//!
//! Each sequence is reduced to the hashes of its canonical 21-mers that fall
//! in the lowest `1/scale` of hash space. Sketches at the same scale are
//! compared by set overlap, turned into a per-base distance with the Mash
//! formula and penalized for length differences.
//!
//! ## Features
//!
//! - **Search**: match query sequences against a reference collection
//! - **Clustering**: greedy star clustering with longest-first seeds
//! - **Persisted sketches**: sketch references once, search many times
//! - **Inverted index**: only references sharing a hash are ever scored
//!
//! ## Example
//!
//! ```rust,no_run
//! use seqsketch::{ClusterConfig, ClusterEngine, SketchCollection, Sketcher};
//! use std::path::Path;
//!
//! let sketcher = Sketcher::with_scale(200).unwrap();
//! let collection = SketchCollection::from_fasta(Path::new("seqs.fa"), &sketcher).unwrap();
//!
//! let clustering = ClusterEngine::new(ClusterConfig::default()).run(collection);
//! println!("{}", clustering.to_json().unwrap());
//! ```
//!
//! ## Modules
//!
//! - [`core`]: k-mers, sketches and shared types
//! - [`catalog`]: sketch collections, persistence and the hash index
//! - [`matching`]: distances, search and clustering
//! - [`parsing`]: FASTA reading and writing
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod core;
pub mod matching;
pub mod parsing;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::SketchCollection;
pub use core::sketch::{Sketch, Sketcher};
pub use core::types::*;
pub use matching::cluster::{ClusterConfig, ClusterEngine, Clustering};
pub use matching::distance::DistanceConfig;
pub use matching::search::{SearchConfig, SearchEngine};
