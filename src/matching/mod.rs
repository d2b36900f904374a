//! Distance estimation, search and clustering.
//!
//! - [`distance`]: Jaccard, containment and Mash distance over sorted hashes
//! - [`search`]: [`SearchEngine`] matches queries against indexed references
//! - [`cluster`]: [`ClusterEngine`] partitions one collection greedily
//!
//! ## Similarity
//!
//! Similarity is `1 - distance`. With default settings the overlap estimate
//! is compensated containment of the shorter sequence within the longer one,
//! converted by the Mash formula and blended with the length ratio `r` as
//! `d * r + (1 - r)`. Sequences of very different lengths are therefore never
//! reported as similar even when one contains the other.
//!
//! ## Example
//!
//! ```rust,no_run
//! use seqsketch::catalog::store::SketchCollection;
//! use seqsketch::core::sketch::Sketcher;
//! use seqsketch::matching::search::{SearchConfig, SearchEngine};
//! use std::path::Path;
//!
//! let sketcher = Sketcher::with_scale(200).unwrap();
//! let refs = SketchCollection::from_fasta(Path::new("refs.fa"), &sketcher).unwrap();
//! let engine = SearchEngine::new(&refs, SearchConfig::default());
//!
//! let query = sketcher.sketch("read", b"ACGT...");
//! for m in engine.search(&query).unwrap() {
//!     println!("{},{},{}", m.similarity_percent(), m.query, m.reference);
//! }
//! ```
//!
//! [`SearchEngine`]: search::SearchEngine
//! [`ClusterEngine`]: cluster::ClusterEngine

pub mod cluster;
pub mod distance;
pub mod search;

pub use distance::DistanceConfig;
