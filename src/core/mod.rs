//! Core data types for sequence sketching.
//!
//! - [`kmer`]: 2-bit packed canonical k-mer extraction
//! - [`sketch`]: [`Sketch`] and the [`Sketcher`] that builds them
//! - [`types`]: shared constants, [`Metric`], [`MatchRecord`]
//!
//! ## Sketches
//!
//! A sketch keeps every canonical k-mer hash at or below `u64::MAX / scale`,
//! so two sketches built at the same scale sample the same region of hash
//! space and can be compared directly. The number of retained hashes grows
//! with sequence length, unlike a fixed-size bottom-k sketch.
//!
//! [`Sketch`]: sketch::Sketch
//! [`Sketcher`]: sketch::Sketcher
//! [`Metric`]: types::Metric
//! [`MatchRecord`]: types::MatchRecord

pub mod kmer;
pub mod sketch;
pub mod types;
