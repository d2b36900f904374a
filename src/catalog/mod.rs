//! Sketch collections and the inverted hash index.
//!
//! A [`SketchCollection`] owns a list of sketches that share one scale and
//! assigns each its position as id. It can be built from a FASTA file or
//! read from a persisted sketch file:
//!
//! ```rust,no_run
//! use seqsketch::catalog::store::SketchCollection;
//! use seqsketch::core::sketch::Sketcher;
//! use std::path::Path;
//!
//! let sketcher = Sketcher::with_scale(200).unwrap();
//! let refs = SketchCollection::from_fasta(Path::new("refs.fa"), &sketcher).unwrap();
//! refs.save_to_file(Path::new("refs.sketch")).unwrap();
//!
//! let reloaded = SketchCollection::load_from_file(Path::new("refs.sketch")).unwrap();
//! assert_eq!(refs.len(), reloaded.len());
//! ```
//!
//! [`HashIndex`] maps hash values to the ids holding them and turns a query
//! sketch into a candidate list without touching unrelated sketches.
//!
//! [`SketchCollection`]: store::SketchCollection
//! [`HashIndex`]: index::HashIndex

pub mod index;
pub mod store;
