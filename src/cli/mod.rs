//! Command-line interface for seqsketch.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **sketch**: Sketch a FASTA file and persist the sketches
//! - **search**: Match query sequences against references
//! - **cluster**: Group similar sequences and pick representatives
//!
//! ## Usage
//!
//! ```text
//! # Sketch references once
//! seqsketch sketch refs.fa -o refs
//!
//! # Search reads against the persisted sketches
//! seqsketch search -q reads.fa -r refs.sketch -o matches.csv
//!
//! # Cluster, writing clusters.json and clusters.fasta
//! seqsketch cluster seqs.fa -o clusters -m 0.95
//! ```

use clap::{Args, Parser, Subcommand};

use crate::core::types::{
    ContainmentMode, Metric, DEFAULT_MIN_SIMILARITY, DEFAULT_SCALE, INDEX_SCALE_FACTOR,
};
use crate::matching::distance::DistanceConfig;
use crate::utils::validation::{validate_min_similarity, validate_scale};

pub mod cluster;
pub mod search;
pub mod sketch;

#[derive(Parser)]
#[command(name = "seqsketch")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Compare and cluster DNA sequences with fractional MinHash sketches")]
#[command(
    long_about = "seqsketch estimates similarity between DNA sequences from subsampled k-mer hashes.\n\nIt can:\n- Persist sketches of a reference set for repeated use\n- Search queries against references and report matches as CSV\n- Cluster a set of sequences and write one representative per cluster"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sketch a FASTA file and write the sketches to disk
    Sketch(sketch::SketchArgs),

    /// Search query sequences against reference sequences
    Search(search::SearchArgs),

    /// Cluster sequences by similarity
    Cluster(cluster::ClusterArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum MetricArg {
    Jaccard,
    Containment,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::Jaccard => Metric::Jaccard,
            MetricArg::Containment => Metric::Containment,
        }
    }
}

/// Options shared by `search` and `cluster`
#[derive(Args, Debug)]
pub struct SimilarityArgs {
    /// Minimum similarity for a match, between 0 and 1
    #[arg(short = 'm', long, default_value_t = DEFAULT_MIN_SIMILARITY)]
    pub min_similarity: f64,

    /// Keep roughly 1/scale of all k-mers
    #[arg(short, long, default_value_t = DEFAULT_SCALE)]
    pub scale: u64,

    /// Overlap estimator for --plain-distance
    #[arg(long, value_enum, default_value = "containment")]
    pub metric: MetricArg,

    /// Do not penalize differing sequence lengths
    #[arg(long)]
    pub plain_distance: bool,
}

impl SimilarityArgs {
    /// Validate numeric options and build the distance configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the scale or the minimum similarity is out of range.
    pub fn resolve(&self) -> anyhow::Result<(u64, f64, DistanceConfig)> {
        let scale = validate_scale(self.scale, INDEX_SCALE_FACTOR)?;
        let min_similarity = validate_min_similarity(self.min_similarity)?;
        let distance = DistanceConfig {
            metric: self.metric.into(),
            containment_mode: ContainmentMode::Compensated,
            length_compensated: !self.plain_distance,
            ..DistanceConfig::default()
        };
        Ok((scale, min_similarity, distance))
    }
}
