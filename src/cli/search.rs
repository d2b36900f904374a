use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::catalog::store::SketchCollection;
use crate::cli::SimilarityArgs;
use crate::core::sketch::Sketcher;
use crate::core::types::{MatchRecord, INDEX_SCALE_FACTOR};
use crate::matching::search::{SearchConfig, SearchEngine};
use crate::parsing::fasta::open_fasta;
use crate::utils::validation::is_sketch_file;

#[derive(Args)]
pub struct SearchArgs {
    /// Query FASTA file
    #[arg(short, long, required = true)]
    pub query: PathBuf,

    /// Reference FASTA file or persisted .sketch file
    #[arg(short, long, required = true)]
    pub reference: PathBuf,

    /// Output CSV file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report queries without any match as "(unmatched)"
    #[arg(short = 'u', long)]
    pub include_unmatched: bool,

    #[command(flatten)]
    pub similarity: SimilarityArgs,
}

/// Search every query record against the references and write CSV rows
///
/// # Errors
///
/// Returns an error for invalid options, unreadable inputs, sketch files
/// with mixed scales, or write failures.
pub fn run(args: SearchArgs) -> anyhow::Result<()> {
    let (scale, min_similarity, distance) = args.similarity.resolve()?;
    let references = load_references(&args.reference, scale, distance.kmer_length)?;
    if references.is_empty() {
        warn!("No reference sequences in {}", args.reference.display());
    }
    if let Some(reference_scale) = references.scale() {
        if reference_scale != scale {
            warn!("Using the reference sketch scale {reference_scale} instead of {scale}");
        }
    }

    let config = SearchConfig {
        min_similarity,
        distance,
        include_unmatched: args.include_unmatched,
        index_scale_factor: INDEX_SCALE_FACTOR,
    };
    let engine = SearchEngine::new(&references, config);

    let mut out = open_output(args.output.as_deref())?;
    write_header(&mut out)?;

    let queries = open_fasta(&args.query)
        .with_context(|| format!("Failed to open {}", args.query.display()))?;
    let mut query_count = 0usize;
    let mut match_count = 0usize;
    for record in queries {
        let record = record.with_context(|| format!("Failed to read {}", args.query.display()))?;
        for m in engine.search_sequence(&record)? {
            if !m.is_unmatched() {
                match_count += 1;
            }
            write_match(&mut out, &m)?;
        }
        query_count += 1;
    }
    out.flush()?;

    if query_count == 0 {
        warn!("No query sequences in {}", args.query.display());
    }
    info!("Searched {query_count} queries, found {match_count} matches");
    Ok(())
}

fn load_references(path: &Path, scale: u64, kmer_length: usize) -> anyhow::Result<SketchCollection> {
    let collection = if is_sketch_file(path) {
        SketchCollection::load_from_file(path)
    } else {
        SketchCollection::from_fasta(path, &Sketcher::new(kmer_length, scale)?)
    };
    collection.with_context(|| format!("Failed to load references from {}", path.display()))
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn write_header(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "similarity,query,reference")
}

fn write_match(out: &mut dyn Write, m: &MatchRecord) -> io::Result<()> {
    writeln!(
        out,
        "{},{},{}",
        m.similarity_percent(),
        csv_field(&m.query),
        csv_field(&m.reference)
    )
}

/// Quote a CSV field when it contains a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
