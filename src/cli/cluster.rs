use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::catalog::store::SketchCollection;
use crate::cli::SimilarityArgs;
use crate::core::sketch::Sketcher;
use crate::core::types::INDEX_SCALE_FACTOR;
use crate::matching::cluster::{ClusterConfig, ClusterEngine, Clustering};
use crate::parsing::fasta::{open_fasta, FastaWriter};

#[derive(Args)]
pub struct ClusterArgs {
    /// Input FASTA file (optionally gzip-compressed)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output prefix for <PREFIX>.json and <PREFIX>.fasta (JSON to stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub similarity: SimilarityArgs,
}

/// Cluster the input and write the cluster lists and representatives
///
/// # Errors
///
/// Returns an error for invalid options, an unreadable input or write
/// failures.
pub fn run(args: ClusterArgs) -> anyhow::Result<()> {
    let (scale, min_similarity, distance) = args.similarity.resolve()?;
    let sketcher = Sketcher::new(distance.kmer_length, scale)?;
    let collection = SketchCollection::from_fasta(&args.input, &sketcher)
        .with_context(|| format!("Failed to sketch {}", args.input.display()))?;
    if collection.is_empty() {
        warn!("No sequences found in {}", args.input.display());
    }

    let config = ClusterConfig {
        min_similarity,
        distance,
        index_scale_factor: INDEX_SCALE_FACTOR,
    };
    let clustering = ClusterEngine::new(config).run(collection);
    let json = clustering.to_json()?;

    match &args.output {
        Some(prefix) => {
            let json_path = with_extension(prefix, "json");
            std::fs::write(&json_path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", json_path.display()))?;

            let fasta_path = with_extension(prefix, "fasta");
            let written = write_representatives(&args.input, &fasta_path, &clustering)?;
            info!(
                "Wrote {} and {written} representatives to {}",
                json_path.display(),
                fasta_path.display()
            );
        }
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{json}")?;
            out.flush()?;
        }
    }
    Ok(())
}

/// `<prefix>.<extension>`, keeping any dots already in the prefix
fn with_extension(prefix: &Path, extension: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Re-read the input and copy each cluster seed to `path` in cluster order
fn write_representatives(
    input: &Path,
    path: &Path,
    clustering: &Clustering,
) -> anyhow::Result<usize> {
    // Seeds are ascending ids, and ids follow input order
    let mut seeds = clustering.representatives().into_iter().peekable();

    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    let mut written = 0usize;
    {
        let mut writer = FastaWriter::new(&mut out);
        for (id, record) in open_fasta(input)?.enumerate() {
            let Some(&next) = seeds.peek() else {
                break;
            };
            let record = record.with_context(|| format!("Failed to read {}", input.display()))?;
            if id == next {
                writer.write_record(&record)?;
                written += 1;
                seeds.next();
            }
        }
    }
    out.flush()?;

    if seeds.peek().is_some() {
        anyhow::bail!(
            "{} changed while clustering: fewer records than sketched",
            input.display()
        );
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_extension() {
        assert_eq!(
            with_extension(Path::new("out/clusters"), "json"),
            PathBuf::from("out/clusters.json")
        );
        assert_eq!(
            with_extension(Path::new("run.v2"), "fasta"),
            PathBuf::from("run.v2.fasta")
        );
    }
}
