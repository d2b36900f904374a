use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::catalog::store::SketchWriter;
use crate::core::sketch::Sketcher;
use crate::core::types::{DEFAULT_SCALE, INDEX_SCALE_FACTOR, KMER_LENGTH};
use crate::parsing::fasta::open_fasta;
use crate::utils::validation::{validate_scale, with_sketch_suffix};

#[derive(Args)]
pub struct SketchArgs {
    /// Input FASTA file (optionally gzip-compressed)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output path; the .sketch suffix is added when missing
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Keep roughly 1/scale of all k-mers
    #[arg(short, long, default_value_t = DEFAULT_SCALE)]
    pub scale: u64,
}

/// Sketch every record of the input and stream the sketches to disk
///
/// # Errors
///
/// Returns an error if the scale is invalid, the input cannot be parsed, or
/// the output cannot be written.
pub fn run(args: SketchArgs) -> anyhow::Result<()> {
    let scale = validate_scale(args.scale, INDEX_SCALE_FACTOR)?;
    let sketcher = Sketcher::new(KMER_LENGTH, scale)?;
    let output = with_sketch_suffix(&args.output);

    let records = open_fasta(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let mut writer = SketchWriter::create(&output)
        .with_context(|| format!("Failed to create {}", output.display()))?;

    let mut count = 0usize;
    let mut hashes = 0usize;
    for record in records {
        let record =
            record.with_context(|| format!("Failed to read {}", args.input.display()))?;
        let sketch = sketcher.sketch(record.name, &record.sequence);
        hashes += sketch.len();
        writer.write(&sketch)?;
        count += 1;
    }
    writer.finish()?;

    if count == 0 {
        warn!("No sequences found in {}", args.input.display());
    }
    info!(
        "Wrote {count} sketches ({hashes} hashes) to {}",
        output.display()
    );
    Ok(())
}
