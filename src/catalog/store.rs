use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;
use thiserror::Error;
use tracing::info;

use crate::core::sketch::{SketchError, Sketch, Sketcher};
use crate::core::types::SketchId;
use crate::parsing::fasta::{is_gzipped, open_fasta, open_maybe_gzipped, ParseError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read sketches: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to decode sketch record: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("Failed to read sequences: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Sketch(#[from] SketchError),

    #[error("Mismatching scales: {expected}, {found}")]
    ScaleMismatch { expected: u64, found: u64 },

    #[error("Invalid sketch record '{name}': {reason}")]
    InvalidRecord { name: String, reason: String },
}

/// Sketches that share one scale, addressed by their position
#[derive(Debug, Clone, Default)]
pub struct SketchCollection {
    sketches: Vec<Sketch>,
    scale: Option<u64>,
}

impl SketchCollection {
    /// Create an empty collection; its scale is fixed by the first sketch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sketch, assigning it the next id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ScaleMismatch` if the sketch's scale differs from
    /// the sketches already collected.
    pub fn push(&mut self, sketch: Sketch) -> Result<SketchId, CatalogError> {
        match self.scale {
            Some(expected) if expected != sketch.scale() => {
                return Err(CatalogError::ScaleMismatch {
                    expected,
                    found: sketch.scale(),
                });
            }
            Some(_) => {}
            None => self.scale = Some(sketch.scale()),
        }
        let id = self.sketches.len();
        self.sketches.push(sketch);
        Ok(id)
    }

    /// Collect a fallible stream of sketches, stopping at the first error
    ///
    /// # Errors
    ///
    /// Returns the first error of the stream, or `CatalogError::ScaleMismatch`
    /// when two sketches disagree on scale.
    pub fn collect<I, E>(sketches: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = Result<Sketch, E>>,
        CatalogError: From<E>,
    {
        let mut collection = Self::new();
        for sketch in sketches {
            collection.push(sketch?)?;
        }
        Ok(collection)
    }

    /// Sketch every record of a FASTA file at the given scale
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if the file cannot be read or a record is
    /// malformed.
    pub fn from_fasta(path: &Path, sketcher: &Sketcher) -> Result<Self, CatalogError> {
        let records = open_fasta(path)?;
        let collection = Self::collect(
            records.map(|record| record.map(|r| sketcher.sketch(r.name, &r.sequence))),
        )?;
        info!(
            "Sketched {} sequences from {}",
            collection.len(),
            path.display()
        );
        Ok(collection)
    }

    /// Load a persisted sketch file (optionally gzip-compressed)
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` or `CatalogError::Encoding` if the file
    /// cannot be read, `CatalogError::InvalidRecord` for a record that breaks
    /// sketch invariants, and `CatalogError::ScaleMismatch` for mixed scales.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let collection = Self::collect(SketchReader::new(open_maybe_gzipped(path)?))?;
        info!(
            "Read {} sketches from {}",
            collection.len(),
            path.display()
        );
        Ok(collection)
    }

    /// Write all sketches to a file, gzip-compressed if the path ends in `.gz`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` or `CatalogError::Encoding` on write
    /// failure.
    pub fn save_to_file(&self, path: &Path) -> Result<(), CatalogError> {
        let mut writer = SketchWriter::create(path)?;
        for sketch in &self.sketches {
            writer.write(sketch)?;
        }
        writer.finish()
    }

    pub fn get(&self, id: SketchId) -> Option<&Sketch> {
        self.sketches.get(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sketch> {
        self.sketches.iter()
    }

    /// Shared scale, `None` while empty
    pub fn scale(&self) -> Option<u64> {
        self.scale
    }

    pub fn len(&self) -> usize {
        self.sketches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sketches.is_empty()
    }

    pub fn into_sketches(self) -> Vec<Sketch> {
        self.sketches
    }
}

impl std::ops::Index<SketchId> for SketchCollection {
    type Output = Sketch;

    fn index(&self, id: SketchId) -> &Sketch {
        &self.sketches[id]
    }
}

impl<'a> IntoIterator for &'a SketchCollection {
    type Item = &'a Sketch;
    type IntoIter = std::slice::Iter<'a, Sketch>;

    fn into_iter(self) -> Self::IntoIter {
        self.sketches.iter()
    }
}

/// Streams bincode-encoded sketch records from a reader.
///
/// Every record is checked against the sketch invariants. A clean end of
/// input between records ends the stream; a truncated record is an error.
pub struct SketchReader<R> {
    inner: R,
    finished: bool,
}

impl<R: BufRead> SketchReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            finished: false,
        }
    }

    fn read_sketch(&mut self) -> Result<Option<Sketch>, CatalogError> {
        if self.inner.fill_buf()?.is_empty() {
            return Ok(None);
        }
        let sketch: Sketch = bincode::deserialize_from(&mut self.inner)?;
        sketch
            .check_invariants()
            .map_err(|reason| CatalogError::InvalidRecord {
                name: sketch.name().to_string(),
                reason,
            })?;
        Ok(Some(sketch))
    }
}

impl<R: BufRead> Iterator for SketchReader<R> {
    type Item = Result<Sketch, CatalogError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.read_sketch().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.finished = true;
        }
        result
    }
}

/// Writes sketch records one at a time
pub struct SketchWriter {
    inner: Box<dyn FinishWrite>,
}

impl SketchWriter {
    /// Create the output file, gzip-compressing when the path ends in `.gz`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, CatalogError> {
        let file = BufWriter::new(File::create(path)?);
        let inner: Box<dyn FinishWrite> = if is_gzipped(path) {
            Box::new(GzEncoder::new(file, Compression::default()))
        } else {
            Box::new(file)
        };
        Ok(Self { inner })
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Encoding` on write failure.
    pub fn write(&mut self, sketch: &Sketch) -> Result<(), CatalogError> {
        bincode::serialize_into(&mut self.inner, sketch)?;
        Ok(())
    }

    /// Flush buffers and write any compression trailer
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` if flushing fails.
    pub fn finish(self) -> Result<(), CatalogError> {
        self.inner.finish()?;
        Ok(())
    }
}

/// A writer that needs an explicit final step before it is dropped
trait FinishWrite: Write {
    fn finish(self: Box<Self>) -> std::io::Result<()>;
}

impl<W: Write> FinishWrite for BufWriter<W> {
    fn finish(mut self: Box<Self>) -> std::io::Result<()> {
        self.flush()
    }
}

impl<W: Write> FinishWrite for GzEncoder<W> {
    fn finish(self: Box<Self>) -> std::io::Result<()> {
        let mut inner = GzEncoder::finish(*self)?;
        inner.flush()
    }
}
