//! FASTA input and output using noodles.
//!
//! Records are streamed one at a time so that query files never have to be
//! held in memory. Supports both uncompressed and gzip/bgzip compressed input.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),
}

/// One named sequence from a FASTA file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// Definition name (text up to the first whitespace)
    pub name: String,

    /// Raw sequence bytes, line breaks removed
    pub sequence: Vec<u8>,

    /// Full definition line without the leading `>`
    definition: String,
}

impl SequenceRecord {
    pub fn new(name: impl Into<String>, sequence: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        Self {
            definition: name.clone(),
            name,
            sequence: sequence.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Open a buffered reader over a file, decompressing gzip/bgzip by extension
///
/// # Errors
///
/// Returns `std::io::Error` if the file cannot be opened.
pub fn open_maybe_gzipped(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Streaming FASTA reader yielding [`SequenceRecord`]s in file order.
///
/// The first error ends the stream: after yielding an `Err` the reader
/// returns `None`.
pub struct FastaReader<R> {
    inner: fasta::io::Reader<R>,
    line: String,
    finished: bool,
}

impl<R: BufRead> FastaReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: fasta::io::Reader::new(reader),
            line: String::new(),
            finished: false,
        }
    }

    fn read_record(&mut self) -> Result<Option<SequenceRecord>, ParseError> {
        self.line.clear();
        let n = self
            .inner
            .read_definition(&mut self.line)
            .map_err(|e| ParseError::Noodles(format!("Failed to read FASTA definition: {e}")))?;
        if n == 0 {
            return Ok(None);
        }

        let definition: fasta::record::Definition = self.line.parse().map_err(|e| {
            ParseError::InvalidFormat(format!("Bad definition line '{}': {e}", self.line))
        })?;

        let mut sequence = Vec::new();
        self.inner
            .read_sequence(&mut sequence)
            .map_err(|e| ParseError::Noodles(format!("Failed to read FASTA sequence: {e}")))?;

        Ok(Some(SequenceRecord {
            name: String::from_utf8_lossy(definition.name()).to_string(),
            sequence,
            definition: self.line.trim_start_matches('>').to_string(),
        }))
    }
}

impl<R: BufRead> Iterator for FastaReader<R> {
    type Item = Result<SequenceRecord, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Open a FASTA file (plain or gzip) as a record stream
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_fasta(path: &Path) -> Result<FastaReader<Box<dyn BufRead>>, ParseError> {
    Ok(FastaReader::new(open_maybe_gzipped(path)?))
}

/// FASTA writer that preserves each record's original definition line
pub struct FastaWriter<W: Write> {
    inner: fasta::io::Writer<W>,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: fasta::io::Writer::new(writer),
        }
    }

    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` for an unusable definition and
    /// `ParseError::Io` on write failure.
    pub fn write_record(&mut self, record: &SequenceRecord) -> Result<(), ParseError> {
        let definition: fasta::record::Definition =
            format!(">{}", record.definition).parse().map_err(|e| {
                ParseError::InvalidFormat(format!("Bad definition '{}': {e}", record.definition))
            })?;
        let sequence = fasta::record::Sequence::from(record.sequence.clone());
        self.inner
            .write_record(&fasta::Record::new(definition, sequence))?;
        Ok(())
    }
}
