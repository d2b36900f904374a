//! Centralized validation of user-supplied parameters and paths.

use std::path::{Path, PathBuf};

use crate::core::types::SKETCH_FILE_SUFFIX;

/// Rejected command-line parameters
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Scale must be at least 1")]
    ZeroScale,
    #[error("Scale {0} is too large to multiply by the index factor")]
    ScaleTooLarge(u64),
    #[error("Minimum similarity must be between 0 and 1, got {0}")]
    SimilarityOutOfRange(f64),
}

/// Validate a subsampling scale.
///
/// The scale is later multiplied by the index factor, so it must leave room
/// for that without overflowing.
///
/// # Errors
///
/// Returns `ValidationError::ZeroScale` for 0 and
/// `ValidationError::ScaleTooLarge` when `scale * index_factor` overflows.
pub fn validate_scale(scale: u64, index_factor: u64) -> Result<u64, ValidationError> {
    if scale == 0 {
        return Err(ValidationError::ZeroScale);
    }
    if scale.checked_mul(index_factor).is_none() {
        return Err(ValidationError::ScaleTooLarge(scale));
    }
    Ok(scale)
}

/// Validate a minimum similarity threshold.
///
/// # Errors
///
/// Returns `ValidationError::SimilarityOutOfRange` unless the value is a
/// number in `[0, 1]`.
pub fn validate_min_similarity(value: f64) -> Result<f64, ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::SimilarityOutOfRange(value))
    }
}

/// Check if the path names a persisted sketch file (`.sketch` or `.sketch.gz`)
#[must_use]
pub fn is_sketch_file(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    let stem = path_str
        .strip_suffix(".gz")
        .unwrap_or(path_str.as_str());
    stem.ends_with(SKETCH_FILE_SUFFIX)
}

/// Append the sketch suffix unless the path already carries it
#[must_use]
pub fn with_sketch_suffix(path: &Path) -> PathBuf {
    if is_sketch_file(path) {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(SKETCH_FILE_SUFFIX);
        PathBuf::from(name)
    }
}
