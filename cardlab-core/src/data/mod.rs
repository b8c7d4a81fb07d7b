//! Workbook ingestion and normalization.

pub mod normalize;
pub mod workbook;

pub use normalize::{normalize, QualityWarning};
pub use workbook::{read_sheet, read_sheet_from, RawExtract};

use std::io::{Read, Seek};
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::domain::NormalizedSeries;
use crate::error::LoadError;

/// Read the configured sheet from disk and normalize it in one step.
pub fn load_series(
    path: &Path,
    config: &AnalysisConfig,
) -> Result<(NormalizedSeries, Vec<QualityWarning>), LoadError> {
    let raw = read_sheet(path, &config.sheet_name, config.skip_rows)?;
    normalize(&raw)
}

/// Same as [`load_series`] for an in-memory workbook (uploaded bytes).
pub fn load_series_from<R: Read + Seek>(
    reader: R,
    config: &AnalysisConfig,
) -> Result<(NormalizedSeries, Vec<QualityWarning>), LoadError> {
    let raw = read_sheet_from(reader, &config.sheet_name, config.skip_rows)?;
    normalize(&raw)
}
