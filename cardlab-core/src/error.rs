//! Error taxonomy: hard load failures vs. per-view metric failures.
//!
//! Cell-level parse problems are never errors — they become nulls during
//! normalization and are reported as [`QualityWarning`]s alongside the
//! series (see `data::normalize`).

use chrono::NaiveDate;

/// Total failure to produce a series from the uploaded workbook.
///
/// Anything recoverable (a bad cell, a junk row) is absorbed during
/// normalization instead; `LoadError` means the analysis cannot start.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("sheet '{0}' not found in workbook")]
    SheetMissing(String),

    #[error("sheet '{sheet}' has no data rows after skipping {skip} header rows")]
    NoDataRows { sheet: String, skip: usize },

    #[error("sheet '{0}' has no issuer columns")]
    NoIssuerColumns(String),

    #[error("no rows with a parseable date in sheet '{0}'")]
    NoParseableDates(String),

    #[error("normalization failed: {0}")]
    Frame(#[from] polars::error::PolarsError),

    #[error("normalized table is invalid: {0}")]
    InvalidSeries(String),
}

/// A requested view cannot be computed from the loaded series.
///
/// Carries enough context for the caller to say which comparison failed
/// and why, rather than rendering misleading zeros.
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    #[error("series contains no observations")]
    EmptySeries,

    #[error("date {0} is not an observation period in the series")]
    DateNotFound(NaiveDate),

    #[error("issuer '{0}' is not a column of the series")]
    UnknownIssuer(String),

    #[error("not enough data: {0}")]
    InsufficientData(String),
}
