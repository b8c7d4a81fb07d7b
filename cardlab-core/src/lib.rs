//! cardlab-core — loader/normalizer and metrics engine for per-issuer
//! card-count series.
//!
//! Two components, used sequentially:
//! - `data` parses one named sheet of a regulator workbook into a
//!   validated, immutable [`domain::NormalizedSeries`], absorbing bad
//!   cells as missing values and reporting them as quality warnings.
//! - `metrics` derives the descriptive views (snapshot ranking, growth,
//!   share change and evolution, comparison slice, trailing-window
//!   growth, decline flags, share waterfall) as pure functions over the
//!   series.
//!
//! Presentation — charts, widgets, layout — is a caller concern; every
//! result here is a plain ordered collection of labels and numbers.

pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod metrics;

pub use config::{AnalysisConfig, GrowthWindow};
pub use data::{load_series, load_series_from, QualityWarning};
pub use domain::NormalizedSeries;
pub use error::{LoadError, MetricError};
