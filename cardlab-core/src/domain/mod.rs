//! Domain types for the normalized issuer series.

pub mod series;

pub use series::NormalizedSeries;
