//! Multi-issuer comparison slice — wide table to long form.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::NormalizedSeries;
use crate::error::MetricError;

/// One (date, issuer, value) observation of the long-form slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPoint {
    pub date: NaiveDate,
    pub issuer: String,
    pub value: f64,
}

/// Project the series onto the selected issuers and reshape to long form,
/// ordered by date, then by the selection order.
///
/// Every requested name must be a column of the series. Periods where a
/// selected issuer has no value produce no point for it.
pub fn comparison_slice(
    series: &NormalizedSeries,
    issuers: &[String],
) -> Result<Vec<ComparisonPoint>, MetricError> {
    let indices: Vec<usize> = issuers
        .iter()
        .map(|name| {
            series
                .issuer_index(name)
                .ok_or_else(|| MetricError::UnknownIssuer(name.clone()))
        })
        .collect::<Result<_, _>>()?;

    let mut points = Vec::new();
    for (date_idx, date) in series.dates().iter().enumerate() {
        for (name, &issuer_idx) in issuers.iter().zip(&indices) {
            if let Some(value) = series.value(date_idx, issuer_idx) {
                points.push(ComparisonPoint {
                    date: *date,
                    issuer: name.clone(),
                    value,
                });
            }
        }
    }
    Ok(points)
}
