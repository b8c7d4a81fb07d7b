//! Period-over-period decline detection for one issuer.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::NormalizedSeries;
use crate::error::MetricError;

/// One period of the issuer's series with its month-over-month delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclinePoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
    /// Difference versus the immediately preceding period; `None` on the
    /// first period or when either side is missing.
    pub delta: Option<f64>,
    pub declined: bool,
}

/// Full series plus the dates flagged as declines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeclineReport {
    pub issuer: String,
    pub points: Vec<DeclinePoint>,
    /// Dates where the count fell versus the immediately preceding period.
    pub flagged: Vec<NaiveDate>,
}

/// Flag the periods where the issuer's count dropped month over month.
///
/// The first period has no prior and is never flagged; a comparison with
/// a missing side is not evaluable and is never flagged either.
pub fn monthly_declines(
    series: &NormalizedSeries,
    issuer: &str,
) -> Result<DeclineReport, MetricError> {
    let issuer_idx = series
        .issuer_index(issuer)
        .ok_or_else(|| MetricError::UnknownIssuer(issuer.to_string()))?;

    let mut points = Vec::with_capacity(series.len());
    let mut flagged = Vec::new();
    for (date_idx, date) in series.dates().iter().enumerate() {
        let value = series.value(date_idx, issuer_idx);
        let delta = match (date_idx.checked_sub(1), value) {
            (Some(prev_idx), Some(value)) => series
                .value(prev_idx, issuer_idx)
                .map(|prev| value - prev),
            _ => None,
        };
        let declined = delta.is_some_and(|d| d < 0.0);
        if declined {
            flagged.push(*date);
        }
        points.push(DeclinePoint {
            date: *date,
            value,
            delta,
            declined,
        });
    }

    Ok(DeclineReport {
        issuer: issuer.to_string(),
        points,
        flagged,
    })
}
