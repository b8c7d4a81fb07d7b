//! Latest-period share waterfall — a breakdown of 100% of the market.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::NormalizedSeries;
use crate::error::MetricError;

/// One issuer's slice of the latest-period market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSegment {
    pub issuer: String,
    pub count: f64,
    pub share_pct: f64,
}

/// Ranked share breakdown at the latest period, plus the explicit total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareWaterfall {
    pub date: NaiveDate,
    /// Descending by share; issuers without a value at `date` excluded.
    pub segments: Vec<ShareSegment>,
    pub total_count: f64,
    /// Sum of the segment shares — the waterfall's closing bar. Within
    /// floating rounding of 100.
    pub total_pct: f64,
}

/// Break the latest period's market into per-issuer shares summing to 100%.
pub fn share_waterfall(series: &NormalizedSeries) -> Result<ShareWaterfall, MetricError> {
    let last = series.last_index().ok_or(MetricError::EmptySeries)?;
    let date = series.dates()[last];
    let total_count = match series.present_total(last) {
        Some(total) if total > 0.0 => total,
        _ => {
            return Err(MetricError::InsufficientData(format!(
                "no positive market total at {date}"
            )))
        }
    };

    let mut segments: Vec<ShareSegment> = series
        .issuers()
        .iter()
        .zip(series.row(last))
        .filter_map(|(issuer, value)| {
            value.map(|count| ShareSegment {
                issuer: issuer.clone(),
                count,
                share_pct: count / total_count * 100.0,
            })
        })
        .collect();
    segments.sort_by(|a, b| {
        b.share_pct
            .partial_cmp(&a.share_pct)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total_pct = segments.iter().map(|s| s.share_pct).sum();

    Ok(ShareWaterfall {
        date,
        segments,
        total_count,
        total_pct,
    })
}
