//! Latest-period snapshot ranking.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::NormalizedSeries;
use crate::error::MetricError;

/// One issuer's count at the snapshot date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuerCount {
    pub issuer: String,
    pub count: f64,
}

/// Issuers ranked by count at the latest observation period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRanking {
    pub date: NaiveDate,
    /// Descending by count; issuers without a value at `date` excluded.
    pub entries: Vec<IssuerCount>,
}

/// Rank issuers by their count at the latest period.
pub fn latest_ranking(series: &NormalizedSeries) -> Result<SnapshotRanking, MetricError> {
    let last = series.last_index().ok_or(MetricError::EmptySeries)?;

    let mut entries: Vec<IssuerCount> = series
        .issuers()
        .iter()
        .zip(series.row(last))
        .filter_map(|(issuer, value)| {
            value.map(|count| IssuerCount {
                issuer: issuer.clone(),
                count,
            })
        })
        .collect();
    entries.sort_by(|a, b| {
        b.count
            .partial_cmp(&a.count)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(SnapshotRanking {
        date: series.dates()[last],
        entries,
    })
}
