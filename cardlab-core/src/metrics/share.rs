//! Market-share views: two-date share change and one issuer's share over time.
//!
//! A share at a period is the issuer's count divided by the sum over
//! issuers *present* at that period — missing issuers are outside the
//! denominator, never counted as zero.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::NormalizedSeries;
use crate::error::MetricError;

/// One issuer's share movement between the two reference dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareChangeEntry {
    pub issuer: String,
    pub start_value: f64,
    pub end_value: f64,
    pub start_share_pct: f64,
    pub end_share_pct: f64,
    /// Percentage points: `end_share_pct - start_share_pct`.
    pub change_pp: f64,
}

/// Issuers ranked by share change, biggest losers first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareChangeRanking {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Ascending by `change_pp`.
    pub entries: Vec<ShareChangeEntry>,
}

/// Share change per issuer between `start` and `end`, losers first.
pub fn share_change(
    series: &NormalizedSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ShareChangeRanking, MetricError> {
    let start_idx = series
        .date_index(start)
        .ok_or(MetricError::DateNotFound(start))?;
    let end_idx = series
        .date_index(end)
        .ok_or(MetricError::DateNotFound(end))?;
    if start_idx >= end_idx {
        return Err(MetricError::InsufficientData(format!(
            "share window start {start} is not before end {end}"
        )));
    }

    let start_total = positive_total(series, start_idx, start)?;
    let end_total = positive_total(series, end_idx, end)?;

    let mut entries = Vec::new();
    for (issuer_idx, issuer) in series.issuers().iter().enumerate() {
        let (Some(start_value), Some(end_value)) = (
            series.value(start_idx, issuer_idx),
            series.value(end_idx, issuer_idx),
        ) else {
            continue;
        };
        let start_share_pct = start_value / start_total * 100.0;
        let end_share_pct = end_value / end_total * 100.0;
        entries.push(ShareChangeEntry {
            issuer: issuer.clone(),
            start_value,
            end_value,
            start_share_pct,
            end_share_pct,
            change_pp: end_share_pct - start_share_pct,
        });
    }
    entries.sort_by(|a, b| {
        a.change_pp
            .partial_cmp(&b.change_pp)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(ShareChangeRanking {
        start,
        end,
        entries,
    })
}

/// One period of an issuer's share evolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SharePoint {
    pub date: NaiveDate,
    pub share_pct: f64,
}

/// One issuer's share of the market over the full series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSeries {
    pub issuer: String,
    /// One point per period where the issuer has a value and the period
    /// total is positive; other periods yield no point.
    pub points: Vec<SharePoint>,
}

/// The issuer's share per period, with the denominator recomputed each
/// period from the issuers present at it.
pub fn share_evolution(
    series: &NormalizedSeries,
    issuer: &str,
) -> Result<ShareSeries, MetricError> {
    let issuer_idx = series
        .issuer_index(issuer)
        .ok_or_else(|| MetricError::UnknownIssuer(issuer.to_string()))?;

    let mut points = Vec::new();
    for (date_idx, date) in series.dates().iter().enumerate() {
        let Some(value) = series.value(date_idx, issuer_idx) else {
            continue;
        };
        let Some(total) = series.present_total(date_idx) else {
            continue;
        };
        if total <= 0.0 {
            continue;
        }
        points.push(SharePoint {
            date: *date,
            share_pct: value / total * 100.0,
        });
    }

    Ok(ShareSeries {
        issuer: issuer.to_string(),
        points,
    })
}

fn positive_total(
    series: &NormalizedSeries,
    date_idx: usize,
    date: NaiveDate,
) -> Result<f64, MetricError> {
    match series.present_total(date_idx) {
        Some(total) if total > 0.0 => Ok(total),
        _ => Err(MetricError::InsufficientData(format!(
            "no positive market total at {date}"
        ))),
    }
}
