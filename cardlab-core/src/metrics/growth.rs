//! Growth rankings: between two reference dates, and over a trailing window.

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::domain::NormalizedSeries;
use crate::error::MetricError;

/// One issuer's growth between the two reference dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthEntry {
    pub issuer: String,
    pub start_value: f64,
    pub end_value: f64,
    pub absolute: f64,
    /// `absolute / start_value * 100`.
    pub percent: f64,
}

/// Issuers ranked by percentage growth between two observation dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRanking {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Descending by percentage growth.
    pub entries: Vec<GrowthEntry>,
    /// Issuers present at both dates but starting from zero — a percentage
    /// is undefined for them, so they are reported here instead of as ±inf.
    pub zero_base: Vec<String>,
}

/// Absolute and percentage growth per issuer between `start` and `end`.
///
/// Both dates must be observation periods. Issuers missing a value at
/// either date are excluded from the ranking.
pub fn growth_between(
    series: &NormalizedSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<GrowthRanking, MetricError> {
    let start_idx = series
        .date_index(start)
        .ok_or(MetricError::DateNotFound(start))?;
    let end_idx = series
        .date_index(end)
        .ok_or(MetricError::DateNotFound(end))?;
    if start_idx >= end_idx {
        return Err(MetricError::InsufficientData(format!(
            "growth window start {start} is not before end {end}"
        )));
    }

    let mut entries = Vec::new();
    let mut zero_base = Vec::new();
    for (issuer_idx, issuer) in series.issuers().iter().enumerate() {
        let (Some(start_value), Some(end_value)) = (
            series.value(start_idx, issuer_idx),
            series.value(end_idx, issuer_idx),
        ) else {
            continue;
        };
        if start_value == 0.0 {
            zero_base.push(issuer.clone());
            continue;
        }
        let absolute = end_value - start_value;
        entries.push(GrowthEntry {
            issuer: issuer.clone(),
            start_value,
            end_value,
            absolute,
            percent: absolute / start_value * 100.0,
        });
    }
    entries.sort_by(|a, b| {
        b.percent
            .partial_cmp(&a.percent)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(GrowthRanking {
        start,
        end,
        entries,
        zero_base,
    })
}

/// One issuer's count change across the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailingEntry {
    pub issuer: String,
    pub first_value: f64,
    pub last_value: f64,
    pub delta: f64,
}

/// Count deltas over the last `months` months of the series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailingGrowth {
    /// Lower bound of the window (latest date minus the window length).
    pub window_start: NaiveDate,
    /// Latest observation date.
    pub window_end: NaiveDate,
    /// First and last observation periods that fall inside the window.
    pub first_obs: Option<NaiveDate>,
    pub last_obs: Option<NaiveDate>,
    /// Descending by delta. Empty when fewer than two observations fall
    /// inside the window — that is an answer, not an error.
    pub entries: Vec<TrailingEntry>,
}

/// Rank issuers by count delta between the first and last observation
/// inside the trailing `months`-month window ending at the latest date.
pub fn trailing_growth(
    series: &NormalizedSeries,
    months: u32,
) -> Result<TrailingGrowth, MetricError> {
    let last = series.last_index().ok_or(MetricError::EmptySeries)?;
    let window_end = series.dates()[last];
    let window_start = window_end
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);

    let in_window: Vec<usize> = (0..series.len())
        .filter(|&idx| series.dates()[idx] >= window_start)
        .collect();
    if in_window.len() < 2 {
        return Ok(TrailingGrowth {
            window_start,
            window_end,
            first_obs: in_window.first().map(|&idx| series.dates()[idx]),
            last_obs: in_window.last().map(|&idx| series.dates()[idx]),
            entries: Vec::new(),
        });
    }

    let first_idx = in_window[0];
    let last_idx = *in_window.last().unwrap_or(&last);

    let mut entries = Vec::new();
    for (issuer_idx, issuer) in series.issuers().iter().enumerate() {
        let (Some(first_value), Some(last_value)) = (
            series.value(first_idx, issuer_idx),
            series.value(last_idx, issuer_idx),
        ) else {
            continue;
        };
        entries.push(TrailingEntry {
            issuer: issuer.clone(),
            first_value,
            last_value,
            delta: last_value - first_value,
        });
    }
    entries.sort_by(|a, b| {
        b.delta
            .partial_cmp(&a.delta)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(TrailingGrowth {
        window_start,
        window_end,
        first_obs: Some(series.dates()[first_idx]),
        last_obs: Some(series.dates()[last_idx]),
        entries,
    })
}
