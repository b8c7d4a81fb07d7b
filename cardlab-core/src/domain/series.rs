//! The canonical in-memory representation every metric reads from.
//!
//! One axis of strictly increasing observation dates, one axis of issuer
//! names in source-column order, and a row-major grid of optional counts.
//! `None` means "issuer not evaluable for this period" and must propagate
//! through derived computations — it is never a zero count.
//!
//! The series is immutable after construction; metrics are read-only
//! projections over it.

use chrono::NaiveDate;
use serde::Serialize;

/// A validated, date-indexed table of per-issuer card counts.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedSeries {
    dates: Vec<NaiveDate>,
    issuers: Vec<String>,
    /// Row-major: `values[date_idx][issuer_idx]`.
    values: Vec<Vec<Option<f64>>>,
}

impl NormalizedSeries {
    /// Build a series, checking the structural invariants.
    ///
    /// Dates must be strictly increasing (sorted, no duplicates) and every
    /// row must have exactly one cell per issuer.
    pub fn new(
        dates: Vec<NaiveDate>,
        issuers: Vec<String>,
        values: Vec<Vec<Option<f64>>>,
    ) -> Result<Self, String> {
        if dates.len() != values.len() {
            return Err(format!(
                "{} dates but {} value rows",
                dates.len(),
                values.len()
            ));
        }
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "dates must be strictly increasing, found {} before {}",
                w[0], w[1]
            ));
        }
        if let Some((i, row)) = values
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != issuers.len())
        {
            return Err(format!(
                "row {i} has {} cells for {} issuers",
                row.len(),
                issuers.len()
            ));
        }
        Ok(Self {
            dates,
            issuers,
            values,
        })
    }

    /// Observation dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Issuer names in source-column order. This order is the deterministic
    /// tie-break for every ranking.
    pub fn issuers(&self) -> &[String] {
        &self.issuers
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of observation periods.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Position of a date in the series, if it is an observation period.
    pub fn date_index(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Position of an issuer column.
    pub fn issuer_index(&self, issuer: &str) -> Option<usize> {
        self.issuers.iter().position(|name| name == issuer)
    }

    /// Index of the latest observation period.
    pub fn last_index(&self) -> Option<usize> {
        self.dates.len().checked_sub(1)
    }

    /// Count for one issuer at one period; `None` when not evaluable.
    pub fn value(&self, date_idx: usize, issuer_idx: usize) -> Option<f64> {
        self.values[date_idx][issuer_idx]
    }

    /// All issuer cells for one period, in issuer order.
    pub fn row(&self, date_idx: usize) -> &[Option<f64>] {
        &self.values[date_idx]
    }

    /// Sum of counts over issuers present at this period.
    ///
    /// `None` when no issuer has a value — a period with no evaluable
    /// issuers has no meaningful total.
    pub fn present_total(&self, date_idx: usize) -> Option<f64> {
        let mut total = 0.0;
        let mut any = false;
        for v in &self.values[date_idx] {
            if let Some(v) = v {
                total += v;
                any = true;
            }
        }
        any.then_some(total)
    }
}
