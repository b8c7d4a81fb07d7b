//! Analysis configuration — sheet shape, reference window, focus issuer.
//!
//! Stored as a TOML file. Everything the original extract hardcoded
//! (reference dates, the one bank singled out for the evolution and
//! decline views) is a parameter here, so a renamed issuer or a dataset
//! that outgrows the reference dates fails loudly instead of silently.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::NormalizedSeries;
use crate::error::MetricError;

/// Which two periods the two-date growth/share views compare.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GrowthWindow {
    /// Two explicit observation dates, start < end.
    Explicit { start: NaiveDate, end: NaiveDate },

    /// Compare the latest period against `periods` observations back.
    PeriodsBack { periods: usize },
}

impl GrowthWindow {
    /// Resolve the window against the actual series.
    ///
    /// Explicit dates must both be observation periods; `PeriodsBack`
    /// needs at least `periods + 1` observations.
    pub fn resolve(&self, series: &NormalizedSeries) -> Result<(NaiveDate, NaiveDate), MetricError> {
        match self {
            GrowthWindow::Explicit { start, end } => {
                series
                    .date_index(*start)
                    .ok_or(MetricError::DateNotFound(*start))?;
                series
                    .date_index(*end)
                    .ok_or(MetricError::DateNotFound(*end))?;
                if start >= end {
                    return Err(MetricError::InsufficientData(format!(
                        "window start {start} is not before window end {end}"
                    )));
                }
                Ok((*start, *end))
            }
            GrowthWindow::PeriodsBack { periods } => {
                let n = series.dates().len();
                if *periods == 0 {
                    return Err(MetricError::InsufficientData(
                        "periods_back must be at least 1".into(),
                    ));
                }
                if n <= *periods {
                    return Err(MetricError::InsufficientData(format!(
                        "need {} observations for a {periods}-period comparison, have {n}",
                        periods + 1
                    )));
                }
                Ok((series.dates()[n - 1 - periods], series.dates()[n - 1]))
            }
        }
    }
}

impl Default for GrowthWindow {
    fn default() -> Self {
        // Monthly observations: 24 periods back = the original's two-year view.
        GrowthWindow::PeriodsBack { periods: 24 }
    }
}

/// The complete analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the sheet holding the per-issuer counts.
    pub sheet_name: String,

    /// Leading metadata/subtitle rows to discard before the header row.
    pub skip_rows: usize,

    /// Window for the two-date growth and share-change views.
    pub growth_window: GrowthWindow,

    /// Issuer used by the share-evolution and decline views.
    pub focus_issuer: Option<String>,

    /// Trailing window length for the short-horizon growth ranking.
    pub trailing_months: u32,

    /// How many entries the presentation layer shows per ranking.
    pub top_n: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sheet_name: "tarj_vig_tit_emi".into(),
            skip_rows: 3,
            growth_window: GrowthWindow::default(),
            focus_issuer: None,
            trailing_months: 12,
            top_n: 10,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read config file: {e}"))?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("parse config TOML: {e}"))
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("serialize config: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NormalizedSeries;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series_of(dates: &[NaiveDate]) -> NormalizedSeries {
        let values = dates.iter().map(|_| vec![Some(1.0)]).collect();
        NormalizedSeries::new(dates.to_vec(), vec!["A".into()], values).unwrap()
    }

    #[test]
    fn defaults_match_regulator_extract_shape() {
        let c = AnalysisConfig::default();
        assert_eq!(c.sheet_name, "tarj_vig_tit_emi");
        assert_eq!(c.skip_rows, 3);
        assert_eq!(c.trailing_months, 12);
        assert_eq!(c.growth_window, GrowthWindow::PeriodsBack { periods: 24 });
    }

    #[test]
    fn toml_roundtrip() {
        let c = AnalysisConfig {
            focus_issuer: Some("Banco Falabella".into()),
            growth_window: GrowthWindow::Explicit {
                start: date(2023, 2, 1),
                end: date(2025, 2, 1),
            },
            ..Default::default()
        };
        let toml_str = c.to_toml().unwrap();
        let parsed = AnalysisConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.growth_window, c.growth_window);
        assert_eq!(parsed.focus_issuer.as_deref(), Some("Banco Falabella"));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed = AnalysisConfig::from_toml("skip_rows = 5").unwrap();
        assert_eq!(parsed.skip_rows, 5);
        assert_eq!(parsed.sheet_name, "tarj_vig_tit_emi");
    }

    #[test]
    fn periods_back_resolves_against_series() {
        let dates = vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)];
        let s = series_of(&dates);
        let w = GrowthWindow::PeriodsBack { periods: 2 };
        assert_eq!(w.resolve(&s).unwrap(), (date(2024, 1, 1), date(2024, 3, 1)));
    }

    #[test]
    fn periods_back_beyond_history_is_insufficient_data() {
        let s = series_of(&[date(2024, 1, 1), date(2024, 2, 1)]);
        let w = GrowthWindow::PeriodsBack { periods: 24 };
        assert!(matches!(
            w.resolve(&s),
            Err(MetricError::InsufficientData(_))
        ));
    }

    #[test]
    fn explicit_date_absent_from_series_is_reported() {
        let s = series_of(&[date(2024, 1, 1), date(2024, 2, 1)]);
        let w = GrowthWindow::Explicit {
            start: date(2023, 2, 1),
            end: date(2024, 2, 1),
        };
        assert!(matches!(
            w.resolve(&s),
            Err(MetricError::DateNotFound(d)) if d == date(2023, 2, 1)
        ));
    }
}
