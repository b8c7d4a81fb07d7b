//! Normalization — raw extract to validated, date-indexed series.
//!
//! One polars pipeline does all the coercion: the first column is parsed
//! as dates (failures become null, the row is then dropped), every other
//! column is cast to numeric non-strictly (failures become null and stay
//! null — a bad cell is "not evaluable", never zero). Rows are stably
//! sorted by date and deduplicated keeping the first occurrence; columns
//! that end up empty across all retained rows are dropped.
//!
//! Nothing here raises on a bad cell. Everything absorbed along the way
//! is reported back as [`QualityWarning`]s so the caller can show them
//! without aborting the analysis.

use polars::prelude::*;
use std::fmt;

use crate::data::workbook::RawExtract;
use crate::domain::NormalizedSeries;
use crate::error::LoadError;

/// Non-fatal data-quality findings from one normalization pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityWarning {
    /// Rows dropped because the date cell did not parse.
    UnparseableDateRows { count: usize },
    /// Rows dropped because their date repeated an earlier observation.
    DuplicateDates { count: usize },
    /// Issuer columns dropped for having no value in any retained row.
    EmptyColumnsDropped { names: Vec<String> },
    /// Cells in a kept column coerced to missing (non-numeric content).
    NonNumericCells { issuer: String, count: usize },
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityWarning::UnparseableDateRows { count } => {
                write!(f, "dropped {count} row(s) without a parseable date")
            }
            QualityWarning::DuplicateDates { count } => {
                write!(f, "dropped {count} row(s) repeating an earlier date")
            }
            QualityWarning::EmptyColumnsDropped { names } => {
                write!(f, "dropped empty column(s): {}", names.join(", "))
            }
            QualityWarning::NonNumericCells { issuer, count } => {
                write!(f, "'{issuer}': {count} non-numeric cell(s) treated as missing")
            }
        }
    }
}

/// Normalize a raw extract into a series plus quality warnings.
pub fn normalize(
    raw: &RawExtract,
) -> Result<(NormalizedSeries, Vec<QualityWarning>), LoadError> {
    if raw.headers.len() < 2 {
        return Err(LoadError::NoIssuerColumns(raw.sheet.clone()));
    }
    let issuer_names = dedupe_headers(&raw.headers[1..]);
    let width = raw.headers.len();

    // Raw per-column content counts, for the coercion warnings later.
    let mut raw_non_empty = vec![0usize; width];
    for row in &raw.rows {
        for (idx, cell) in row.iter().enumerate() {
            if cell.is_some() {
                raw_non_empty[idx] += 1;
            }
        }
    }

    let df = build_string_frame(raw, &issuer_names)?;

    // Coerce: first column to dates, the rest to numerics, both non-strict.
    let date_format = StrptimeOptions {
        format: Some("%Y-%m-%d".into()),
        strict: false,
        exact: true,
        cache: true,
    };
    let mut exprs: Vec<Expr> = vec![col("date").str().to_date(date_format)];
    for name in &issuer_names {
        exprs.push(col(name.as_str()).cast(DataType::Float64));
    }
    let casted = df.lazy().select(exprs).collect()?;

    let mut warnings = Vec::new();

    let unparseable_dates = casted.column("date")?.null_count();
    if unparseable_dates > 0 {
        warnings.push(QualityWarning::UnparseableDateRows {
            count: unparseable_dates,
        });
    }
    for (idx, name) in issuer_names.iter().enumerate() {
        let kept = casted.height() - casted.column(name)?.null_count();
        let coerced = raw_non_empty[idx + 1].saturating_sub(kept);
        if coerced > 0 && kept > 0 {
            warnings.push(QualityWarning::NonNumericCells {
                issuer: name.clone(),
                count: coerced,
            });
        }
    }

    // Drop unusable rows, order the timeline, dedupe repeated dates.
    let dated = casted
        .lazy()
        .filter(col("date").is_not_null())
        .sort(
            ["date"],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;
    if dated.height() == 0 {
        return Err(LoadError::NoParseableDates(raw.sheet.clone()));
    }
    let frame = dated.unique_stable(
        Some(&["date".to_string()]),
        UniqueKeepStrategy::First,
        None,
    )?;
    let duplicates = dated.height() - frame.height();
    if duplicates > 0 {
        warnings.push(QualityWarning::DuplicateDates { count: duplicates });
    }

    // Columns with no value in any retained row carry no information.
    let mut kept_issuers = Vec::new();
    let mut dropped = Vec::new();
    for name in &issuer_names {
        if frame.column(name)?.null_count() == frame.height() {
            dropped.push(name.clone());
        } else {
            kept_issuers.push(name.clone());
        }
    }
    if kept_issuers.is_empty() {
        return Err(LoadError::NoIssuerColumns(raw.sheet.clone()));
    }
    if !dropped.is_empty() {
        warnings.push(QualityWarning::EmptyColumnsDropped { names: dropped });
    }

    let series = extract_series(&frame, &kept_issuers)?;
    Ok((series, warnings))
}

/// Build the wide string frame: column 0 renamed to `date`, issuer columns
/// under their (deduplicated) source labels.
fn build_string_frame(raw: &RawExtract, issuer_names: &[String]) -> Result<DataFrame, LoadError> {
    let mut columns: Vec<Column> = Vec::with_capacity(raw.headers.len());

    let dates: Vec<Option<String>> = raw.rows.iter().map(|row| row[0].clone()).collect();
    columns.push(Column::new("date".into(), dates));

    for (idx, name) in issuer_names.iter().enumerate() {
        let cells: Vec<Option<String>> =
            raw.rows.iter().map(|row| row[idx + 1].clone()).collect();
        columns.push(Column::new(name.as_str().into(), cells));
    }

    Ok(DataFrame::new(columns)?)
}

/// Pull the typed axes out of the cleaned frame.
fn extract_series(frame: &DataFrame, issuers: &[String]) -> Result<NormalizedSeries, LoadError> {
    let dates: Vec<chrono::NaiveDate> = frame
        .column("date")?
        .as_materialized_series()
        .date()?
        .as_date_iter()
        .flatten()
        .collect();

    let mut columns: Vec<Vec<Option<f64>>> = Vec::with_capacity(issuers.len());
    for name in issuers {
        columns.push(frame.column(name)?.f64()?.to_vec());
    }

    let values: Vec<Vec<Option<f64>>> = (0..dates.len())
        .map(|row| columns.iter().map(|col| col[row]).collect())
        .collect();

    NormalizedSeries::new(dates, issuers.to_vec(), values).map_err(LoadError::InvalidSeries)
}

/// Source sheets occasionally repeat a header label; suffix repeats so the
/// frame keeps every column addressable.
fn dedupe_headers(headers: &[String]) -> Vec<String> {
    let mut seen: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    headers
        .iter()
        .map(|name| {
            let n = seen.entry(name.clone()).or_insert(0);
            *n += 1;
            if *n == 1 {
                name.clone()
            } else {
                format!("{name}_{n}")
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn extract(headers: &[&str], rows: Vec<Vec<Option<String>>>) -> RawExtract {
        RawExtract {
            sheet: "tarj_vig_tit_emi".into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn clean_extract_passes_through() {
        let raw = extract(
            &["Fecha", "Banco A", "Banco B"],
            vec![
                vec![s("2024-01-01"), s("100"), s("50")],
                vec![s("2024-02-01"), s("110"), s("55")],
            ],
        );
        let (series, warnings) = normalize(&raw).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(series.dates(), &[date(2024, 1, 1), date(2024, 2, 1)]);
        assert_eq!(series.issuers(), &["Banco A".to_string(), "Banco B".to_string()]);
        assert_eq!(series.value(0, 0), Some(100.0));
        assert_eq!(series.value(1, 1), Some(55.0));
    }

    #[test]
    fn rows_without_parseable_dates_are_dropped() {
        let raw = extract(
            &["Fecha", "Banco A"],
            vec![
                vec![s("Fuente: CMF"), s("999")],
                vec![s("2024-01-01"), s("100")],
                vec![None, s("7")],
                vec![s("2024-02-01"), s("110")],
            ],
        );
        let (series, warnings) = normalize(&raw).unwrap();
        assert_eq!(series.len(), 2);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, QualityWarning::UnparseableDateRows { count: 2 })));
    }

    #[test]
    fn non_numeric_cells_become_missing_not_zero() {
        let raw = extract(
            &["Fecha", "Banco A", "Banco B"],
            vec![
                vec![s("2024-01-01"), s("100"), s("n/d")],
                vec![s("2024-02-01"), s("110"), s("55")],
            ],
        );
        let (series, warnings) = normalize(&raw).unwrap();
        assert_eq!(series.value(0, 1), None);
        assert_eq!(series.value(1, 1), Some(55.0));
        assert!(warnings.iter().any(|w| matches!(
            w,
            QualityWarning::NonNumericCells { issuer, count: 1 } if issuer == "Banco B"
        )));
    }

    #[test]
    fn fully_empty_columns_are_dropped() {
        let raw = extract(
            &["Fecha", "Banco A", "column_2"],
            vec![
                vec![s("2024-01-01"), s("100"), None],
                vec![s("2024-02-01"), s("110"), None],
            ],
        );
        let (series, warnings) = normalize(&raw).unwrap();
        assert_eq!(series.issuers(), &["Banco A".to_string()]);
        assert!(warnings.iter().any(|w| matches!(
            w,
            QualityWarning::EmptyColumnsDropped { names } if names == &["column_2".to_string()]
        )));
    }

    #[test]
    fn unsorted_rows_come_out_in_date_order() {
        let raw = extract(
            &["Fecha", "Banco A"],
            vec![
                vec![s("2024-03-01"), s("120")],
                vec![s("2024-01-01"), s("100")],
                vec![s("2024-02-01"), s("110")],
            ],
        );
        let (series, _) = normalize(&raw).unwrap();
        assert_eq!(
            series.dates(),
            &[date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]
        );
        assert_eq!(series.value(0, 0), Some(100.0));
        assert_eq!(series.value(2, 0), Some(120.0));
    }

    #[test]
    fn duplicate_dates_keep_first_occurrence() {
        let raw = extract(
            &["Fecha", "Banco A"],
            vec![
                vec![s("2024-01-01"), s("100")],
                vec![s("2024-01-01"), s("999")],
                vec![s("2024-02-01"), s("110")],
            ],
        );
        let (series, warnings) = normalize(&raw).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.value(0, 0), Some(100.0));
        assert!(warnings
            .iter()
            .any(|w| matches!(w, QualityWarning::DuplicateDates { count: 1 })));
    }

    #[test]
    fn no_parseable_dates_is_a_hard_error() {
        let raw = extract(
            &["Fecha", "Banco A"],
            vec![vec![s("Total"), s("100")], vec![s("Nota"), s("110")]],
        );
        assert!(matches!(
            normalize(&raw),
            Err(LoadError::NoParseableDates(sheet)) if sheet == "tarj_vig_tit_emi"
        ));
    }

    #[test]
    fn all_columns_empty_is_a_hard_error() {
        let raw = extract(
            &["Fecha", "Banco A"],
            vec![vec![s("2024-01-01"), None]],
        );
        assert!(matches!(normalize(&raw), Err(LoadError::NoIssuerColumns(_))));
    }

    #[test]
    fn repeated_header_labels_are_suffixed() {
        assert_eq!(
            dedupe_headers(&["A".into(), "A".into(), "B".into()]),
            vec!["A".to_string(), "A_2".to_string(), "B".to_string()]
        );
    }

    /// Round-tripping a normalized series through a raw extract changes
    /// nothing: same dates, same issuers, same values.
    #[test]
    fn normalization_is_idempotent() {
        let raw = extract(
            &["Fecha", "Banco A", "Banco B"],
            vec![
                vec![s("nota al pie"), None, None],
                vec![s("2024-02-01"), s("110"), None],
                vec![s("2024-01-01"), s("100"), s("50")],
            ],
        );
        let (first, _) = normalize(&raw).unwrap();

        let rows: Vec<Vec<Option<String>>> = first
            .dates()
            .iter()
            .enumerate()
            .map(|(idx, d)| {
                let mut row = vec![s(&d.format("%Y-%m-%d").to_string())];
                row.extend(
                    first
                        .row(idx)
                        .iter()
                        .map(|v| v.map(|v| format!("{v}"))),
                );
                row
            })
            .collect();
        let mut headers = vec!["date".to_string()];
        headers.extend(first.issuers().iter().cloned());
        let roundtrip = RawExtract {
            sheet: "tarj_vig_tit_emi".into(),
            headers,
            rows,
        };

        let (second, warnings) = normalize(&roundtrip).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(second.dates(), first.dates());
        assert_eq!(second.issuers(), first.issuers());
        for di in 0..first.len() {
            assert_eq!(second.row(di), first.row(di));
        }
    }
}
