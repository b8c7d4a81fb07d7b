//! End-to-end: write a regulator-shaped workbook, load it, run the views.

use cardlab_core::config::{AnalysisConfig, GrowthWindow};
use cardlab_core::data::{load_series, QualityWarning};
use cardlab_core::error::LoadError;
use cardlab_core::metrics;
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use std::path::PathBuf;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A small workbook with the CMF extract's shape: three subtitle rows, a
/// header row, then monthly observations with some junk mixed in.
fn write_fixture(dir: &tempfile::TempDir) -> PathBuf {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("tarj_vig_tit_emi").unwrap();

    sheet
        .write_string(0, 0, "Tarjetas de crédito vigentes por emisor")
        .unwrap();
    sheet.write_string(1, 0, "Fuente: CMF").unwrap();
    // Row 2 left blank on purpose (subtitle spacing row).

    sheet.write_string(3, 0, "Fecha").unwrap();
    sheet.write_string(3, 1, "Banco A").unwrap();
    sheet.write_string(3, 2, "Banco B").unwrap();
    sheet.write_string(3, 3, "Banco C").unwrap();

    // Clean observation.
    sheet.write_string(4, 0, "2023-02-01").unwrap();
    sheet.write_number(4, 1, 100.0).unwrap();
    sheet.write_number(4, 2, 900.0).unwrap();

    // Footer-style junk row: no parseable date.
    sheet.write_string(5, 0, "Total sistema").unwrap();
    sheet.write_number(5, 1, 999.0).unwrap();
    sheet.write_number(5, 2, 999.0).unwrap();

    // Observation with a non-numeric cell.
    sheet.write_string(6, 0, "2024-02-01").unwrap();
    sheet.write_number(6, 1, 120.0).unwrap();
    sheet.write_string(6, 2, "n/d").unwrap();

    // Latest observation.
    sheet.write_string(7, 0, "2025-02-01").unwrap();
    sheet.write_number(7, 1, 96.0).unwrap();
    sheet.write_number(7, 2, 1104.0).unwrap();

    let path = dir.path().join("cmf.xlsx");
    workbook.save(&path).unwrap();
    path
}

#[test]
fn loads_and_normalizes_a_regulator_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);

    let config = AnalysisConfig::default();
    let (series, warnings) = load_series(&path, &config).unwrap();

    assert_eq!(
        series.dates(),
        &[date(2023, 2, 1), date(2024, 2, 1), date(2025, 2, 1)]
    );
    // Banco C never has a value and is dropped.
    assert_eq!(
        series.issuers(),
        &["Banco A".to_string(), "Banco B".to_string()]
    );
    // The junk row is gone, the bad cell is missing (not zero).
    assert_eq!(series.value(0, 0), Some(100.0));
    assert_eq!(series.value(1, 1), None);

    assert!(warnings
        .iter()
        .any(|w| matches!(w, QualityWarning::UnparseableDateRows { count: 1 })));
    assert!(warnings.iter().any(|w| matches!(
        w,
        QualityWarning::EmptyColumnsDropped { names } if names == &["Banco C".to_string()]
    )));
    assert!(warnings.iter().any(|w| matches!(
        w,
        QualityWarning::NonNumericCells { issuer, count: 1 } if issuer == "Banco B"
    )));
}

#[test]
fn views_compose_over_the_loaded_series() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);
    let (series, _) = load_series(&path, &AnalysisConfig::default()).unwrap();

    let ranking = metrics::latest_ranking(&series).unwrap();
    assert_eq!(ranking.entries[0].issuer, "Banco B");
    assert_eq!(ranking.entries[0].count, 1104.0);

    let window = GrowthWindow::Explicit {
        start: date(2023, 2, 1),
        end: date(2025, 2, 1),
    };
    let (start, end) = window.resolve(&series).unwrap();
    let growth = metrics::growth_between(&series, start, end).unwrap();
    let a = growth.entries.iter().find(|e| e.issuer == "Banco A").unwrap();
    assert_eq!(a.absolute, -4.0);
    assert!((a.percent + 4.0).abs() < 1e-9);

    // A: 100/1000 = 10% then 96/1200 = 8%: two points of share lost.
    let share = metrics::share_change(&series, start, end).unwrap();
    assert_eq!(share.entries[0].issuer, "Banco A");
    assert!((share.entries[0].change_pp + 2.0).abs() < 1e-9);

    let waterfall = metrics::share_waterfall(&series).unwrap();
    assert!((waterfall.total_pct - 100.0).abs() < 0.01);
}

#[test]
fn missing_sheet_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);

    let config = AnalysisConfig {
        sheet_name: "otra_hoja".into(),
        ..Default::default()
    };
    assert!(matches!(
        load_series(&path, &config),
        Err(LoadError::SheetMissing(name)) if name == "otra_hoja"
    ));
}

#[test]
fn unreadable_file_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not_a_workbook.xlsx");
    std::fs::write(&path, b"plain text, not a zip archive").unwrap();

    assert!(matches!(
        load_series(&path, &AnalysisConfig::default()),
        Err(LoadError::Workbook(_))
    ));
}

#[test]
fn reference_date_outside_the_data_reports_date_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&dir);
    let (series, _) = load_series(&path, &AnalysisConfig::default()).unwrap();

    let window = GrowthWindow::Explicit {
        start: date(2020, 1, 1),
        end: date(2025, 2, 1),
    };
    assert!(matches!(
        window.resolve(&series),
        Err(cardlab_core::MetricError::DateNotFound(d)) if d == date(2020, 1, 1)
    ));
}
