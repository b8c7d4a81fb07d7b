//! cardlab CLI — load a regulator workbook and render each analysis view.
//!
//! Commands:
//! - `snapshot` — issuer ranking at the latest period
//! - `growth` — absolute/percentage growth between two reference dates
//! - `share-change` — share movement between two reference dates, losers first
//! - `evolution` — one issuer's market share over time
//! - `compare` — long-form slice for a set of issuers
//! - `trailing` — count deltas over the trailing window
//! - `declines` — month-over-month decline flags for one issuer
//! - `waterfall` — latest-period share breakdown with explicit total

use anyhow::{bail, Context, Result};
use cardlab_core::config::{AnalysisConfig, GrowthWindow};
use cardlab_core::data::load_series;
use cardlab_core::domain::NormalizedSeries;
use cardlab_core::metrics;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cardlab",
    about = "Issuer card-count analytics over a regulator workbook"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every view: where the data comes from and how to
/// present it.
#[derive(Args)]
struct LoadArgs {
    /// Path to the regulator workbook (.xlsx).
    file: PathBuf,

    /// Path to a TOML analysis config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sheet name override.
    #[arg(long)]
    sheet: Option<String>,

    /// Leading rows to skip before the header row.
    #[arg(long)]
    skip_rows: Option<usize>,

    /// Show at most this many ranked entries.
    #[arg(long)]
    top: Option<usize>,

    /// Emit the raw result as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

/// Arguments for views comparing two reference dates.
#[derive(Args)]
struct WindowArgs {
    /// Window start (YYYY-MM-DD); requires --end.
    #[arg(long)]
    start: Option<String>,

    /// Window end (YYYY-MM-DD); requires --start.
    #[arg(long)]
    end: Option<String>,

    /// Compare the latest period against this many periods back.
    #[arg(long)]
    periods_back: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Issuer ranking at the latest period.
    Snapshot {
        #[command(flatten)]
        load: LoadArgs,
    },
    /// Absolute and percentage growth between two reference dates.
    Growth {
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Share movement between two reference dates, biggest losers first.
    ShareChange {
        #[command(flatten)]
        load: LoadArgs,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// One issuer's market share over the full series.
    Evolution {
        #[command(flatten)]
        load: LoadArgs,
        /// Issuer to follow (defaults to the config's focus issuer).
        #[arg(long)]
        issuer: Option<String>,
    },
    /// Long-form (date, issuer, value) slice for selected issuers.
    Compare {
        #[command(flatten)]
        load: LoadArgs,
        /// Issuer names to include.
        #[arg(required = true)]
        issuers: Vec<String>,
    },
    /// Count deltas over the trailing window ending at the latest period.
    Trailing {
        #[command(flatten)]
        load: LoadArgs,
        /// Window length in months.
        #[arg(long)]
        months: Option<u32>,
    },
    /// Month-over-month decline flags for one issuer.
    Declines {
        #[command(flatten)]
        load: LoadArgs,
        /// Issuer to check (defaults to the config's focus issuer).
        #[arg(long)]
        issuer: Option<String>,
    },
    /// Latest-period share breakdown with an explicit 100% total.
    Waterfall {
        #[command(flatten)]
        load: LoadArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot { load } => {
            let (config, series) = load_view(&load)?;
            let ranking = metrics::latest_ranking(&series)?;
            if load.json {
                return print_json(&ranking);
            }
            println!("Issuers by card count at {}", ranking.date);
            println!("{:<40} {:>14}", "Issuer", "Cards");
            println!("{}", "-".repeat(55));
            for entry in top(&ranking.entries, &load, &config) {
                println!("{:<40} {:>14.0}", entry.issuer, entry.count);
            }
            Ok(())
        }
        Commands::Growth { load, window } => {
            let (config, series) = load_view(&load)?;
            let (start, end) = resolve_window(&config, &window, &series)?;
            let growth = metrics::growth_between(&series, start, end)?;
            if load.json {
                return print_json(&growth);
            }
            println!("Growth {} to {}", growth.start, growth.end);
            println!(
                "{:<40} {:>12} {:>12} {:>10}",
                "Issuer", "From", "To", "Growth %"
            );
            println!("{}", "-".repeat(78));
            for entry in top(&growth.entries, &load, &config) {
                println!(
                    "{:<40} {:>12.0} {:>12.0} {:>9.2}%",
                    entry.issuer, entry.start_value, entry.end_value, entry.percent
                );
            }
            for issuer in &growth.zero_base {
                eprintln!("note: '{issuer}' started from zero; percentage growth undefined");
            }
            Ok(())
        }
        Commands::ShareChange { load, window } => {
            let (config, series) = load_view(&load)?;
            let (start, end) = resolve_window(&config, &window, &series)?;
            let ranking = metrics::share_change(&series, start, end)?;
            if load.json {
                return print_json(&ranking);
            }
            println!(
                "Share change {} to {} (losers first)",
                ranking.start, ranking.end
            );
            println!(
                "{:<40} {:>10} {:>10} {:>10}",
                "Issuer", "From %", "To %", "Change pp"
            );
            println!("{}", "-".repeat(74));
            for entry in top(&ranking.entries, &load, &config) {
                println!(
                    "{:<40} {:>10.2} {:>10.2} {:>+10.2}",
                    entry.issuer, entry.start_share_pct, entry.end_share_pct, entry.change_pp
                );
            }
            Ok(())
        }
        Commands::Evolution { load, issuer } => {
            let (config, series) = load_view(&load)?;
            let issuer = focus_issuer(issuer, &config)?;
            let evolution = metrics::share_evolution(&series, &issuer)?;
            if load.json {
                return print_json(&evolution);
            }
            println!("Market share of '{}'", evolution.issuer);
            println!("{:<12} {:>10}", "Period", "Share %");
            println!("{}", "-".repeat(23));
            for point in &evolution.points {
                println!("{:<12} {:>10.2}", point.date, point.share_pct);
            }
            Ok(())
        }
        Commands::Compare { load, issuers } => {
            let (_, series) = load_view(&load)?;
            let points = metrics::comparison_slice(&series, &issuers)?;
            if load.json {
                return print_json(&points);
            }
            println!("{:<12} {:<40} {:>14}", "Period", "Issuer", "Cards");
            println!("{}", "-".repeat(68));
            for point in &points {
                println!(
                    "{:<12} {:<40} {:>14.0}",
                    point.date, point.issuer, point.value
                );
            }
            Ok(())
        }
        Commands::Trailing { load, months } => {
            let (config, series) = load_view(&load)?;
            let months = months.unwrap_or(config.trailing_months);
            let trailing = metrics::trailing_growth(&series, months)?;
            if load.json {
                return print_json(&trailing);
            }
            match (trailing.first_obs, trailing.last_obs) {
                (Some(first), Some(last)) if !trailing.entries.is_empty() => {
                    println!("Card count change, {first} to {last} ({months}-month window)");
                    println!("{:<40} {:>12} {:>12} {:>12}", "Issuer", "From", "To", "Delta");
                    println!("{}", "-".repeat(80));
                    for entry in top(&trailing.entries, &load, &config) {
                        println!(
                            "{:<40} {:>12.0} {:>12.0} {:>+12.0}",
                            entry.issuer, entry.first_value, entry.last_value, entry.delta
                        );
                    }
                }
                _ => println!(
                    "Not enough data: fewer than two observations in the last {months} months."
                ),
            }
            Ok(())
        }
        Commands::Declines { load, issuer } => {
            let (config, series) = load_view(&load)?;
            let issuer = focus_issuer(issuer, &config)?;
            let report = metrics::monthly_declines(&series, &issuer)?;
            if load.json {
                return print_json(&report);
            }
            println!("Month-over-month declines for '{}'", report.issuer);
            if report.flagged.is_empty() {
                println!("No declining periods.");
                return Ok(());
            }
            println!("{:<12} {:>14} {:>12}", "Period", "Cards", "Delta");
            println!("{}", "-".repeat(40));
            for point in report.points.iter().filter(|p| p.declined) {
                let value = point.value.unwrap_or(f64::NAN);
                let delta = point.delta.unwrap_or(f64::NAN);
                println!("{:<12} {:>14.0} {:>+12.0}", point.date, value, delta);
            }
            Ok(())
        }
        Commands::Waterfall { load } => {
            let (config, series) = load_view(&load)?;
            let waterfall = metrics::share_waterfall(&series)?;
            if load.json {
                return print_json(&waterfall);
            }
            println!("Market share breakdown at {}", waterfall.date);
            println!("{:<40} {:>14} {:>10}", "Issuer", "Cards", "Share %");
            println!("{}", "-".repeat(66));
            for segment in top(&waterfall.segments, &load, &config) {
                println!(
                    "{:<40} {:>14.0} {:>10.2}",
                    segment.issuer, segment.count, segment.share_pct
                );
            }
            println!("{}", "-".repeat(66));
            println!(
                "{:<40} {:>14.0} {:>10.2}",
                "Total", waterfall.total_count, waterfall.total_pct
            );
            Ok(())
        }
    }
}

/// Build the effective config and load the series, sending quality
/// warnings to stderr so tables stay clean on stdout.
fn load_view(load: &LoadArgs) -> Result<(AnalysisConfig, NormalizedSeries)> {
    let mut config = match &load.config {
        Some(path) => AnalysisConfig::from_file(path).map_err(|e| anyhow::anyhow!(e))?,
        None => AnalysisConfig::default(),
    };
    if let Some(sheet) = &load.sheet {
        config.sheet_name = sheet.clone();
    }
    if let Some(skip) = load.skip_rows {
        config.skip_rows = skip;
    }

    let (series, warnings) = load_series(&load.file, &config)
        .with_context(|| format!("loading {}", load.file.display()))?;
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    Ok((config, series))
}

/// Pick the two reference dates: explicit flags beat the config.
fn resolve_window(
    config: &AnalysisConfig,
    window: &WindowArgs,
    series: &NormalizedSeries,
) -> Result<(NaiveDate, NaiveDate)> {
    let chosen = match (&window.start, &window.end, window.periods_back) {
        (Some(_), Some(_), Some(_)) => {
            bail!("--periods-back and --start/--end are mutually exclusive")
        }
        (Some(start), Some(end), None) => GrowthWindow::Explicit {
            start: parse_date(start)?,
            end: parse_date(end)?,
        },
        (None, None, Some(periods)) => GrowthWindow::PeriodsBack { periods },
        (None, None, None) => config.growth_window.clone(),
        _ => bail!("--start and --end must be given together"),
    };
    Ok(chosen.resolve(series)?)
}

fn focus_issuer(flag: Option<String>, config: &AnalysisConfig) -> Result<String> {
    flag.or_else(|| config.focus_issuer.clone()).ok_or_else(|| {
        anyhow::anyhow!("no issuer selected: pass --issuer or set focus_issuer in the config")
    })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn top<'a, T>(entries: &'a [T], load: &LoadArgs, config: &AnalysisConfig) -> &'a [T] {
    let n = load.top.unwrap_or(config.top_n);
    &entries[..entries.len().min(n)]
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
