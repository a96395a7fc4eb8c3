// SPDX-FileCopyrightText: 2026 SendVision Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sendvision stats` command implementation.
//!
//! Opens a monitoring dashboard over the export for the requested window
//! and prints the live statistics tiles plus both chart breakdowns.

use std::io::IsTerminal;
use std::path::Path;

use chrono::{Days, NaiveDate, Utc};
use sendvision_config::SendvisionConfig;
use sendvision_core::{SendvisionError, TimeRange};
use sendvision_dashboard::{Dashboard, DashboardOptions, View};
use sendvision_stats::{AggregateResult, Breakdown, Category};
use serde::Serialize;

use crate::export::load_source;

/// One entry of a chart.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Slice {
    pub category: Category,
    pub count: u64,
}

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub range: TimeRange,
    pub records: usize,
    pub live: AggregateResult,
    pub permission: Vec<Slice>,
    pub overall: Vec<Slice>,
}

fn slices(breakdown: Breakdown) -> Vec<Slice> {
    breakdown
        .into_iter()
        .map(|(category, count)| Slice { category, count })
        .collect()
}

/// Fills in whichever bound the user left out: `from` defaults to
/// `window_days` before today, `to` defaults to today.
pub fn resolve_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
    window_days: u32,
) -> Result<TimeRange, SendvisionError> {
    let from = match from {
        Some(from) => from,
        None => today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN),
    };
    TimeRange::between(from, to.unwrap_or(today))
}

/// Loads the export and computes the report for `range`.
pub async fn build_report(
    config: &SendvisionConfig,
    records: &Path,
    range: TimeRange,
) -> Result<StatsReport, SendvisionError> {
    let source = load_source(&config.source.collection, records).await?;
    let dashboard = Dashboard::open(
        source,
        View::Monitor { range },
        DashboardOptions::from_config(config),
    )
    .await?;
    let snapshot = dashboard.ready().await?;
    let live = dashboard.get_aggregates();
    let report = StatsReport {
        range,
        records: snapshot.len(),
        live: (*live).clone(),
        permission: slices(live.permission_breakdown()),
        overall: slices(live.overall_breakdown()),
    };
    dashboard.close().await;
    Ok(report)
}

/// Run the `sendvision stats` command.
pub async fn run_stats(
    config: &SendvisionConfig,
    records: &Path,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    json: bool,
    plain: bool,
) -> Result<(), SendvisionError> {
    let today = Utc::now().date_naive();
    let range = resolve_range(from, to, today, config.dashboard.default_window_days)?;
    let report = build_report(config, records, range).await?;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| SendvisionError::Internal(format!("failed to encode report: {e}")))?;
        println!("{out}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_report(&report, use_color);
    }
    Ok(())
}

fn print_report(report: &StatsReport, use_color: bool) {
    println!();
    println!("  sendvision stats {}", report.range);
    println!("  {}", "-".repeat(35));
    for (category, count) in report.live.live_stats() {
        let label = format!("{category}:");
        if use_color && count > 0 {
            use colored::Colorize;
            println!("    {label:<16}{}", count.to_string().bold());
        } else {
            println!("    {label:<16}{count}");
        }
    }
    println!("    {:<16}{}", "Records:", report.records);
    print_chart("Status", &report.permission);
    print_chart("Flags", &report.overall);
    println!();
}

fn print_chart(title: &str, slices: &[Slice]) {
    println!();
    println!("  {title}");
    if slices.is_empty() {
        println!("    (no data)");
        return;
    }
    let total: u64 = slices.iter().map(|s| s.count).sum();
    for slice in slices {
        let pct = slice.count as f64 * 100.0 / total as f64;
        println!(
            "    {:<16}{:>5}  {pct:>5.1}%",
            format!("{}:", slice.category),
            slice.count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_window_is_last_week_through_today() {
        let range = resolve_range(None, None, day(2024, 5, 10), 7).unwrap();
        assert_eq!(range.from, Some(day(2024, 5, 3)));
        assert_eq!(range.to, Some(day(2024, 5, 10)));
    }

    #[test]
    fn explicit_bounds_win() {
        let range = resolve_range(Some(day(2024, 1, 1)), None, day(2024, 5, 10), 7).unwrap();
        assert_eq!(range.from, Some(day(2024, 1, 1)));
        assert_eq!(range.to, Some(day(2024, 5, 10)));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = resolve_range(Some(day(2024, 5, 10)), Some(day(2024, 5, 1)), day(2024, 5, 10), 7)
            .unwrap_err();
        assert!(matches!(err, SendvisionError::Validation { .. }));
    }

    #[tokio::test]
    async fn report_counts_export_in_window() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "created_at": "2024-05-01T08:00:00Z", "permission": "Approval", "escalation": true}},
                {{"id": 2, "created_at": "2024-05-02T23:59:59Z", "permission": null}},
                {{"id": 3, "created_at": "2024-05-03T00:00:00Z", "permission": "Objection"}}
            ]"#
        )
        .unwrap();

        let range = TimeRange::between(day(2024, 5, 1), day(2024, 5, 2)).unwrap();
        let report = build_report(&SendvisionConfig::default(), file.path(), range)
            .await
            .unwrap();

        assert_eq!(report.records, 2);
        assert_eq!(report.live.get(Category::Approval), 1);
        assert_eq!(report.live.get(Category::Waiting), 1);
        assert_eq!(report.live.get(Category::Objection), 0);
        assert_eq!(
            report.overall,
            vec![Slice {
                category: Category::Escalation,
                count: 1
            }]
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["live"]["Approval"], 1);
        assert_eq!(json["permission"][0]["category"], "Approval");
    }
}
