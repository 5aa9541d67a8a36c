// src/services/reporter.rs

//! Audit report aggregation and persistence.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{CheckVerdict, InvalidEntry, ReportSummary, ValidationReport};
use crate::utils::console;
use crate::utils::fs::save_json;

/// Aggregate verdicts into a report. Invalid entries keep verdict order.
pub fn summarize(verdicts: &[CheckVerdict], timestamp: DateTime<Utc>) -> ValidationReport {
    let total = verdicts.len();
    let valid = verdicts.iter().filter(|v| v.is_valid()).count();

    let invalid_urls = verdicts
        .iter()
        .filter(|v| !v.is_valid())
        .map(|v| InvalidEntry {
            path: v.record.location_path.clone(),
            url: v.record.url.clone(),
            error: v
                .error_detail
                .clone()
                .unwrap_or_else(|| "unknown error".to_string()),
        })
        .collect();

    ValidationReport {
        timestamp,
        summary: ReportSummary {
            total,
            valid,
            invalid: total - valid,
            success_rate_percent: success_rate(valid, total),
        },
        invalid_urls,
    }
}

/// `valid / total` as a percentage with one decimal; 0 when there is nothing to rate.
pub fn success_rate(valid: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let percent = valid as f64 / total as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

/// Print the terminal summary and enumerate invalid URLs.
pub fn log_report(report: &ValidationReport) {
    console::header("VALIDATION REPORT");
    console::summary(
        "URL audit",
        &[
            ("Total URLs", report.summary.total.to_string()),
            ("Valid URLs", report.summary.valid.to_string()),
            ("Invalid URLs", report.summary.invalid.to_string()),
            (
                "Success Rate",
                format!("{:.1}%", report.summary.success_rate_percent),
            ),
        ],
    );

    if report.invalid_urls.is_empty() {
        return;
    }

    console::separator();
    log::warn!("INVALID URLS:");
    for (index, entry) in report.invalid_urls.iter().enumerate() {
        log::warn!("{}. {}", index + 1, entry.path);
        console::sub_item(&format!("URL: {}", entry.url));
        console::sub_item(&format!("Error: {}", entry.error));
    }
}

/// Write the invalid URL list and the full report.
pub async fn persist_reports(
    report: &ValidationReport,
    invalid_urls_path: &Path,
    report_path: &Path,
) -> Result<()> {
    save_json(invalid_urls_path, &report.invalid_urls).await?;
    log::info!("Invalid URLs saved to: {}", invalid_urls_path.display());

    save_json(report_path, report).await?;
    log::info!("Full report saved to: {}", report_path.display());
    Ok(())
}
