// src/pipeline/audit.rs

//! Resource URL audit: extract → check → report.

use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, ValidationReport};
use crate::services::reporter::{log_report, persist_reports, summarize};
use crate::services::{UrlChecker, extract_urls};
use crate::utils::console;

use super::load::load_feed;

/// Audit every `rom` URL in the configured feed and persist the reports.
pub async fn run_audit(config: &Config) -> Result<ValidationReport> {
    console::header("Starting ROM URL validation");

    let feed = load_feed(&config.paths.feed_path()).await?;

    log::info!("Extracting ROM URLs...");
    let records = extract_urls(&feed.document);
    log::info!("Found {} ROM URLs to validate", records.len());
    log::info!("Starting validation (this may take a while)...");

    let checker = UrlChecker::new(&config.checker)?;
    let verdicts = checker
        .check_all(
            &records,
            config.checker.max_concurrent,
            Duration::from_secs(config.checker.timeout_secs),
        )
        .await;

    let report = summarize(&verdicts, Utc::now());
    log_report(&report);
    persist_reports(
        &report,
        &config.paths.invalid_urls_path(),
        &config.paths.report_path(),
    )
    .await?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_run_audit_writes_reports() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok.nes"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/gone.nes"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.build_dir = tmp.path().to_path_buf();
        config.checker.batch_delay_ms = 0;

        let feed = json!({
            "title": "NES",
            "categories": [{
                "title": "A",
                "items": [
                    {"rom": format!("{}/ok.nes", server.uri())},
                    {"rom": format!("{}/gone.nes", server.uri())}
                ]
            }]
        });
        tokio::fs::write(config.paths.feed_path(), feed.to_string())
            .await
            .unwrap();

        let report = run_audit(&config).await.unwrap();

        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.valid, 1);
        assert_eq!(report.summary.success_rate_percent, 50.0);

        let invalid: Value = serde_json::from_slice(
            &tokio::fs::read(config.paths.invalid_urls_path()).await.unwrap(),
        )
        .unwrap();
        assert_eq!(invalid[0]["path"], "categories[0].items[1].rom");
        assert_eq!(invalid[0]["error"], "HTTP 410");
        assert!(config.paths.report_path().exists());
    }

    #[tokio::test]
    async fn test_run_audit_missing_feed_fails() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.build_dir = tmp.path().to_path_buf();

        assert!(run_audit(&config).await.is_err());
        assert!(!config.paths.report_path().exists());
    }
}
