// src/services/checker.rs

//! URL liveness checker.
//!
//! Checks resource URLs in fixed-size batches. Every request in a batch runs
//! concurrently and the batch is joined before the next one starts, with a
//! cooldown in between so third-party hosts see a bounded request rate.

use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{CheckFailure, CheckVerdict, CheckerConfig, UrlRecord};
use crate::utils::http::create_checker_client;
use crate::utils::parse_http_url;

/// Service for checking resource URL reachability.
#[derive(Clone)]
pub struct UrlChecker {
    client: Client,
    batch_delay: Duration,
}

impl UrlChecker {
    /// Create a checker with a client built from configuration.
    pub fn new(config: &CheckerConfig) -> Result<Self> {
        let client = create_checker_client(config)?;
        Ok(Self::with_client(
            client,
            Duration::from_millis(config.batch_delay_ms),
        ))
    }

    /// Create a checker around an existing client.
    pub fn with_client(client: Client, batch_delay: Duration) -> Self {
        Self {
            client,
            batch_delay,
        }
    }

    /// Check every record, returning exactly one verdict per record in input order.
    pub async fn check_all(
        &self,
        records: &[UrlRecord],
        concurrency_limit: usize,
        timeout: Duration,
    ) -> Vec<CheckVerdict> {
        let batch_size = concurrency_limit.max(1);
        let batch_count = records.len().div_ceil(batch_size);
        let mut verdicts = Vec::with_capacity(records.len());

        for (index, batch) in records.chunks(batch_size).enumerate() {
            log::info!(
                "Processing batch {}/{} ({} URLs)...",
                index + 1,
                batch_count,
                batch.len()
            );

            let results = join_all(batch.iter().map(|record| self.check_one(record, timeout))).await;
            for verdict in &results {
                log_verdict(verdict);
            }
            verdicts.extend(results);

            if index + 1 < batch_count && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        verdicts
    }

    /// Check a single record. Never fails; problems become an invalid verdict.
    pub async fn check_one(&self, record: &UrlRecord, timeout: Duration) -> CheckVerdict {
        let url = match parse_http_url(&record.url) {
            Ok(url) => url,
            Err(reason) => {
                return CheckVerdict::invalid(
                    record.clone(),
                    CheckFailure::MalformedUrl,
                    None,
                    AppError::malformed_url(reason).to_string(),
                );
            }
        };

        match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => {
                let code = response.status().as_u16();
                if (200..=399).contains(&code) {
                    CheckVerdict::valid(record.clone(), code)
                } else {
                    CheckVerdict::invalid(
                        record.clone(),
                        CheckFailure::HttpStatus,
                        Some(code),
                        format!("HTTP {code}"),
                    )
                }
            }
            Err(e) if e.is_timeout() => {
                CheckVerdict::invalid(record.clone(), CheckFailure::Timeout, None, "Timeout")
            }
            Err(e) => CheckVerdict::invalid(
                record.clone(),
                CheckFailure::Network,
                None,
                AppError::network(error_chain(&e)).to_string(),
            ),
        }
    }
}

fn log_verdict(verdict: &CheckVerdict) {
    let path = &verdict.record.location_path;
    match (&verdict.status_code, &verdict.error_detail) {
        (Some(code), None) => log::info!("✓ {}: {}", path, code),
        (_, Some(detail)) => log::warn!("✗ {}: {}", path, detail),
        (None, None) => log::warn!("✗ {}: unknown", path),
    }
}

/// Join an error with its sources; reqwest's top-level message hides the cause.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn checker() -> UrlChecker {
        let config = CheckerConfig {
            batch_delay_ms: 0,
            ..CheckerConfig::default()
        };
        UrlChecker::new(&config).unwrap()
    }

    async fn server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.rom"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/moved.rom"))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/gone.rom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing.rom"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow.rom"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_mixed_batch() {
        let server = server().await;
        let records = vec![
            UrlRecord::new(format!("{}/a.rom", server.uri()), "categories[0].items[0].rom"),
            UrlRecord::new("not a url", "categories[0].items[1].rom"),
            UrlRecord::new("http://127.0.0.1:1/b.rom", "categories[0].items[2].rom"),
        ];

        let verdicts = checker()
            .check_all(&records, 2, Duration::from_secs(5))
            .await;

        assert_eq!(verdicts.len(), 3);
        assert_eq!(verdicts[0].outcome, Outcome::Valid);
        assert_eq!(verdicts[0].status_code, Some(200));

        assert_eq!(verdicts[1].outcome, Outcome::Invalid);
        assert_eq!(verdicts[1].failure, Some(CheckFailure::MalformedUrl));
        assert!(verdicts[1].error_detail.as_deref().unwrap().starts_with("Invalid URL"));

        assert_eq!(verdicts[2].outcome, Outcome::Invalid);
        assert_eq!(verdicts[2].failure, Some(CheckFailure::Network));

        for (verdict, record) in verdicts.iter().zip(&records) {
            assert_eq!(&verdict.record, record);
        }
    }

    #[tokio::test]
    async fn test_status_classification() {
        let server = server().await;
        let checker = checker();
        let timeout = Duration::from_secs(5);

        let moved = UrlRecord::new(format!("{}/moved.rom", server.uri()), "moved");
        let verdict = checker.check_one(&moved, timeout).await;
        assert_eq!(verdict.outcome, Outcome::Valid);
        assert_eq!(verdict.status_code, Some(302));

        let missing = UrlRecord::new(format!("{}/missing.rom", server.uri()), "missing");
        let verdict = checker.check_one(&missing, timeout).await;
        assert_eq!(verdict.outcome, Outcome::Invalid);
        assert_eq!(verdict.failure, Some(CheckFailure::HttpStatus));
        assert_eq!(verdict.error_detail.as_deref(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = server().await;
        let slow = UrlRecord::new(format!("{}/slow.rom", server.uri()), "slow");

        let verdict = checker()
            .check_one(&slow, Duration::from_millis(200))
            .await;

        assert_eq!(verdict.outcome, Outcome::Invalid);
        assert_eq!(verdict.failure, Some(CheckFailure::Timeout));
        assert_eq!(verdict.error_detail.as_deref(), Some("Timeout"));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_malformed() {
        let record = UrlRecord::new("ftp://files.example/a.rom", "ftp");
        let verdict = checker().check_one(&record, Duration::from_secs(1)).await;
        assert_eq!(verdict.failure, Some(CheckFailure::MalformedUrl));
    }

    #[tokio::test]
    async fn test_one_verdict_per_record() {
        let records: Vec<UrlRecord> = (0..7)
            .map(|i| UrlRecord::new(format!("bad url {i}"), format!("items[{i}].rom")))
            .collect();

        let verdicts = checker()
            .check_all(&records, 3, Duration::from_secs(1))
            .await;

        assert_eq!(verdicts.len(), 7);
        assert!(verdicts.iter().all(|v| v.outcome == Outcome::Invalid));
        assert_eq!(verdicts[6].record.location_path, "items[6].rom");
    }

    #[tokio::test]
    async fn test_batches_run_concurrently_with_cooldown_between() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;

        let records: Vec<UrlRecord> = (0..4)
            .map(|i| UrlRecord::new(format!("{}/{i}.rom", server.uri()), format!("items[{i}].rom")))
            .collect();
        let checker = UrlChecker::with_client(Client::new(), Duration::from_millis(400));

        let started = std::time::Instant::now();
        let verdicts = checker
            .check_all(&records, 2, Duration::from_secs(5))
            .await;
        let elapsed = started.elapsed();

        assert!(verdicts.iter().all(CheckVerdict::is_valid));
        assert_eq!(verdicts[3].record.location_path, "items[3].rom");
        // two batches of 300ms plus one cooldown, none after the last batch
        assert!(elapsed >= Duration::from_millis(1000), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(1400), "{elapsed:?}");

        let requests = server.received_requests().await.unwrap_or_default();
        assert_eq!(requests.len(), 4);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let verdicts = checker().check_all(&[], 5, Duration::from_secs(1)).await;
        assert!(verdicts.is_empty());
    }
}
