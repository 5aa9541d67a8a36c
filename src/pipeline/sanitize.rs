// src/pipeline/sanitize.rs

//! In-place key sanitization with backup and rollback.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::services::{KeySanitizer, SanitizeOutcome};
use crate::utils::console;
use crate::utils::fs::{copy_durable, write_atomic};

/// Sanitize the configured feed file in place.
pub async fn run_sanitize(config: &Config) -> Result<SanitizeOutcome> {
    console::header("Replacing store-incompatible keys");

    let sanitizer = KeySanitizer::new(&config.sanitize.rules)?;
    let outcome = sanitize_file(
        &sanitizer,
        &config.paths.feed_path(),
        &config.paths.backup_path(),
    )
    .await?;

    let mut items: Vec<(&str, String)> = outcome
        .counts
        .iter()
        .map(|c| {
            (
                "Rule",
                format!(
                    "\"{}\" → \"{}\": {} instances",
                    c.rule.forbidden, c.rule.replacement, c.matches
                ),
            )
        })
        .collect();
    items.push(("Total replacements", outcome.total_matches().to_string()));
    console::summary("Key replacement", &items);

    Ok(outcome)
}

/// Back up `input`, rewrite it, and restore the backup if anything fails.
pub async fn sanitize_file(
    sanitizer: &KeySanitizer,
    input: &Path,
    backup: &Path,
) -> Result<SanitizeOutcome> {
    log::info!("Reading JSON file {}...", input.display());
    let bytes = tokio::fs::read(input).await?;

    log::info!("Creating backup...");
    write_atomic(backup, &bytes).await?;
    log::info!("Backup created: {}", backup.display());

    match rewrite(sanitizer, input, &bytes).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            log::error!("Sanitization failed: {}", e);
            log::info!("Restoring from backup...");
            copy_durable(backup, input).await?;
            log::info!("Backup restored successfully.");
            Err(e)
        }
    }
}

async fn rewrite(sanitizer: &KeySanitizer, input: &Path, bytes: &[u8]) -> Result<SanitizeOutcome> {
    let raw = std::str::from_utf8(bytes).map_err(|e| {
        AppError::validation(format!("{} is not valid UTF-8: {e}", input.display()))
    })?;

    log::info!("Replacing store-incompatible keys...");
    let outcome = sanitizer.sanitize(raw)?;
    for count in &outcome.counts {
        log::info!(
            "Replaced {} instances of \"{}\" with \"{}\"",
            count.matches,
            count.rule.forbidden,
            count.rule.replacement
        );
    }
    log::info!("JSON validation passed!");

    if outcome.total_matches() == 0 {
        log::info!("No forbidden keys found; {} left unchanged", input.display());
        return Ok(outcome);
    }

    log::info!("Writing modified JSON to {}...", input.display());
    write_atomic(input, outcome.text.as_bytes()).await?;
    log::info!("Successfully replaced store-incompatible keys!");
    Ok(outcome)
}
