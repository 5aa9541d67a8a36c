// src/pipeline/pipeline.rs

use crate::error::Result;
use crate::models::Config;
use crate::storage::TreeStore;
use crate::utils::console;

use super::audit::run_audit;
use super::publish::run_publish;
use super::sanitize::run_sanitize;

/// Which optional stages to skip.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub skip_audit: bool,
    pub skip_publish: bool,
}

/// Run the full pipeline: Sanitize → Audit → Publish.
///
/// `store` is only required when publishing.
pub async fn run_pipeline(
    config: &Config,
    store: Option<&dyn TreeStore>,
    options: PipelineOptions,
) -> Result<()> {
    console::header("Starting feed pipeline");

    let total_steps = 1 + usize::from(!options.skip_audit) + usize::from(!options.skip_publish);
    let mut current_step = 1;

    console::step(current_step, total_steps, "Sanitize - Replacing forbidden keys");
    run_sanitize(config).await?;
    current_step += 1;

    if !options.skip_audit {
        console::step(current_step, total_steps, "Audit - Checking ROM URLs");
        run_audit(config).await?;
        current_step += 1;
    }

    if !options.skip_publish {
        console::step(current_step, total_steps, "Publish - Uploading feed");
        match store {
            Some(store) => {
                run_publish(config, store).await?;
            }
            None => log::warn!("No store configured; skipping publish"),
        }
    }

    log::info!("Pipeline complete!");

    Ok(())
}
