//! `generate` and `sources` command handlers.

use std::sync::Arc;

use alphaleads_core::{AppConfig, SearchCriteria};
use alphaleads_pipeline::{leads_to_csv, source_statuses, LeadPipeline, PipelineResult};

use crate::OutputFormat;

#[derive(Debug, Clone, Copy)]
pub(crate) struct GenerateOptions {
    pub format: OutputFormat,
    pub validate: bool,
    pub save: bool,
}

/// Runs one pipeline generation and prints the result to stdout.
///
/// # Errors
///
/// Returns an error if adapters cannot be built, `--save` is given without a
/// reachable database, or the criteria are rejected.
pub(crate) async fn run_generate(
    config: &AppConfig,
    criteria: &SearchCriteria,
    options: GenerateOptions,
) -> anyhow::Result<()> {
    let mut pipeline = LeadPipeline::from_config(config)?;
    if !options.validate {
        pipeline = pipeline.without_validation();
    }
    if options.save {
        let pool = alphaleads_db::connect_pool_from_config(config).await?;
        alphaleads_db::run_migrations(&pool).await?;
        pipeline = pipeline.with_store(Arc::new(alphaleads_db::PgLeadStore::new(pool)));
    }

    let result = pipeline.generate_leads(criteria).await;
    if !result.success {
        anyhow::bail!(
            "lead generation failed: {}",
            result.error.as_deref().unwrap_or("invalid search criteria")
        );
    }

    println!("{}", render(&result, options.format)?);
    Ok(())
}

pub(crate) fn render(result: &PipelineResult, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(result)?,
        OutputFormat::Csv => leads_to_csv(&result.leads),
    })
}

pub(crate) fn print_sources(config: &AppConfig) {
    for status in source_statuses(config) {
        let state = if status.enabled { "enabled" } else { "disabled" };
        println!("{:<14} {:<9} {}", status.name, state, status.description);
        if let Some(hint) = status.recommendation {
            println!("{:<14} {:<9} -> {hint}", "", "");
        }
    }
}
