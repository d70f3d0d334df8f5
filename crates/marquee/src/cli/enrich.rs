//! Enrichment command handler.

use marquee::{
    ConfigError, ConfigErrorKind, JsonError, MarqueeConfig, MarqueeResult, Pipeline, RunSettings,
    WorkItem, parse_work_items,
};
use std::path::PathBuf;

/// Options for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Files holding work items
    pub items: Vec<PathBuf>,
    /// Force recomputation
    pub force: bool,
    /// Concurrency override
    pub concurrency: Option<usize>,
}

/// Run the pipeline over every work item and print one JSON report per line.
#[tracing::instrument(skip(config, options), fields(files = options.items.len()))]
pub async fn enrich(config: &MarqueeConfig, options: EnrichOptions) -> MarqueeResult<()> {
    let mut items: Vec<WorkItem> = Vec::new();
    for path in &options.items {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ConfigError::new(ConfigErrorKind::Intake {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        items.extend(parse_work_items(&contents)?);
    }
    tracing::info!(items = items.len(), "Loaded work items");

    let mut settings = RunSettings::from_config(config);
    if options.force {
        settings = settings.with_force_recompute(true);
    }
    if settings.credential.is_none() {
        tracing::warn!("No catalog credential configured, every item will be skipped");
    }

    let pipeline = Pipeline::builder_from_config(config)?
        .build()
        .map_err(|e| ConfigError::new(ConfigErrorKind::MissingComponent(e.to_string())))?;

    let concurrency = options
        .concurrency
        .unwrap_or(*config.pipeline.concurrency());
    let reports = pipeline.process_batch(items, &settings, concurrency).await;

    for report in &reports {
        println!("{}", serde_json::to_string(report).map_err(JsonError::from)?);
    }
    Ok(())
}
