//! Mammyx — breast-cancer gene evidence aggregation.
//! Entry point for the pipeline binary.

mod config;

use std::path::Path;
use std::time::Duration;

use mammyx_common::http::{PacedClient, PacingPolicy};
use mammyx_core::{pipeline, report};
use mammyx_sources::{ClinicalTrialsClient, InteractionSet, OpenTargetsClient};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mammyx=debug,info")),
        )
        .init();

    info!("Mammyx starting up");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = match config::Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!("Could not load mammyx.toml: {e}");
            warn!("Copy mammyx.example.toml to mammyx.toml and edit it.");
            return Ok(());
        }
    };

    // Static inputs are validated before any network work: a broken
    // interaction table or empty panel aborts here, with nothing written.
    let interactions = InteractionSet::load(Path::new(&config.data.interactions_path))?;

    let trial_client = PacedClient::new(PacingPolicy::new(Duration::from_millis(
        config.pacing.trial_delay_ms,
    )))?;
    let ot_client = PacedClient::new(PacingPolicy::new(Duration::from_millis(
        config.pacing.lookup_delay_ms,
    )))?;

    let trials = ClinicalTrialsClient::new(trial_client).with_page_size(config.search.page_size);
    let open_targets = OpenTargetsClient::new(ot_client);

    let job = pipeline::PipelineJob {
        condition: config.search.condition.clone(),
        disease_efo: config.opentargets.disease_efo.clone(),
        association_page_size: config.opentargets.association_page_size,
    };

    let result = pipeline::run_pipeline(
        &job,
        &config.categories,
        &trials,
        &open_targets,
        &open_targets,
        &interactions,
    )
    .await?;

    info!("Category priority: {:?}", result.category_ranking);
    if !result.errors.is_empty() {
        warn!(
            n = result.errors.len(),
            "Run completed with degraded genes/sources"
        );
    }

    let out_dir = Path::new(&config.data.output_dir);
    std::fs::create_dir_all(out_dir)?;

    report::write_summary(&out_dir.join(report::SUMMARY_FILE), &result.records)?;
    report::write_scores(&out_dir.join(report::SCORES_FILE), &result.score_lookup)?;
    if config.data.write_study_hits {
        report::write_studies(&out_dir.join(report::STUDIES_FILE), &result.study_hits)?;
    }

    info!(
        genes = result.genes_processed,
        duration_ms = result.duration_ms,
        "Done"
    );

    Ok(())
}
