//! End-to-end evidence pipeline.
//!
//! Orchestrates the full flow for a single run:
//!   1. Validate category definitions and build the gene-category index
//!   2. Fetch disease-associated targets (one call) and build the score lookup
//!   3. Query trial counts, one search per unique gene
//!   4. Rank categories and resolve one category per gene
//!   5. Enrich each assignment with drug, interaction, and score evidence
//!
//! Stages 3 and 4 are separated by a hard barrier: ranking only ever sees
//! the complete count relation. Transport failures degrade per gene and are
//! collected in the result; only malformed static input aborts the run.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use mammyx_common::Result;
use mammyx_sources::clinicaltrials::TrialSearch;
use mammyx_sources::dgidb::InteractionSet;
use mammyx_sources::models::StudyHit;
use mammyx_sources::opentargets::{AssociationSource, DrugEvidence};

use crate::aggregate::collect_study_counts;
use crate::categories::{validate_definitions, CategoryDefinition, GeneCategoryIndex};
use crate::enrich::{enrich_assignments, EnrichedGeneRecord, ScoreLookup};
use crate::priority::assign_categories;

/// Parameters for a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineJob {
    /// Disease condition paired with every gene in the trial search.
    pub condition: String,
    /// EFO identifier for the disease-association query.
    pub disease_efo: String,
    /// Page size for the single associated-targets call.
    pub association_page_size: usize,
}

impl Default for PipelineJob {
    fn default() -> Self {
        Self {
            condition: "Breast Cancer".to_string(),
            disease_efo: "EFO_0000305".to_string(),
            association_page_size: 500,
        }
    }
}

/// Summary of one completed run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub job_id: Uuid,
    pub genes_processed: usize,
    /// Category names from highest priority down.
    pub category_ranking: Vec<String>,
    /// One record per unique gene, gene-sorted.
    pub records: Vec<EnrichedGeneRecord>,
    /// Raw gene → association score mapping (secondary artifact input).
    pub score_lookup: ScoreLookup,
    /// Raw study hits (tertiary artifact input).
    pub study_hits: Vec<StudyHit>,
    /// Transport failures absorbed along the way.
    pub errors: Vec<String>,
    pub duration_ms: u64,
}

/// Run the full pipeline for one job.
///
/// Fails only on malformed static input (empty category definitions); every
/// network-level failure degrades to defaults and lands in `errors`.
#[instrument(skip_all, fields(condition = %job.condition, efo = %job.disease_efo))]
pub async fn run_pipeline(
    job: &PipelineJob,
    definitions: &[CategoryDefinition],
    trials: &dyn TrialSearch,
    drugs: &dyn DrugEvidence,
    associations: &dyn AssociationSource,
    interactions: &InteractionSet,
) -> Result<PipelineResult> {
    let job_id = Uuid::new_v4();
    let t0 = std::time::Instant::now();
    let mut errors = Vec::new();

    // ── 1. Index ──────────────────────────────────────────────────────────
    validate_definitions(definitions)?;
    let index = GeneCategoryIndex::build(definitions);
    info!(job_id = %job_id, genes = index.len(), "Gene-category index built");

    // ── 2. Association scores (single call for the whole run) ─────────────
    let score_lookup = match associations
        .associated_targets(&job.disease_efo, job.association_page_size)
        .await
    {
        Ok(rows) => {
            info!(n = rows.len(), "Disease-associated targets retrieved");
            ScoreLookup::from_rows(&rows)
        }
        Err(e) => {
            let msg = format!("associated-targets query failed: {e}");
            warn!("{}", &msg);
            errors.push(msg);
            ScoreLookup::default()
        }
    };

    // ── 3. Trial counts ───────────────────────────────────────────────────
    let aggregation = collect_study_counts(&index, trials, &job.condition).await;
    errors.extend(aggregation.errors);

    // ── 4. Priority assignment (all counts collected before ranking) ──────
    let (assignments, ranking) = assign_categories(&aggregation.counts);

    // ── 5. Enrichment ─────────────────────────────────────────────────────
    let enrichment = enrich_assignments(&assignments, drugs, interactions, &score_lookup).await;
    errors.extend(enrichment.errors);

    let result = PipelineResult {
        job_id,
        genes_processed: index.len(),
        category_ranking: ranking.order().to_vec(),
        records: enrichment.records,
        score_lookup,
        study_hits: aggregation.hits,
        errors,
        duration_ms: t0.elapsed().as_millis() as u64,
    };

    info!(
        job_id = %result.job_id,
        genes = result.genes_processed,
        records = result.records.len(),
        failures = result.errors.len(),
        duration_ms = result.duration_ms,
        "Pipeline run complete"
    );

    Ok(result)
}
