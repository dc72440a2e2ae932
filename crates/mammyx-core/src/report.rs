//! Output artifact writers.
//!
//! Column names and value sentinels are a compatibility surface consumed
//! downstream; they must not drift. Booleans render as `True`/`False` and
//! list fields join with `"; "` to match the established artifact format.

use std::path::Path;

use mammyx_common::Result;
use mammyx_sources::models::StudyHit;
use tracing::info;

use crate::enrich::{EnrichedGeneRecord, ScoreLookup};

pub const SUMMARY_FILE: &str = "Clinical_Trials_Summary.csv";
pub const SCORES_FILE: &str = "OpenTargets_Score.csv";
pub const STUDIES_FILE: &str = "Clinical_Trials_Studies.csv";

fn bool_cell(v: bool) -> &'static str {
    if v { "True" } else { "False" }
}

/// Write the flattened per-gene summary, one row per gene.
pub fn write_summary(path: &Path, records: &[EnrichedGeneRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "gene",
        "category",
        "studies",
        "FDA_Approved_Drug",
        "DGIdb_Status",
        "OpenTargets_Score",
        "Strong_BreastCancer_Support",
        "Has_FDA_Drug",
    ])?;

    for rec in records {
        writer.write_record([
            rec.gene.as_str(),
            rec.category.as_str(),
            &rec.studies.to_string(),
            rec.fda_approved_drug.as_str(),
            rec.dgidb_status.as_str(),
            &rec.opentargets_score.to_string(),
            bool_cell(rec.strong_breastcancer_support),
            if rec.has_fda_drug { "Yes" } else { "No" },
        ])?;
    }

    writer.flush()?;
    info!(file = %path.display(), rows = records.len(), "Summary artifact written");
    Ok(())
}

/// Write the raw gene → association score mapping, symbol-sorted.
pub fn write_scores(path: &Path, scores: &ScoreLookup) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["gene", "OpenTargets_Score"])?;
    for (symbol, score) in scores.sorted_entries() {
        writer.write_record([symbol.as_str(), &score.to_string()])?;
    }

    writer.flush()?;
    info!(file = %path.display(), rows = scores.len(), "Score artifact written");
    Ok(())
}

/// Write the raw study hits, one row per (gene, study) pair.
pub fn write_studies(path: &Path, hits: &[StudyHit]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(["gene", "nct_id", "title", "conditions", "interventions"])?;
    for hit in hits {
        writer.write_record([
            hit.gene.as_str(),
            hit.nct_id.as_deref().unwrap_or(""),
            hit.title.as_deref().unwrap_or(""),
            &hit.conditions.join("; "),
            &hit.interventions.join("; "),
        ])?;
    }

    writer.flush()?;
    info!(file = %path.display(), rows = hits.len(), "Study artifact written");
    Ok(())
}
