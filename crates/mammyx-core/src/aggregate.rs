//! Study aggregation.
//!
//! Queries the trial-search adapter exactly once per unique gene, in the
//! canonical order from the category index, and tabulates per-(category,
//! gene) study counts. A gene's count is its total hit count, attributed in
//! full to every category the gene belongs to.
//!
//! Adapter failures degrade that gene to zero hits; the run continues.

use mammyx_sources::clinicaltrials::TrialSearch;
use mammyx_sources::models::StudyHit;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::categories::GeneCategoryIndex;

/// One row of the (category, gene) → studies_found relation.
/// (category, gene) pairs are unique within one aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGeneCount {
    pub category: String,
    pub gene: String,
    pub studies_found: u64,
}

/// Output of the aggregation stage.
#[derive(Debug, Clone, Default)]
pub struct StudyAggregation {
    /// Every raw hit, tagged with the gene that found it, in gene order.
    pub hits: Vec<StudyHit>,
    /// One row per (category, gene) pair from the index.
    pub counts: Vec<CategoryGeneCount>,
    /// Transport failures absorbed along the way.
    pub errors: Vec<String>,
}

/// Collect study counts for every gene in the index.
///
/// Pacing between consecutive searches is the adapter client's concern; this
/// loop stays sequential so results keep the canonical gene order.
pub async fn collect_study_counts(
    index: &GeneCategoryIndex,
    trials: &dyn TrialSearch,
    condition: &str,
) -> StudyAggregation {
    let mut agg = StudyAggregation::default();

    for gene in index.genes() {
        let hits = match trials.search(gene, condition).await {
            Ok(hits) => hits,
            Err(e) => {
                let msg = format!("trial search failed for {gene}: {e}");
                warn!("{}", &msg);
                agg.errors.push(msg);
                Vec::new()
            }
        };

        let n = hits.len() as u64;
        agg.hits.extend(hits);

        // The same total is attributed to each of the gene's categories.
        if let Some(categories) = index.categories_of(gene) {
            for category in categories {
                agg.counts.push(CategoryGeneCount {
                    category: category.clone(),
                    gene: gene.clone(),
                    studies_found: n,
                });
            }
        }
    }

    info!(
        genes = index.len(),
        hits = agg.hits.len(),
        rows = agg.counts.len(),
        failures = agg.errors.len(),
        "Study aggregation complete"
    );

    agg
}
