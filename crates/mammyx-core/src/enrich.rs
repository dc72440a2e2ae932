//! Enrichment merger.
//!
//! Joins the priority assignment with three independent evidence sources
//! (known approved drugs, DGIdb interaction status, disease-association
//! score) into one record per gene. The join is left-anchored on the assignment:
//! no gene is added or dropped, and each source applies its own default, so
//! a failure in one never blanks the other two.

use std::collections::{BTreeSet, HashMap};

use mammyx_sources::dgidb::InteractionSet;
use mammyx_sources::models::AssociationRow;
use mammyx_sources::opentargets::DrugEvidence;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::priority::GeneAssignment;

/// Sentinel for a gene with no approved drug evidence.
pub const NO_DRUG_SENTINEL: &str = "No Specific Drug";
pub const DGIDB_TARGETED: &str = "Targeted";
pub const DGIDB_NOT_TARGETED: &str = "Not Targeted";

/// Open Targets phase 4 = approved.
const APPROVED_PHASE: i64 = 4;
/// Association score at or above this is strong breast-cancer support.
const STRONG_SUPPORT_THRESHOLD: f64 = 0.5;

/// Case-insensitive gene → association score lookup, built once per run.
/// Duplicate symbols keep the maximum score.
#[derive(Debug, Clone, Default)]
pub struct ScoreLookup {
    scores: HashMap<String, f64>,
}

impl ScoreLookup {
    pub fn from_rows(rows: &[AssociationRow]) -> Self {
        let mut scores: HashMap<String, f64> = HashMap::new();
        for row in rows {
            let key = row.symbol.to_uppercase();
            scores
                .entry(key)
                .and_modify(|s| *s = s.max(row.score))
                .or_insert(row.score);
        }
        Self { scores }
    }

    /// Score for a gene; missing entries default to 0.
    pub fn get(&self, gene: &str) -> f64 {
        self.scores.get(&gene.to_uppercase()).copied().unwrap_or(0.0)
    }

    /// (symbol, score) pairs sorted by symbol, for the raw-score artifact.
    pub fn sorted_entries(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> =
            self.scores.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Final per-gene output record. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedGeneRecord {
    pub gene: String,
    pub category: String,
    pub studies: u64,
    pub fda_approved_drug: String,
    pub dgidb_status: String,
    pub opentargets_score: f64,
    pub strong_breastcancer_support: bool,
    pub has_fda_drug: bool,
}

/// Output of the enrichment stage.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub records: Vec<EnrichedGeneRecord>,
    pub errors: Vec<String>,
}

/// Enrich every assignment, in assignment order.
pub async fn enrich_assignments(
    assignments: &[GeneAssignment],
    drugs: &dyn DrugEvidence,
    interactions: &InteractionSet,
    scores: &ScoreLookup,
) -> Enrichment {
    let mut enrichment = Enrichment::default();

    for assignment in assignments {
        let gene = &assignment.gene;

        let fda_approved_drug = match approved_drugs_for(gene, drugs).await {
            Ok(rendered) => rendered,
            Err(e) => {
                let msg = format!("drug lookup failed for {gene}: {e}");
                warn!("{}", &msg);
                enrichment.errors.push(msg);
                NO_DRUG_SENTINEL.to_string()
            }
        };

        let dgidb_status = if interactions.contains(gene) {
            DGIDB_TARGETED.to_string()
        } else {
            DGIDB_NOT_TARGETED.to_string()
        };

        let opentargets_score = scores.get(gene);
        let has_fda_drug = fda_approved_drug != NO_DRUG_SENTINEL;

        enrichment.records.push(EnrichedGeneRecord {
            gene: gene.clone(),
            category: assignment.category.clone(),
            studies: assignment.studies,
            fda_approved_drug,
            dgidb_status,
            opentargets_score,
            strong_breastcancer_support: opentargets_score >= STRONG_SUPPORT_THRESHOLD,
            has_fda_drug,
        });
    }

    info!(
        genes = enrichment.records.len(),
        failures = enrichment.errors.len(),
        "Enrichment complete"
    );

    enrichment
}

/// Resolve the gene and render its approved drugs as a single string.
///
/// An unresolved symbol is absence of evidence, not an error, and maps to
/// the sentinel directly. Drug names are deduplicated and sorted so the
/// rendering is identical run over run.
async fn approved_drugs_for(gene: &str, drugs: &dyn DrugEvidence) -> anyhow::Result<String> {
    let Some(ensembl_id) = drugs.resolve(gene).await? else {
        return Ok(NO_DRUG_SENTINEL.to_string());
    };

    let rows = drugs.known_drugs(&ensembl_id).await?;
    let approved: BTreeSet<&str> = rows
        .iter()
        .filter(|r| r.phase == APPROVED_PHASE)
        .map(|r| r.drug_name.as_str())
        .collect();

    if approved.is_empty() {
        Ok(NO_DRUG_SENTINEL.to_string())
    } else {
        Ok(approved.into_iter().collect::<Vec<_>>().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mammyx_sources::models::KnownDrugRow;
    use std::collections::HashMap;

    struct MockDrugEvidence {
        ids: HashMap<String, String>,
        drugs: HashMap<String, Vec<KnownDrugRow>>,
        fail_resolve: Vec<String>,
    }

    impl MockDrugEvidence {
        fn new() -> Self {
            Self {
                ids: HashMap::new(),
                drugs: HashMap::new(),
                fail_resolve: Vec::new(),
            }
        }

        fn with_target(mut self, gene: &str, id: &str) -> Self {
            self.ids.insert(gene.to_string(), id.to_string());
            self
        }

        fn with_drug(mut self, id: &str, name: &str, phase: i64) -> Self {
            self.drugs.entry(id.to_string()).or_default().push(KnownDrugRow {
                drug_name: name.to_string(),
                phase,
                status: None,
            });
            self
        }

        fn failing_resolve(mut self, gene: &str) -> Self {
            self.fail_resolve.push(gene.to_string());
            self
        }
    }

    #[async_trait]
    impl DrugEvidence for MockDrugEvidence {
        async fn resolve(&self, gene_symbol: &str) -> anyhow::Result<Option<String>> {
            if self.fail_resolve.iter().any(|g| g == gene_symbol) {
                anyhow::bail!("gateway timeout");
            }
            Ok(self.ids.get(gene_symbol).cloned())
        }

        async fn known_drugs(&self, ensembl_id: &str) -> anyhow::Result<Vec<KnownDrugRow>> {
            Ok(self.drugs.get(ensembl_id).cloned().unwrap_or_default())
        }
    }

    fn assignment(gene: &str) -> GeneAssignment {
        GeneAssignment {
            gene: gene.to_string(),
            category: "Cat1".to_string(),
            studies: 7,
        }
    }

    #[test]
    fn test_score_lookup_keeps_maximum() {
        let rows = vec![
            AssociationRow { symbol: "GENEA".to_string(), score: 0.2 },
            AssociationRow { symbol: "GENEA".to_string(), score: 0.7 },
        ];

        let lookup = ScoreLookup::from_rows(&rows);
        assert!((lookup.get("GENEA") - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_score_lookup_case_insensitive_default_zero() {
        let rows = vec![AssociationRow { symbol: "Erbb2".to_string(), score: 0.9 }];

        let lookup = ScoreLookup::from_rows(&rows);
        assert!((lookup.get("ERBB2") - 0.9).abs() < 1e-12);
        assert!((lookup.get("erbb2") - 0.9).abs() < 1e-12);
        assert_eq!(lookup.get("UNKNOWN"), 0.0);
    }

    #[tokio::test]
    async fn test_unresolved_gene_gets_sentinel() {
        let drugs = MockDrugEvidence::new();
        let interactions = InteractionSet::from_genes(["G1"]);
        let scores = ScoreLookup::from_rows(&[AssociationRow {
            symbol: "G1".to_string(),
            score: 0.8,
        }]);

        let enrichment =
            enrich_assignments(&[assignment("G1")], &drugs, &interactions, &scores).await;

        let rec = &enrichment.records[0];
        assert_eq!(rec.fda_approved_drug, NO_DRUG_SENTINEL);
        assert!(!rec.has_fda_drug);
        // The other two sources still populate.
        assert_eq!(rec.dgidb_status, DGIDB_TARGETED);
        assert!(rec.strong_breastcancer_support);
    }

    #[tokio::test]
    async fn test_approved_drugs_filtered_deduped_sorted() {
        let drugs = MockDrugEvidence::new()
            .with_target("ERBB2", "ENSG00000141736")
            .with_drug("ENSG00000141736", "TRASTUZUMAB", 4)
            .with_drug("ENSG00000141736", "LAPATINIB", 4)
            .with_drug("ENSG00000141736", "TRASTUZUMAB", 4)
            .with_drug("ENSG00000141736", "NERATINIB", 3);
        let interactions = InteractionSet::from_genes(Vec::<&str>::new());
        let scores = ScoreLookup::default();

        let enrichment =
            enrich_assignments(&[assignment("ERBB2")], &drugs, &interactions, &scores).await;

        let rec = &enrichment.records[0];
        assert_eq!(rec.fda_approved_drug, "LAPATINIB, TRASTUZUMAB");
        assert!(rec.has_fda_drug);
    }

    #[tokio::test]
    async fn test_resolved_but_no_approved_phase() {
        let drugs = MockDrugEvidence::new()
            .with_target("G1", "ENSG1")
            .with_drug("ENSG1", "EXPERIMENTAL", 2);
        let interactions = InteractionSet::from_genes(Vec::<&str>::new());
        let scores = ScoreLookup::default();

        let enrichment =
            enrich_assignments(&[assignment("G1")], &drugs, &interactions, &scores).await;

        assert_eq!(enrichment.records[0].fda_approved_drug, NO_DRUG_SENTINEL);
    }

    #[tokio::test]
    async fn test_resolve_failure_degrades_only_drug_field() {
        let drugs = MockDrugEvidence::new().failing_resolve("G1");
        let interactions = InteractionSet::from_genes(["g1"]);
        let scores = ScoreLookup::from_rows(&[AssociationRow {
            symbol: "G1".to_string(),
            score: 0.5,
        }]);

        let enrichment =
            enrich_assignments(&[assignment("G1")], &drugs, &interactions, &scores).await;

        assert_eq!(enrichment.errors.len(), 1);
        let rec = &enrichment.records[0];
        assert_eq!(rec.fda_approved_drug, NO_DRUG_SENTINEL);
        assert_eq!(rec.dgidb_status, DGIDB_TARGETED);
        // 0.5 exactly is inclusive.
        assert!(rec.strong_breastcancer_support);
    }

    #[tokio::test]
    async fn test_score_below_threshold_not_strong() {
        let drugs = MockDrugEvidence::new();
        let interactions = InteractionSet::from_genes(Vec::<&str>::new());
        let scores = ScoreLookup::from_rows(&[AssociationRow {
            symbol: "G1".to_string(),
            score: 0.49,
        }]);

        let enrichment =
            enrich_assignments(&[assignment("G1")], &drugs, &interactions, &scores).await;

        let rec = &enrichment.records[0];
        assert!(!rec.strong_breastcancer_support);
        assert_eq!(rec.dgidb_status, DGIDB_NOT_TARGETED);
    }

    #[tokio::test]
    async fn test_records_follow_assignment_order() {
        let drugs = MockDrugEvidence::new();
        let interactions = InteractionSet::from_genes(Vec::<&str>::new());
        let scores = ScoreLookup::default();
        let assignments = vec![assignment("AAA"), assignment("BBB")];

        let enrichment =
            enrich_assignments(&assignments, &drugs, &interactions, &scores).await;

        let genes: Vec<_> = enrichment.records.iter().map(|r| r.gene.as_str()).collect();
        assert_eq!(genes, vec!["AAA", "BBB"]);
    }
}
