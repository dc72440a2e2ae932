//! Data models returned by the evidence source adapters.

use serde::{Deserialize, Serialize};

/// One clinical-trial record matching a gene/condition search.
///
/// Identifier and title may be absent in the registry payload; they are kept
/// as `None` rather than filled with placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyHit {
    pub gene: String,
    pub nct_id: Option<String>,
    pub title: Option<String>,
    pub conditions: Vec<String>,
    pub interventions: Vec<String>,
}

/// One known-drug row for a target, as reported by Open Targets.
///
/// `phase` 4 means approved; filtering to that phase is the caller's
/// decision, not the adapter's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownDrugRow {
    pub drug_name: String,
    pub phase: i64,
    pub status: Option<String>,
}

/// One disease-associated target row: approved gene symbol plus the
/// association score linking it to the queried disease.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationRow {
    pub symbol: String,
    pub score: f64,
}
