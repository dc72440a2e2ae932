//! Open Targets Platform GraphQL client.
//!
//! API docs: https://platform-docs.opentargets.org/data-access/graphql-api
//! Endpoint: https://api.platform.opentargets.org/api/v4/graphql
//!
//! Three operations are used:
//!   - target search by symbol (to resolve an Ensembl gene id)
//!   - knownDrugs rows for a resolved target
//!   - disease.associatedTargets (one call per run, not per gene)

use async_trait::async_trait;
use mammyx_common::http::PacedClient;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::models::{AssociationRow, KnownDrugRow};

const OT_GRAPHQL_URL: &str = "https://api.platform.opentargets.org/api/v4/graphql";

const SEARCH_TARGET_QUERY: &str = r#"
query searchTarget($queryString: String!) {
    search(queryString: $queryString, entityNames: ["target"]) {
        hits {
            id
            entity
            object {
                ... on Target {
                    approvedSymbol
                }
            }
        }
    }
}
"#;

const KNOWN_DRUGS_QUERY: &str = r#"
query getKnownDrugs($ensemblId: String!) {
    target(ensemblId: $ensemblId) {
        id
        knownDrugs {
            rows {
                drug {
                    id
                    name
                }
                phase
                status
            }
        }
    }
}
"#;

const ASSOCIATED_TARGETS_QUERY: &str = r#"
query diseaseTargets($efoId: String!, $size: Int!) {
    disease(efoId: $efoId) {
        associatedTargets(page: { index: 0, size: $size }) {
            rows {
                target { approvedSymbol }
                score
            }
        }
    }
}
"#;

/// Known-drug adapter contract: resolve a gene symbol to a target identifier,
/// then list the drugs known for that target.
///
/// `resolve` returning `Ok(None)` means no confident match: absence of
/// evidence, not an error.
#[async_trait]
pub trait DrugEvidence: Send + Sync {
    async fn resolve(&self, gene_symbol: &str) -> anyhow::Result<Option<String>>;
    async fn known_drugs(&self, ensembl_id: &str) -> anyhow::Result<Vec<KnownDrugRow>>;
}

/// Disease-association adapter contract, called once for the whole run.
#[async_trait]
pub trait AssociationSource: Send + Sync {
    async fn associated_targets(
        &self,
        efo_id: &str,
        page_size: usize,
    ) -> anyhow::Result<Vec<AssociationRow>>;
}

pub struct OpenTargetsClient {
    client: PacedClient,
}

impl OpenTargetsClient {
    pub fn new(client: PacedClient) -> Self {
        Self { client }
    }

    async fn graphql(&self, query: &str, variables: Value) -> anyhow::Result<Value> {
        let request = self.client
            .post(OT_GRAPHQL_URL)
            .json(&json!({ "query": query, "variables": variables }));

        let resp = self.client.send(request).await?.error_for_status()?;
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl DrugEvidence for OpenTargetsClient {
    #[instrument(skip(self))]
    async fn resolve(&self, gene_symbol: &str) -> anyhow::Result<Option<String>> {
        let body = self
            .graphql(SEARCH_TARGET_QUERY, json!({ "queryString": gene_symbol }))
            .await?;

        let id = resolve_from_search(&body, gene_symbol);
        debug!(gene = gene_symbol, resolved = ?id, "Open Targets symbol resolution");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn known_drugs(&self, ensembl_id: &str) -> anyhow::Result<Vec<KnownDrugRow>> {
        let body = self
            .graphql(KNOWN_DRUGS_QUERY, json!({ "ensemblId": ensembl_id }))
            .await?;

        let rows = known_drug_rows(&body);
        debug!(ensembl_id = ensembl_id, n = rows.len(), "known-drug rows retrieved");
        Ok(rows)
    }
}

#[async_trait]
impl AssociationSource for OpenTargetsClient {
    #[instrument(skip(self))]
    async fn associated_targets(
        &self,
        efo_id: &str,
        page_size: usize,
    ) -> anyhow::Result<Vec<AssociationRow>> {
        let body = self
            .graphql(
                ASSOCIATED_TARGETS_QUERY,
                json!({ "efoId": efo_id, "size": page_size as i64 }),
            )
            .await?;

        let rows = association_rows(&body);
        debug!(efo_id = efo_id, n = rows.len(), "disease-associated targets retrieved");
        Ok(rows)
    }
}

/// Pick the hit whose approvedSymbol matches the queried symbol exactly.
/// Fuzzy search hits for other targets are not a confident match.
pub(crate) fn resolve_from_search(body: &Value, gene_symbol: &str) -> Option<String> {
    let hits = body["data"]["search"]["hits"].as_array()?;
    hits.iter().find_map(|hit| {
        let is_target = hit["entity"].as_str() == Some("target");
        let symbol_matches = hit["object"]["approvedSymbol"].as_str() == Some(gene_symbol);
        if is_target && symbol_matches {
            hit["id"].as_str().map(String::from)
        } else {
            None
        }
    })
}

pub(crate) fn known_drug_rows(body: &Value) -> Vec<KnownDrugRow> {
    body["data"]["target"]["knownDrugs"]["rows"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| {
                    Some(KnownDrugRow {
                        drug_name: r["drug"]["name"].as_str()?.to_string(),
                        phase: r["phase"].as_i64()?,
                        status: r["status"].as_str().map(String::from),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Rows with a missing symbol or score carry no usable evidence and are
/// dropped here, at the boundary.
pub(crate) fn association_rows(body: &Value) -> Vec<AssociationRow> {
    body["data"]["disease"]["associatedTargets"]["rows"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| {
                    Some(AssociationRow {
                        symbol: r["target"]["approvedSymbol"].as_str()?.to_string(),
                        score: r["score"].as_f64()?,
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}
