//! ClinicalTrials.gov v2 API client.
//!
//! API docs: https://clinicaltrials.gov/data-api/api
//! Endpoint: https://clinicaltrials.gov/api/v2/studies
//!
//! Searches `query.term = ("<condition>") AND (<gene>)` and returns one
//! `StudyHit` per study with:
//!   - nct_id        = NCTId (may be absent)
//!   - title         = BriefTitle, falling back to OfficialTitle
//!   - conditions    = ConditionsModule condition list
//!   - interventions = intervention names

use async_trait::async_trait;
use mammyx_common::http::PacedClient;
use tracing::{debug, instrument};

use crate::models::StudyHit;

const CT_API_URL: &str = "https://clinicaltrials.gov/api/v2/studies";
const DEFAULT_PAGE_SIZE: usize = 100;

/// Trial-search adapter contract.
///
/// An empty vec means "no matches": that is success, not failure. An `Err`
/// is a transport failure; callers degrade it to zero hits and keep going.
#[async_trait]
pub trait TrialSearch: Send + Sync {
    async fn search(&self, gene: &str, condition: &str) -> anyhow::Result<Vec<StudyHit>>;
}

pub struct ClinicalTrialsClient {
    client: PacedClient,
    page_size: usize,
}

impl ClinicalTrialsClient {
    pub fn new(client: PacedClient) -> Self {
        Self { client, page_size: DEFAULT_PAGE_SIZE }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

#[async_trait]
impl TrialSearch for ClinicalTrialsClient {
    #[instrument(skip(self))]
    async fn search(&self, gene: &str, condition: &str) -> anyhow::Result<Vec<StudyHit>> {
        let query = format!("(\"{condition}\") AND ({gene})");

        let request = self.client
            .get(CT_API_URL)
            .query(&[
                ("query.term", query.as_str()),
                ("pageSize", &self.page_size.to_string()),
                ("format", "json"),
            ]);

        let resp = self.client.send(request).await?.error_for_status()?;
        let body: serde_json::Value = resp.json().await?;

        // An absent "studies" field is the registry's way of saying no match.
        let studies = body["studies"].as_array().cloned().unwrap_or_default();
        debug!(gene = gene, n = studies.len(), "ClinicalTrials.gov studies retrieved");

        Ok(studies.iter().map(|s| study_from_json(gene, s)).collect())
    }
}

/// Extract the fields this pipeline consumes from one study payload.
/// Absent identifier/title stay `None`.
pub(crate) fn study_from_json(gene: &str, study: &serde_json::Value) -> StudyHit {
    let proto = &study["protocolSection"];
    let id_mod = &proto["identificationModule"];

    let nct_id = id_mod["nctId"].as_str().map(String::from);
    let title = id_mod["briefTitle"]
        .as_str()
        .or_else(|| id_mod["officialTitle"].as_str())
        .map(String::from);

    let conditions: Vec<String> = proto["conditionsModule"]["conditions"]
        .as_array()
        .map(|c| c.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();

    // The v2 payload nests interventions under armsInterventionsModule; older
    // exports used interventionsModule.interventionList. Accept either.
    let interv = &proto["armsInterventionsModule"]["interventions"];
    let interventions: Vec<String> = interv
        .as_array()
        .or_else(|| proto["interventionsModule"]["interventionList"]["intervention"].as_array())
        .map(|iv| {
            iv.iter()
                .filter_map(|v| v["name"].as_str().or_else(|| v["interventionName"].as_str()))
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    StudyHit {
        gene: gene.to_string(),
        nct_id,
        title,
        conditions,
        interventions,
    }
}
