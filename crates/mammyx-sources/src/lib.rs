//! mammyx-sources — evidence source adapters.
//!
//! One module per external source. All absence handling happens here, at the
//! adapter boundary: adapters return explicit `Option`/empty collections, so
//! the core never digs through nested JSON.

pub mod clinicaltrials;
pub mod dgidb;
pub mod models;
pub mod opentargets;

pub use clinicaltrials::{ClinicalTrialsClient, TrialSearch};
pub use dgidb::InteractionSet;
pub use opentargets::{AssociationSource, DrugEvidence, OpenTargetsClient};
