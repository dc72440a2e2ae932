//! Gene-category index.
//!
//! Category definitions map a category name to an ordered gene list; the same
//! gene may be declared under several categories. The index inverts that into
//! gene → category set and fixes the canonical gene processing order:
//! first-seen across definitions, definitions in argument order, genes in
//! list order.

use std::collections::{BTreeSet, HashMap};

use mammyx_common::{MammyxError, Result};
use serde::{Deserialize, Serialize};

/// One user-defined evidentiary category and the genes declared under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    pub genes: Vec<String>,
}

/// Inverted index over one or more category definitions.
#[derive(Debug, Clone, Default)]
pub struct GeneCategoryIndex {
    categories_by_gene: HashMap<String, BTreeSet<String>>,
    gene_order: Vec<String>,
}

impl GeneCategoryIndex {
    /// Build the index. Pure and total: empty input yields an empty index.
    pub fn build(definitions: &[CategoryDefinition]) -> Self {
        let mut categories_by_gene: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut gene_order = Vec::new();

        for def in definitions {
            for gene in &def.genes {
                let entry = categories_by_gene.entry(gene.clone()).or_insert_with(|| {
                    gene_order.push(gene.clone());
                    BTreeSet::new()
                });
                entry.insert(def.name.clone());
            }
        }

        Self { categories_by_gene, gene_order }
    }

    /// Unique genes in canonical processing order.
    pub fn genes(&self) -> &[String] {
        &self.gene_order
    }

    /// Categories a gene was declared under.
    pub fn categories_of(&self, gene: &str) -> Option<&BTreeSet<String>> {
        self.categories_by_gene.get(gene)
    }

    pub fn len(&self) -> usize {
        self.gene_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gene_order.is_empty()
    }
}

/// Reject malformed category definitions before any network work starts.
///
/// An empty definition set or an empty gene list means broken configuration,
/// not absent evidence.
pub fn validate_definitions(definitions: &[CategoryDefinition]) -> Result<()> {
    if definitions.is_empty() {
        return Err(MammyxError::Config(
            "no category definitions supplied".to_string(),
        ));
    }

    for def in definitions {
        if def.name.trim().is_empty() {
            return Err(MammyxError::Config(
                "category definition with blank name".to_string(),
            ));
        }
        if def.genes.is_empty() {
            return Err(MammyxError::Config(format!(
                "category '{}' declares no genes",
                def.name
            )));
        }
    }

    Ok(())
}
