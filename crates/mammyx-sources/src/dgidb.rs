//! DGIdb interaction table loader.
//!
//! DGIdb ships `interactions.tsv` as a bulk download; the pipeline only needs
//! a membership test over its `gene_name` column. The table is loaded once
//! and held in memory, uppercased so lookups are case-insensitive.
//!
//! A table without a `gene_name` column is a broken input, not absent
//! evidence: loading fails rather than silently reporting every gene as
//! untargeted.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mammyx_common::{MammyxError, Result};
use tracing::info;

const GENE_NAME_COLUMN: &str = "gene_name";

/// Set of gene symbols with at least one known drug-gene interaction.
#[derive(Debug, Clone)]
pub struct InteractionSet {
    genes: HashSet<String>,
    loaded_at: DateTime<Utc>,
    source_file: Option<PathBuf>,
}

impl InteractionSet {
    /// Load from a tab-delimited file with a header row.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path)?;

        let headers = reader.headers()?.clone();
        let gene_idx = headers
            .iter()
            .position(|h| h == GENE_NAME_COLUMN)
            .ok_or_else(|| {
                MammyxError::Config(format!(
                    "interaction table {} has no '{}' column (found: {})",
                    path.display(),
                    GENE_NAME_COLUMN,
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })?;

        let mut genes = HashSet::new();
        for record in reader.records() {
            let record = record?;
            if let Some(name) = record.get(gene_idx) {
                let name = name.trim();
                if !name.is_empty() {
                    genes.insert(name.to_uppercase());
                }
            }
        }

        info!(
            file = %path.display(),
            n_genes = genes.len(),
            "Loaded DGIdb interaction table"
        );

        Ok(Self {
            genes,
            loaded_at: Utc::now(),
            source_file: Some(path.to_path_buf()),
        })
    }

    /// Build directly from symbols (tests, alternate sources).
    pub fn from_genes<I, S>(genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            genes: genes
                .into_iter()
                .map(|g| g.as_ref().trim().to_uppercase())
                .collect(),
            loaded_at: Utc::now(),
            source_file: None,
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, gene: &str) -> bool {
        self.genes.contains(&gene.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }
}
