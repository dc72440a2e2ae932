//! Configuration loading for Mammyx.
//! Reads mammyx.toml from the current directory or the path in MAMMYX_CONFIG.
//!
//! Category definitions are an array of tables so definition order, and with
//! it the canonical gene processing order, survives the round trip.

use mammyx_core::categories::CategoryDefinition;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub opentargets: OpenTargetsConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_condition")]
    pub condition: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_condition() -> String { "Breast Cancer".to_string() }
fn default_page_size() -> usize { 100 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            condition: default_condition(),
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenTargetsConfig {
    #[serde(default = "default_disease_efo")]
    pub disease_efo: String,
    #[serde(default = "default_association_page_size")]
    pub association_page_size: usize,
}

fn default_disease_efo() -> String { "EFO_0000305".to_string() }
fn default_association_page_size() -> usize { 500 }

impl Default for OpenTargetsConfig {
    fn default() -> Self {
        Self {
            disease_efo: default_disease_efo(),
            association_page_size: default_association_page_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// Minimum spacing between consecutive trial-registry searches.
    #[serde(default = "default_trial_delay_ms")]
    pub trial_delay_ms: u64,
    /// Minimum spacing between consecutive Open Targets lookups.
    #[serde(default = "default_lookup_delay_ms")]
    pub lookup_delay_ms: u64,
}

fn default_trial_delay_ms() -> u64 { 1000 }
fn default_lookup_delay_ms() -> u64 { 300 }

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            trial_delay_ms: default_trial_delay_ms(),
            lookup_delay_ms: default_lookup_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_interactions_path")]
    pub interactions_path: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Also write the raw per-study rows alongside the summary.
    #[serde(default = "default_true")]
    pub write_study_hits: bool,
}

fn default_interactions_path() -> String { "assets/interactions.tsv".to_string() }
fn default_output_dir() -> String { "assets".to_string() }
fn default_true() -> bool { true }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            interactions_path: default_interactions_path(),
            output_dir: default_output_dir(),
            write_study_hits: default_true(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            opentargets: OpenTargetsConfig::default(),
            pacing: PacingConfig::default(),
            data: DataConfig::default(),
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Load from MAMMYX_CONFIG or ./mammyx.toml; built-in defaults (including
    /// the breast-cancer gene panel) when neither exists.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("MAMMYX_CONFIG").unwrap_or_else(|_| "mammyx.toml".to_string());
        if Path::new(&path).exists() {
            Self::from_file(&path)
        } else {
            tracing::info!("No {path} found, using built-in defaults");
            Ok(Self::default())
        }
    }

    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

/// The curated breast-cancer gene panel used when no config is supplied.
fn default_categories() -> Vec<CategoryDefinition> {
    let panel: [(&str, &[&str]); 4] = [
        ("Emerging Breast Cancer Target", &["CASP8"]),
        (
            "Lacks Breast Cancer Evidence",
            &["CDKN1A", "VHL", "BAX", "NRAS", "NF2", "SRC", "WT1", "NTRK1"],
        ),
        (
            "FDA-approved Breast Cancer Therapy",
            &[
                "CDK4", "FGFR1", "ERBB2", "KRAS", "AKT1", "MYC", "BRCA1", "TP53",
                "PIK3CA", "CDK6", "BRCA2", "EGFR", "FGFR2",
            ],
        ),
        (
            "FDA-approved Other Indication",
            &[
                "PTEN", "CDKN2A", "MDM2", "HRAS", "FOXO3", "CCND1", "BCL2", "RB1",
                "NF1", "ATR", "SMAD4", "CHEK2", "TSC2", "STK11", "MET", "NOTCH1",
                "ATM", "NTRK2",
            ],
        ),
    ];

    panel
        .iter()
        .map(|(name, genes)| CategoryDefinition {
            name: name.to_string(),
            genes: genes.iter().map(|g| g.to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.condition, "Breast Cancer");
        assert_eq!(config.opentargets.disease_efo, "EFO_0000305");
        assert_eq!(config.pacing.trial_delay_ms, 1000);
        assert_eq!(config.categories.len(), 4);

        let total_genes: usize = config.categories.iter().map(|c| c.genes.len()).sum();
        assert_eq!(total_genes, 40);
    }

    #[test]
    fn test_parse_minimal_toml_fills_defaults() {
        let toml = r#"
            [[categories]]
            name = "Cat1"
            genes = ["TP53"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.search.page_size, 100);
        assert_eq!(config.pacing.lookup_delay_ms, 300);
        assert_eq!(config.categories.len(), 1);
        assert_eq!(config.categories[0].genes, vec!["TP53"]);
    }

    #[test]
    fn test_category_order_preserved() {
        let toml = r#"
            [[categories]]
            name = "Zeta"
            genes = ["G1"]

            [[categories]]
            name = "Alpha"
            genes = ["G2"]
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        let names: Vec<_> = config.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let rendered = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.categories.len(), config.categories.len());
        assert_eq!(parsed.search.condition, config.search.condition);
    }
}
