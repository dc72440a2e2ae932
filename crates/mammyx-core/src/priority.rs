//! Category priority ranking and per-gene assignment.
//!
//! Ranking: categories ordered by total studies_found descending; equal
//! totals fall back to category name so the order is stable, never
//! incidental. Assignment: for each gene, the winning row is chosen by
//! (priority index asc, studies_found desc, category name asc), which is a
//! total order because category names are unique.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::CategoryGeneCount;

/// Total order over category names derived from aggregate study volume.
#[derive(Debug, Clone, Default)]
pub struct CategoryRanking {
    order: Vec<String>,
    index: HashMap<String, usize>,
}

impl CategoryRanking {
    /// Rank categories by summed studies_found, descending.
    pub fn rank(counts: &[CategoryGeneCount]) -> Self {
        let mut totals: HashMap<&str, u64> = HashMap::new();
        for row in counts {
            *totals.entry(row.category.as_str()).or_default() += row.studies_found;
        }

        let mut ordered: Vec<(&str, u64)> = totals.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let order: Vec<String> = ordered.iter().map(|(name, _)| name.to_string()).collect();
        let index = order
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Self { order, index }
    }

    /// Categories from highest priority (index 0) down.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Priority index of a category; 0 is highest.
    pub fn priority_index(&self, category: &str) -> Option<usize> {
        self.index.get(category).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Exactly one category resolved per unique gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneAssignment {
    pub gene: String,
    pub category: String,
    pub studies: u64,
}

/// Resolve every gene in `counts` to exactly one category.
///
/// Returns assignments sorted by gene symbol ascending, plus the global
/// ranking they were resolved against.
pub fn assign_categories(counts: &[CategoryGeneCount]) -> (Vec<GeneAssignment>, CategoryRanking) {
    let ranking = CategoryRanking::rank(counts);

    // BTreeMap keys give the gene-sorted output order directly.
    let mut by_gene: BTreeMap<&str, Vec<&CategoryGeneCount>> = BTreeMap::new();
    for row in counts {
        by_gene.entry(row.gene.as_str()).or_default().push(row);
    }

    let assignments: Vec<GeneAssignment> = by_gene
        .into_iter()
        .map(|(gene, mut rows)| {
            rows.sort_by(|a, b| {
                let pa = ranking.priority_index(&a.category).unwrap_or(usize::MAX);
                let pb = ranking.priority_index(&b.category).unwrap_or(usize::MAX);
                pa.cmp(&pb)
                    .then_with(|| b.studies_found.cmp(&a.studies_found))
                    .then_with(|| a.category.cmp(&b.category))
            });
            let chosen = rows[0];
            GeneAssignment {
                gene: gene.to_string(),
                category: chosen.category.clone(),
                studies: chosen.studies_found,
            }
        })
        .collect();

    info!(
        genes = assignments.len(),
        categories = ranking.order().len(),
        "Priority assignment complete"
    );

    (assignments, ranking)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(category: &str, gene: &str, n: u64) -> CategoryGeneCount {
        CategoryGeneCount {
            category: category.to_string(),
            gene: gene.to_string(),
            studies_found: n,
        }
    }

    #[test]
    fn test_ranking_by_total_desc() {
        let counts = vec![
            row("Cat1", "G1", 10),
            row("Cat2", "G1", 10),
            row("Cat2", "G2", 5),
        ];

        let ranking = CategoryRanking::rank(&counts);
        assert_eq!(ranking.order(), &["Cat2", "Cat1"]);
        assert_eq!(ranking.priority_index("Cat2"), Some(0));
        assert_eq!(ranking.priority_index("Cat1"), Some(1));
    }

    #[test]
    fn test_ranking_tie_broken_by_name() {
        let counts = vec![row("Zeta", "G1", 5), row("Alpha", "G2", 5)];

        let ranking = CategoryRanking::rank(&counts);
        assert_eq!(ranking.order(), &["Alpha", "Zeta"]);
    }

    #[test]
    fn test_assignment_prefers_higher_priority_category() {
        // Cat1 total 10, Cat2 total 15, so priority order is [Cat2, Cat1].
        // G1 is in both; it goes to Cat2 with its own count of 10.
        let counts = vec![
            row("Cat1", "G1", 10),
            row("Cat2", "G1", 10),
            row("Cat2", "G2", 5),
        ];

        let (assignments, ranking) = assign_categories(&counts);
        assert_eq!(ranking.order(), &["Cat2", "Cat1"]);
        assert_eq!(assignments.len(), 2);

        assert_eq!(assignments[0], GeneAssignment {
            gene: "G1".to_string(),
            category: "Cat2".to_string(),
            studies: 10,
        });
        assert_eq!(assignments[1], GeneAssignment {
            gene: "G2".to_string(),
            category: "Cat2".to_string(),
            studies: 5,
        });
    }

    #[test]
    fn test_assignment_single_category_trivially_wins() {
        let counts = vec![row("OnlyCat", "G1", 0)];

        let (assignments, _) = assign_categories(&counts);
        assert_eq!(assignments[0].category, "OnlyCat");
        assert_eq!(assignments[0].studies, 0);
    }

    #[test]
    fn test_assignment_all_zero_counts_still_assigns() {
        let counts = vec![
            row("CatA", "G1", 0),
            row("CatB", "G1", 0),
        ];

        let (assignments, ranking) = assign_categories(&counts);
        // Totals tie at zero; CatA ranks first by name and wins.
        assert_eq!(ranking.order(), &["CatA", "CatB"]);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].category, "CatA");
    }

    #[test]
    fn test_assignment_lexicographic_final_tiebreak() {
        // Both categories have equal totals and the gene's own counts are
        // equal, so the lexicographically smaller name wins.
        let counts = vec![
            row("Beta", "G1", 4),
            row("Alpha", "G1", 4),
        ];

        let (assignments, _) = assign_categories(&counts);
        assert_eq!(assignments[0].category, "Alpha");
    }

    #[test]
    fn test_assignment_output_gene_sorted() {
        let counts = vec![
            row("Cat1", "ZZZ", 1),
            row("Cat1", "AAA", 1),
            row("Cat1", "MMM", 1),
        ];

        let (assignments, _) = assign_categories(&counts);
        let genes: Vec<_> = assignments.iter().map(|a| a.gene.as_str()).collect();
        assert_eq!(genes, vec!["AAA", "MMM", "ZZZ"]);
    }

    #[test]
    fn test_assignment_never_invents_categories() {
        let counts = vec![
            row("Cat1", "G1", 2),
            row("Cat2", "G2", 9),
        ];

        let (assignments, _) = assign_categories(&counts);
        let g1 = assignments.iter().find(|a| a.gene == "G1").unwrap();
        // G1 is not in Cat2, however large Cat2's volume is.
        assert_eq!(g1.category, "Cat1");
    }
}
