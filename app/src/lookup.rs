// ==============================================================================
// lookup.rs - Free-Text Gene and Region Resolution
// ==============================================================================
// Description: Resolves user-entered gene and region text to gene IDs and
//              xpos ranges
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use std::collections::HashSet;
use tracing::debug;

use crate::catalog::{Catalog, CatalogError};
use crate::genomeloc;
use crate::reference::Reference;

/// Outcome of resolving free text
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved<T> {
    Ok(T),
    /// First token that could not be resolved
    Unrecognized(String),
}

/// Tokens of a free-text gene list: whitespace or comma separated
pub fn gene_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
}

/// Tokens of a free-text region list: whitespace or semicolon separated
pub fn region_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| c.is_whitespace() || c == ';')
        .filter(|t| !t.is_empty())
}

/// Resolve whitespace/comma separated gene IDs, gene symbols and gene list slugs
///
/// Gene list slugs expand to every gene on the list. The result keeps
/// first-seen order with duplicates removed.
pub async fn gene_id_list_from_raw(
    raw: &str,
    reference: &dyn Reference,
    catalog: &dyn Catalog,
) -> Result<Resolved<Vec<String>>, CatalogError> {
    let mut seen = HashSet::new();
    let mut gene_ids = Vec::new();

    for token in gene_tokens(raw) {
        let ids = if let Some(gene) = reference.resolve_gene(token) {
            vec![gene.gene_id.clone()]
        } else if let Some(gene_list) = catalog.gene_list(token).await? {
            debug!("Expanded gene list {} ({} genes)", token, gene_list.gene_ids.len());
            gene_list.gene_ids
        } else {
            return Ok(Resolved::Unrecognized(token.to_string()));
        };

        for id in ids {
            if seen.insert(id.clone()) {
                gene_ids.push(id);
            }
        }
    }

    Ok(Resolved::Ok(gene_ids))
}

/// Resolve whitespace/semicolon separated regions (`chr1:100-200`) or genes
/// to inclusive xpos ranges
pub fn locations_from_raw(raw: &str, reference: &dyn Reference) -> Resolved<Vec<(i64, i64)>> {
    let mut locations = Vec::new();

    for token in region_tokens(raw) {
        let location = if token.contains(':') {
            genomeloc::parse_region(token).ok()
        } else {
            reference.resolve_gene(token).and_then(|g| g.xrange().ok())
        };

        match location {
            Some(location) => locations.push(location),
            None => return Resolved::Unrecognized(token.to_string()),
        }
    }

    Resolved::Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::tests::test_catalog;
    use crate::reference::tests::test_reference;

    #[tokio::test]
    async fn test_genes_by_symbol_id_and_list() {
        let reference = test_reference();
        let catalog = test_catalog();

        let resolved = gene_id_list_from_raw(
            "tp53, ENSG00000012048\nbreast-cancer",
            &reference,
            &catalog,
        )
        .await
        .unwrap();

        // BRCA1 appears both directly and via the list; kept once
        assert_eq!(
            resolved,
            Resolved::Ok(vec![
                "ENSG00000141510".to_string(),
                "ENSG00000012048".to_string(),
                "ENSG00000139618".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_unrecognized_gene_reported() {
        let reference = test_reference();
        let catalog = test_catalog();

        let resolved = gene_id_list_from_raw("BRCA1 FAKE1 FAKE2", &reference, &catalog)
            .await
            .unwrap();
        assert_eq!(resolved, Resolved::Unrecognized("FAKE1".to_string()));
    }

    #[test]
    fn test_locations_from_regions_and_genes() {
        let reference = test_reference();

        let resolved = locations_from_raw("chr1:1,000-2,000; X:5\nTP53", &reference);
        assert_eq!(
            resolved,
            Resolved::Ok(vec![
                (1_000_001_000, 1_000_002_000),
                (23_000_000_005, 23_000_000_005),
                (17_007_661_779, 17_007_687_550),
            ])
        );
    }

    #[test]
    fn test_unrecognized_region_reported() {
        let reference = test_reference();
        assert_eq!(
            locations_from_raw("chr1:100-200 chr1:500-100", &reference),
            Resolved::Unrecognized("chr1:500-100".to_string())
        );
        assert_eq!(
            locations_from_raw("NOTAGENE", &reference),
            Resolved::Unrecognized("NOTAGENE".to_string())
        );
    }
}
