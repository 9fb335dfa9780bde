// ==============================================================================
// state.rs - Application State Management
// ==============================================================================
// Description: Shared application state for the seqr gateway
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use anyhow::{Context, Result};
use seqr_search::{Catalog, GeneReference, MemoryCatalog, PgCatalog, Reference, SearchContext};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

use crate::config::{CatalogSource, Config};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Project / family / gene list metadata
    catalog: Box<dyn Catalog>,

    /// Reference gene table used to resolve gene and region text
    reference: GeneReference,
}

impl AppState {
    /// Create new application state from configuration
    pub async fn new(config: &Config) -> Result<Self> {
        let reference = GeneReference::load(&config.reference_genes).with_context(|| {
            format!(
                "Failed to load reference genes from {}",
                config.reference_genes.display()
            )
        })?;

        let catalog: Box<dyn Catalog> = match config.catalog_source()? {
            CatalogSource::Postgres(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(&database_url)
                    .await
                    .context("Failed to connect to PostgreSQL")?;
                info!("Using PostgreSQL catalog");
                Box::new(PgCatalog::new(pool))
            }
            CatalogSource::Seed(path) => {
                let catalog = MemoryCatalog::load(&path)
                    .await
                    .with_context(|| format!("Failed to load catalog seed {}", path.display()))?;
                info!("Using in-memory catalog from {}", path.display());
                Box::new(catalog)
            }
        };

        Ok(Self::from_parts(catalog, reference))
    }

    pub fn from_parts(catalog: Box<dyn Catalog>, reference: GeneReference) -> Self {
        Self {
            inner: Arc::new(AppStateInner { catalog, reference }),
        }
    }

    /// Get catalog
    pub fn catalog(&self) -> &dyn Catalog {
        self.inner.catalog.as_ref()
    }

    /// Get reference gene table
    pub fn reference(&self) -> &dyn Reference {
        &self.inner.reference
    }

    pub fn reference_gene_count(&self) -> usize {
        self.inner.reference.len()
    }

    /// Services needed to clean search forms
    pub fn search_context(&self) -> SearchContext<'_> {
        SearchContext {
            reference: self.reference(),
            catalog: self.catalog(),
        }
    }

    /// Create state backed by the test fixtures
    #[cfg(test)]
    pub fn mock() -> Self {
        let reference = GeneReference::from_reader(fixtures::GENES_TSV.as_bytes())
            .expect("fixture reference parses");
        let seed = serde_json::from_str(fixtures::CATALOG_SEED).expect("fixture seed parses");
        let catalog = MemoryCatalog::from_seed(seed).expect("fixture seed is consistent");
        Self::from_parts(Box::new(catalog), reference)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::ffi::OsStr;
    use std::io::Write;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_new_from_seed_and_reference_files() {
        let dir = TempDir::new().unwrap();
        let genes_path = dir.path().join("genes.tsv");
        let seed_path = dir.path().join("seed.json");
        std::fs::File::create(&genes_path)
            .unwrap()
            .write_all(fixtures::GENES_TSV.as_bytes())
            .unwrap();
        std::fs::write(&seed_path, fixtures::CATALOG_SEED).unwrap();

        let config = Config::try_parse_from([
            OsStr::new("seqr-server"),
            OsStr::new("--reference-genes"),
            genes_path.as_os_str(),
            OsStr::new("--catalog-seed"),
            seed_path.as_os_str(),
        ])
        .unwrap();

        let state = AppState::new(&config).await.unwrap();
        assert_eq!(state.reference_gene_count(), 3);
        assert!(state.catalog().ping().await);
        assert!(state.catalog().project("cmg").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_new_fails_on_missing_reference() {
        let dir = TempDir::new().unwrap();
        let config = Config::try_parse_from([
            OsStr::new("seqr-server"),
            OsStr::new("--reference-genes"),
            dir.path().join("absent.tsv").as_os_str(),
            OsStr::new("--catalog-seed"),
            dir.path().join("absent.json").as_os_str(),
        ])
        .unwrap();

        assert!(AppState::new(&config).await.is_err());
    }
}
