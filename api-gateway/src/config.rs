// ==============================================================================
// config.rs - Gateway Configuration
// ==============================================================================
// Description: Command line / environment configuration for the gateway
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

/// seqr page and API gateway
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Port to listen on
    #[arg(long, env = "SEQR_PORT", default_value_t = 8099)]
    pub port: u16,

    /// PostgreSQL catalog database URL (or use DATABASE_URL_FILE)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// JSON catalog seed, used when no database is configured
    #[arg(long, env = "CATALOG_SEED")]
    pub catalog_seed: Option<PathBuf>,

    /// Reference gene table (TSV, optionally .gz)
    #[arg(long, env = "REFERENCE_GENES")]
    pub reference_genes: PathBuf,

    /// Comma-separated list of allowed CORS origins
    #[arg(long, env = "CORS_ALLOWED_ORIGINS", default_value = "http://localhost:3000")]
    pub cors_allowed_origins: String,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Where the catalog is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Postgres(String),
    Seed(PathBuf),
}

impl Config {
    /// Resolve the catalog backend; a database takes precedence over a seed file
    pub fn catalog_source(&self) -> Result<CatalogSource> {
        if let Some(url) = &self.database_url {
            return Ok(CatalogSource::Postgres(url.clone()));
        }

        if let Ok(file_path) = std::env::var("DATABASE_URL_FILE") {
            let url = std::fs::read_to_string(&file_path)
                .with_context(|| format!("Failed to read DATABASE_URL_FILE {}", file_path))?;
            return Ok(CatalogSource::Postgres(url.trim().to_string()));
        }

        match &self.catalog_seed {
            Some(path) => Ok(CatalogSource::Seed(path.clone())),
            None => anyhow::bail!("DATABASE_URL, DATABASE_URL_FILE or CATALOG_SEED must be provided"),
        }
    }

    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let config = Config::try_parse_from([
            "seqr-server",
            "--reference-genes",
            "/data/genes.tsv.gz",
            "--catalog-seed",
            "/data/seed.json",
            "--cors-allowed-origins",
            "https://seqr.example.org, http://localhost:3000,",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(config.reference_genes, PathBuf::from("/data/genes.tsv.gz"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.allowed_origins(),
            vec!["https://seqr.example.org", "http://localhost:3000"]
        );
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = Config::try_parse_from([
            "seqr-server",
            "--reference-genes",
            "genes.tsv",
            "--catalog-seed",
            "seed.json",
            "--database-url",
            "postgres://seqr@localhost/seqr",
        ])
        .unwrap();

        assert_eq!(
            config.catalog_source().unwrap(),
            CatalogSource::Postgres("postgres://seqr@localhost/seqr".to_string())
        );
    }
}
