// ==============================================================================
// reference.rs - Reference Gene Service
// ==============================================================================
// Description: Gene ID / symbol resolution against a reference gene table
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================
// Format: tab-separated file with header, optionally gzip-compressed (.gz)
// Example:
//   gene_id          symbol  chrom  start     end
//   ENSG00000012048  BRCA1   17     43044295  43125483
// ==============================================================================

use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::genomeloc::{self, RegionError};

/// A gene in the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub gene_id: String,
    pub symbol: String,
    pub chrom: String,
    pub start: i64,
    pub end: i64,
}

impl Gene {
    /// Extent of the gene as an inclusive xpos range
    pub fn xrange(&self) -> Result<(i64, i64), RegionError> {
        Ok((
            genomeloc::xpos(&self.chrom, self.start)?,
            genomeloc::xpos(&self.chrom, self.end)?,
        ))
    }
}

/// Errors that can occur while loading the reference gene table
#[derive(Error, Debug)]
pub enum ReferenceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid gene record at line {line}: {details}")]
    InvalidRecord { line: u64, details: String },

    #[error("Duplicate gene ID: {0}")]
    DuplicateGene(String),
}

/// Gene lookups used while cleaning search forms
pub trait Reference: Send + Sync {
    fn is_valid_gene_id(&self, gene_id: &str) -> bool;

    /// Resolve a gene symbol (case-insensitive) to its gene ID
    fn gene_id_from_symbol(&self, symbol: &str) -> Option<&str>;

    fn gene(&self, gene_id: &str) -> Option<&Gene>;

    /// Resolve a token that is either a gene ID or a gene symbol
    fn resolve_gene(&self, token: &str) -> Option<&Gene> {
        self.gene(token)
            .or_else(|| self.gene_id_from_symbol(token).and_then(|id| self.gene(id)))
    }
}

/// In-memory reference gene table
#[derive(Debug, Default)]
pub struct GeneReference {
    genes: HashMap<String, Gene>,
    symbols: HashMap<String, String>,
}

impl GeneReference {
    /// Load the reference table from a TSV file (plain or `.gz`)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReferenceError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let input: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        let reference = Self::from_reader(input)?;
        info!(
            "Loaded {} reference genes from {}",
            reference.len(),
            path.display()
        );
        Ok(reference)
    }

    /// Parse a reference table from any reader
    pub fn from_reader(input: impl Read) -> Result<Self, ReferenceError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let mut genes = Vec::new();
        for (idx, result) in reader.deserialize().enumerate() {
            // Header occupies line 1
            let line = idx as u64 + 2;
            let gene: Gene = result.map_err(|e| ReferenceError::InvalidRecord {
                line,
                details: e.to_string(),
            })?;
            gene.xrange().map_err(|e| ReferenceError::InvalidRecord {
                line,
                details: e.to_string(),
            })?;
            if gene.end < gene.start {
                return Err(ReferenceError::InvalidRecord {
                    line,
                    details: format!("end {} is before start {}", gene.end, gene.start),
                });
            }
            genes.push(gene);
        }

        Self::from_genes(genes)
    }

    /// Build a reference from already-parsed genes
    pub fn from_genes(genes: impl IntoIterator<Item = Gene>) -> Result<Self, ReferenceError> {
        let mut reference = Self::default();

        for gene in genes {
            if reference.genes.contains_key(&gene.gene_id) {
                return Err(ReferenceError::DuplicateGene(gene.gene_id));
            }
            reference
                .symbols
                .entry(gene.symbol.to_uppercase())
                .or_insert_with(|| gene.gene_id.clone());
            reference.genes.insert(gene.gene_id.clone(), gene);
        }

        Ok(reference)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl Reference for GeneReference {
    fn is_valid_gene_id(&self, gene_id: &str) -> bool {
        self.genes.contains_key(gene_id)
    }

    fn gene_id_from_symbol(&self, symbol: &str) -> Option<&str> {
        self.symbols.get(&symbol.to_uppercase()).map(String::as_str)
    }

    fn gene(&self, gene_id: &str) -> Option<&Gene> {
        self.genes.get(gene_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    pub(crate) const TEST_GENES_TSV: &str = "\
gene_id\tsymbol\tchrom\tstart\tend
ENSG00000012048\tBRCA1\t17\t43044295\t43125483
ENSG00000139618\tBRCA2\t13\t32315474\t32400266
ENSG00000141510\tTP53\t17\t7661779\t7687550
ENSG00000198947\tDMD\tX\t31097677\t33339441
";

    pub(crate) fn test_reference() -> GeneReference {
        GeneReference::from_reader(TEST_GENES_TSV.as_bytes()).unwrap()
    }

    #[test]
    fn test_lookup_by_id_and_symbol() {
        let reference = test_reference();
        assert_eq!(reference.len(), 4);
        assert!(reference.is_valid_gene_id("ENSG00000141510"));
        assert!(!reference.is_valid_gene_id("TP53"));
        assert_eq!(reference.gene_id_from_symbol("tp53"), Some("ENSG00000141510"));
        assert_eq!(
            reference.resolve_gene("brca2").map(|g| g.gene_id.as_str()),
            Some("ENSG00000139618")
        );
        assert!(reference.resolve_gene("NOTAGENE").is_none());
    }

    #[test]
    fn test_gene_xrange() {
        let reference = test_reference();
        let dmd = reference.gene("ENSG00000198947").unwrap();
        assert_eq!(dmd.xrange().unwrap(), (23_031_097_677, 23_033_339_441));
    }

    #[test]
    fn test_invalid_record_names_line() {
        let tsv = "gene_id\tsymbol\tchrom\tstart\tend\nENSG1\tA\t1\t10\t20\nENSG2\tB\tchrQ\t10\t20\n";
        match GeneReference::from_reader(tsv.as_bytes()) {
            Err(ReferenceError::InvalidRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected InvalidRecord, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_gene_rejected() {
        let tsv = "gene_id\tsymbol\tchrom\tstart\tend\nENSG1\tA\t1\t10\t20\nENSG1\tB\t1\t10\t20\n";
        assert!(matches!(
            GeneReference::from_reader(tsv.as_bytes()),
            Err(ReferenceError::DuplicateGene(_))
        ));
    }

    #[test]
    fn test_load_gzipped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genes.tsv.gz");

        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(TEST_GENES_TSV.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let reference = GeneReference::load(&path).unwrap();
        assert_eq!(reference.len(), 4);
        assert!(reference.is_valid_gene_id("ENSG00000012048"));
    }
}
