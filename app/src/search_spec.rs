// ==============================================================================
// search_spec.rs - Search Specifications
// ==============================================================================
// Description: Structured query inputs handed to the variant search engine
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::filters::{AlleleCountFilter, BurdenFilter, GenotypeFilter, QualityFilter, VariantFilter};

/// How a Mendelian or cohort variant search selects variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    StandardInheritance,
    CustomInheritance,
    GeneBurden,
    AlleleCount,
    AllVariants,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::StandardInheritance => "standard_inheritance",
            SearchMode::CustomInheritance => "custom_inheritance",
            SearchMode::GeneBurden => "gene_burden",
            SearchMode::AlleleCount => "allele_count",
            SearchMode::AllVariants => "all_variants",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard_inheritance" => Ok(SearchMode::StandardInheritance),
            "custom_inheritance" => Ok(SearchMode::CustomInheritance),
            "gene_burden" => Ok(SearchMode::GeneBurden),
            "allele_count" => Ok(SearchMode::AlleleCount),
            "all_variants" => Ok(SearchMode::AllVariants),
            other => Err(other.to_string()),
        }
    }
}

/// Family or cohort variant search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MendelianVariantSearchSpec {
    pub search_mode: SearchMode,
    pub inheritance_mode: Option<String>,
    pub genotype_inheritance_filter: Option<GenotypeFilter>,
    pub gene_burden_filter: Option<BurdenFilter>,
    pub allele_count_filter: Option<AlleleCountFilter>,
    pub variant_filter: Option<VariantFilter>,
    pub genotype_quality_filter: Option<QualityFilter>,
}

/// Gene-level search across a cohort
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortGeneSearchSpec {
    pub inheritance_mode: String,
    pub variant_filter: Option<VariantFilter>,
    pub genotype_quality_filter: Option<QualityFilter>,
}

/// Gene-level search combining several families
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombineMendelianFamiliesSpec {
    pub inheritance_mode: String,
    pub variant_filter: Option<VariantFilter>,
    pub genotype_quality_filter: Option<QualityFilter>,
}

/// Search restricted to the genes of a curated gene list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticSearchSpec {
    pub variant_filter: Option<VariantFilter>,
    pub gene_ids: Vec<String>,
}
