// ==============================================================================
// filters.rs - Variant Search Filters
// ==============================================================================
// Description: Filter value objects and the built-in named filter dictionaries
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==============================================================================
// CONSEQUENCE TERM SETS (Sequence Ontology)
// ==============================================================================

const HIGH_IMPACT_ANNOTATIONS: &[&str] = &[
    "transcript_ablation",
    "splice_donor_variant",
    "splice_acceptor_variant",
    "stop_gained",
    "frameshift_variant",
    "stop_lost",
    "initiator_codon_variant",
    "start_lost",
];

const MODERATE_IMPACT_ANNOTATIONS: &[&str] = &[
    "transcript_amplification",
    "inframe_insertion",
    "inframe_deletion",
    "missense_variant",
    "protein_altering_variant",
];

const LOW_IMPACT_CODING_ANNOTATIONS: &[&str] = &[
    "splice_region_variant",
    "incomplete_terminal_codon_variant",
    "stop_retained_variant",
    "synonymous_variant",
    "coding_sequence_variant",
];

/// Population reference panels used for allele frequency cutoffs
const RARE_FREQ_CUTOFF: f64 = 0.01;
const FREQ_REFERENCE_PANELS: &[&str] = &["1kg_wgs_phase3", "exac_v3", "gnomad_genomes"];

// ==============================================================================
// FILTER VALUE OBJECTS
// ==============================================================================

/// Variant-level annotation filter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_types: Option<Vec<String>>,

    /// Sequence Ontology consequence terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub so_annotations: Option<Vec<String>>,

    /// Annotation source → accepted values (e.g. `polyphen` → `["damaging"]`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, Vec<String>>>,

    /// `(population, max allele frequency)` pairs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_freqs: Option<Vec<(String, f64)>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genes: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_genes: Option<Vec<String>>,

    /// Inclusive `(xstart, xend)` ranges
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<(i64, i64)>>,
}

/// Per-genotype call quality thresholds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QualityFilter {
    /// `pass` to require a PASS FILTER column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vcf_filter: Option<String>,

    /// Minimum genotype quality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_gq: Option<u32>,

    /// Minimum allele balance for heterozygous calls, in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ab: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub het_ratio: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hom_alt_ratio: Option<f64>,
}

/// Genotype an individual must carry for a variant to pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenotypeRequirement {
    RefRef,
    RefAlt,
    AltAlt,
    HasAlt,
    HasRef,
    NotMissing,
    Missing,
}

/// Individual ID → required genotype
pub type GenotypeFilter = BTreeMap<String, GenotypeRequirement>;

/// Number of alternate alleles an individual must carry within a gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurdenRequirement {
    #[serde(rename = "at_least_1")]
    AtLeast1,
    #[serde(rename = "at_least_2")]
    AtLeast2,
    #[serde(rename = "less_than_2")]
    LessThan2,
    None,
}

/// Individual ID → required gene burden
pub type BurdenFilter = BTreeMap<String, BurdenRequirement>;

/// Bounds on how many affected / unaffected individuals carry the allele
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlleleCountFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_gte: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_lte: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unaffected_gte: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unaffected_lte: Option<u32>,
}

// ==============================================================================
// BUILT-IN FILTER DICTIONARIES
// ==============================================================================

/// A named, preconfigured filter
#[derive(Debug, Clone, Serialize)]
pub struct NamedFilter<F> {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub filter: F,
}

fn terms(sets: &[&[&str]]) -> Vec<String> {
    sets.iter()
        .flat_map(|set| set.iter().map(|s| s.to_string()))
        .collect()
}

fn rare_freqs() -> Vec<(String, f64)> {
    FREQ_REFERENCE_PANELS
        .iter()
        .map(|panel| (panel.to_string(), RARE_FREQ_CUTOFF))
        .collect()
}

/// Built-in variant filters, in display order
pub fn default_variant_filters() -> Vec<NamedFilter<VariantFilter>> {
    vec![
        NamedFilter {
            slug: "high_impact",
            name: "High Impact",
            description: "Nonsense, essential splice site and frameshift variants below 1% frequency",
            filter: VariantFilter {
                so_annotations: Some(terms(&[HIGH_IMPACT_ANNOTATIONS])),
                ref_freqs: Some(rare_freqs()),
                ..Default::default()
            },
        },
        NamedFilter {
            slug: "moderate_impact",
            name: "Moderate to High Impact",
            description: "High impact variants plus missense and in-frame indels below 1% frequency",
            filter: VariantFilter {
                so_annotations: Some(terms(&[
                    HIGH_IMPACT_ANNOTATIONS,
                    MODERATE_IMPACT_ANNOTATIONS,
                ])),
                ref_freqs: Some(rare_freqs()),
                ..Default::default()
            },
        },
        NamedFilter {
            slug: "all_coding",
            name: "All Coding",
            description: "Every coding and splice region variant, no frequency cutoff",
            filter: VariantFilter {
                so_annotations: Some(terms(&[
                    HIGH_IMPACT_ANNOTATIONS,
                    MODERATE_IMPACT_ANNOTATIONS,
                    LOW_IMPACT_CODING_ANNOTATIONS,
                ])),
                ..Default::default()
            },
        },
        NamedFilter {
            slug: "all_coding_rare",
            name: "All Rare Coding",
            description: "Every coding and splice region variant below 1% frequency",
            filter: VariantFilter {
                so_annotations: Some(terms(&[
                    HIGH_IMPACT_ANNOTATIONS,
                    MODERATE_IMPACT_ANNOTATIONS,
                    LOW_IMPACT_CODING_ANNOTATIONS,
                ])),
                ref_freqs: Some(rare_freqs()),
                ..Default::default()
            },
        },
    ]
}

/// Built-in quality filters, in display order
pub fn default_quality_filters() -> Vec<NamedFilter<QualityFilter>> {
    vec![
        NamedFilter {
            slug: "high_quality",
            name: "High Quality",
            description: "PASS variants with GQ >= 20 and allele balance >= 25%",
            filter: QualityFilter {
                vcf_filter: Some("pass".to_string()),
                min_gq: Some(20),
                min_ab: Some(25),
                ..Default::default()
            },
        },
        NamedFilter {
            slug: "all_pass",
            name: "All Passing Variants",
            description: "Variants with a PASS filter value",
            filter: QualityFilter {
                vcf_filter: Some("pass".to_string()),
                ..Default::default()
            },
        },
        NamedFilter {
            slug: "min_quality",
            name: "Minimum Quality",
            description: "Any call with GQ >= 5",
            filter: QualityFilter {
                min_gq: Some(5),
                ..Default::default()
            },
        },
    ]
}

/// Look up a built-in variant filter by slug
pub fn default_variant_filter(slug: &str) -> Option<VariantFilter> {
    default_variant_filters()
        .into_iter()
        .find(|f| f.slug == slug)
        .map(|f| f.filter)
}

/// Look up a built-in quality filter by slug
pub fn default_quality_filter(slug: &str) -> Option<QualityFilter> {
    default_quality_filters()
        .into_iter()
        .find(|f| f.slug == slug)
        .map(|f| f.filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        let high = default_variant_filter("high_impact").unwrap();
        let annotations = high.so_annotations.unwrap();
        assert!(annotations.contains(&"stop_gained".to_string()));
        assert!(!annotations.contains(&"missense_variant".to_string()));
        assert_eq!(high.ref_freqs.unwrap().len(), FREQ_REFERENCE_PANELS.len());

        assert!(default_variant_filter("all_coding").unwrap().ref_freqs.is_none());
        assert!(default_variant_filter("everything").is_none());

        let hq = default_quality_filter("high_quality").unwrap();
        assert_eq!(hq.min_gq, Some(20));
        assert!(default_quality_filter("low_quality").is_none());
    }

    #[test]
    fn test_builtin_slugs_unique() {
        let mut slugs: Vec<_> = default_variant_filters().iter().map(|f| f.slug).collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), default_variant_filters().len());
    }

    #[test]
    fn test_variant_filter_rejects_unknown_keys() {
        let result: Result<VariantFilter, _> =
            serde_json::from_str(r#"{"so_annotations": ["stop_gained"], "bogus": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_genotype_and_burden_filters_decode() {
        let genotypes: GenotypeFilter =
            serde_json::from_str(r#"{"NA12878": "alt_alt", "NA12891": "ref_alt"}"#).unwrap();
        assert_eq!(genotypes["NA12878"], GenotypeRequirement::AltAlt);

        let burden: BurdenFilter = serde_json::from_str(r#"{"NA12878": "at_least_2"}"#).unwrap();
        assert_eq!(burden["NA12878"], BurdenRequirement::AtLeast2);

        let bad: Result<GenotypeFilter, _> = serde_json::from_str(r#"{"NA12878": "hom"}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_burden_requirement_wire_names() {
        let all = [
            BurdenRequirement::AtLeast1,
            BurdenRequirement::AtLeast2,
            BurdenRequirement::LessThan2,
            BurdenRequirement::None,
        ];
        assert_eq!(
            serde_json::to_value(all).unwrap(),
            serde_json::json!(["at_least_1", "at_least_2", "less_than_2", "none"])
        );

        let legacy: Result<BurdenFilter, _> = serde_json::from_str(r#"{"P": "at_least2"}"#);
        assert!(legacy.is_err());
    }
}
