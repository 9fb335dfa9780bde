// ==============================================================================
// forms.rs - Variant Search Forms
// ==============================================================================
// Description: Validates submitted search parameters and builds search specs
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// Security: All user-supplied filter JSON is decoded strictly (unknown keys
//           rejected); gene, region and family references are resolved
//           before a search spec is produced
// ==============================================================================
//
// Every form decodes from URL-encoded fields. Text is whitespace-trimmed and
// blank values count as absent. `clean()` runs the required-field checks
// first, then the shared parse steps in a fixed order, then form-specific
// rules.
//
// ==============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;
use validator::{Validate, ValidationErrors};

use crate::catalog::{Catalog, CatalogError, Family};
use crate::filters::{
    self, AlleleCountFilter, BurdenFilter, GenotypeFilter, QualityFilter, VariantFilter,
};
use crate::lookup::{self, Resolved};
use crate::reference::Reference;
use crate::search_spec::{
    CohortGeneSearchSpec, CombineMendelianFamiliesSpec, DiagnosticSearchSpec,
    MendelianVariantSearchSpec, SearchMode,
};

// ==============================================================================
// ERRORS
// ==============================================================================

/// Reasons a search form is rejected
#[derive(Error, Debug)]
pub enum FormError {
    #[error("{}", format_field_errors(.0))]
    Fields(BTreeMap<String, Vec<String>>),

    #[error("Invalid search mode: {0}")]
    InvalidSearchMode(String),

    #[error("Inheritance mode is required for standard search.")]
    InheritanceModeRequired,

    #[error("Unknown variant filter: {0}")]
    UnknownVariantFilter(String),

    #[error("{0} is not a valid quality filter name")]
    UnknownQualityFilter(String),

    #[error("Invalid {field}: {source}")]
    InvalidJson {
        field: &'static str,
        source: serde_json::Error,
    },

    #[error("{0} is not a recognized gene or gene set")]
    UnrecognizedGenes(String),

    #[error("{0} is not a recognized region")]
    UnrecognizedRegion(String),

    #[error("{0} is not a valid gene ID")]
    InvalidGeneId(String),

    #[error("Family {family_id} not found in project {project_id}")]
    UnknownFamily {
        project_id: String,
        family_id: String,
    },

    #[error("Unknown gene list: {0}")]
    UnknownGeneList(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl FormError {
    /// True when the rejection is caused by the submitted data
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FormError::Catalog(_))
    }
}

fn format_field_errors(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ValidationErrors> for FormError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, errs) in errors.field_errors() {
            let messages = fields.entry(field.to_string()).or_default();
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                messages.push(message);
            }
        }
        FormError::Fields(fields)
    }
}

// ==============================================================================
// SHARED PARSE STEPS
// ==============================================================================

/// Services consulted while cleaning forms
#[derive(Clone, Copy)]
pub struct SearchContext<'a> {
    pub reference: &'a dyn Reference,
    pub catalog: &'a dyn Catalog,
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn parse_json<T: DeserializeOwned>(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<T>, FormError> {
    raw.map(|raw| serde_json::from_str(raw).map_err(|source| FormError::InvalidJson { field, source }))
        .transpose()
}

/// Variant filter as submitted: free-text genes and regions still unresolved
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubmittedVariantFilter {
    #[serde(default)]
    variant_types: Option<Vec<String>>,
    #[serde(default)]
    so_annotations: Option<Vec<String>>,
    #[serde(default)]
    annotations: Option<BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    ref_freqs: Option<Vec<(String, f64)>>,
    #[serde(default)]
    genes: Option<Vec<String>>,
    #[serde(default)]
    exclude_genes: Option<Vec<String>>,
    #[serde(default)]
    locations: Option<Vec<(i64, i64)>>,
    #[serde(default)]
    genes_raw: Option<String>,
    #[serde(default)]
    regions: Option<String>,
}

/// Named built-in filter wins over submitted JSON
async fn parse_variant_filter(
    name: Option<&str>,
    json: Option<&str>,
    ctx: &SearchContext<'_>,
) -> Result<Option<VariantFilter>, FormError> {
    if let Some(name) = name {
        return filters::default_variant_filter(name)
            .map(Some)
            .ok_or_else(|| FormError::UnknownVariantFilter(name.to_string()));
    }

    let Some(submitted) = parse_json::<SubmittedVariantFilter>("variant_filter", json)? else {
        return Ok(None);
    };

    let mut genes = submitted.genes;
    // Separator-only text names no genes; treat it as not submitted
    if let Some(raw) = submitted
        .genes_raw
        .as_deref()
        .filter(|s| lookup::gene_tokens(s).next().is_some())
    {
        match lookup::gene_id_list_from_raw(raw, ctx.reference, ctx.catalog).await? {
            Resolved::Ok(ids) => genes = Some(ids),
            Resolved::Unrecognized(token) => {
                debug!("Unresolved gene token {} in {:?}", token, raw);
                return Err(FormError::UnrecognizedGenes(raw.to_string()));
            }
        }
    }

    let mut locations = submitted.locations;
    if let Some(raw) = submitted
        .regions
        .as_deref()
        .filter(|s| lookup::region_tokens(s).next().is_some())
    {
        match lookup::locations_from_raw(raw, ctx.reference) {
            Resolved::Ok(ranges) => locations = Some(ranges),
            Resolved::Unrecognized(token) => return Err(FormError::UnrecognizedRegion(token)),
        }
    }

    Ok(Some(VariantFilter {
        variant_types: submitted.variant_types,
        so_annotations: submitted.so_annotations,
        annotations: submitted.annotations,
        ref_freqs: submitted.ref_freqs,
        genes,
        exclude_genes: submitted.exclude_genes,
        locations,
    }))
}

fn parse_quality_filter(
    name: Option<&str>,
    json: Option<&str>,
) -> Result<Option<QualityFilter>, FormError> {
    if let Some(name) = name {
        return filters::default_quality_filter(name)
            .map(Some)
            .ok_or_else(|| FormError::UnknownQualityFilter(name.to_string()));
    }
    parse_json("quality_filter", json)
}

/// Resolve a JSON list of `[project_id, family_id]` pairs
async fn parse_family_tuple_list(
    raw: &str,
    catalog: &dyn Catalog,
) -> Result<Vec<Family>, FormError> {
    let tuples: Vec<(String, String)> = serde_json::from_str(raw).map_err(|source| {
        FormError::InvalidJson {
            field: "family_tuple_list",
            source,
        }
    })?;

    let mut families = Vec::with_capacity(tuples.len());
    for (project_id, family_id) in tuples {
        match catalog.family(&project_id, &family_id).await? {
            Some(family) => families.push(family),
            None => return Err(FormError::UnknownFamily { project_id, family_id }),
        }
    }
    Ok(families)
}

fn require_gene_id(gene_id: &str, reference: &dyn Reference) -> Result<(), FormError> {
    if !reference.is_valid_gene_id(gene_id) {
        return Err(FormError::InvalidGeneId(gene_id.to_string()));
    }
    Ok(())
}

// Fields are guaranteed by `validate()`; fall back to empty rather than panic
fn required(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

// ==============================================================================
// MENDELIAN VARIANT SEARCH
// ==============================================================================

const MENDELIAN_SEARCH_MODES: &[SearchMode] = &[
    SearchMode::StandardInheritance,
    SearchMode::CustomInheritance,
    SearchMode::GeneBurden,
    SearchMode::AlleleCount,
    SearchMode::AllVariants,
];

const COHORT_SEARCH_MODES: &[SearchMode] = &[SearchMode::CustomInheritance, SearchMode::GeneBurden];

fn parse_search_mode(raw: &str, allowed: &[SearchMode]) -> Result<SearchMode, FormError> {
    raw.parse::<SearchMode>()
        .ok()
        .filter(|mode| allowed.contains(mode))
        .ok_or_else(|| FormError::InvalidSearchMode(raw.to_string()))
}

/// Variant search within a single family
#[derive(Debug, Default, Deserialize, Validate)]
pub struct MendelianVariantSearchForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub search_mode: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub inheritance_mode: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub genotype_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub burden_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub allele_count_filter: Option<String>,
}

impl MendelianVariantSearchForm {
    pub async fn clean(
        &self,
        ctx: &SearchContext<'_>,
    ) -> Result<MendelianVariantSearchSpec, FormError> {
        self.validate()?;

        let search_mode = parse_search_mode(required(&self.search_mode), MENDELIAN_SEARCH_MODES)?;
        if search_mode == SearchMode::StandardInheritance && self.inheritance_mode.is_none() {
            return Err(FormError::InheritanceModeRequired);
        }

        let variant_filter = parse_variant_filter(
            self.variant_filter_name.as_deref(),
            self.variant_filter.as_deref(),
            ctx,
        )
        .await?;
        let genotype_quality_filter = parse_quality_filter(
            self.quality_filter_name.as_deref(),
            self.quality_filter.as_deref(),
        )?;
        let genotype_inheritance_filter: Option<GenotypeFilter> =
            parse_json("genotype_filter", self.genotype_filter.as_deref())?;
        let gene_burden_filter: Option<BurdenFilter> =
            parse_json("burden_filter", self.burden_filter.as_deref())?;
        let allele_count_filter: Option<AlleleCountFilter> =
            parse_json("allele_count_filter", self.allele_count_filter.as_deref())?;

        Ok(MendelianVariantSearchSpec {
            search_mode,
            inheritance_mode: self.inheritance_mode.clone(),
            genotype_inheritance_filter,
            gene_burden_filter,
            allele_count_filter,
            variant_filter,
            genotype_quality_filter,
        })
    }
}

// ==============================================================================
// COHORT SEARCHES
// ==============================================================================

/// Variant search across a cohort (custom inheritance or gene burden only)
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CohortVariantSearchForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub search_mode: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub genotype_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub burden_filter: Option<String>,
}

impl CohortVariantSearchForm {
    pub async fn clean(
        &self,
        ctx: &SearchContext<'_>,
    ) -> Result<MendelianVariantSearchSpec, FormError> {
        self.validate()?;

        let search_mode = parse_search_mode(required(&self.search_mode), COHORT_SEARCH_MODES)?;

        let variant_filter = parse_variant_filter(
            self.variant_filter_name.as_deref(),
            self.variant_filter.as_deref(),
            ctx,
        )
        .await?;
        let genotype_quality_filter = parse_quality_filter(
            self.quality_filter_name.as_deref(),
            self.quality_filter.as_deref(),
        )?;
        let genotype_inheritance_filter: Option<GenotypeFilter> =
            parse_json("genotype_filter", self.genotype_filter.as_deref())?;
        let gene_burden_filter: Option<BurdenFilter> =
            parse_json("burden_filter", self.burden_filter.as_deref())?;

        Ok(MendelianVariantSearchSpec {
            search_mode,
            inheritance_mode: None,
            genotype_inheritance_filter,
            gene_burden_filter,
            allele_count_filter: None,
            variant_filter,
            genotype_quality_filter,
        })
    }
}

/// Gene-level search across a cohort
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CohortGeneSearchForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub inheritance_mode: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter: Option<String>,
}

impl CohortGeneSearchForm {
    pub async fn clean(&self, ctx: &SearchContext<'_>) -> Result<CohortGeneSearchSpec, FormError> {
        self.validate()?;

        let variant_filter = parse_variant_filter(
            self.variant_filter_name.as_deref(),
            self.variant_filter.as_deref(),
            ctx,
        )
        .await?;
        let genotype_quality_filter = parse_quality_filter(
            self.quality_filter_name.as_deref(),
            self.quality_filter.as_deref(),
        )?;

        Ok(CohortGeneSearchSpec {
            inheritance_mode: required(&self.inheritance_mode).to_string(),
            variant_filter,
            genotype_quality_filter,
        })
    }
}

/// Variants within one gene of a cohort gene search
#[derive(Debug, Clone, Serialize)]
pub struct CohortGeneVariantsQuery {
    pub gene_id: String,
    pub search_spec: CohortGeneSearchSpec,
}

/// Cohort gene search narrowed to a single gene
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CohortGeneSearchVariantsForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub inheritance_mode: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub gene_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter: Option<String>,
}

impl CohortGeneSearchVariantsForm {
    fn gene_search_form(&self) -> CohortGeneSearchForm {
        CohortGeneSearchForm {
            inheritance_mode: self.inheritance_mode.clone(),
            variant_filter_name: self.variant_filter_name.clone(),
            variant_filter: self.variant_filter.clone(),
            quality_filter_name: self.quality_filter_name.clone(),
            quality_filter: self.quality_filter.clone(),
        }
    }

    pub async fn clean(
        &self,
        ctx: &SearchContext<'_>,
    ) -> Result<CohortGeneVariantsQuery, FormError> {
        self.validate()?;

        let search_spec = self.gene_search_form().clean(ctx).await?;
        let gene_id = required(&self.gene_id);
        require_gene_id(gene_id, ctx.reference)?;

        Ok(CohortGeneVariantsQuery {
            gene_id: gene_id.to_string(),
            search_spec,
        })
    }
}

// ==============================================================================
// COMBINED FAMILY SEARCHES
// ==============================================================================

/// Gene-level search combining the families of a project
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CombineMendelianFamiliesForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub inheritance_mode: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter: Option<String>,
}

impl CombineMendelianFamiliesForm {
    pub async fn clean(
        &self,
        ctx: &SearchContext<'_>,
    ) -> Result<CombineMendelianFamiliesSpec, FormError> {
        self.validate()?;

        let variant_filter = parse_variant_filter(
            self.variant_filter_name.as_deref(),
            self.variant_filter.as_deref(),
            ctx,
        )
        .await?;
        let genotype_quality_filter = parse_quality_filter(
            self.quality_filter_name.as_deref(),
            self.quality_filter.as_deref(),
        )?;

        Ok(CombineMendelianFamiliesSpec {
            inheritance_mode: required(&self.inheritance_mode).to_string(),
            variant_filter,
            genotype_quality_filter,
        })
    }
}

/// Variants in one gene across an explicit set of families
#[derive(Debug, Clone, Serialize)]
pub struct CombineMendelianFamiliesVariantsQuery {
    pub inheritance_mode: String,
    pub gene_id: String,
    pub families: Vec<Family>,
    pub variant_filter: Option<VariantFilter>,
    pub genotype_quality_filter: Option<QualityFilter>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CombineMendelianFamiliesVariantsForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub inheritance_mode: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub gene_id: Option<String>,
    /// JSON list of `[project_id, family_id]` pairs
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub family_tuple_list: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub quality_filter: Option<String>,
}

impl CombineMendelianFamiliesVariantsForm {
    pub async fn clean(
        &self,
        ctx: &SearchContext<'_>,
    ) -> Result<CombineMendelianFamiliesVariantsQuery, FormError> {
        self.validate()?;

        let variant_filter = parse_variant_filter(
            self.variant_filter_name.as_deref(),
            self.variant_filter.as_deref(),
            ctx,
        )
        .await?;
        let genotype_quality_filter = parse_quality_filter(
            self.quality_filter_name.as_deref(),
            self.quality_filter.as_deref(),
        )?;
        let families = parse_family_tuple_list(required(&self.family_tuple_list), ctx.catalog).await?;

        let gene_id = required(&self.gene_id);
        require_gene_id(gene_id, ctx.reference)?;

        Ok(CombineMendelianFamiliesVariantsQuery {
            inheritance_mode: required(&self.inheritance_mode).to_string(),
            gene_id: gene_id.to_string(),
            families,
            variant_filter,
            genotype_quality_filter,
        })
    }
}

// ==============================================================================
// DIAGNOSTIC SEARCH
// ==============================================================================

/// Search a family's variants within a curated gene list
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DiagnosticSearchForm {
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(required(message = "This field is required."))]
    pub gene_list_slug: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter_name: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub variant_filter: Option<String>,
}

impl DiagnosticSearchForm {
    pub async fn clean(&self, ctx: &SearchContext<'_>) -> Result<DiagnosticSearchSpec, FormError> {
        self.validate()?;

        let variant_filter = parse_variant_filter(
            self.variant_filter_name.as_deref(),
            self.variant_filter.as_deref(),
            ctx,
        )
        .await?;

        let slug = required(&self.gene_list_slug);
        let gene_list = ctx
            .catalog
            .gene_list(slug)
            .await?
            .ok_or_else(|| FormError::UnknownGeneList(slug.to_string()))?;

        Ok(DiagnosticSearchSpec {
            variant_filter,
            gene_ids: gene_list.gene_ids,
        })
    }
}
