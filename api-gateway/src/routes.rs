// ==============================================================================
// routes.rs - URL Route Table
// ==============================================================================
// Description: Maps page and API endpoint paths to handlers; API endpoints are
//              served both unversioned and under /v1
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use axum::{
    routing::{get, MethodRouter},
    Router,
};

use crate::{handlers, state::AppState};

/// Prefix for the versioned copy of the API
pub const API_VERSION_PREFIX: &str = "v1";

/// Handler behind a route table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Dashboard,
    ProjectsWithStats,
    Projects,
    User,
    MendelianVariantSearch,
    CohortVariantSearch,
    CohortGeneSearch,
    CohortGeneSearchVariants,
    CombineMendelianFamilies,
    CombineMendelianFamiliesVariants,
    DiagnosticSearch,
}

impl Endpoint {
    fn method_router(self) -> MethodRouter<AppState> {
        match self {
            Endpoint::Dashboard => get(handlers::dashboard),
            Endpoint::ProjectsWithStats => get(handlers::projects_with_stats),
            Endpoint::Projects => get(handlers::projects),
            Endpoint::User => get(handlers::user),
            // Searches accept the form as a query string (GET) or body (POST)
            Endpoint::MendelianVariantSearch => {
                get(handlers::mendelian_variant_search).post(handlers::mendelian_variant_search)
            }
            Endpoint::CohortVariantSearch => {
                get(handlers::cohort_variant_search).post(handlers::cohort_variant_search)
            }
            Endpoint::CohortGeneSearch => {
                get(handlers::cohort_gene_search).post(handlers::cohort_gene_search)
            }
            Endpoint::CohortGeneSearchVariants => get(handlers::cohort_gene_search_variants)
                .post(handlers::cohort_gene_search_variants),
            Endpoint::CombineMendelianFamilies => get(handlers::combine_mendelian_families)
                .post(handlers::combine_mendelian_families),
            Endpoint::CombineMendelianFamiliesVariants => {
                get(handlers::combine_mendelian_families_variants)
                    .post(handlers::combine_mendelian_families_variants)
            }
            Endpoint::DiagnosticSearch => {
                get(handlers::diagnostic_search).post(handlers::diagnostic_search)
            }
        }
    }
}

/// HTML pages
pub const PAGE_ENDPOINTS: &[(&str, Endpoint)] = &[("dashboard", Endpoint::Dashboard)];

/// JSON API
pub const API_ENDPOINTS: &[(&str, Endpoint)] = &[
    ("projects_with_stats", Endpoint::ProjectsWithStats),
    ("projects", Endpoint::Projects),
    ("user", Endpoint::User),
    (
        "projects/{project_id}/families/{family_id}/mendelian_variant_search",
        Endpoint::MendelianVariantSearch,
    ),
    (
        "projects/{project_id}/cohorts/{cohort_id}/cohort_variant_search",
        Endpoint::CohortVariantSearch,
    ),
    (
        "projects/{project_id}/cohorts/{cohort_id}/cohort_gene_search",
        Endpoint::CohortGeneSearch,
    ),
    (
        "projects/{project_id}/cohorts/{cohort_id}/cohort_gene_search_variants",
        Endpoint::CohortGeneSearchVariants,
    ),
    (
        "projects/{project_id}/combine_mendelian_families",
        Endpoint::CombineMendelianFamilies,
    ),
    (
        "projects/{project_id}/combine_mendelian_families_variants",
        Endpoint::CombineMendelianFamiliesVariants,
    ),
    (
        "projects/{project_id}/families/{family_id}/diagnostic_search",
        Endpoint::DiagnosticSearch,
    ),
];

/// One route table entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlPattern {
    pub path: String,
    pub endpoint: Endpoint,
}

/// The full route table: pages once, API endpoints plain and versioned
pub fn url_patterns() -> Vec<UrlPattern> {
    let pages = PAGE_ENDPOINTS.iter().map(|(name, endpoint)| UrlPattern {
        path: format!("/{}", name),
        endpoint: *endpoint,
    });

    let api = API_ENDPOINTS.iter().map(|(name, endpoint)| UrlPattern {
        path: format!("/{}", name),
        endpoint: *endpoint,
    });

    let versioned_api = API_ENDPOINTS.iter().map(|(name, endpoint)| UrlPattern {
        path: format!("/{}/{}", API_VERSION_PREFIX, name),
        endpoint: *endpoint,
    });

    pages.chain(api).chain(versioned_api).collect()
}

/// Register every route table entry on `router`
pub fn register(router: Router<AppState>) -> Router<AppState> {
    url_patterns()
        .into_iter()
        .fold(router, |router, pattern| {
            router.route(&pattern.path, pattern.endpoint.method_router())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_api_endpoints_registered_twice() {
        let patterns = url_patterns();
        assert_eq!(
            patterns.len(),
            PAGE_ENDPOINTS.len() + 2 * API_ENDPOINTS.len()
        );

        let paths: Vec<_> = patterns.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(paths[0], "/dashboard");
        assert!(paths.contains(&"/projects_with_stats"));
        assert!(paths.contains(&"/v1/projects_with_stats"));
        assert!(paths.contains(&"/v1/user"));
        assert!(!paths.contains(&"/v1/dashboard"));
    }

    #[test]
    fn test_paths_unique() {
        let patterns = url_patterns();
        let unique: HashSet<_> = patterns.iter().map(|p| &p.path).collect();
        assert_eq!(unique.len(), patterns.len());
    }

    #[test]
    fn test_versioned_entry_shares_handler() {
        let patterns = url_patterns();
        let find = |path: &str| patterns.iter().find(|p| p.path == path).map(|p| p.endpoint);
        assert_eq!(find("/projects"), Some(Endpoint::Projects));
        assert_eq!(find("/v1/projects"), Some(Endpoint::Projects));
        assert_eq!(
            find("/v1/projects/{project_id}/families/{family_id}/diagnostic_search"),
            Some(Endpoint::DiagnosticSearch)
        );
    }
}
