// ==============================================================================
// handlers.rs - Page and API Request Handlers
// ==============================================================================
// Description: HTTP request handlers for seqr pages, project API and variant
//              search validation
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use axum::{
    extract::{rejection::FormRejection, Form, FromRequest, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;
use seqr_search::catalog::{CatalogError, Project, User};
use seqr_search::forms::{
    CohortGeneSearchForm, CohortGeneSearchVariantsForm, CohortGeneVariantsQuery,
    CombineMendelianFamiliesForm, CombineMendelianFamiliesVariantsForm,
    CombineMendelianFamiliesVariantsQuery, CohortVariantSearchForm, DiagnosticSearchForm,
    FormError, MendelianVariantSearchForm,
};
use seqr_search::search_spec::{
    CohortGeneSearchSpec, CombineMendelianFamiliesSpec, DiagnosticSearchSpec,
    MendelianVariantSearchSpec,
};
use tracing::{error, info, warn};

use crate::{
    middleware::AuthUser,
    models::*,
    routes,
    state::AppState,
};

// ==============================================================================
// OPERATIONAL ENDPOINTS
// ==============================================================================

/// Root endpoint - API information
pub async fn root() -> Json<ApiInfoResponse> {
    let mut endpoints = vec!["/health".to_string(), "/ready".to_string()];
    endpoints.extend(routes::url_patterns().into_iter().map(|p| p.path));

    Json(ApiInfoResponse {
        service: "seqr Gateway",
        version: env!("CARGO_PKG_VERSION"),
        endpoints,
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

/// Readiness check endpoint
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let catalog_ready = state.catalog().ping().await;
    // Gene resolution is meaningless without a reference table
    let reference_ready = state.reference_gene_count() > 0;

    let ready = catalog_ready && reference_ready;

    let response = ReadinessResponse {
        ready,
        catalog: catalog_ready,
        reference: reference_ready,
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

// ==============================================================================
// ACCESS HELPERS
// ==============================================================================

async fn current_user(state: &AppState, auth: &AuthUser) -> Result<User, AppError> {
    state.catalog().user(&auth.0).await?.ok_or_else(|| {
        warn!("Request from unknown user {}", auth.0);
        AppError::Forbidden
    })
}

async fn viewable_project(
    state: &AppState,
    user: &User,
    project_id: &str,
) -> Result<Project, AppError> {
    let project = state
        .catalog()
        .project(project_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !project.can_view(user) {
        warn!("User {} denied access to project {}", user.username, project_id);
        return Err(AppError::Forbidden);
    }
    Ok(project)
}

async fn projects_with_stats_for(
    state: &AppState,
    user: &User,
) -> Result<Vec<ProjectWithStats>, AppError> {
    let projects = state.catalog().projects_for_user(user).await?;

    let mut with_stats = Vec::with_capacity(projects.len());
    for project in projects {
        let stats = state.catalog().project_stats(&project.project_id).await?;
        with_stats.push(ProjectWithStats { project, stats });
    }
    Ok(with_stats)
}

// ==============================================================================
// PAGES
// ==============================================================================

/// Dashboard page: HTML shell with the user's projects as initial JSON
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Html<String>, AppError> {
    let user = current_user(&state, &auth).await?;
    let projects = projects_with_stats_for(&state, &user).await?;

    let initial_json = serde_json::to_string(&DashboardInitialJson { user, projects })
        .map_err(|e| AppError::Internal(format!("Failed to serialize dashboard state: {}", e)))?
        // Keep user-controlled text from closing the script element
        .replace('<', "\\u003c");

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>seqr</title>
</head>
<body>
  <div id="reactjs-root"></div>
  <script>window.initialJSON = {initial_json};</script>
  <script src="/static/dashboard.js"></script>
</body>
</html>
"#
    )))
}

// ==============================================================================
// PROJECT API
// ==============================================================================

/// Projects visible to the current user
pub async fn projects(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProjectsResponse>, AppError> {
    let user = current_user(&state, &auth).await?;
    let projects = state.catalog().projects_for_user(&user).await?;
    Ok(Json(ProjectsResponse { projects }))
}

/// Projects visible to the current user, with family / individual counts
pub async fn projects_with_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProjectsWithStatsResponse>, AppError> {
    let user = current_user(&state, &auth).await?;
    let projects = projects_with_stats_for(&state, &user).await?;
    Ok(Json(ProjectsWithStatsResponse { projects }))
}

/// Current user profile
pub async fn user(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = current_user(&state, &auth).await?;
    Ok(Json(UserResponse { user }))
}

// ==============================================================================
// SEARCH API
// ==============================================================================

/// Search form from the query string (GET) or urlencoded body (POST);
/// undecodable submissions are rejected as JSON 400s
#[derive(FromRequest)]
#[from_request(via(Form), rejection(AppError))]
pub struct SearchForm<T>(pub T);

/// Mendelian variant search within one family
pub async fn mendelian_variant_search(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, family_id)): Path<(String, String)>,
    SearchForm(form): SearchForm<MendelianVariantSearchForm>,
) -> Result<Json<SearchResponse<MendelianVariantSearchSpec>>, AppError> {
    let user = current_user(&state, &auth).await?;
    viewable_project(&state, &user, &project_id).await?;
    state
        .catalog()
        .family(&project_id, &family_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let spec = form.clean(&state.search_context()).await?;
    info!(
        "Validated {} search for family {}/{}",
        spec.search_mode, project_id, family_id
    );

    Ok(Json(SearchResponse::new(
        project_id,
        SearchTarget::Family { family_id },
        spec,
    )))
}

async fn require_cohort(
    state: &AppState,
    project_id: &str,
    cohort_id: &str,
) -> Result<(), AppError> {
    state
        .catalog()
        .cohort(project_id, cohort_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::NotFound)
}

/// Variant search across a cohort
pub async fn cohort_variant_search(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, cohort_id)): Path<(String, String)>,
    SearchForm(form): SearchForm<CohortVariantSearchForm>,
) -> Result<Json<SearchResponse<MendelianVariantSearchSpec>>, AppError> {
    let user = current_user(&state, &auth).await?;
    viewable_project(&state, &user, &project_id).await?;
    require_cohort(&state, &project_id, &cohort_id).await?;

    let spec = form.clean(&state.search_context()).await?;
    info!(
        "Validated cohort {} search for {}/{}",
        spec.search_mode, project_id, cohort_id
    );

    Ok(Json(SearchResponse::new(
        project_id,
        SearchTarget::Cohort { cohort_id },
        spec,
    )))
}

/// Gene-level cohort search
pub async fn cohort_gene_search(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, cohort_id)): Path<(String, String)>,
    SearchForm(form): SearchForm<CohortGeneSearchForm>,
) -> Result<Json<SearchResponse<CohortGeneSearchSpec>>, AppError> {
    let user = current_user(&state, &auth).await?;
    viewable_project(&state, &user, &project_id).await?;
    require_cohort(&state, &project_id, &cohort_id).await?;

    let spec = form.clean(&state.search_context()).await?;
    info!("Validated cohort gene search for {}/{}", project_id, cohort_id);

    Ok(Json(SearchResponse::new(
        project_id,
        SearchTarget::Cohort { cohort_id },
        spec,
    )))
}

/// Variants of one gene in a cohort gene search
pub async fn cohort_gene_search_variants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, cohort_id)): Path<(String, String)>,
    SearchForm(form): SearchForm<CohortGeneSearchVariantsForm>,
) -> Result<Json<SearchResponse<CohortGeneVariantsQuery>>, AppError> {
    let user = current_user(&state, &auth).await?;
    viewable_project(&state, &user, &project_id).await?;
    require_cohort(&state, &project_id, &cohort_id).await?;

    let query = form.clean(&state.search_context()).await?;
    info!(
        "Validated cohort gene variants search for {}/{} gene {}",
        project_id, cohort_id, query.gene_id
    );

    Ok(Json(SearchResponse::new(
        project_id,
        SearchTarget::Cohort { cohort_id },
        query,
    )))
}

/// Gene-level search combining a project's families
pub async fn combine_mendelian_families(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    SearchForm(form): SearchForm<CombineMendelianFamiliesForm>,
) -> Result<Json<SearchResponse<CombineMendelianFamiliesSpec>>, AppError> {
    let user = current_user(&state, &auth).await?;
    viewable_project(&state, &user, &project_id).await?;

    let spec = form.clean(&state.search_context()).await?;
    info!("Validated combined family search for project {}", project_id);

    Ok(Json(SearchResponse::new(project_id, SearchTarget::Project, spec)))
}

/// Variants of one gene across an explicit family list
pub async fn combine_mendelian_families_variants(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(project_id): Path<String>,
    SearchForm(form): SearchForm<CombineMendelianFamiliesVariantsForm>,
) -> Result<Json<SearchResponse<CombineMendelianFamiliesVariantsQuery>>, AppError> {
    let user = current_user(&state, &auth).await?;
    viewable_project(&state, &user, &project_id).await?;

    let query = form.clean(&state.search_context()).await?;

    // Families may come from other projects; each must be visible too
    for family in &query.families {
        if family.project_id != project_id {
            viewable_project(&state, &user, &family.project_id).await?;
        }
    }
    info!(
        "Validated combined family variants search for {} families, gene {}",
        query.families.len(),
        query.gene_id
    );

    Ok(Json(SearchResponse::new(project_id, SearchTarget::Project, query)))
}

/// Diagnostic gene-list search for one family
pub async fn diagnostic_search(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((project_id, family_id)): Path<(String, String)>,
    SearchForm(form): SearchForm<DiagnosticSearchForm>,
) -> Result<Json<SearchResponse<DiagnosticSearchSpec>>, AppError> {
    let user = current_user(&state, &auth).await?;
    viewable_project(&state, &user, &project_id).await?;
    state
        .catalog()
        .family(&project_id, &family_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let spec = form.clean(&state.search_context()).await?;
    info!(
        "Validated diagnostic search for family {}/{} ({} genes)",
        project_id,
        family_id,
        spec.gene_ids.len()
    );

    Ok(Json(SearchResponse::new(
        project_id,
        SearchTarget::Family { family_id },
        spec,
    )))
}

// ==============================================================================
// ERRORS
// ==============================================================================

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound,
    BadRequest(String),
    Forbidden,
    Internal(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        AppError::Internal(format!("Catalog error: {}", err))
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        warn!("Rejected search form: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Access denied".to_string()),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(ErrorResponse::new(error_message));
        (status, body).into_response()
    }
}
