// ==============================================================================
// models.rs - API Data Models
// ==============================================================================
// Description: Response models for the seqr page and search API
// Author: Matt Barham
// Created: 2025-11-06
// Modified: 2026-10-17
// Version: 2.0.0
// ==============================================================================

use chrono::{DateTime, Utc};
use seqr_search::catalog::{Project, ProjectStats, User};
use serde::Serialize;
use uuid::Uuid;

/// Projects visible to the current user
#[derive(Debug, Serialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Project>,
}

/// Project with family and individual counts
#[derive(Debug, Serialize)]
pub struct ProjectWithStats {
    #[serde(flatten)]
    pub project: Project,
    #[serde(flatten)]
    pub stats: ProjectStats,
}

#[derive(Debug, Serialize)]
pub struct ProjectsWithStatsResponse {
    pub projects: Vec<ProjectWithStats>,
}

/// Current user profile
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Initial state embedded in the dashboard page
#[derive(Debug, Serialize)]
pub struct DashboardInitialJson {
    pub user: User,
    pub projects: Vec<ProjectWithStats>,
}

/// What a search runs over
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchTarget {
    Family { family_id: String },
    Cohort { cohort_id: String },
    Project,
}

/// A validated search, ready for the search engine
#[derive(Debug, Serialize)]
pub struct SearchResponse<T: Serialize> {
    pub search_id: Uuid,
    pub project_id: String,
    pub target: SearchTarget,
    pub search_spec: T,
    pub created_at: DateTime<Utc>,
}

impl<T: Serialize> SearchResponse<T> {
    pub fn new(project_id: impl Into<String>, target: SearchTarget, search_spec: T) -> Self {
        Self {
            search_id: Uuid::new_v4(),
            project_id: project_id.into(),
            target,
            search_spec,
            created_at: Utc::now(),
        }
    }
}

/// API information response
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub catalog: bool,
    pub reference: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}
