// ==============================================================================
// catalog/mod.rs - Project Catalog
// ==============================================================================
// Description: Read-only lookups for users, projects, families, cohorts and
//              gene lists
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;
pub mod postgres;

pub use memory::{CatalogSeed, MemoryCatalog};
pub use postgres::PgCatalog;

/// Errors raised by catalog backends
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog seed: {0}")]
    InvalidSeed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Usernames with access to this project
    #[serde(default)]
    pub collaborators: Vec<String>,
    pub created_date: DateTime<Utc>,
}

impl Project {
    /// Staff can view every project; other users need to be collaborators
    pub fn can_view(&self, user: &User) -> bool {
        user.is_staff || self.collaborators.iter().any(|c| c == &user.username)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStats {
    pub num_families: i64,
    pub num_individuals: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffectedStatus {
    Affected,
    Unaffected,
    #[default]
    Unknown,
}

impl AffectedStatus {
    pub fn from_code(code: &str) -> Self {
        match code {
            "A" | "affected" => AffectedStatus::Affected,
            "N" | "unaffected" => AffectedStatus::Unaffected,
            _ => AffectedStatus::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unknown,
}

impl Sex {
    pub fn from_code(code: &str) -> Self {
        match code {
            "M" | "male" => Sex::Male,
            "F" | "female" => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    pub indiv_id: String,
    #[serde(default)]
    pub affected: AffectedStatus,
    #[serde(default)]
    pub sex: Sex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub project_id: String,
    pub family_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub individuals: Vec<Individual>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    pub project_id: String,
    pub cohort_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub indiv_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneList {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Curated order; every backend returns genes in this order
    #[serde(default)]
    pub gene_ids: Vec<String>,
}

/// Read-only access to project metadata
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn user(&self, username: &str) -> Result<Option<User>, CatalogError>;

    /// Projects visible to `user`, ordered by project ID
    async fn projects_for_user(&self, user: &User) -> Result<Vec<Project>, CatalogError>;

    async fn project(&self, project_id: &str) -> Result<Option<Project>, CatalogError>;

    async fn project_stats(&self, project_id: &str) -> Result<ProjectStats, CatalogError>;

    async fn family(&self, project_id: &str, family_id: &str)
        -> Result<Option<Family>, CatalogError>;

    async fn cohort(&self, project_id: &str, cohort_id: &str)
        -> Result<Option<Cohort>, CatalogError>;

    async fn gene_list(&self, slug: &str) -> Result<Option<GeneList>, CatalogError>;

    /// Liveness probe for readiness checks
    async fn ping(&self) -> bool {
        true
    }
}
