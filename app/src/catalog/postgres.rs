// ==============================================================================
// catalog/postgres.rs - PostgreSQL Catalog
// ==============================================================================
// Description: Catalog backed by the seqr metadata database
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================
// Schema: app/sql/catalog.sql
// ==============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{
    AffectedStatus, Catalog, CatalogError, Cohort, Family, GeneList, Individual, Project,
    ProjectStats, Sex, User,
};

const PROJECT_COLUMNS: &str = "
    SELECT p.project_id, p.name, p.description, p.created_date,
           COALESCE(array_agg(c.username ORDER BY c.username)
                    FILTER (WHERE c.username IS NOT NULL), '{}') AS collaborators
    FROM projects p
    LEFT JOIN project_collaborators c ON c.project_id = p.project_id";

type ProjectRow = (String, String, String, DateTime<Utc>, Vec<String>);

fn project_from_row(row: ProjectRow) -> Project {
    let (project_id, name, description, created_date, collaborators) = row;
    Project {
        project_id,
        name,
        description,
        collaborators,
        created_date,
    }
}

/// Catalog reading from PostgreSQL
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn user(&self, username: &str) -> Result<Option<User>, CatalogError> {
        let row = sqlx::query_as::<_, (String, String, String, String, bool)>(
            "SELECT username, email, first_name, last_name, is_staff FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(username, email, first_name, last_name, is_staff)| User {
            username,
            email,
            first_name,
            last_name,
            is_staff,
        }))
    }

    async fn projects_for_user(&self, user: &User) -> Result<Vec<Project>, CatalogError> {
        let query = format!(
            "{PROJECT_COLUMNS}
             WHERE $1 OR EXISTS (
                 SELECT 1 FROM project_collaborators pc
                 WHERE pc.project_id = p.project_id AND pc.username = $2)
             GROUP BY p.project_id
             ORDER BY p.project_id"
        );

        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(user.is_staff)
            .bind(&user.username)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(project_from_row).collect())
    }

    async fn project(&self, project_id: &str) -> Result<Option<Project>, CatalogError> {
        let query = format!("{PROJECT_COLUMNS} WHERE p.project_id = $1 GROUP BY p.project_id");

        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(project_from_row))
    }

    async fn project_stats(&self, project_id: &str) -> Result<ProjectStats, CatalogError> {
        let (num_families, num_individuals) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT (SELECT COUNT(*) FROM families WHERE project_id = $1),
                    (SELECT COUNT(*) FROM individuals WHERE project_id = $1)",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ProjectStats {
            num_families,
            num_individuals,
        })
    }

    async fn family(
        &self,
        project_id: &str,
        family_id: &str,
    ) -> Result<Option<Family>, CatalogError> {
        let Some((display_name,)) = sqlx::query_as::<_, (String,)>(
            "SELECT display_name FROM families WHERE project_id = $1 AND family_id = $2",
        )
        .bind(project_id)
        .bind(family_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let individuals = sqlx::query_as::<_, (String, String, String)>(
            "SELECT indiv_id, affected, sex FROM individuals
             WHERE project_id = $1 AND family_id = $2
             ORDER BY indiv_id",
        )
        .bind(project_id)
        .bind(family_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(indiv_id, affected, sex)| Individual {
            indiv_id,
            affected: AffectedStatus::from_code(&affected),
            sex: Sex::from_code(&sex),
        })
        .collect();

        Ok(Some(Family {
            project_id: project_id.to_string(),
            family_id: family_id.to_string(),
            display_name,
            individuals,
        }))
    }

    async fn cohort(
        &self,
        project_id: &str,
        cohort_id: &str,
    ) -> Result<Option<Cohort>, CatalogError> {
        let row = sqlx::query_as::<_, (String, Vec<String>)>(
            "SELECT c.display_name,
                    COALESCE(array_agg(m.indiv_id ORDER BY m.indiv_id)
                             FILTER (WHERE m.indiv_id IS NOT NULL), '{}')
             FROM cohorts c
             LEFT JOIN cohort_members m
                    ON m.project_id = c.project_id AND m.cohort_id = c.cohort_id
             WHERE c.project_id = $1 AND c.cohort_id = $2
             GROUP BY c.project_id, c.cohort_id",
        )
        .bind(project_id)
        .bind(cohort_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(display_name, indiv_ids)| Cohort {
            project_id: project_id.to_string(),
            cohort_id: cohort_id.to_string(),
            display_name,
            indiv_ids,
        }))
    }

    async fn gene_list(&self, slug: &str) -> Result<Option<GeneList>, CatalogError> {
        let row = sqlx::query_as::<_, (String, String, Vec<String>)>(
            "SELECT l.name, l.description,
                    COALESCE(array_agg(g.gene_id ORDER BY g.position)
                             FILTER (WHERE g.gene_id IS NOT NULL), '{}')
             FROM gene_lists l
             LEFT JOIN gene_list_genes g ON g.slug = l.slug
             WHERE l.slug = $1
             GROUP BY l.slug",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(name, description, gene_ids)| GeneList {
            slug: slug.to_string(),
            name,
            description,
            gene_ids,
        }))
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await.is_ok()
    }
}
