// ==============================================================================
// catalog/memory.rs - In-Memory Catalog
// ==============================================================================
// Description: Catalog backed by a JSON seed document
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

use super::{Catalog, CatalogError, Cohort, Family, GeneList, Project, ProjectStats, User};

/// JSON document used to populate a [`MemoryCatalog`]
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSeed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub families: Vec<Family>,
    #[serde(default)]
    pub cohorts: Vec<Cohort>,
    #[serde(default)]
    pub gene_lists: Vec<GeneList>,
}

/// Catalog held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    users: HashMap<String, User>,
    projects: BTreeMap<String, Project>,
    families: HashMap<(String, String), Family>,
    cohorts: HashMap<(String, String), Cohort>,
    gene_lists: HashMap<String, GeneList>,
}

impl MemoryCatalog {
    /// Load a seed document from disk
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let seed: CatalogSeed = serde_json::from_str(&raw)
            .map_err(|e| CatalogError::InvalidSeed(format!("{}: {}", path.display(), e)))?;

        let catalog = Self::from_seed(seed)?;
        info!(
            "Loaded catalog seed {} ({} projects, {} families, {} gene lists)",
            path.display(),
            catalog.projects.len(),
            catalog.families.len(),
            catalog.gene_lists.len()
        );
        Ok(catalog)
    }

    /// Index a seed document, rejecting dangling project references
    pub fn from_seed(seed: CatalogSeed) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();

        for user in seed.users {
            catalog.users.insert(user.username.clone(), user);
        }
        for project in seed.projects {
            catalog.projects.insert(project.project_id.clone(), project);
        }
        for family in seed.families {
            if !catalog.projects.contains_key(&family.project_id) {
                return Err(CatalogError::InvalidSeed(format!(
                    "family {} references unknown project {}",
                    family.family_id, family.project_id
                )));
            }
            catalog
                .families
                .insert((family.project_id.clone(), family.family_id.clone()), family);
        }
        for cohort in seed.cohorts {
            if !catalog.projects.contains_key(&cohort.project_id) {
                return Err(CatalogError::InvalidSeed(format!(
                    "cohort {} references unknown project {}",
                    cohort.cohort_id, cohort.project_id
                )));
            }
            catalog
                .cohorts
                .insert((cohort.project_id.clone(), cohort.cohort_id.clone()), cohort);
        }
        for gene_list in seed.gene_lists {
            catalog.gene_lists.insert(gene_list.slug.clone(), gene_list);
        }

        Ok(catalog)
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn user(&self, username: &str) -> Result<Option<User>, CatalogError> {
        Ok(self.users.get(username).cloned())
    }

    async fn projects_for_user(&self, user: &User) -> Result<Vec<Project>, CatalogError> {
        Ok(self
            .projects
            .values()
            .filter(|p| p.can_view(user))
            .cloned()
            .collect())
    }

    async fn project(&self, project_id: &str) -> Result<Option<Project>, CatalogError> {
        Ok(self.projects.get(project_id).cloned())
    }

    async fn project_stats(&self, project_id: &str) -> Result<ProjectStats, CatalogError> {
        let families: Vec<&Family> = self
            .families
            .values()
            .filter(|f| f.project_id == project_id)
            .collect();

        Ok(ProjectStats {
            num_families: families.len() as i64,
            num_individuals: families.iter().map(|f| f.individuals.len() as i64).sum(),
        })
    }

    async fn family(
        &self,
        project_id: &str,
        family_id: &str,
    ) -> Result<Option<Family>, CatalogError> {
        Ok(self
            .families
            .get(&(project_id.to_string(), family_id.to_string()))
            .cloned())
    }

    async fn cohort(
        &self,
        project_id: &str,
        cohort_id: &str,
    ) -> Result<Option<Cohort>, CatalogError> {
        Ok(self
            .cohorts
            .get(&(project_id.to_string(), cohort_id.to_string()))
            .cloned())
    }

    async fn gene_list(&self, slug: &str) -> Result<Option<GeneList>, CatalogError> {
        Ok(self.gene_lists.get(slug).cloned())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TEST_SEED: &str = r#"{
        "users": [
            {"username": "alice", "email": "alice@example.org", "first_name": "Alice", "last_name": "Ng"},
            {"username": "root", "email": "root@example.org", "is_staff": true},
            {"username": "mallory"}
        ],
        "projects": [
            {"project_id": "cmg", "name": "CMG Rare Disease", "collaborators": ["alice"],
             "created_date": "2025-03-01T00:00:00Z"},
            {"project_id": "neuro", "name": "Neuromuscular", "collaborators": [],
             "created_date": "2025-06-15T00:00:00Z"}
        ],
        "families": [
            {"project_id": "cmg", "family_id": "F1", "display_name": "Family 1", "individuals": [
                {"indiv_id": "F1_proband", "affected": "affected", "sex": "female"},
                {"indiv_id": "F1_mother", "affected": "unaffected", "sex": "female"},
                {"indiv_id": "F1_father", "affected": "unaffected", "sex": "male"}
            ]},
            {"project_id": "cmg", "family_id": "F2", "individuals": [
                {"indiv_id": "F2_proband", "affected": "affected"}
            ]},
            {"project_id": "neuro", "family_id": "N1", "individuals": []}
        ],
        "cohorts": [
            {"project_id": "cmg", "cohort_id": "all_probands", "indiv_ids": ["F1_proband", "F2_proband"]}
        ],
        "gene_lists": [
            {"slug": "breast-cancer", "name": "Breast Cancer",
             "gene_ids": ["ENSG00000012048", "ENSG00000139618"]}
        ]
    }"#;

    pub(crate) fn test_catalog() -> MemoryCatalog {
        MemoryCatalog::from_seed(serde_json::from_str(TEST_SEED).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_projects_visible_by_collaboration() {
        let catalog = test_catalog();

        let alice = catalog.user("alice").await.unwrap().unwrap();
        let ids: Vec<_> = catalog
            .projects_for_user(&alice)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.project_id)
            .collect();
        assert_eq!(ids, vec!["cmg"]);

        let root = catalog.user("root").await.unwrap().unwrap();
        assert_eq!(catalog.projects_for_user(&root).await.unwrap().len(), 2);

        let mallory = catalog.user("mallory").await.unwrap().unwrap();
        assert!(catalog.projects_for_user(&mallory).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_project_stats() {
        let catalog = test_catalog();
        let stats = catalog.project_stats("cmg").await.unwrap();
        assert_eq!(stats.num_families, 2);
        assert_eq!(stats.num_individuals, 4);
        assert_eq!(
            catalog.project_stats("missing").await.unwrap(),
            ProjectStats::default()
        );
    }

    #[tokio::test]
    async fn test_family_cohort_and_gene_list_lookup() {
        let catalog = test_catalog();
        assert!(catalog.family("cmg", "F1").await.unwrap().is_some());
        assert!(catalog.family("neuro", "F1").await.unwrap().is_none());
        assert_eq!(
            catalog.cohort("cmg", "all_probands").await.unwrap().unwrap().indiv_ids.len(),
            2
        );
        assert!(catalog.gene_list("breast-cancer").await.unwrap().is_some());
        assert!(catalog.gene_list("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_gene_list_keeps_curated_order() {
        let seed: CatalogSeed = serde_json::from_str(
            r#"{"gene_lists": [{"slug": "dmd-first", "name": "DMD first",
                "gene_ids": ["ENSG00000198947", "ENSG00000012048"]}]}"#,
        )
        .unwrap();
        let catalog = MemoryCatalog::from_seed(seed).unwrap();

        let list = catalog.gene_list("dmd-first").await.unwrap().unwrap();
        assert_eq!(list.gene_ids, vec!["ENSG00000198947", "ENSG00000012048"]);
    }

    #[test]
    fn test_dangling_family_rejected() {
        let seed: CatalogSeed = serde_json::from_str(
            r#"{"families": [{"project_id": "ghost", "family_id": "F1"}]}"#,
        )
        .unwrap();
        assert!(matches!(
            MemoryCatalog::from_seed(seed),
            Err(CatalogError::InvalidSeed(_))
        ));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        tokio::fs::write(&path, TEST_SEED).await.unwrap();

        let catalog = MemoryCatalog::load(&path).await.unwrap();
        assert!(catalog.project("cmg").await.unwrap().is_some());
    }
}
