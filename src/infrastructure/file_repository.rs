// File-backed configuration store - one JSON document per organization
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::config_repository::ConfigRepository;
use crate::domain::layout::{DashboardConfiguration, GridItem};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("organization id {0:?} contains characters outside [A-Za-z0-9_-]")]
    InvalidOrgId(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

/// Versioned envelope written to disk. Blobs carrying a different schema
/// version load as absent instead of being force-parsed, so a catalog or
/// format migration can never corrupt a session.
#[derive(Debug, Serialize, Deserialize)]
struct StoredConfig {
    schema_version: u32,
    saved_at: DateTime<Utc>,
    active_widget_ids: Vec<String>,
    layouts: BTreeMap<String, Vec<GridItem>>,
}

#[derive(Debug, Clone)]
pub struct FileConfigRepository {
    storage_dir: PathBuf,
}

impl FileConfigRepository {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
        }
    }

    /// Keys become file names; anything that could walk out of the storage
    /// directory is rejected.
    fn blob_path(&self, org_id: &str) -> Result<PathBuf, StorageError> {
        let valid = !org_id.is_empty()
            && org_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidOrgId(org_id.to_string()));
        }
        Ok(self.storage_dir.join(format!("{org_id}.json")))
    }
}

#[async_trait]
impl ConfigRepository for FileConfigRepository {
    async fn load(&self, org_id: &str) -> Option<DashboardConfiguration> {
        let path = match self.blob_path(org_id) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(org_id, "refusing to load dashboard: {e}");
                return None;
            }
        };
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(path = %path.display(), "failed to read stored dashboard: {e}");
                return None;
            }
        };
        let stored: StoredConfig = match serde_json::from_slice(&bytes) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(path = %path.display(), "corrupt stored dashboard: {e}");
                return None;
            }
        };
        if stored.schema_version != SCHEMA_VERSION {
            tracing::warn!(
                path = %path.display(),
                version = stored.schema_version,
                "unsupported dashboard schema version"
            );
            return None;
        }
        Some(DashboardConfiguration {
            active_widget_ids: stored.active_widget_ids.into_iter().collect(),
            layouts: stored.layouts,
        })
    }

    async fn save(&self, org_id: &str, config: &DashboardConfiguration) -> Result<()> {
        let path = self.blob_path(org_id)?;
        tokio::fs::create_dir_all(&self.storage_dir).await?;
        let stored = StoredConfig {
            schema_version: SCHEMA_VERSION,
            saved_at: Utc::now(),
            active_widget_ids: config.active_widget_ids.iter().cloned().collect(),
            layouts: config.layouts.clone(),
        };
        let body = serde_json::to_vec_pretty(&stored)?;
        tokio::fs::write(&path, body).await?;
        Ok(())
    }

    async fn clear(&self, org_id: &str) -> Result<()> {
        let path = self.blob_path(org_id)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{DEFAULT_WIDGETS, WidgetCatalog};
    use crate::infrastructure::config::default_breakpoints;

    fn sample_config() -> DashboardConfiguration {
        DashboardConfiguration::generate(
            &WidgetCatalog::builtin(),
            DEFAULT_WIDGETS,
            &default_breakpoints(),
        )
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileConfigRepository::new(dir.path());
        let config = sample_config();
        repo.save("camp_cedar", &config).await.expect("save");
        assert_eq!(repo.load("camp_cedar").await, Some(config));
    }

    #[tokio::test]
    async fn test_missing_blob_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileConfigRepository::new(dir.path());
        assert_eq!(repo.load("camp_cedar").await, None);
    }

    #[tokio::test]
    async fn test_corrupt_blob_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileConfigRepository::new(dir.path());
        tokio::fs::write(dir.path().join("camp_cedar.json"), b"{not json")
            .await
            .expect("write");
        assert_eq!(repo.load("camp_cedar").await, None);
    }

    #[tokio::test]
    async fn test_unknown_schema_version_loads_as_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileConfigRepository::new(dir.path());
        repo.save("camp_cedar", &sample_config()).await.expect("save");

        let path = dir.path().join("camp_cedar.json");
        let body = tokio::fs::read_to_string(&path).await.expect("read");
        let bumped = body.replace("\"schema_version\": 1", "\"schema_version\": 99");
        tokio::fs::write(&path, bumped).await.expect("write");

        assert_eq!(repo.load("camp_cedar").await, None);
    }

    #[tokio::test]
    async fn test_clear_removes_the_blob_and_tolerates_absence() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileConfigRepository::new(dir.path());
        repo.save("camp_cedar", &sample_config()).await.expect("save");
        repo.clear("camp_cedar").await.expect("clear");
        assert_eq!(repo.load("camp_cedar").await, None);
        repo.clear("camp_cedar").await.expect("second clear");
    }

    #[tokio::test]
    async fn test_org_ids_cannot_escape_the_storage_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileConfigRepository::new(dir.path());
        assert!(repo.save("../elsewhere", &sample_config()).await.is_err());
        assert_eq!(repo.load("../elsewhere").await, None);
        assert_eq!(repo.load("").await, None);
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_blob() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = FileConfigRepository::new(dir.path());
        let mut config = sample_config();
        repo.save("camp_cedar", &config).await.expect("first save");
        config.active_widget_ids.remove("occupancy_rate");
        for items in config.layouts.values_mut() {
            items.retain(|i| i.widget_id != "occupancy_rate");
        }
        repo.save("camp_cedar", &config).await.expect("second save");
        assert_eq!(repo.load("camp_cedar").await, Some(config));
    }
}
