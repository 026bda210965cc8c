// In-memory configuration store - substitute adapter for tests and dev runs
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::config_repository::ConfigRepository;
use crate::domain::layout::DashboardConfiguration;

#[derive(Debug, Default)]
pub struct InMemoryConfigRepository {
    configs: Mutex<HashMap<String, DashboardConfiguration>>,
}

#[async_trait]
impl ConfigRepository for InMemoryConfigRepository {
    async fn load(&self, org_id: &str) -> Option<DashboardConfiguration> {
        self.configs.lock().await.get(org_id).cloned()
    }

    async fn save(&self, org_id: &str, config: &DashboardConfiguration) -> anyhow::Result<()> {
        self.configs
            .lock()
            .await
            .insert(org_id.to_string(), config.clone());
        Ok(())
    }

    async fn clear(&self, org_id: &str) -> anyhow::Result<()> {
        self.configs.lock().await.remove(org_id);
        Ok(())
    }
}
