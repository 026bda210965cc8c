// Repository trait for dashboard configuration persistence
use async_trait::async_trait;

use crate::domain::layout::DashboardConfiguration;

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Fetch the stored configuration for an organization. Absent, unreadable
    /// and unparsable payloads are all reported as `None`, never as an error;
    /// the caller falls back to the default layout.
    async fn load(&self, org_id: &str) -> Option<DashboardConfiguration>;

    /// Persist the configuration. Overwrite semantics, last write wins.
    async fn save(&self, org_id: &str, config: &DashboardConfiguration) -> anyhow::Result<()>;

    /// Remove the stored configuration, if any.
    async fn clear(&self, org_id: &str) -> anyhow::Result<()>;
}
