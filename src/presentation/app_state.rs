// Application state for HTTP handlers
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::application::config_repository::ConfigRepository;
use crate::application::dashboard_service::DashboardService;
use crate::domain::catalog::WidgetCatalog;
use crate::domain::layout::Breakpoint;
use crate::infrastructure::config::NarrowLayoutPolicy;

/// Shared server state. Each organization's `DashboardService` is hydrated on
/// first touch and lives behind the session lock from then on, so layout
/// mutations for one organization are serialized and run to completion.
pub struct AppState {
    pub catalog: WidgetCatalog,
    pub breakpoints: Vec<Breakpoint>,
    pub policy: NarrowLayoutPolicy,
    pub repository: Arc<dyn ConfigRepository>,
    pub sessions: Mutex<HashMap<String, DashboardService>>,
}

impl AppState {
    pub fn new(
        catalog: WidgetCatalog,
        breakpoints: Vec<Breakpoint>,
        policy: NarrowLayoutPolicy,
        repository: Arc<dyn ConfigRepository>,
    ) -> Self {
        Self {
            catalog,
            breakpoints,
            policy,
            repository,
            sessions: Mutex::new(HashMap::new()),
        }
    }
}
