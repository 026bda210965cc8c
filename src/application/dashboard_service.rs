// Dashboard service - Use case for one organization's dashboard edit session
use std::sync::Arc;

use crate::application::config_repository::ConfigRepository;
use crate::application::layout_store::LayoutStore;
use crate::domain::catalog::{DEFAULT_WIDGETS, WidgetCatalog};
use crate::domain::geometry::GridRect;
use crate::domain::layout::{Breakpoint, DashboardConfiguration};
use crate::infrastructure::config::NarrowLayoutPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
    Viewing,
    Editing,
}

impl DashboardMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardMode::Viewing => "viewing",
            DashboardMode::Editing => "editing",
        }
    }
}

/// Orchestrates one organization's dashboard: hydrates the layout store at
/// mount, gates mutations on edit mode, and drives the persistence adapter
/// on save/reset. Layout mutations run to completion while the session is
/// held, so the invariants hold at every observable point between requests.
pub struct DashboardService {
    org_id: String,
    store: LayoutStore,
    repository: Arc<dyn ConfigRepository>,
    policy: NarrowLayoutPolicy,
    mode: DashboardMode,
    edit_snapshot: Option<DashboardConfiguration>,
}

impl DashboardService {
    /// Mount: seed from storage when a usable blob exists, otherwise generate
    /// the default arrangement. A stored blob is consulted only here.
    pub async fn open(
        org_id: String,
        catalog: WidgetCatalog,
        breakpoints: Vec<Breakpoint>,
        policy: NarrowLayoutPolicy,
        repository: Arc<dyn ConfigRepository>,
    ) -> Self {
        let store = match repository.load(&org_id).await {
            Some(stored) => LayoutStore::hydrated(catalog, breakpoints, stored),
            None => {
                tracing::debug!(org_id = %org_id, "no stored dashboard, generating defaults");
                LayoutStore::generated(catalog, breakpoints, DEFAULT_WIDGETS)
            }
        };
        Self {
            org_id,
            store,
            repository,
            policy,
            mode: DashboardMode::Viewing,
            edit_snapshot: None,
        }
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    pub fn mode(&self) -> DashboardMode {
        self.mode
    }

    pub fn configuration(&self) -> &DashboardConfiguration {
        self.store.configuration()
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        self.store.breakpoints()
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        self.store.catalog()
    }

    pub fn enter_edit(&mut self) {
        if self.mode == DashboardMode::Editing {
            tracing::debug!(org_id = %self.org_id, "already editing");
            return;
        }
        self.edit_snapshot = Some(self.store.snapshot());
        self.mode = DashboardMode::Editing;
    }

    pub fn add_widget(&mut self, widget_id: &str) {
        if !self.editing("add widget") {
            return;
        }
        self.store.add_widget(widget_id);
    }

    pub fn remove_widget(&mut self, widget_id: &str) {
        if !self.editing("remove widget") {
            return;
        }
        self.store.remove_widget(widget_id);
    }

    pub fn move_or_resize(&mut self, breakpoint: &str, widget_id: &str, rect: GridRect) {
        if !self.editing("move widget") {
            return;
        }
        self.store.move_or_resize(breakpoint, widget_id, rect);
    }

    /// Exit edit mode and persist the current arrangement. The write runs in
    /// the background: later edits never wait on it, a failure leaves the
    /// in-memory state untouched (the next save retries from current state),
    /// and overlapping saves are last-write-wins.
    pub fn save(&mut self) {
        if !self.editing("save") {
            return;
        }
        if self.policy == NarrowLayoutPolicy::Derive {
            self.store.derive_narrow_layouts();
        }
        self.mode = DashboardMode::Viewing;
        self.edit_snapshot = None;

        let snapshot = self.store.snapshot();
        let repository = Arc::clone(&self.repository);
        let org_id = self.org_id.clone();
        tokio::spawn(async move {
            if let Err(e) = repository.save(&org_id, &snapshot).await {
                tracing::error!(org_id = %org_id, "failed to save dashboard: {e}");
            }
        });
    }

    /// Exit edit mode discarding every in-session mutation, restoring the
    /// arrangement captured when editing began. Storage is not touched.
    pub fn cancel(&mut self) {
        if !self.editing("cancel") {
            return;
        }
        if let Some(snapshot) = self.edit_snapshot.take() {
            self.store.replace(snapshot);
        }
        self.mode = DashboardMode::Viewing;
    }

    /// Clear storage and return to the generated default arrangement.
    pub async fn reset(&mut self) {
        if !self.editing("reset") {
            return;
        }
        if let Err(e) = self.repository.clear(&self.org_id).await {
            tracing::error!(org_id = %self.org_id, "failed to clear stored dashboard: {e}");
        }
        self.store.replace(DashboardConfiguration::generate(
            self.store.catalog(),
            DEFAULT_WIDGETS,
            self.store.breakpoints(),
        ));
        self.edit_snapshot = None;
        self.mode = DashboardMode::Viewing;
    }

    fn editing(&self, action: &str) -> bool {
        if self.mode != DashboardMode::Editing {
            tracing::debug!(org_id = %self.org_id, action, "ignored outside edit mode");
            return false;
        }
        true
    }
}
