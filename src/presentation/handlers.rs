// HTTP request handlers
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::application::dashboard_service::DashboardService;
use crate::domain::catalog::{WidgetCategory, WidgetDefinition};
use crate::domain::geometry::GridRect;
use crate::domain::layout::{Breakpoint, GridItem};
use crate::presentation::app_state::AppState;

#[derive(Serialize)]
pub struct DashboardView {
    pub org_id: String,
    pub mode: &'static str,
    pub active_widget_ids: Vec<String>,
    pub layouts: BTreeMap<String, Vec<GridItem>>,
    pub breakpoints: Vec<Breakpoint>,
}

#[derive(Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub definition: WidgetDefinition,
    pub active: bool,
}

#[derive(Deserialize)]
pub struct AddWidgetRequest {
    pub widget_id: String,
}

/// A move/resize reported by the pointer-input source: widget X now occupies
/// rectangle R on one breakpoint.
#[derive(Deserialize)]
pub struct MoveWidgetRequest {
    pub breakpoint: String,
    pub widget_id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current arrangement plus mode and tier table, for the widget renderer.
pub async fn get_dashboard(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    Json(dashboard_view(service))
}

/// Catalog listing for the add-widget panel, grouped by category; entries
/// already on the dashboard are flagged so the panel can disable them.
pub async fn get_catalog(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    let active = &service.configuration().active_widget_ids;
    let mut entries = Vec::new();
    for category in [
        WidgetCategory::Occupancy,
        WidgetCategory::Maintenance,
        WidgetCategory::FoodService,
        WidgetCategory::Communications,
    ] {
        for definition in service.catalog().list_by_category(category) {
            entries.push(CatalogEntry {
                definition: definition.clone(),
                active: active.contains(&definition.id),
            });
        }
    }
    Json(entries)
}

pub async fn enter_edit(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    service.enter_edit();
    Json(dashboard_view(service))
}

pub async fn add_widget(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddWidgetRequest>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    service.add_widget(&request.widget_id);
    Json(dashboard_view(service))
}

pub async fn remove_widget(
    Path((org_id, widget_id)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    service.remove_widget(&widget_id);
    Json(dashboard_view(service))
}

pub async fn move_widget(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<MoveWidgetRequest>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    service.move_or_resize(
        &request.breakpoint,
        &request.widget_id,
        GridRect::new(request.x, request.y, request.w, request.h),
    );
    Json(dashboard_view(service))
}

pub async fn save_dashboard(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    service.save();
    Json(dashboard_view(service))
}

pub async fn cancel_edit(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    service.cancel();
    Json(dashboard_view(service))
}

pub async fn reset_dashboard(
    Path(org_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.lock().await;
    let service = session(&state, &mut sessions, org_id).await;
    service.reset().await;
    Json(dashboard_view(service))
}

/// Fetch the organization's session, hydrating it from storage on first touch.
async fn session<'a>(
    state: &AppState,
    sessions: &'a mut HashMap<String, DashboardService>,
    org_id: String,
) -> &'a mut DashboardService {
    match sessions.entry(org_id) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            let service = DashboardService::open(
                entry.key().clone(),
                state.catalog.clone(),
                state.breakpoints.clone(),
                state.policy,
                Arc::clone(&state.repository),
            )
            .await;
            entry.insert(service)
        }
    }
}

fn dashboard_view(service: &DashboardService) -> DashboardView {
    let config = service.configuration();
    DashboardView {
        org_id: service.org_id().to_string(),
        mode: service.mode().as_str(),
        active_widget_ids: config.active_widget_ids.iter().cloned().collect(),
        layouts: config.layouts.clone(),
        breakpoints: service.breakpoints().to_vec(),
    }
}
