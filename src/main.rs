// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::domain::catalog::WidgetCatalog;
use crate::infrastructure::config::load_server_config;
use crate::infrastructure::file_repository::FileConfigRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_widget, cancel_edit, enter_edit, get_catalog, get_dashboard, health_check, move_widget,
    remove_widget, reset_dashboard, save_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_server_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(FileConfigRepository::new(&config.server.storage_dir));

    // Create application state
    let state = Arc::new(AppState::new(
        WidgetCatalog::builtin(),
        config.dashboard.breakpoints.clone(),
        config.dashboard.narrow_layout_policy,
        repository,
    ));

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/orgs/:org/dashboard", get(get_dashboard))
        .route("/orgs/:org/dashboard/catalog", get(get_catalog))
        .route("/orgs/:org/dashboard/edit", post(enter_edit))
        .route("/orgs/:org/dashboard/widgets", post(add_widget))
        .route("/orgs/:org/dashboard/widgets/:widget_id", delete(remove_widget))
        .route("/orgs/:org/dashboard/layout", put(move_widget))
        .route("/orgs/:org/dashboard/save", post(save_dashboard))
        .route("/orgs/:org/dashboard/cancel", post(cancel_edit))
        .route("/orgs/:org/dashboard/reset", post(reset_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.server.bind_address))?;
    println!("Starting camp-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
