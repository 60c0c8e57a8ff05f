// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::goal_service::GoalService;
use crate::infrastructure::config::load_goals_config;
use crate::infrastructure::source_repository::SourceRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    batch_milestones, health_check, invalidate_cache, list_locations, location_figure,
    location_milestones,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let goals_config = load_goals_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(SourceRepository::new(goals_config.sources.clone()));

    // Create services (application layer)
    let goal_service = GoalService::new(
        repository,
        goals_config.projection.policy(),
        goals_config.projection.headline_threshold,
    );

    let state = Arc::new(AppState { goal_service });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/locations", get(list_locations))
        .route("/locations/:name/milestones", get(location_milestones))
        .route("/locations/:name/figure", get(location_figure))
        .route("/milestones", get(batch_milestones))
        .route("/cache/invalidate", post(invalidate_cache))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = goals_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind address {}", goals_config.server.bind))?;
    tracing::info!("Starting vaccination-goals service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
