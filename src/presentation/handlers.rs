// HTTP request handlers
use crate::application::goal_service::LocationReport;
use crate::domain::figure::GoalFigure;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct BatchQuery {
    pub locations: Option<String>,
}

#[derive(Serialize)]
pub struct BatchEntry {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<LocationReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List every location with vaccination data
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.goal_service.list_locations().await?))
}

/// Milestones for a single location
pub async fn location_milestones(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<LocationReport>, ApiError> {
    Ok(Json(state.goal_service.evaluate_location(&name).await?))
}

/// Chart description for a single location
pub async fn location_figure(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<GoalFigure>, ApiError> {
    Ok(Json(state.goal_service.figure_for(&name).await?))
}

/// Milestones for a comma-separated list of locations
pub async fn batch_milestones(
    Query(query): Query<BatchQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BatchEntry>>, ApiError> {
    let locations = parse_location_list(query.locations.as_deref().unwrap_or_default());
    let outcomes = state.goal_service.evaluate_locations(&locations).await?;

    let entries = outcomes
        .into_iter()
        .map(|outcome| match outcome.result {
            Ok(report) => BatchEntry {
                location: outcome.location,
                report: Some(report),
                error: None,
            },
            Err(e) => BatchEntry {
                location: outcome.location,
                report: None,
                error: Some(e.to_string()),
            },
        })
        .collect();

    Ok(Json(entries))
}

/// Drop cached datasets
pub async fn invalidate_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.goal_service.refresh().await;
    StatusCode::NO_CONTENT
}

fn parse_location_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::goal_service::GoalService;
    use crate::application::goal_service::tests::repository;
    use crate::application::projector::ProjectionPolicy;
    use axum::response::IntoResponse;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            goal_service: GoalService::new(
                Arc::new(repository()),
                ProjectionPolicy::default(),
                70.0,
            ),
        })
    }

    #[test]
    fn test_parse_location_list() {
        assert_eq!(
            parse_location_list(" France, ,Germany,"),
            vec!["France", "Germany"]
        );
        assert!(parse_location_list("").is_empty());
    }

    #[tokio::test]
    async fn test_location_milestones() {
        let Json(report) = location_milestones(Path("Testland".to_string()), State(state()))
            .await
            .unwrap();

        assert_eq!(report.location, "Testland");
        assert_eq!(report.milestones.len(), 6);
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let unknown = location_milestones(Path("Atlantis".to_string()), State(state())).await;
        assert_eq!(
            unknown.err().map(|e| e.into_response().status()),
            Some(StatusCode::NOT_FOUND)
        );

        let invalid = location_figure(Path("Ghost Town".to_string()), State(state())).await;
        assert_eq!(
            invalid.err().map(|e| e.into_response().status()),
            Some(StatusCode::UNPROCESSABLE_ENTITY)
        );
    }

    #[tokio::test]
    async fn test_batch_milestones_reports_each_location() {
        let query = BatchQuery {
            locations: Some("Testland,Atlantis".to_string()),
        };
        let Json(entries) = batch_milestones(Query(query), State(state()))
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert!(entries[0].report.is_some());
        assert_eq!(entries[1].error.as_deref(), Some("no vaccination data for Atlantis"));
    }

    #[tokio::test]
    async fn test_invalidate_cache() {
        assert_eq!(invalidate_cache(State(state())).await, StatusCode::NO_CONTENT);
    }
}
