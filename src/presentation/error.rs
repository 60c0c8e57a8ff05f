// Mapping of service errors onto HTTP responses
use crate::application::goal_service::GoalError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError(pub GoalError);

impl From<GoalError> for ApiError {
    fn from(e: GoalError) -> Self {
        Self(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self(GoalError::Dataset(e))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            GoalError::UnknownLocation { .. } | GoalError::UnresolvedLocation { .. } => {
                StatusCode::NOT_FOUND
            }
            GoalError::Projection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GoalError::Dataset(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
