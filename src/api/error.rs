use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use super::types::ErrorResponse;
use crate::leaderboard::LeaderboardError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("Error: {0}")]
    Internal(String),
}

impl From<LeaderboardError> for ApiError {
    fn from(err: LeaderboardError) -> Self {
        match err {
            LeaderboardError::InvalidInput => ApiError::InvalidInput,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidInput => StatusCode::BAD_REQUEST,
            ApiError::Internal(ref detail) => {
                tracing::error!("request failed: {detail}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
