use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use super::{
    error::ApiError,
    types::{MessageResponse, ResultsQuery, ResultsResponse, SubmitRequest},
    AppState, MAX_TOP_N,
};

pub(crate) async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}

pub(crate) async fn submit_result(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let payload: SubmitRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("rejecting result body: {e}");
        ApiError::InvalidInput
    })?;

    let (Some(score), Some(user_name)) = (payload.score, payload.user_name) else {
        return Err(ApiError::InvalidInput);
    };

    state.leaderboard.submit(&user_name, score).await?;

    Ok(Json(MessageResponse::new("Success")))
}

pub(crate) async fn list_results(
    State(state): State<AppState>,
    query: Result<Query<ResultsQuery>, QueryRejection>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!("rejecting results query: {e}");
        ApiError::InvalidInput
    })?;

    let limit = match query.limit {
        Some(limit) if (1..=MAX_TOP_N).contains(&limit) => limit,
        Some(_) => return Err(ApiError::InvalidInput),
        None => state.top_n,
    };

    let results = state.leaderboard.top_n(limit).await?;

    Ok(Json(ResultsResponse { results }))
}
