use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    profiles::{dto::PublicProfile, repo_types::User},
    response::ApiResponse,
    search::engine::{self, PageParams},
    state::AppState,
};

/// `page` and `limit` stay raw strings so malformed values fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
}

pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/search/a", get(aligned_search))
        .route("/search/s", get(unaligned_search))
}

#[instrument(skip(state))]
pub async fn aligned_search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<ApiResponse<Vec<PublicProfile>>>> {
    let requester = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("user not found"))?;
    let candidates = User::list_all(&state.db).await?;

    let page = PageParams::from_query(params.page.as_deref(), params.limit.as_deref());
    let results = engine::aligned_search(
        &requester,
        candidates,
        params.query.as_deref().unwrap_or(""),
        &page,
    );

    Ok(Json(ApiResponse::ok(
        results.into_iter().map(PublicProfile::from).collect(),
        "search results fetched successfully",
    )))
}

#[instrument(skip(state))]
pub async fn unaligned_search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<ApiResponse<Vec<PublicProfile>>>> {
    let requester = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("user not found"))?;
    let candidates = User::list_all(&state.db).await?;

    let page = PageParams::from_query(params.page.as_deref(), params.limit.as_deref());
    let results = engine::unaligned_search(
        &requester,
        candidates,
        params.query.as_deref().unwrap_or(""),
        &page,
    );

    Ok(Json(ApiResponse::ok(
        results.into_iter().map(PublicProfile::from).collect(),
        "search results fetched successfully",
    )))
}
