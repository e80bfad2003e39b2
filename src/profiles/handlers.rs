use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{cookies::secure_cookie, extractors::AuthUser},
    error::{ApiError, ApiResult},
    profiles::{
        dto::{PublicProfile, UpdateProfileRequest},
        repo_types::User,
        views::{ViewHistory, VIEWED_PROFILES_COOKIE},
    },
    response::ApiResponse,
    state::AppState,
    storage::upload_avatar,
};

const TOP_PROFILES_LIMIT: i64 = 10;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/my-profile", get(my_profile))
        .route("/c/:id", get(view_profile))
        .route("/explore-top", get(explore_top))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/update-profile", post(update_profile))
        .route(
            "/update-avatar",
            post(update_avatar).layer(DefaultBodyLimit::max(5 * 1024 * 1024)),
        )
}

#[instrument(skip(state))]
pub async fn my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<ApiResponse<PublicProfile>>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("user not found"))?;
    Ok(Json(ApiResponse::ok(
        PublicProfile::from(user),
        "current user fetched successfully",
    )))
}

/// Fetch a profile by id, counting the view once per distinct viewer. The
/// dedup set lives in the `viewedProfiles` cookie and is handed back to the
/// client on every response; self-views and repeat views never increment.
#[instrument(skip(state, jar))]
pub async fn view_profile(
    State(state): State<AppState>,
    AuthUser(viewer_id): AuthUser,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<ApiResponse<PublicProfile>>)> {
    let mut history =
        ViewHistory::from_cookie(jar.get(VIEWED_PROFILES_COOKIE).map(|c| c.value()));

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    let user = if id != viewer_id && !history.contains(id) {
        history.record(id);
        info!(viewer_id = %viewer_id, target_id = %id, "impression counted");
        User::increment_impressions(&state.db, id).await?.unwrap_or(user)
    } else {
        user
    };

    let jar = jar.add(secure_cookie(VIEWED_PROFILES_COOKIE, history.to_cookie_value()));
    Ok((
        jar,
        Json(ApiResponse::ok(
            PublicProfile::from(user),
            "user fetched successfully",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ApiResponse<PublicProfile>>> {
    let changes = payload.into_changes();
    if changes.is_empty() {
        warn!(user_id = %user_id, "update-profile with nothing to update");
        return Err(ApiError::validation("nothing to update"));
    }

    let user = User::update_profile(&state.db, user_id, &changes).await?;

    info!(user_id = %user_id, "profile updated");
    Ok(Json(ApiResponse::ok(
        PublicProfile::from(user),
        "user profile updated successfully",
    )))
}

/// POST /update-avatar (multipart, field `avatar`): uploads the image to
/// object storage and persists the hosted URL on the profile.
#[instrument(skip(state, multipart))]
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<ApiResponse<PublicProfile>>> {
    let mut upload = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("avatar") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::validation(format!("invalid avatar upload: {e}")))?;
            upload = Some((data, content_type));
            break;
        }
    }

    let (body, content_type) =
        upload.ok_or_else(|| ApiError::validation("avatar image is required, nothing to update"))?;

    let url = upload_avatar(&state, user_id, body, &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "avatar upload failed");
            ApiError::upstream("error uploading avatar")
        })?;

    let user = User::set_avatar(&state.db, user_id, &url).await?;

    info!(user_id = %user_id, avatar = %url, "avatar updated");
    Ok(Json(ApiResponse::ok(
        PublicProfile::from(user),
        "avatar image updated successfully",
    )))
}

/// Public leaderboard: top profiles by impressions.
#[instrument(skip(state))]
pub async fn explore_top(
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<PublicProfile>>>> {
    let top = User::top_by_impressions(&state.db, TOP_PROFILES_LIMIT).await?;
    if top.is_empty() {
        return Err(ApiError::not_found("no records found"));
    }
    Ok(Json(ApiResponse::ok(
        top.into_iter().map(PublicProfile::from).collect(),
        "top profiles fetched successfully",
    )))
}
