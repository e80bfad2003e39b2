use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        cookies::{removal_cookie, secure_cookie, ACCESS_COOKIE, REFRESH_COOKIE},
        dto::{AuthResponse, LoginRequest, RefreshRequest, SignUpRequest, UpdatePasswordRequest},
        extractors::AuthUser,
        password::{hash_password, is_strong_password, is_valid_email, verify_password},
        tokens::{self, JwtKeys},
    },
    error::{ApiError, ApiResult},
    profiles::{dto::PublicProfile, repo, repo_types::User},
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
        .route("/update-password", post(update_password))
}

/// Argon2 is CPU-bound; run it off the async workers.
async fn hash_blocking(plain: String) -> ApiResult<String> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(hash)
}

async fn verify_blocking(plain: String, hash: String) -> ApiResult<bool> {
    let ok = tokio::task::spawn_blocking(move || verify_password(&plain, &hash))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(ok)
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(mut payload): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<PublicProfile>>)> {
    payload.email = payload.email.trim().to_lowercase();
    payload.first_name = payload.first_name.trim().to_string();

    if payload.first_name.is_empty() {
        return Err(ApiError::validation("first name is required"));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("invalid email"));
    }
    if !is_strong_password(&payload.password) {
        warn!("weak password rejected");
        return Err(ApiError::validation("password format incorrect"));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("user with same e-mail already exists"));
    }

    let hash = hash_blocking(payload.password).await?;

    let last_name = payload.last_name.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let user = match User::create(&state.db, &payload.email, &hash, &payload.first_name, last_name)
        .await
    {
        Ok(u) => u,
        // The unique index closes the check-then-insert race.
        Err(e) if repo::is_unique_violation(&e) => {
            warn!(email = %payload.email, "email already registered");
            return Err(ApiError::conflict("user with same e-mail already exists"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            201,
            PublicProfile::from(user),
            "user registered successfully",
        )),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<ApiResponse<AuthResponse>>)> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::validation("invalid email"));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::unauthorized("invalid credentials")
        })?;

    let ok = verify_blocking(payload.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let keys = JwtKeys::from_ref(&state);
    let pair = tokens::issue_session(&state.db, &keys, &user).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let jar = jar
        .add(secure_cookie(ACCESS_COOKIE, pair.access.clone()))
        .add(secure_cookie(REFRESH_COOKIE, pair.refresh.clone()));
    Ok((
        jar,
        Json(ApiResponse::ok(
            AuthResponse {
                access_token: pair.access,
                refresh_token: pair.refresh,
                user: PublicProfile::from(user),
            },
            "user logged in successfully",
        )),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Option<Json<RefreshRequest>>,
) -> ApiResult<(CookieJar, Json<ApiResponse<AuthResponse>>)> {
    let presented = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| payload.and_then(|Json(p)| p.refresh_token))
        .ok_or_else(|| ApiError::unauthorized("missing refresh credential"))?;

    let keys = JwtKeys::from_ref(&state);
    let (user, pair) = tokens::rotate_refresh(&state.db, &keys, &presented).await?;

    info!(user_id = %user.id, "tokens refreshed");
    let jar = jar
        .add(secure_cookie(ACCESS_COOKIE, pair.access.clone()))
        .add(secure_cookie(REFRESH_COOKIE, pair.refresh.clone()));
    Ok((
        jar,
        Json(ApiResponse::ok(
            AuthResponse {
                access_token: pair.access,
                refresh_token: pair.refresh,
                user: PublicProfile::from(user),
            },
            "tokens refreshed successfully",
        )),
    ))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<ApiResponse<serde_json::Value>>)> {
    tokens::revoke_session(&state.db, user_id).await?;

    info!(user_id = %user_id, "user logged out");
    let jar = jar
        .remove(removal_cookie(ACCESS_COOKIE))
        .remove(removal_cookie(REFRESH_COOKIE));
    Ok((
        jar,
        Json(ApiResponse::ok(
            serde_json::json!({}),
            "user logged out successfully",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> ApiResult<Json<ApiResponse<serde_json::Value>>> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("user not found"))?;

    let ok = verify_blocking(payload.old_password.clone(), user.password_hash.clone()).await?;
    if !ok {
        warn!(user_id = %user_id, "password change with invalid old password");
        return Err(ApiError::unauthorized("invalid old password"));
    }
    if payload.new_password == payload.old_password {
        return Err(ApiError::validation(
            "new password can't be the same as the old password",
        ));
    }
    if !is_strong_password(&payload.new_password) {
        return Err(ApiError::validation("password format incorrect"));
    }

    let hash = hash_blocking(payload.new_password).await?;
    User::set_password_hash(&state.db, user_id, &hash).await?;

    info!(user_id = %user_id, "password changed");
    Ok(Json(ApiResponse::ok(
        serde_json::json!({}),
        "password changed successfully",
    )))
}
