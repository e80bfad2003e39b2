use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::auth::cookies::ACCESS_COOKIE;
use crate::auth::tokens::{JwtKeys, TokenKind};
use crate::error::ApiError;

/// Extracts and validates the access JWT, returning the user ID. The token
/// comes from the Authorization header or the `accessToken` cookie; validity
/// is cryptographic + expiry only, never checked against storage.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let bearer = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
            .map(str::to_owned);

        let token = match bearer {
            Some(t) => t,
            None => CookieJar::from_headers(&parts.headers)
                .get(ACCESS_COOKIE)
                .map(|c| c.value().to_string())
                .ok_or_else(|| ApiError::unauthorized("missing access credential"))?,
        };

        let claims = keys.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired access token");
            ApiError::from(e)
        })?;

        if claims.kind != TokenKind::Access {
            return Err(ApiError::unauthorized("access token required"));
        }

        Ok(AuthUser(claims.sub))
    }
}
