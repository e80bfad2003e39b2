pub(crate) use crate::auth::dto::{Claims, JwtKeys, TokenKind};
use crate::config::JwtConfig;
use crate::error::{ApiError, ApiResult};
use crate::profiles::repo_types::User;
use crate::state::AppState;
use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use std::time::Duration;
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Outcome of a failed token check. `Reused` means the presented refresh
/// token no longer matches the stored one: it was already rotated (or
/// stolen), and the caller must force a re-login.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("refresh token is expired or already used")]
    Reused,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Invalid | TokenError::Expired => ApiError::Unauthorized(e.to_string()),
            TokenError::Reused => ApiError::Forbidden(e.to_string()),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
            ttl_minutes,
            refresh_ttl_minutes,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
            access_ttl: Duration::from_secs((ttl_minutes as u64) * 60),
            refresh_ttl: Duration::from_secs((refresh_ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn sign(
        &self,
        user_id: Uuid,
        kind: TokenKind,
        email: Option<String>,
        first_name: Option<String>,
    ) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            kind,
            email,
            first_name,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn sign_access(&self, user: &User) -> anyhow::Result<String> {
        self.sign(
            user.id,
            TokenKind::Access,
            Some(user.email.clone()),
            Some(user.first_name.clone()),
        )
    }

    pub fn sign_refresh(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.sign(user_id, TokenKind::Refresh, None, None)
    }

    /// Stateless check: signature, expiry, issuer and audience only.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(TokenError::from)?;
        debug!(user_id = %data.claims.sub, kind = ?data.claims.kind, "jwt verified");
        Ok(data.claims)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.verify(token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(TokenError::Invalid);
        }
        Ok(claims)
    }
}

#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

fn signing_failure(e: anyhow::Error) -> ApiError {
    error!(error = %e, "token signing failed");
    ApiError::Internal(anyhow::anyhow!("error generating tokens"))
}

/// Issues a fresh token pair and installs the refresh token as the user's
/// sole valid one, invalidating every other outstanding session.
pub async fn issue_session(db: &PgPool, keys: &JwtKeys, user: &User) -> ApiResult<TokenPair> {
    let access = keys.sign_access(user).map_err(signing_failure)?;
    let refresh = keys.sign_refresh(user.id).map_err(signing_failure)?;
    User::install_refresh_token(db, user.id, &refresh).await?;
    Ok(TokenPair { access, refresh })
}

/// Rotation-on-use: verifies the presented refresh token, then swaps it for
/// a new pair with a single conditional update. A mismatch means the token
/// was already rotated and the session must be re-established.
pub async fn rotate_refresh(
    db: &PgPool,
    keys: &JwtKeys,
    presented: &str,
) -> ApiResult<(User, TokenPair)> {
    let claims = keys.verify_refresh(presented)?;
    let user = User::find_by_id(db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid refresh token"))?;

    let access = keys.sign_access(&user).map_err(signing_failure)?;
    let refresh = keys.sign_refresh(user.id).map_err(signing_failure)?;

    let rotated = User::rotate_refresh_token(db, user.id, presented, &refresh).await?;
    if !rotated {
        warn!(user_id = %user.id, "refresh token replay detected");
        return Err(TokenError::Reused.into());
    }
    Ok((user, TokenPair { access, refresh }))
}

/// Clears the stored refresh token (logout). Idempotent.
pub async fn revoke_session(db: &PgPool, user_id: Uuid) -> ApiResult<()> {
    User::clear_refresh_token(db, user_id).await?;
    Ok(())
}
