//! Request extractors that gate handlers on a valid bearer token.
//! Auth failures are rejected here, before any business logic runs.

use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::header, http::request::Parts};

use crate::auth::token::decode_access_token;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

/// The authenticated caller. 401 on a missing/invalid/expired token or an
/// unknown or deactivated user.
pub struct AuthUser(pub UserRow);

/// An authenticated superuser. Same as [`AuthUser`] plus a 403 check.
pub struct AdminUser(pub UserRow);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let user_id =
            decode_access_token(token, &state.config.jwt_secret).map_err(|_| AppError::Unauthorized)?;

        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_superuser {
            return Err(AppError::Forbidden(
                "This operation requires administrator privileges".to_string(),
            ));
        }
        Ok(AdminUser(user))
    }
}
