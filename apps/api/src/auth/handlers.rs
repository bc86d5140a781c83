//! Axum route handlers for registration, login and the current user.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::extract::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::create_access_token;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<UserRow>, AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }

    let taken: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM users WHERE email = $1 OR username = $2")
            .bind(&req.email)
            .bind(&req.username)
            .fetch_optional(&state.db)
            .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(
            "A user with this email or username already exists".to_string(),
        ));
    }

    let hashed = hash_password(&req.password)?;
    let user = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (email, username, hashed_password) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&req.email)
    .bind(&req.username)
    .bind(&hashed)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(user))
}

/// POST /api/v1/auth/login
///
/// Verifies credentials and returns a bearer token. The generic 401 on a
/// bad email or password avoids confirming which one was wrong.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(&req.email)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&req.password, &user.hashed_password) {
        return Err(AppError::Unauthorized);
    }
    if !user.is_active {
        return Err(AppError::Forbidden("User account is deactivated".to_string()));
    }

    sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
        .bind(user.id)
        .execute(&state.db)
        .await?;

    let access_token = create_access_token(
        user.id,
        &state.config.jwt_secret,
        state.config.access_token_ttl_minutes,
    )?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(AuthUser(user): AuthUser) -> Json<UserRow> {
    Json(user)
}
