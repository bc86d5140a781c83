//! Axum route handlers for the caller's profile — the feature source for
//! recommendation scoring.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::profile::UserProfileRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProfileUpsertRequest {
    pub full_name: Option<String>,
    pub education_level: Option<String>,
    pub major: Option<String>,
    pub experience_years: Option<i32>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    pub bio: Option<String>,
}

/// GET /api/v1/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserProfileRow>, AppError> {
    let profile =
        sqlx::query_as::<_, UserProfileRow>("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user.id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not created yet".to_string()))?;
    Ok(Json(profile))
}

/// PUT /api/v1/profile
///
/// Full-replace upsert of the caller's profile.
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<ProfileUpsertRequest>,
) -> Result<Json<UserProfileRow>, AppError> {
    if let Some(years) = req.experience_years {
        if years < 0 {
            return Err(AppError::Validation(
                "experience_years cannot be negative".to_string(),
            ));
        }
    }

    let profile = sqlx::query_as::<_, UserProfileRow>(
        r#"
        INSERT INTO user_profiles
            (user_id, full_name, education_level, major, experience_years, skills, interests, bio)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            education_level = EXCLUDED.education_level,
            major = EXCLUDED.major,
            experience_years = EXCLUDED.experience_years,
            skills = EXCLUDED.skills,
            interests = EXCLUDED.interests,
            bio = EXCLUDED.bio,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&req.full_name)
    .bind(&req.education_level)
    .bind(&req.major)
    .bind(req.experience_years)
    .bind(&req.skills)
    .bind(&req.interests)
    .bind(&req.bio)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(profile))
}
