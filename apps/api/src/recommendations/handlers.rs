//! Axum route handlers for career recommendations. Each generate call
//! persists a fresh ranked session; history is append-only and individual
//! recommendation rows are never updated.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::catalog::CareerRow;
use crate::models::profile::UserProfileRow;
use crate::models::recommendation::CareerRecommendationRow;
use crate::models::resume::ResumeRow;
use crate::recommendations::scorer::{rank_careers, UserFeatures};
use crate::state::AppState;

const DEFAULT_TOP_N: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    /// How many careers to keep, default 10.
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationWithCareer {
    #[serde(flatten)]
    pub recommendation: CareerRecommendationRow,
    pub career: CareerRow,
}

#[derive(Debug, Serialize)]
pub struct RecommendationListResponse {
    pub session_id: Option<Uuid>,
    pub recommendations: Vec<RecommendationWithCareer>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SessionSummary {
    pub recommendation_session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub count: i64,
    pub top_score: i32,
}

/// Folds the active resume's parsed text into the skill list: any known
/// required skill that appears in the resume counts as a user skill.
fn supplement_skills_from_resume(skills: &mut Vec<String>, parsed_text: &str, careers: &[CareerRow]) {
    let text = parsed_text.to_lowercase();
    for career in careers {
        for skill in &career.required_skills {
            let needle = skill.to_lowercase();
            if !needle.is_empty()
                && text.contains(&needle)
                && !skills.iter().any(|s| s.to_lowercase() == needle)
            {
                skills.push(skill.clone());
            }
        }
    }
}

async fn build_features(
    state: &AppState,
    user_id: i64,
    careers: &[CareerRow],
) -> Result<UserFeatures, AppError> {
    let profile =
        sqlx::query_as::<_, UserProfileRow>("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?;

    let mut features = match profile {
        Some(p) => UserFeatures {
            skills: p.skills,
            education_level: p.education_level,
            interests: p.interests,
            major: p.major,
        },
        None => UserFeatures::default(),
    };

    let resume = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 AND is_active ORDER BY updated_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?;
    if let Some(text) = resume.and_then(|r| r.parsed_text) {
        supplement_skills_from_resume(&mut features.skills, &text, careers);
    }

    Ok(features)
}

/// POST /api/v1/recommendations/generate
///
/// Scores every career against the caller's profile and persists the top-N
/// as a new session. Recomputation never touches earlier sessions.
pub async fn handle_generate(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<GenerateParams>,
) -> Result<Json<RecommendationListResponse>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_TOP_N).clamp(1, 100) as usize;

    let careers = sqlx::query_as::<_, CareerRow>("SELECT * FROM careers ORDER BY id")
        .fetch_all(&state.db)
        .await?;
    if careers.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "no careers available to recommend".to_string(),
        ));
    }

    let features = build_features(&state, user.id, &careers).await?;
    if features.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "profile has no skills, education or interests to match against".to_string(),
        ));
    }

    let ranked = rank_careers(&careers, &features, limit);
    let session_id = Uuid::new_v4();

    let mut tx = state.db.begin().await?;
    for (i, scored) in ranked.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO career_recommendations
                (user_id, career_id, match_score, match_reasons, recommendation_session_id, rank)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(scored.career_id)
        .bind(scored.match_score)
        .bind(&scored.match_reasons)
        .bind(session_id)
        .bind(i as i32 + 1)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    load_session(&state, user.id, session_id).await
}

/// GET /api/v1/recommendations
///
/// The caller's most recent session, ranked, with careers embedded.
pub async fn handle_current(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<RecommendationListResponse>, AppError> {
    let latest: Option<(Uuid,)> = sqlx::query_as(
        "SELECT recommendation_session_id FROM career_recommendations \
         WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
    )
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;

    match latest {
        Some((session_id,)) => load_session(&state, user.id, session_id).await,
        None => Ok(Json(RecommendationListResponse {
            session_id: None,
            recommendations: vec![],
        })),
    }
}

/// GET /api/v1/recommendations/sessions
///
/// Append-only history of the caller's recommendation sessions, newest first.
pub async fn handle_sessions(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<SessionSummary>>, AppError> {
    let sessions = sqlx::query_as::<_, SessionSummary>(
        "SELECT recommendation_session_id, MIN(created_at) AS created_at, \
                COUNT(*) AS count, MAX(match_score) AS top_score \
         FROM career_recommendations WHERE user_id = $1 \
         GROUP BY recommendation_session_id ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(sessions))
}

async fn load_session(
    state: &AppState,
    user_id: i64,
    session_id: Uuid,
) -> Result<Json<RecommendationListResponse>, AppError> {
    let rows = sqlx::query_as::<_, CareerRecommendationRow>(
        "SELECT * FROM career_recommendations \
         WHERE user_id = $1 AND recommendation_session_id = $2 ORDER BY rank",
    )
    .bind(user_id)
    .bind(session_id)
    .fetch_all(&state.db)
    .await?;

    let career_ids: Vec<i64> = rows.iter().map(|r| r.career_id).collect();
    let careers = sqlx::query_as::<_, CareerRow>("SELECT * FROM careers WHERE id = ANY($1)")
        .bind(&career_ids)
        .fetch_all(&state.db)
        .await?;

    let recommendations = rows
        .into_iter()
        .filter_map(|rec| {
            careers
                .iter()
                .find(|c| c.id == rec.career_id)
                .cloned()
                .map(|career| RecommendationWithCareer {
                    recommendation: rec,
                    career,
                })
        })
        .collect();

    Ok(Json(RecommendationListResponse {
        session_id: Some(session_id),
        recommendations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn career(id: i64, skills: &[&str]) -> CareerRow {
        CareerRow {
            id,
            title: "Role".to_string(),
            description: "description".to_string(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            education_required: "bachelor".to_string(),
            experience_required: "2-4 years".to_string(),
            salary_range: None,
            future_prospect: None,
            category_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_resume_supplements_missing_skills() {
        let careers = vec![career(1, &["Rust", "PostgreSQL"]), career(2, &["Python"])];
        let mut skills = vec!["Python".to_string()];
        supplement_skills_from_resume(
            &mut skills,
            "Five years writing Rust services on PostgreSQL.",
            &careers,
        );
        assert_eq!(skills, vec!["Python", "Rust", "PostgreSQL"]);
    }

    #[test]
    fn test_resume_supplement_does_not_duplicate() {
        let careers = vec![career(1, &["Rust"])];
        let mut skills = vec!["rust".to_string()];
        supplement_skills_from_resume(&mut skills, "rust rust rust", &careers);
        assert_eq!(skills, vec!["rust"]);
    }
}
