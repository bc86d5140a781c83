//! Axum route handlers for the career catalog.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::extract::{AdminUser, AuthUser};
use crate::errors::AppError;
use crate::models::catalog::CareerRow;
use crate::models::{ListResponse, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CareerCreateRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub education_required: String,
    pub experience_required: String,
    /// `{"min": .., "max": ..}` when present.
    pub salary_range: Option<Value>,
    pub future_prospect: Option<String>,
    pub category_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CareerUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub education_required: Option<String>,
    pub experience_required: Option<String>,
    pub salary_range: Option<Value>,
    pub future_prospect: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CareerListParams {
    pub category_id: Option<i64>,
    /// Keyword matched against title and description.
    pub q: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

async fn ensure_career_category(state: &AppState, category_id: i64) -> Result<(), AppError> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM career_categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(AppError::Validation(format!(
            "career category {category_id} does not exist"
        )));
    }
    Ok(())
}

/// POST /api/v1/careers
pub async fn handle_create_career(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(req): Json<CareerCreateRequest>,
) -> Result<Json<CareerRow>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    ensure_career_category(&state, req.category_id).await?;

    let taken: Option<(i64,)> = sqlx::query_as("SELECT id FROM careers WHERE title = $1")
        .bind(&req.title)
        .fetch_optional(&state.db)
        .await?;
    if taken.is_some() {
        return Err(AppError::Conflict(format!(
            "Career '{}' already exists",
            req.title
        )));
    }

    let career = sqlx::query_as::<_, CareerRow>(
        r#"
        INSERT INTO careers
            (title, description, required_skills, education_required, experience_required,
             salary_range, future_prospect, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.required_skills)
    .bind(&req.education_required)
    .bind(&req.experience_required)
    .bind(&req.salary_range)
    .bind(&req.future_prospect)
    .bind(req.category_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(career))
}

/// GET /api/v1/careers
///
/// Paginated listing with optional category filter and keyword search.
pub async fn handle_list_careers(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(params): Query<CareerListParams>,
) -> Result<Json<ListResponse<CareerRow>>, AppError> {
    let page = Pagination::from_query(params.skip, params.limit);

    const FILTER: &str = "($1::bigint IS NULL OR category_id = $1) \
         AND ($2::text IS NULL OR title ILIKE '%' || $2 || '%' \
              OR description ILIKE '%' || $2 || '%')";

    let items = sqlx::query_as::<_, CareerRow>(&format!(
        "SELECT * FROM careers WHERE {FILTER} ORDER BY id LIMIT $3 OFFSET $4"
    ))
    .bind(params.category_id)
    .bind(&params.q)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM careers WHERE {FILTER}"))
        .bind(params.category_id)
        .bind(&params.q)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ListResponse { items, total }))
}

/// GET /api/v1/careers/:id
pub async fn handle_get_career(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CareerRow>, AppError> {
    let career = sqlx::query_as::<_, CareerRow>("SELECT * FROM careers WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Career {id} not found")))?;
    Ok(Json(career))
}

/// PUT /api/v1/careers/:id
pub async fn handle_update_career(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<CareerUpdateRequest>,
) -> Result<Json<CareerRow>, AppError> {
    if let Some(category_id) = req.category_id {
        ensure_career_category(&state, category_id).await?;
    }

    let career = sqlx::query_as::<_, CareerRow>(
        r#"
        UPDATE careers SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            required_skills = COALESCE($4, required_skills),
            education_required = COALESCE($5, education_required),
            experience_required = COALESCE($6, experience_required),
            salary_range = COALESCE($7, salary_range),
            future_prospect = COALESCE($8, future_prospect),
            category_id = COALESCE($9, category_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(&req.required_skills)
    .bind(&req.education_required)
    .bind(&req.experience_required)
    .bind(&req.salary_range)
    .bind(&req.future_prospect)
    .bind(req.category_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Career {id} not found")))?;

    Ok(Json(career))
}

/// DELETE /api/v1/careers/:id
pub async fn handle_delete_career(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query("DELETE FROM careers WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Career {id} not found")));
    }
    Ok(Json(json!({ "status": "deleted" })))
}
