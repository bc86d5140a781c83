//! Axum route handlers for the job catalog.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::extract::{AdminUser, AuthUser};
use crate::errors::AppError;
use crate::models::catalog::JobRow;
use crate::models::{ListResponse, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobCreateRequest {
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    pub salary_range: String,
    pub location: String,
    pub job_type: String,
    pub experience_required: String,
    pub education_required: String,
    pub category_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct JobUpdateRequest {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub skills: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub salary_range: Option<String>,
    pub location: Option<String>,
    pub job_type: Option<String>,
    /// `active` or `closed`.
    pub status: Option<String>,
    pub experience_required: Option<String>,
    pub education_required: Option<String>,
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct JobListParams {
    pub category_id: Option<i64>,
    pub status: Option<String>,
    /// Keyword matched against title, company and description.
    pub q: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

async fn ensure_job_category(state: &AppState, category_id: i64) -> Result<(), AppError> {
    let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM job_categories WHERE id = $1")
        .bind(category_id)
        .fetch_optional(&state.db)
        .await?;
    if exists.is_none() {
        return Err(AppError::Validation(format!(
            "job category {category_id} does not exist"
        )));
    }
    Ok(())
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Json(req): Json<JobCreateRequest>,
) -> Result<Json<JobRow>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    ensure_job_category(&state, req.category_id).await?;

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO jobs
            (title, company, description, requirements, skills, benefits, salary_range,
             location, job_type, experience_required, education_required, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(&req.title)
    .bind(&req.company)
    .bind(&req.description)
    .bind(&req.requirements)
    .bind(&req.skills)
    .bind(&req.benefits)
    .bind(&req.salary_range)
    .bind(&req.location)
    .bind(&req.job_type)
    .bind(&req.experience_required)
    .bind(&req.education_required)
    .bind(req.category_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(job))
}

/// GET /api/v1/jobs
///
/// Paginated listing with optional category, status and keyword filters.
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Query(params): Query<JobListParams>,
) -> Result<Json<ListResponse<JobRow>>, AppError> {
    let page = Pagination::from_query(params.skip, params.limit);

    const FILTER: &str = "($1::bigint IS NULL OR category_id = $1) \
         AND ($2::text IS NULL OR status = $2) \
         AND ($3::text IS NULL OR title ILIKE '%' || $3 || '%' \
              OR company ILIKE '%' || $3 || '%' OR description ILIKE '%' || $3 || '%')";

    let items = sqlx::query_as::<_, JobRow>(&format!(
        "SELECT * FROM jobs WHERE {FILTER} ORDER BY id LIMIT $4 OFFSET $5"
    ))
    .bind(params.category_id)
    .bind(&params.status)
    .bind(&params.q)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM jobs WHERE {FILTER}"))
        .bind(params.category_id)
        .bind(&params.status)
        .bind(&params.q)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ListResponse { items, total }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    AuthUser(_): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<JobRow>, AppError> {
    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(job))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<JobUpdateRequest>,
) -> Result<Json<JobRow>, AppError> {
    if let Some(category_id) = req.category_id {
        ensure_job_category(&state, category_id).await?;
    }
    if let Some(status) = &req.status {
        if status != "active" && status != "closed" {
            return Err(AppError::Validation(
                "status must be 'active' or 'closed'".to_string(),
            ));
        }
    }

    let job = sqlx::query_as::<_, JobRow>(
        r#"
        UPDATE jobs SET
            title = COALESCE($2, title),
            company = COALESCE($3, company),
            description = COALESCE($4, description),
            requirements = COALESCE($5, requirements),
            skills = COALESCE($6, skills),
            benefits = COALESCE($7, benefits),
            salary_range = COALESCE($8, salary_range),
            location = COALESCE($9, location),
            job_type = COALESCE($10, job_type),
            status = COALESCE($11, status),
            experience_required = COALESCE($12, experience_required),
            education_required = COALESCE($13, education_required),
            category_id = COALESCE($14, category_id),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.title)
    .bind(&req.company)
    .bind(&req.description)
    .bind(&req.requirements)
    .bind(&req.skills)
    .bind(&req.benefits)
    .bind(&req.salary_range)
    .bind(&req.location)
    .bind(&req.job_type)
    .bind(&req.status)
    .bind(&req.experience_required)
    .bind(&req.education_required)
    .bind(req.category_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    Ok(Json(job))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    Ok(Json(json!({ "status": "deleted" })))
}
