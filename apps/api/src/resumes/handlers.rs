//! Axum route handlers for resumes. All access is owner-scoped; uploaded
//! files land under the configured upload directory and PDF text is
//! extracted into `parsed_text` for the recommendation engine.

use axum::{
    extract::{Multipart, Path, Query, State},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;

use crate::auth::extract::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::models::user::UserRow;
use crate::models::{ListResponse, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ResumeCreateRequest {
    pub title: String,
    pub content: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub description: Option<String>,
    /// `draft` or `submitted`.
    pub status: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

async fn fetch_owned(state: &AppState, id: i64, user: &UserRow) -> Result<ResumeRow, AppError> {
    let resume = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    if resume.user_id != user.id {
        return Err(AppError::Forbidden(
            "Resumes are visible only to their owner".to_string(),
        ));
    }
    Ok(resume)
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<ResumeCreateRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    let resume = sqlx::query_as::<_, ResumeRow>(
        "INSERT INTO resumes (user_id, title, content, description) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(user.id)
    .bind(&req.title)
    .bind(&req.content)
    .bind(&req.description)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(resume))
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<ResumeListParams>,
) -> Result<Json<ListResponse<ResumeRow>>, AppError> {
    let page = Pagination::from_query(params.skip, params.limit);

    let items = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE user_id = $1 ORDER BY updated_at DESC LIMIT $2 OFFSET $3",
    )
    .bind(user.id)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM resumes WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ListResponse { items, total }))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ResumeRow>, AppError> {
    Ok(Json(fetch_owned(&state, id, &user).await?))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ResumeUpdateRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    fetch_owned(&state, id, &user).await?;

    if let Some(status) = &req.status {
        if status != "draft" && status != "submitted" {
            return Err(AppError::Validation(
                "status must be 'draft' or 'submitted'".to_string(),
            ));
        }
    }

    let resume = sqlx::query_as::<_, ResumeRow>(
        r#"
        UPDATE resumes SET
            title = COALESCE($2, title),
            content = COALESCE($3, content),
            description = COALESCE($4, description),
            status = COALESCE($5, status),
            is_active = COALESCE($6, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.title)
    .bind(&req.content)
    .bind(&req.description)
    .bind(&req.status)
    .bind(req.is_active)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    fetch_owned(&state, id, &user).await?;
    sqlx::query("DELETE FROM resumes WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;
    Ok(Json(json!({ "status": "deleted" })))
}

/// POST /api/v1/resumes/:id/file
///
/// Uploads a PDF or plain-text resume file. The file is stored under the
/// upload directory and its text recorded for matching.
pub async fn handle_upload_resume_file(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<ResumeRow>, AppError> {
    fetch_owned(&state, id, &user).await?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field
                .file_name()
                .ok_or_else(|| AppError::Validation("file field has no filename".to_string()))?
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("could not read upload: {e}")))?;
            upload = Some((filename, data));
        }
    }
    let (filename, data) = upload
        .ok_or_else(|| AppError::Validation("multipart field 'file' is required".to_string()))?;

    let lower = filename.to_lowercase();
    let parsed_text = if lower.ends_with(".pdf") {
        Some(
            pdf_extract::extract_text_from_mem(&data)
                .map_err(|e| AppError::UnprocessableEntity(format!("could not parse PDF: {e}")))?,
        )
    } else if lower.ends_with(".txt") {
        Some(String::from_utf8_lossy(&data).into_owned())
    } else {
        return Err(AppError::Validation(
            "only .pdf and .txt resume files are supported".to_string(),
        ));
    };

    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| anyhow::anyhow!("could not create upload directory: {e}"))?;
    let stored_name = format!("resume_{id}_{filename}");
    let path = std::path::Path::new(&state.config.upload_dir).join(&stored_name);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| anyhow::anyhow!("could not store upload: {e}"))?;
    let stored_path = path.to_string_lossy().into_owned();

    let resume = sqlx::query_as::<_, ResumeRow>(
        "UPDATE resumes SET file_path = $2, parsed_text = $3, last_parsed_at = NOW(), \
         updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(&stored_path)
    .bind(&parsed_text)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(resume))
}
