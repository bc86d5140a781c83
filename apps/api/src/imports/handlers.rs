//! Axum route handlers for bulk imports. Upload returns the pending record
//! immediately; processing happens in a background task and clients poll
//! the record endpoints for progress. All endpoints are admin-only.

use axum::{
    extract::{Extension, Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;

use crate::auth::extract::AdminUser;
use crate::errors::AppError;
use crate::imports::columns::ColumnSpec;
use crate::imports::runner::{create_record, run_import};
use crate::imports::template::build_template;
use crate::imports::ImportKind;
use crate::models::import::ImportRecordRow;
use crate::models::{ListResponse, Pagination};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /api/v1/{job,career}-imports/upload
///
/// Accepts a multipart `file` field (.xlsx or .csv), creates the import
/// record and hands the bytes to the background runner. The response is the
/// record in `pending` state; poll `records/:id` for the outcome.
pub async fn handle_upload(
    State(state): State<AppState>,
    Extension(kind): Extension<ImportKind>,
    AdminUser(user): AdminUser,
    mut multipart: Multipart,
) -> Result<Json<ImportRecordRow>, AppError> {
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
    if !lower.ends_with(".xlsx") && !lower.ends_with(".csv") {
        return Err(AppError::Validation(
            "only .xlsx and .csv uploads are supported".to_string(),
        ));
    }
    if data.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let record = create_record(&state.db, kind, &filename, data.len() as i64, user.id).await?;

    let db = state.db.clone();
    let record_id = record.id;
    tokio::spawn(async move {
        run_import(db, record_id, kind, filename, data.to_vec()).await;
    });

    Ok(Json(record))
}

/// GET /api/v1/{job,career}-imports/records
///
/// The caller's own import records for this kind, newest first.
pub async fn handle_list_records(
    State(state): State<AppState>,
    Extension(kind): Extension<ImportKind>,
    AdminUser(user): AdminUser,
    Query(params): Query<RecordListParams>,
) -> Result<Json<ListResponse<ImportRecordRow>>, AppError> {
    let page = Pagination::from_query(params.skip, params.limit);

    let items = sqlx::query_as::<_, ImportRecordRow>(
        "SELECT * FROM import_records WHERE importer_id = $1 AND kind = $2 \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(user.id)
    .bind(kind.as_str())
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM import_records WHERE importer_id = $1 AND kind = $2",
    )
    .bind(user.id)
    .bind(kind.as_str())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ListResponse { items, total }))
}

/// GET /api/v1/{job,career}-imports/records/:id
///
/// Poll endpoint. Import records are visible only to their importer.
pub async fn handle_get_record(
    State(state): State<AppState>,
    Extension(kind): Extension<ImportKind>,
    AdminUser(user): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<ImportRecordRow>, AppError> {
    let record = sqlx::query_as::<_, ImportRecordRow>(
        "SELECT * FROM import_records WHERE id = $1 AND kind = $2",
    )
    .bind(id)
    .bind(kind.as_str())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Import record {id} not found")))?;

    if record.importer_id != user.id {
        return Err(AppError::Forbidden(
            "Import records are visible only to their importer".to_string(),
        ));
    }
    Ok(Json(record))
}

/// GET /api/v1/{job,career}-imports/template
///
/// Downloads a generated XLSX template with a field guide and an empty
/// data sheet.
pub async fn handle_template(
    Extension(kind): Extension<ImportKind>,
    AdminUser(_): AdminUser,
) -> Result<impl IntoResponse, AppError> {
    let bytes = build_template(kind)?;
    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", kind.template_filename()),
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/{job,career}-imports/columns
pub async fn handle_columns(
    Extension(kind): Extension<ImportKind>,
    AdminUser(_): AdminUser,
) -> Json<&'static [ColumnSpec]> {
    Json(kind.columns())
}
