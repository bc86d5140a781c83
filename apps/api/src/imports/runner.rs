//! The import pipeline. Runs as a spawned background task; the import
//! record is the only coordination point between the upload request and
//! the poll endpoint, so every step reports progress by updating it.
//!
//! Rows are inserted one at a time outside any batch transaction: partial
//! success is a normal terminal outcome, not an error. Only file-level
//! problems (unreadable upload, missing header columns) fail the record.

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{error, info};

use crate::imports::sheet::parse_upload;
use crate::imports::validate::{missing_columns, validate_rows, CareerDraft, JobDraft, RowDraft, ValidRow};
use crate::imports::ImportKind;
use crate::models::import::{ImportRecordRow, ImportStatus, RowError};

/// Creates the `pending` record returned to the uploader.
pub async fn create_record(
    db: &PgPool,
    kind: ImportKind,
    filename: &str,
    file_size: i64,
    importer_id: i64,
) -> Result<ImportRecordRow, sqlx::Error> {
    sqlx::query_as::<_, ImportRecordRow>(
        r#"
        INSERT INTO import_records (kind, filename, file_size, status, importer_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(kind.as_str())
    .bind(filename)
    .bind(file_size)
    .bind(ImportStatus::Pending.as_str())
    .bind(importer_id)
    .fetch_one(db)
    .await
}

/// Entry point for the spawned task. Never panics the runtime: every failure
/// path lands the record in a terminal state or logs why it could not.
pub async fn run_import(db: PgPool, import_id: i64, kind: ImportKind, filename: String, bytes: Vec<u8>) {
    if let Err(e) = process(&db, import_id, kind, &filename, &bytes).await {
        error!("import {import_id}: processing aborted: {e:#}");
        let fatal = vec![RowError::file(format!("internal import error: {e}"))];
        if let Err(e) = mark_failed(&db, import_id, &fatal).await {
            error!("import {import_id}: could not mark record failed: {e}");
        }
    }
}

async fn process(
    db: &PgPool,
    import_id: i64,
    kind: ImportKind,
    filename: &str,
    bytes: &[u8],
) -> anyhow::Result<()> {
    let started = sqlx::query(
        "UPDATE import_records SET status = $2, updated_at = NOW() WHERE id = $1 AND status = $3",
    )
    .bind(import_id)
    .bind(ImportStatus::Processing.as_str())
    .bind(ImportStatus::Pending.as_str())
    .execute(db)
    .await?;
    if started.rows_affected() == 0 {
        // Already terminal (or deleted); terminal records are immutable.
        info!("import {import_id}: not pending, skipping");
        return Ok(());
    }

    let sheet = match parse_upload(filename, bytes) {
        Ok(sheet) => sheet,
        Err(e) => {
            mark_failed(db, import_id, &[RowError::file(e.to_string())]).await?;
            return Ok(());
        }
    };

    let fatal = missing_columns(kind, &sheet);
    if !fatal.is_empty() {
        mark_failed(db, import_id, &fatal).await?;
        return Ok(());
    }

    let categories = load_category_index(db, kind).await?;
    let total = sheet.rows.len();
    let (valid, mut errors) = validate_rows(kind, &sheet, &categories);

    let mut success = 0;
    for row in &valid {
        match insert_row(db, row).await {
            Ok(()) => success += 1,
            Err(e) => errors.push(e),
        }
    }

    mark_completed(db, import_id, total as i32, success, &errors).await?;
    info!(
        "import {import_id}: completed ({success}/{total} rows, {} failed)",
        errors.len()
    );
    Ok(())
}

/// Name → id lookup for the category column of this kind.
async fn load_category_index(
    db: &PgPool,
    kind: ImportKind,
) -> Result<HashMap<String, i64>, sqlx::Error> {
    let rows: Vec<(i64, String)> = sqlx::query_as(&format!(
        "SELECT id, name FROM {}",
        kind.category_table()
    ))
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(|(id, name)| (name, id)).collect())
}

fn row_error_from_db(number: u32, e: sqlx::Error) -> RowError {
    let reason = match e.as_database_error() {
        Some(db_err) if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) => {
            "duplicate".to_string()
        }
        Some(db_err) => format!("database rejected row: {}", db_err.message()),
        None => format!("database rejected row: {e}"),
    };
    RowError {
        row: number,
        field: None,
        reason,
    }
}

async fn insert_row(db: &PgPool, row: &ValidRow) -> Result<(), RowError> {
    let result = match &row.draft {
        RowDraft::Job(draft) => insert_job(db, draft).await,
        RowDraft::Career(draft) => insert_career(db, draft).await,
    };
    result.map_err(|e| row_error_from_db(row.number, e))
}

async fn insert_job(db: &PgPool, draft: &JobDraft) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO jobs
            (title, company, description, requirements, skills, benefits, salary_range,
             location, job_type, experience_required, education_required, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(&draft.title)
    .bind(&draft.company)
    .bind(&draft.description)
    .bind(&draft.requirements)
    .bind(&draft.skills)
    .bind(&draft.benefits)
    .bind(&draft.salary_range)
    .bind(&draft.location)
    .bind(&draft.job_type)
    .bind(&draft.experience_required)
    .bind(&draft.education_required)
    .bind(draft.category_id)
    .execute(db)
    .await?;
    Ok(())
}

async fn insert_career(db: &PgPool, draft: &CareerDraft) -> Result<(), sqlx::Error> {
    let salary_range = match (draft.salary_min, draft.salary_max) {
        (None, None) => None,
        (min, max) => Some(serde_json::json!({ "min": min, "max": max })),
    };
    sqlx::query(
        r#"
        INSERT INTO careers
            (title, description, required_skills, education_required, experience_required,
             salary_range, future_prospect, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&draft.title)
    .bind(&draft.description)
    .bind(&draft.required_skills)
    .bind(&draft.education_required)
    .bind(&draft.experience_required)
    .bind(&salary_range)
    .bind(&draft.future_prospect)
    .bind(draft.category_id)
    .execute(db)
    .await?;
    Ok(())
}

fn error_details_json(errors: &[RowError]) -> Option<serde_json::Value> {
    if errors.is_empty() {
        None
    } else {
        serde_json::to_value(errors).ok()
    }
}

async fn mark_failed(db: &PgPool, import_id: i64, errors: &[RowError]) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE import_records SET status = $2, error_details = $3, updated_at = NOW() \
         WHERE id = $1 AND status = $4",
    )
    .bind(import_id)
    .bind(ImportStatus::Failed.as_str())
    .bind(error_details_json(errors))
    .bind(ImportStatus::Processing.as_str())
    .execute(db)
    .await?;
    Ok(())
}

async fn mark_completed(
    db: &PgPool,
    import_id: i64,
    total: i32,
    success: i32,
    errors: &[RowError],
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE import_records SET status = $2, total_count = $3, success_count = $4, \
         failed_count = $5, error_details = $6, updated_at = NOW() \
         WHERE id = $1 AND status = $7",
    )
    .bind(import_id)
    .bind(ImportStatus::Completed.as_str())
    .bind(total)
    .bind(success)
    .bind(errors.len() as i32)
    .bind(error_details_json(errors))
    .bind(ImportStatus::Processing.as_str())
    .execute(db)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_details_json_shape() {
        let errors = vec![
            RowError::field(2, "title", "required"),
            RowError::file("missing required column"),
        ];
        let v = error_details_json(&errors).unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["row"], 2);
        assert_eq!(arr[0]["field"], "title");
        assert_eq!(arr[1]["row"], 0);
    }

    #[test]
    fn test_error_details_json_empty_is_null() {
        assert!(error_details_json(&[]).is_none());
    }
}
