//! Axum route handlers for the category trees. One handler set serves both
//! job and career categories; the kind arrives via an `Extension` set on
//! each route subtree. Level and no-cycle invariants are enforced on every
//! write, so stored trees never need after-the-fact repair.

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::extract::{AdminUser, AuthUser};
use crate::categories::tree::{
    ancestors, build_forest, build_subtree, child_level, descendants, plan_move, MoveError,
    TreeResponse,
};
use crate::categories::CategoryKind;
use crate::errors::AppError;
use crate::models::catalog::CategoryRow;
use crate::models::{ListResponse, Pagination};
use crate::state::AppState;

async fn load_all(db: &PgPool, kind: CategoryKind) -> Result<Vec<CategoryRow>, AppError> {
    let rows = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT * FROM {} ORDER BY id",
        kind.table()
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

async fn get_by_id(db: &PgPool, kind: CategoryKind, id: i64) -> Result<CategoryRow, AppError> {
    sqlx::query_as::<_, CategoryRow>(&format!("SELECT * FROM {} WHERE id = $1", kind.table()))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} {id} not found", kind.label())))
}

async fn name_taken(
    db: &PgPool,
    kind: CategoryKind,
    name: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let existing: Option<(i64,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE name = $1",
        kind.table()
    ))
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(matches!(existing, Some((id,)) if Some(id) != exclude_id))
}

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CategoryCreateRequest {
    pub name: String,
    pub parent_id: Option<i64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryListParams {
    pub parent_id: Option<i64>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TreeParams {
    pub root_id: Option<i64>,
    #[serde(default)]
    pub shallow: bool,
}

#[derive(Debug, Deserialize)]
pub struct MoveParams {
    pub new_parent_id: Option<i64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/{job,career}-categories
///
/// Creates a category. The level is derived from the parent, never supplied
/// by the caller.
pub async fn handle_create_category(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AdminUser(_): AdminUser,
    Json(req): Json<CategoryCreateRequest>,
) -> Result<Json<CategoryRow>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if name_taken(&state.db, kind, &req.name, None).await? {
        return Err(AppError::Conflict(format!(
            "{} '{}' already exists",
            kind.label(),
            req.name
        )));
    }

    let parent = match req.parent_id {
        Some(pid) => Some(get_by_id(&state.db, kind, pid).await.map_err(|_| {
            AppError::Validation(format!("parent category {pid} does not exist"))
        })?),
        None => None,
    };
    let level = child_level(parent.as_ref());

    let row = sqlx::query_as::<_, CategoryRow>(&format!(
        "INSERT INTO {} (name, parent_id, level, description) VALUES ($1, $2, $3, $4) RETURNING *",
        kind.table()
    ))
    .bind(&req.name)
    .bind(req.parent_id)
    .bind(level)
    .bind(&req.description)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(row))
}

/// GET /api/v1/{job,career}-categories
///
/// Lists direct children of `parent_id` (roots when omitted), paginated.
pub async fn handle_list_categories(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AuthUser(_): AuthUser,
    Query(params): Query<CategoryListParams>,
) -> Result<Json<ListResponse<CategoryRow>>, AppError> {
    let page = Pagination::from_query(params.skip, params.limit);

    let items = sqlx::query_as::<_, CategoryRow>(&format!(
        "SELECT * FROM {} WHERE parent_id IS NOT DISTINCT FROM $1 ORDER BY id LIMIT $2 OFFSET $3",
        kind.table()
    ))
    .bind(params.parent_id)
    .bind(page.limit)
    .bind(page.skip)
    .fetch_all(&state.db)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE parent_id IS NOT DISTINCT FROM $1",
        kind.table()
    ))
    .bind(params.parent_id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ListResponse { items, total }))
}

/// GET /api/v1/{job,career}-categories/tree
///
/// Resolves a rooted subtree (`root_id`) or the full forest. `shallow=true`
/// limits resolution to direct children.
pub async fn handle_category_tree(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AuthUser(_): AuthUser,
    Query(params): Query<TreeParams>,
) -> Result<Json<TreeResponse>, AppError> {
    let rows = load_all(&state.db, kind).await?;
    match params.root_id {
        Some(root_id) => {
            let node = build_subtree(&rows, root_id, params.shallow).ok_or_else(|| {
                AppError::NotFound(format!("{} {root_id} not found", kind.label()))
            })?;
            Ok(Json(TreeResponse::Subtree(node)))
        }
        None => Ok(Json(TreeResponse::Forest {
            categories: build_forest(&rows, params.shallow),
        })),
    }
}

/// GET /api/v1/{job,career}-categories/:id
pub async fn handle_get_category(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AuthUser(_): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CategoryRow>, AppError> {
    Ok(Json(get_by_id(&state.db, kind, id).await?))
}

/// PUT /api/v1/{job,career}-categories/:id
///
/// Updates name/description. Reparenting goes through the move endpoint so
/// the level cascade cannot be bypassed.
pub async fn handle_update_category(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Json(req): Json<CategoryUpdateRequest>,
) -> Result<Json<CategoryRow>, AppError> {
    get_by_id(&state.db, kind, id).await?;

    if let Some(name) = &req.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("name cannot be empty".to_string()));
        }
        if name_taken(&state.db, kind, name, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "{} '{name}' already exists",
                kind.label()
            )));
        }
    }

    let row = sqlx::query_as::<_, CategoryRow>(&format!(
        "UPDATE {} SET name = COALESCE($2, name), description = COALESCE($3, description), \
         updated_at = NOW() WHERE id = $1 RETURNING *",
        kind.table()
    ))
    .bind(id)
    .bind(&req.name)
    .bind(&req.description)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(row))
}

/// PUT /api/v1/{job,career}-categories/:id/move
///
/// Reparents a category and cascades the level change to its whole subtree.
/// Moving a category under itself or one of its descendants is rejected.
pub async fn handle_move_category(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    Query(params): Query<MoveParams>,
) -> Result<Json<CategoryRow>, AppError> {
    let rows = load_all(&state.db, kind).await?;
    let plan = plan_move(&rows, id, params.new_parent_id).map_err(|e| match e {
        MoveError::CategoryNotFound => {
            AppError::NotFound(format!("{} {id} not found", kind.label()))
        }
        MoveError::ParentNotFound => AppError::Validation(format!(
            "parent category {} does not exist",
            params.new_parent_id.unwrap_or_default()
        )),
        MoveError::WouldCycle => AppError::Validation(
            "cannot move a category under itself or one of its descendants".to_string(),
        ),
    })?;

    let mut tx = state.db.begin().await?;
    sqlx::query(&format!(
        "UPDATE {} SET parent_id = $2, level = $3, updated_at = NOW() WHERE id = $1",
        kind.table()
    ))
    .bind(id)
    .bind(params.new_parent_id)
    .bind(plan.new_level)
    .execute(&mut *tx)
    .await?;

    for (desc_id, level) in &plan.descendant_levels {
        sqlx::query(&format!(
            "UPDATE {} SET level = $2, updated_at = NOW() WHERE id = $1",
            kind.table()
        ))
        .bind(desc_id)
        .bind(level)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    Ok(Json(get_by_id(&state.db, kind, id).await?))
}

/// GET /api/v1/{job,career}-categories/:id/ancestors
pub async fn handle_category_ancestors(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AuthUser(_): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CategoryRow>>, AppError> {
    get_by_id(&state.db, kind, id).await?;
    let rows = load_all(&state.db, kind).await?;
    Ok(Json(ancestors(&rows, id)))
}

/// GET /api/v1/{job,career}-categories/:id/descendants
pub async fn handle_category_descendants(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AuthUser(_): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CategoryRow>>, AppError> {
    get_by_id(&state.db, kind, id).await?;
    let rows = load_all(&state.db, kind).await?;
    Ok(Json(descendants(&rows, id)))
}

/// DELETE /api/v1/{job,career}-categories/:id
///
/// Rejected while the category still has children or catalog rows.
pub async fn handle_delete_category(
    State(state): State<AppState>,
    Extension(kind): Extension<CategoryKind>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    get_by_id(&state.db, kind, id).await?;

    let child_count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE parent_id = $1",
        kind.table()
    ))
    .bind(id)
    .fetch_one(&state.db)
    .await?;
    if child_count > 0 {
        return Err(AppError::Validation(
            "Cannot delete a category with subcategories. Delete the subcategories first."
                .to_string(),
        ));
    }

    let item_count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {} WHERE category_id = $1",
        kind.item_table()
    ))
    .bind(id)
    .fetch_one(&state.db)
    .await?;
    if item_count > 0 {
        return Err(AppError::Validation(format!(
            "Cannot delete a category still referenced by {item_count} {}",
            kind.item_table()
        )));
    }

    sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({ "status": "deleted" })))
}
