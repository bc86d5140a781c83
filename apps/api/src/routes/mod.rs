pub mod health;

use axum::{
    extract::Extension,
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::careers::handlers as careers;
use crate::categories::{handlers as categories, CategoryKind};
use crate::imports::{handlers as imports, ImportKind};
use crate::jobs::handlers as jobs;
use crate::profiles::handlers as profiles;
use crate::recommendations::handlers as recommendations;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

/// One category route subtree; the kind extension picks the backing table.
fn category_routes(kind: CategoryKind) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(categories::handle_create_category).get(categories::handle_list_categories),
        )
        .route("/tree", get(categories::handle_category_tree))
        .route(
            "/:id",
            get(categories::handle_get_category)
                .put(categories::handle_update_category)
                .delete(categories::handle_delete_category),
        )
        .route("/:id/move", put(categories::handle_move_category))
        .route("/:id/ancestors", get(categories::handle_category_ancestors))
        .route(
            "/:id/descendants",
            get(categories::handle_category_descendants),
        )
        .layer(Extension(kind))
}

/// One import route subtree; the kind extension picks columns and target.
fn import_routes(kind: ImportKind) -> Router<AppState> {
    Router::new()
        .route("/upload", post(imports::handle_upload))
        .route("/records", get(imports::handle_list_records))
        .route("/records/:id", get(imports::handle_get_record))
        .route("/template", get(imports::handle_template))
        .route("/columns", get(imports::handle_columns))
        .layer(Extension(kind))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/me", get(auth::handle_me))
        // Profile
        .route(
            "/api/v1/profile",
            get(profiles::handle_get_profile).put(profiles::handle_upsert_profile),
        )
        // Resumes
        .route(
            "/api/v1/resumes",
            post(resumes::handle_create_resume).get(resumes::handle_list_resumes),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/file",
            post(resumes::handle_upload_resume_file),
        )
        // Catalogs
        .route(
            "/api/v1/jobs",
            post(jobs::handle_create_job).get(jobs::handle_list_jobs),
        )
        .route(
            "/api/v1/jobs/:id",
            get(jobs::handle_get_job)
                .put(jobs::handle_update_job)
                .delete(jobs::handle_delete_job),
        )
        .route(
            "/api/v1/careers",
            post(careers::handle_create_career).get(careers::handle_list_careers),
        )
        .route(
            "/api/v1/careers/:id",
            get(careers::handle_get_career)
                .put(careers::handle_update_career)
                .delete(careers::handle_delete_career),
        )
        // Category trees
        .nest("/api/v1/job-categories", category_routes(CategoryKind::Job))
        .nest(
            "/api/v1/career-categories",
            category_routes(CategoryKind::Career),
        )
        // Bulk imports
        .nest("/api/v1/job-imports", import_routes(ImportKind::Jobs))
        .nest("/api/v1/career-imports", import_routes(ImportKind::Careers))
        // Recommendations
        .route(
            "/api/v1/recommendations",
            get(recommendations::handle_current),
        )
        .route(
            "/api/v1/recommendations/generate",
            post(recommendations::handle_generate),
        )
        .route(
            "/api/v1/recommendations/sessions",
            get(recommendations::handle_sessions),
        )
        .with_state(state)
}
