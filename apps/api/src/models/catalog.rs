use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// One node of a job- or career-category tree. Both kinds share this shape;
/// `level` is always `parent.level + 1` (roots are level 1).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub level: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub description: String,
    pub requirements: String,
    pub skills: Vec<String>,
    pub benefits: Vec<String>,
    pub salary_range: String,
    pub location: String,
    pub job_type: String,
    /// `active` or `closed`.
    pub status: String,
    pub experience_required: String,
    pub education_required: String,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareerRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub education_required: String,
    pub experience_required: String,
    /// `{"min": .., "max": ..}` when present.
    pub salary_range: Option<Value>,
    pub future_prospect: Option<String>,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
