use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub description: Option<String>,
    pub file_path: Option<String>,
    pub parsed_text: Option<String>,
    pub last_parsed_at: Option<DateTime<Utc>>,
    /// `draft` or `submitted`.
    pub status: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
