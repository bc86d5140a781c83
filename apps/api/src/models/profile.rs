use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfileRow {
    pub id: i64,
    pub user_id: i64,
    pub full_name: Option<String>,
    pub education_level: Option<String>,
    pub major: Option<String>,
    pub experience_years: Option<i32>,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
