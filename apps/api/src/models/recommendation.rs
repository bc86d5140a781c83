use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One ranked career match, immutable once written. Rows sharing a
/// `recommendation_session_id` form the ranked batch of a single request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CareerRecommendationRow {
    pub id: i64,
    pub user_id: i64,
    pub career_id: i64,
    pub match_score: i32,
    pub match_reasons: Vec<String>,
    pub recommendation_session_id: Uuid,
    pub rank: i32,
    pub created_at: DateTime<Utc>,
}
