pub mod catalog;
pub mod import;
pub mod profile;
pub mod recommendation;
pub mod resume;
pub mod user;

use serde::{Deserialize, Serialize};

fn default_limit() -> i64 {
    100
}

/// Common pagination query parameters (`?skip=0&limit=100`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Pagination {
    /// Clamps the parameters to sane bounds: non-negative skip, limit in 1..=500.
    pub fn clamped(self) -> Self {
        Pagination {
            skip: self.skip.max(0),
            limit: self.limit.clamp(1, 500),
        }
    }

    /// Builds clamped pagination from optional query fields, for handlers
    /// whose query struct mixes pagination with other parameters.
    pub fn from_query(skip: Option<i64>, limit: Option<i64>) -> Self {
        Pagination {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(100),
        }
        .clamped()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            skip: 0,
            limit: 100,
        }
    }
}

/// Standard list envelope: a page of items plus the unpaginated total.
#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 100);
    }

    #[test]
    fn test_pagination_clamps_negative_skip() {
        let p = Pagination {
            skip: -5,
            limit: 10,
        }
        .clamped();
        assert_eq!(p.skip, 0);
        assert_eq!(p.limit, 10);
    }

    #[test]
    fn test_pagination_clamps_oversized_limit() {
        let p = Pagination {
            skip: 0,
            limit: 10_000,
        }
        .clamped();
        assert_eq!(p.limit, 500);
    }

    #[test]
    fn test_pagination_clamps_zero_limit() {
        let p = Pagination { skip: 0, limit: 0 }.clamped();
        assert_eq!(p.limit, 1);
    }
}
