use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A rating score, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatingScore(i32);

impl RatingScore {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i64> for RatingScore {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&value) {
            Ok(Self(value as i32))
        } else {
            Err(AppError::InvalidInput("Invalid rating value".to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    #[serde(default)]
    pub rating: Option<serde_json::Value>,
}

impl RateRequest {
    /// Accepts whole JSON numbers (`4` or `4.0`); `4.5` or `"4"` are rejected
    pub fn score(&self) -> Result<RatingScore, AppError> {
        self.rating
            .as_ref()
            .and_then(|value| {
                value.as_i64().or_else(|| {
                    value
                        .as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                        .map(|f| f as i64)
                })
            })
            .ok_or_else(|| AppError::InvalidInput("Invalid rating value".to_string()))
            .and_then(RatingScore::try_from)
    }
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default)]
    pub comment: Option<String>,
}

/// A comment joined with its author's display name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentView {
    pub id: i32,
    pub recipe_id: i32,
    pub user_id: i32,
    pub user_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a like or favorite toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    /// Whether the record exists after the toggle
    pub active: bool,
    /// Total count for the recipe after the toggle
    pub count: i64,
}

/// Per-viewer state shown on a recipe page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewerState {
    pub liked_by_user: bool,
    pub favorited_by_user: bool,
    pub user_rating: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rating_bounds() {
        assert!(RatingScore::try_from(0).is_err());
        assert_eq!(RatingScore::try_from(1).unwrap().get(), 1);
        assert_eq!(RatingScore::try_from(5).unwrap().get(), 5);
        assert!(RatingScore::try_from(6).is_err());
    }

    #[test]
    fn test_rate_request_rejects_non_integers() {
        let fractional: RateRequest = serde_json::from_value(json!({ "rating": 4.5 })).unwrap();
        assert!(fractional.score().is_err());

        let text: RateRequest = serde_json::from_value(json!({ "rating": "4" })).unwrap();
        assert!(text.score().is_err());

        let missing: RateRequest = serde_json::from_value(json!({})).unwrap();
        assert!(missing.score().is_err());

        let ok: RateRequest = serde_json::from_value(json!({ "rating": 3 })).unwrap();
        assert_eq!(ok.score().unwrap().get(), 3);
    }

    #[test]
    fn test_rate_request_accepts_whole_floats() {
        let whole: RateRequest = serde_json::from_value(json!({ "rating": 4.0 })).unwrap();
        assert_eq!(whole.score().unwrap().get(), 4);

        let out_of_range: RateRequest = serde_json::from_value(json!({ "rating": 6.0 })).unwrap();
        assert!(out_of_range.score().is_err());
    }
}
