use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{trimmed_len, ModelError};

pub const MIN_DURATION_DAYS: i64 = 1;
pub const MAX_DURATION_DAYS: i64 = 7;
pub const DEFAULT_DURATION_DAYS: i64 = 7;
pub const MIN_TOPIC_LEN: usize = 3;
pub const MAX_TOPIC_LEN: usize = 150;

/// An AI-generated learning roadmap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningGuide {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub duration_days: u32,
    pub daily_plan: Vec<DailyPlan>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One day of a [`LearningGuide`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPlan {
    pub day: u32,
    pub title: String,
    pub description: String,
    pub resources: Vec<String>,
}

/// Body of `POST /ai`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLearningGuideInput {
    pub topic: Option<String>,
    pub duration_days: Option<i64>,
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningRequest {
    pub topic: String,
    pub duration_days: u32,
}

impl CreateLearningGuideInput {
    pub fn validate(&self) -> Result<LearningRequest, String> {
        let topic = self.topic.as_deref().map(str::trim).unwrap_or_default();
        if topic.is_empty() {
            return Err("Topic is required".to_string());
        }
        let len = trimmed_len(topic);
        if !(MIN_TOPIC_LEN..=MAX_TOPIC_LEN).contains(&len) {
            return Err(format!(
                "Topic must be between {MIN_TOPIC_LEN} and {MAX_TOPIC_LEN} characters"
            ));
        }

        let days = self.duration_days.unwrap_or(DEFAULT_DURATION_DAYS);
        if !(MIN_DURATION_DAYS..=MAX_DURATION_DAYS).contains(&days) {
            return Err(format!(
                "Duration must be between {MIN_DURATION_DAYS} and {MAX_DURATION_DAYS} days"
            ));
        }

        Ok(LearningRequest {
            topic: topic.to_string(),
            duration_days: days as u32,
        })
    }
}

/// Input for persisting a generated guide.
#[derive(Debug, Clone)]
pub struct NewLearningGuide {
    pub topic: String,
    pub duration_days: u32,
    pub daily_plan: Vec<DailyPlan>,
}

impl NewLearningGuide {
    /// Day numbers must be unique within one guide.
    pub fn check_unique_days(&self) -> Result<(), ModelError> {
        let mut seen = HashSet::new();
        for plan in &self.daily_plan {
            if !seen.insert(plan.day) {
                return Err(ModelError::DuplicateDay(plan.day));
            }
        }
        Ok(())
    }
}

/// Query string of `GET /ai`.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidePage {
    pub guides: Vec<LearningGuide>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_guides: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, returned: usize, total: u32) -> Self {
        let skip = (page.saturating_sub(1) as u64) * limit as u64;
        Self {
            current_page: page,
            total_pages: total.div_ceil(limit.max(1)),
            total_guides: total,
            has_next: skip + (returned as u64) < total as u64,
            has_prev: page > 1,
        }
    }
}
