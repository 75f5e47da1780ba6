//! Turning free-form model output into a [`DailyPlan`] list.
//!
//! The model is asked for strict JSON but routinely wraps it in prose or code
//! fences. The first `{` through the last `}` is taken as the payload. A payload
//! without a `dailyPlan` array is rejected outright; individual entries with
//! missing fields are repaired with fixed defaults, and every repair is logged and
//! reported in [`ParsedPlan::fallbacks`].

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::DailyPlan;

static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("json object pattern is valid"));

pub const DEFAULT_DESCRIPTION: &str = "Learning objectives for the day";
pub const DEFAULT_RESOURCES: [&str; 2] = ["General reading", "Online tutorials"];

#[derive(Debug, Error)]
pub enum PlanParseError {
    #[error("No valid JSON found")]
    NoJson,
    #[error("Malformed JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Response has no dailyPlan array")]
    MissingDailyPlan,
}

/// A defaulted field: which entry, and which field was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback {
    pub index: usize,
    pub field: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPlan {
    pub daily_plan: Vec<DailyPlan>,
    pub fallbacks: Vec<Fallback>,
}

/// Greedy match from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    JSON_OBJECT_RE.find(text).map(|m| m.as_str())
}

pub fn parse_learning_plan(text: &str) -> Result<ParsedPlan, PlanParseError> {
    let json = extract_json_object(text).ok_or(PlanParseError::NoJson)?;
    let value: Value = serde_json::from_str(json)?;

    let entries = value
        .get("dailyPlan")
        .and_then(Value::as_array)
        .ok_or(PlanParseError::MissingDailyPlan)?;

    let mut fallbacks = Vec::new();
    let daily_plan = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_entry(index, entry, &mut fallbacks))
        .collect();

    for fallback in &fallbacks {
        warn!(
            index = fallback.index,
            field = fallback.field,
            "AI plan entry missing field, using default"
        );
    }

    Ok(ParsedPlan {
        daily_plan,
        fallbacks,
    })
}

fn normalize_entry(index: usize, entry: &Value, fallbacks: &mut Vec<Fallback>) -> DailyPlan {
    let position = index as u32 + 1;
    let mut note = |field| fallbacks.push(Fallback { index, field });

    let day = entry.get("day").and_then(parse_day).unwrap_or_else(|| {
        note("day");
        position
    });

    let title = non_blank(entry.get("title")).unwrap_or_else(|| {
        note("title");
        format!("Day {position}")
    });

    let description = non_blank(entry.get("description")).unwrap_or_else(|| {
        note("description");
        DEFAULT_DESCRIPTION.to_string()
    });

    let resources = match entry.get("resources").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        None => {
            note("resources");
            DEFAULT_RESOURCES.iter().map(|r| r.to_string()).collect()
        }
    };

    DailyPlan {
        day,
        title,
        description,
        resources,
    }
}

/// Positive whole numbers, given either as a JSON number or a numeric string.
fn parse_day(value: &Value) -> Option<u32> {
    let day = match value {
        Value::Number(n) => match n.as_u64() {
            Some(d) => d,
            None => {
                let f = n.as_f64()?;
                if f.fract() != 0.0 || f < 0.0 {
                    return None;
                }
                f as u64
            }
        },
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u32::try_from(day).ok().filter(|d| *d > 0)
}

fn non_blank(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
