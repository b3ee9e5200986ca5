use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub code: String,
    pub label: String,
    pub weight: i64, // -4..=4 in the seeded set
    pub color: String,
    pub order_index: i64,
}

// One stored slot of one day. Slots never written are synthesized on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub date: NaiveDate,
    pub slot_index: i64,    // 0..=79
    pub start_time: String, // "HH:MM"
    pub category: Option<String>,
    pub focus: Option<i64>, // 1..=5
    pub memo: Option<String>,
    pub created_at: Option<DateTime<FixedOffset>>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

// Upsert payload for a single slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockInput {
    pub date: String, // "YYYY-MM-DD"
    pub slot_index: i64,
    pub category: Option<String>,
    pub focus: Option<i64>,
    pub memo: Option<String>,
}

// What scoring consumes: a slot that has a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledBlock {
    pub slot_index: i64,
    pub category: String,
    pub focus: Option<i64>,
}

impl FilledBlock {
    pub fn new(slot_index: i64, category: &str, focus: Option<i64>) -> Self {
        Self {
            slot_index,
            category: category.to_string(),
            focus,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub focus_score: f64,
    pub raw_score: f64,
    pub deep_streak_max: i64,
    pub context_switches: i64,
    pub penalty: f64,

    pub productive_blocks: i64, // weight > 0
    pub distract_blocks: i64,   // weight < 0
    pub neutral_blocks: i64,    // weight == 0
    pub total_filled: i64,

    pub productive_hours: f64,
    pub distract_hours: f64,
    pub distract_ratio: f64,
    pub avg_focus_productive: Option<f64>,
}

impl DailySummary {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            focus_score: 0.0,
            raw_score: 0.0,
            deep_streak_max: 0,
            context_switches: 0,
            penalty: 0.0,
            productive_blocks: 0,
            distract_blocks: 0,
            neutral_blocks: 0,
            total_filled: 0,
            productive_hours: 0.0,
            distract_hours: 0.0,
            distract_ratio: 0.0,
            avg_focus_productive: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub focus_score: f64,
    pub productive_hours: f64,
    pub distract_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendSummary {
    pub points: Vec<TrendPoint>,
    pub period_avg_score: f64,
    pub period_avg_productive_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestions {
    pub suggestions: Vec<String>,
    pub summary: String,
    pub is_ai_generated: bool,
}

// On-disk document for the JSON store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Db {
    pub categories: Vec<Category>,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreStats {
    pub total_blocks: i64,
    pub filled_blocks: i64,
    pub fill_rate: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_categories: i64,
}
