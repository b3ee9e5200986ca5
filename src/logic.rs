/*
Focus scoring and trend aggregation.
Module was independently written from HTTP / Axum for testing:
everything except the two compute_* entry points is pure.
*/

use chrono::NaiveDate;

use crate::categories::WeightMap;
use crate::error::AppResult;
use crate::models::{DailySummary, FilledBlock, TrendPoint, TrendSummary};
use crate::slots::{self, HOURS_PER_SLOT};
use crate::store::{BlockStore, RangeBlocks};

// One switch per 8 filled blocks (2h) is free
const FREE_SWITCH_BLOCKS: f64 = 8.0;
const PENALTY_PER_SWITCH: f64 = 0.5;

pub fn safe_divide(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        default
    } else {
        numerator / denominator
    }
}

// Exact halves go to the even digit: 0.125 -> 0.12, 2.625 -> 2.62
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockClass {
    Productive,
    Distracting,
    Neutral,
}

pub fn classify(weight: i64) -> BlockClass {
    if weight > 0 {
        BlockClass::Productive
    } else if weight < 0 {
        BlockClass::Distracting
    } else {
        BlockClass::Neutral
    }
}

// Longest run of contiguous productive slots.
//
// Input is slot-ascending. A non-productive block drops the run to 0;
// a productive block that does not directly follow the previous entry
// starts a new run at 1.
pub fn deep_streak_max(blocks: &[FilledBlock], weights: &WeightMap) -> i64 {
    let mut max_streak = 0;
    let mut current = 0;
    let mut last_slot: Option<i64> = None;

    for b in blocks {
        if classify(weights.weight_of(&b.category)) == BlockClass::Productive {
            current = match last_slot {
                Some(prev) if b.slot_index != prev + 1 => 1,
                _ => current + 1,
            };
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
        last_slot = Some(b.slot_index);
    }

    max_streak
}

// Category changes between neighbours in the filled sequence.
// Unfilled gaps are invisible here.
pub fn context_switches(blocks: &[FilledBlock]) -> i64 {
    blocks
        .windows(2)
        .filter(|w| w[0].category != w[1].category)
        .count() as i64
}

pub fn switch_penalty(switches: i64, total_filled: i64) -> f64 {
    let excess = switches as f64 - total_filled as f64 / FREE_SWITCH_BLOCKS;
    excess.max(0.0) * PENALTY_PER_SWITCH
}

// Unrounded per-day figures shared by the daily summary and trend points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayScore {
    pub raw_score: f64,
    pub deep_streak_max: i64,
    pub context_switches: i64,
    pub penalty: f64,
    pub focus_score: f64,
    pub productive_blocks: i64,
    pub distract_blocks: i64,
    pub neutral_blocks: i64,
    pub total_filled: i64,
    focus_sum: f64,
    focus_count: i64,
}

impl DayScore {
    pub fn avg_focus_productive(&self) -> Option<f64> {
        if self.focus_count > 0 {
            Some(self.focus_sum / self.focus_count as f64)
        } else {
            None
        }
    }

    pub fn productive_hours(&self) -> f64 {
        self.productive_blocks as f64 * HOURS_PER_SLOT
    }

    pub fn distract_hours(&self) -> f64 {
        self.distract_blocks as f64 * HOURS_PER_SLOT
    }

    pub fn distract_ratio(&self) -> f64 {
        let active = (self.productive_blocks + self.distract_blocks) as f64;
        safe_divide(self.distract_blocks as f64, active, 0.0)
    }
}

pub fn score_blocks(blocks: &[FilledBlock], weights: &WeightMap) -> DayScore {
    for code in weights.unknown_codes(blocks.iter().map(|b| b.category.as_str())) {
        tracing::debug!(code, "unknown category code scored as neutral");
    }

    let mut score = DayScore {
        total_filled: blocks.len() as i64,
        ..DayScore::default()
    };

    for b in blocks {
        let weight = weights.weight_of(&b.category);
        score.raw_score += weight as f64;

        match classify(weight) {
            BlockClass::Productive => {
                score.productive_blocks += 1;
                if let Some(f) = b.focus {
                    score.focus_sum += f as f64;
                    score.focus_count += 1;
                }
            }
            BlockClass::Distracting => score.distract_blocks += 1,
            BlockClass::Neutral => score.neutral_blocks += 1,
        }
    }

    score.deep_streak_max = deep_streak_max(blocks, weights);
    score.context_switches = context_switches(blocks);
    score.penalty = switch_penalty(score.context_switches, score.total_filled);
    score.focus_score = score.raw_score + score.deep_streak_max as f64 - score.penalty;
    score
}

/// Full summary of one day from its filled blocks.
///
/// An empty day short-circuits to the zero summary.
/// Rounding happens only here, at the boundary.
pub fn summarize_day(date: NaiveDate, blocks: &[FilledBlock], weights: &WeightMap) -> DailySummary {
    if blocks.is_empty() {
        return DailySummary::empty(date);
    }

    let s = score_blocks(blocks, weights);

    DailySummary {
        date,
        focus_score: round_to(s.focus_score, 2),
        raw_score: round_to(s.raw_score, 2),
        deep_streak_max: s.deep_streak_max,
        context_switches: s.context_switches,
        penalty: round_to(s.penalty, 2),
        productive_blocks: s.productive_blocks,
        distract_blocks: s.distract_blocks,
        neutral_blocks: s.neutral_blocks,
        total_filled: s.total_filled,
        productive_hours: round_to(s.productive_hours(), 2),
        distract_hours: round_to(s.distract_hours(), 2),
        distract_ratio: round_to(s.distract_ratio(), 3),
        avg_focus_productive: s.avg_focus_productive().map(|v| round_to(v, 2)),
    }
}

/// Trend series over a date range.
///
/// Dates without filled blocks are left out, not zero-filled.
/// Averages cover included dates only. Points come back date-ascending
/// whatever order the map yields them in.
pub fn aggregate_trend(range: &RangeBlocks, weights: &WeightMap) -> TrendSummary {
    let mut points = Vec::new();
    let mut total_score = 0.0;
    let mut total_productive = 0.0;

    for (date, blocks) in range {
        if blocks.is_empty() {
            continue;
        }
        let s = score_blocks(blocks, weights);

        points.push(TrendPoint {
            date: *date,
            focus_score: round_to(s.focus_score, 2),
            productive_hours: round_to(s.productive_hours(), 2),
            distract_hours: round_to(s.distract_hours(), 2),
        });

        total_score += s.focus_score;
        total_productive += s.productive_hours();
    }

    points.sort_by_key(|p| p.date);
    let days = points.len() as f64;

    TrendSummary {
        period_avg_score: round_to(safe_divide(total_score, days, 0.0), 2),
        period_avg_productive_hours: round_to(safe_divide(total_productive, days, 0.0), 2),
        points,
    }
}

pub fn compute_daily_summary(store: &dyn BlockStore, date: NaiveDate) -> AppResult<DailySummary> {
    let blocks = store.filled_blocks(date)?;
    let weights = store.weight_map()?;
    Ok(summarize_day(date, &blocks, &weights))
}

// The range is validated before anything is read from the store.
pub fn compute_trend(
    store: &dyn BlockStore,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<TrendSummary> {
    slots::validate_range(start, end)?;
    let range = store.filled_blocks_for_range(start, end)?;
    let weights = store.weight_map()?;
    Ok(aggregate_trend(&range, &weights))
}
