// Per-day breakdowns used by the analytics endpoint and the LLM context.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::categories::WeightMap;
use crate::error::AppResult;
use crate::logic::round_to;
use crate::models::FilledBlock;
use crate::slots::HOURS_PER_SLOT;
use crate::store::BlockStore;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub blocks: i64,
    pub hours: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PeriodProductivity {
    pub period: &'static str,
    pub start_slot: i64,
    pub end_slot: i64,
    pub avg_weight: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayAnalytics {
    pub date: NaiveDate,
    pub categories: Vec<CategoryShare>,
    pub time_of_day: Vec<PeriodProductivity>,
    pub focus_levels: BTreeMap<i64, i64>,
}

// Four-hour windows of the tracked day, by slot (inclusive).
pub const PERIODS: [(&str, i64, i64); 5] = [
    ("early morning (04:00-07:59)", 0, 15),
    ("morning (08:00-11:59)", 16, 31),
    ("afternoon (12:00-15:59)", 32, 47),
    ("evening (16:00-19:59)", 48, 63),
    ("night (20:00-23:59)", 64, 79),
];

/// Share of filled blocks per category, largest first.
pub fn category_distribution(blocks: &[FilledBlock]) -> Vec<CategoryShare> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for b in blocks {
        *counts.entry(b.category.as_str()).or_default() += 1;
    }

    let total = blocks.len() as f64;
    let mut shares: Vec<CategoryShare> = counts
        .into_iter()
        .map(|(category, n)| CategoryShare {
            category: category.to_string(),
            blocks: n,
            hours: round_to(n as f64 * HOURS_PER_SLOT, 2),
            percentage: round_to(n as f64 / total * 100.0, 1),
        })
        .collect();

    // ties stay alphabetical (BTreeMap order + stable sort)
    shares.sort_by(|a, b| b.blocks.cmp(&a.blocks));
    shares
}

/// Mean category weight of the filled blocks in each period.
/// Periods with nothing logged report 0.0.
pub fn time_of_day_productivity(
    blocks: &[FilledBlock],
    weights: &WeightMap,
) -> Vec<PeriodProductivity> {
    PERIODS
        .iter()
        .map(|&(period, start, end)| {
            let in_period: Vec<i64> = blocks
                .iter()
                .filter(|b| (start..=end).contains(&b.slot_index))
                .map(|b| weights.weight_of(&b.category))
                .collect();

            let avg_weight = if in_period.is_empty() {
                0.0
            } else {
                in_period.iter().sum::<i64>() as f64 / in_period.len() as f64
            };

            PeriodProductivity {
                period,
                start_slot: start,
                end_slot: end,
                avg_weight: round_to(avg_weight, 2),
            }
        })
        .collect()
}

pub fn focus_level_distribution(blocks: &[FilledBlock]) -> BTreeMap<i64, i64> {
    let mut levels = BTreeMap::new();
    for f in blocks.iter().filter_map(|b| b.focus) {
        *levels.entry(f).or_default() += 1;
    }
    levels
}

pub fn analyze_day(date: NaiveDate, blocks: &[FilledBlock], weights: &WeightMap) -> DayAnalytics {
    DayAnalytics {
        date,
        categories: category_distribution(blocks),
        time_of_day: time_of_day_productivity(blocks, weights),
        focus_levels: focus_level_distribution(blocks),
    }
}

pub fn compute_day_analytics(store: &dyn BlockStore, date: NaiveDate) -> AppResult<DayAnalytics> {
    let blocks = store.filled_blocks(date)?;
    let weights = store.weight_map()?;
    Ok(analyze_day(date, &blocks, &weights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::default_categories;

    fn weights() -> WeightMap {
        WeightMap::from_categories(&default_categories())
    }

    #[test]
    fn distribution_counts_and_percentages() {
        let day = vec![
            FilledBlock::new(0, "STUDY", None),
            FilledBlock::new(1, "STUDY", None),
            FilledBlock::new(2, "SNS", None),
        ];
        let shares = category_distribution(&day);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].category, "STUDY");
        assert_eq!(shares[0].blocks, 2);
        assert_eq!(shares[0].hours, 0.5);
        assert_eq!(shares[0].percentage, 66.7);
        assert_eq!(shares[1].percentage, 33.3);
        assert!(category_distribution(&[]).is_empty());
    }

    #[test]
    fn time_of_day_averages_weights_per_period() {
        let day = vec![
            FilledBlock::new(0, "STUDY", None),   // 3
            FilledBlock::new(15, "ENGLISH", None), // 4
            FilledBlock::new(16, "SNS", None),    // -3
            FilledBlock::new(79, "EAT", None),    // 0
        ];
        let periods = time_of_day_productivity(&day, &weights());
        assert_eq!(periods.len(), 5);
        assert_eq!(periods[0].avg_weight, 3.5);
        assert_eq!(periods[1].avg_weight, -3.0);
        assert_eq!(periods[2].avg_weight, 0.0);
        assert_eq!(periods[4].avg_weight, 0.0);
        assert_eq!(periods[4].end_slot, 79);
    }

    #[test]
    fn focus_levels_skip_missing() {
        let day = vec![
            FilledBlock::new(0, "STUDY", Some(4)),
            FilledBlock::new(1, "STUDY", Some(4)),
            FilledBlock::new(2, "SNS", Some(1)),
            FilledBlock::new(3, "EAT", None),
        ];
        let levels = focus_level_distribution(&day);
        assert_eq!(levels.get(&4), Some(&2));
        assert_eq!(levels.get(&1), Some(&1));
        assert_eq!(levels.len(), 2);
    }
}
