use std::collections::{BTreeSet, HashMap};

use crate::models::Category;

// (code, label, weight, color suffix)
const SEED: [(&str, &str, i64, &str); 16] = [
    // high productivity
    ("STUDY", "Study", 3, "study"),
    ("ENGLISH", "English", 4, "english"),
    ("AI", "AI learning", 4, "ai"),
    ("WORK_LOG", "Work log", 4, "work"),
    ("BLOG", "Blog", 3, "blog"),
    // moderate
    ("PET_WALK", "Dog walk", 2, "pet"),
    ("FARM", "Farm work", 2, "farm"),
    ("HOUSE", "Housework", 1, "house"),
    ("ADMIN", "Admin", 1, "admin"),
    ("HEALTH", "Health", 2, "health"),
    // neutral
    ("EAT", "Meal", 0, "eat"),
    ("REST", "Rest", 0, "rest"),
    ("SLEEP", "Sleep", 0, "sleep"),
    // distracting
    ("VIDEO", "Video", -2, "video"),
    ("SNS", "Social media", -3, "sns"),
    ("LOST", "Lost time", -4, "lost"),
];

/// Category set written into a fresh store.
pub fn default_categories() -> Vec<Category> {
    SEED.iter()
        .enumerate()
        .map(|(i, (code, label, weight, color))| Category {
            code: code.to_string(),
            label: label.to_string(),
            weight: *weight,
            color: format!("category-{color}"),
            order_index: i as i64 + 1,
        })
        .collect()
}

/// Code -> weight lookup used by scoring.
///
/// Unknown codes weigh 0 (neutral). Blocks tagged with a category that was
/// later removed from configuration still score instead of failing.
#[derive(Debug, Clone, Default)]
pub struct WeightMap {
    weights: HashMap<String, i64>,
}

impl WeightMap {
    pub fn from_categories(categories: &[Category]) -> Self {
        Self {
            weights: categories
                .iter()
                .map(|c| (c.code.clone(), c.weight))
                .collect(),
        }
    }

    pub fn weight_of(&self, code: &str) -> i64 {
        self.weights.get(code).copied().unwrap_or(0)
    }

    // Distinct codes with no configured weight, sorted.
    pub fn unknown_codes<'a>(&self, codes: impl IntoIterator<Item = &'a str>) -> BTreeSet<&'a str> {
        codes
            .into_iter()
            .filter(|c| !self.weights.contains_key(*c))
            .collect()
    }
}

// Categories in display order.
pub fn ordered(mut categories: Vec<Category>) -> Vec<Category> {
    categories.sort_by(|a, b| {
        a.order_index
            .cmp(&b.order_index)
            .then_with(|| a.code.cmp(&b.code))
    });
    categories
}
