/*
Rule-based improvement suggestions.

RULES is evaluated top to bottom; each rule adds at most one line.
Earlier rules win when the list is cut to MAX_SUGGESTIONS, and the
generic tips only fill what is left.
*/

use crate::models::{DailySummary, Suggestions};

pub const MAX_SUGGESTIONS: usize = 5;
pub const MIN_SUGGESTIONS: usize = 2;

pub struct Rule {
    pub name: &'static str,
    pub applies: fn(&DailySummary) -> bool,
    pub message: fn(&DailySummary) -> String,
}

pub const RULES: [Rule; 6] = [
    Rule {
        name: "high_distraction",
        applies: |s| s.distract_ratio > 0.2,
        message: |s| {
            format!(
                "Distractions took {:.1}% of your active time. Cut back on video and social media and set up a distraction-free space.",
                s.distract_ratio * 100.0
            )
        },
    },
    Rule {
        name: "low_productive_time",
        applies: |s| s.productive_blocks < 12,
        message: |s| {
            format!(
                "You logged {:.2} hours of productive work. Aim for at least 3 hours (12 blocks) of study or work.",
                s.productive_hours
            )
        },
    },
    Rule {
        name: "short_streaks",
        applies: |s| s.deep_streak_max < 4,
        message: |s| {
            format!(
                "Your longest focus streak was {} minutes. Reserve a longer uninterrupted block, such as two hours in the morning.",
                s.deep_streak_max * 15
            )
        },
    },
    Rule {
        name: "frequent_switching",
        applies: |s| s.context_switches > 2 * (s.total_filled / 8).max(1),
        message: |s| {
            format!(
                "You switched categories {} times. Batch similar work together to stay in flow.",
                s.context_switches
            )
        },
    },
    Rule {
        name: "sparse_log",
        applies: |s| s.total_filled < 40,
        message: |s| {
            format!(
                "Only {}/80 blocks were logged. Recording the whole day makes patterns easier to spot.",
                s.total_filled
            )
        },
    },
    Rule {
        name: "low_self_rated_focus",
        applies: |s| s.avg_focus_productive.is_some_and(|f| f < 3.0),
        message: |s| {
            format!(
                "Average self-rated focus during productive blocks was {:.1}/5.0. Break tasks into smaller steps and tidy your environment.",
                s.avg_focus_productive.unwrap_or_default()
            )
        },
    },
];

pub const GENERIC_TIPS: [&str; 3] = [
    "Mornings are when focus runs highest; put your most important task there.",
    "Use a 15-minute timer to build a rhythm of focus and rest.",
    "Leave your phone in another room to remove the temptation.",
];

pub fn format_suggestions(summary: &DailySummary) -> Suggestions {
    let mut suggestions: Vec<String> = RULES
        .iter()
        .filter(|r| (r.applies)(summary))
        .inspect(|r| tracing::debug!(rule = r.name, date = %summary.date, "suggestion rule fired"))
        .map(|r| (r.message)(summary))
        .collect();

    if suggestions.len() < MIN_SUGGESTIONS {
        suggestions.extend(GENERIC_TIPS.iter().map(|t| t.to_string()));
    }
    suggestions.truncate(MAX_SUGGESTIONS);

    Suggestions {
        suggestions,
        summary: summary_text(summary),
        is_ai_generated: false,
    }
}

pub fn tone(focus_score: f64) -> &'static str {
    if focus_score >= 15.0 {
        "excellent"
    } else if focus_score >= 10.0 {
        "good"
    } else if focus_score >= 5.0 {
        "average"
    } else {
        "needs improvement"
    }
}

pub fn positive_points(summary: &DailySummary) -> Vec<String> {
    let mut points = Vec::new();
    if summary.productive_hours >= 3.0 {
        points.push(format!("{:.2} hours of productive time", summary.productive_hours));
    }
    if summary.deep_streak_max >= 6 {
        points.push(format!(
            "a {}-minute focus streak",
            summary.deep_streak_max * 15
        ));
    }
    if summary.distract_ratio <= 0.1 {
        points.push("distractions kept low".to_string());
    }
    if summary.focus_score >= 10.0 {
        points.push(format!("a high focus score of {:.1}", summary.focus_score));
    }
    points
}

pub fn summary_text(summary: &DailySummary) -> String {
    let mut text = format!(
        "Today's focus score is {:.1}, which is {}.",
        summary.focus_score,
        tone(summary.focus_score)
    );

    let points = positive_points(summary);
    if !points.is_empty() {
        text.push_str(&format!(" Highlights: {}.", points.join(", ")));
    }

    if summary.focus_score < 10.0 {
        text.push_str(" Set up an environment that helps you focus even more tomorrow!");
    } else {
        text.push_str(" Keep up this pace!");
    }
    text
}
