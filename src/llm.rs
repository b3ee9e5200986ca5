/*
Optional LLM-written suggestions.

The model is reached through SuggestionGenerator only. Whatever goes
wrong (no key, network, bad reply) the caller gets the rule-based
result instead; LLM failures are logged, never returned.
*/

use std::fmt;
use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use serde_json::json;

use crate::analytics::DayAnalytics;
use crate::config::Config;
use crate::models::{Category, DailySummary, Suggestions};
use crate::suggestions::{format_suggestions, MAX_SUGGESTIONS};

const SYSTEM_PROMPT: &str = "You are a productivity coach. Analyze the user's day, logged in \
15-minute blocks, and give concrete, actionable improvement suggestions.";

pub const PARSE_FAILURE: &str = "Could not parse the LLM response.";
pub const FALLBACK_NOTE: &str = " (rule-based analysis: LLM unavailable)";

#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub suggestions: Vec<String>,
    pub summary: String,
}

pub trait SuggestionGenerator: Send + Sync {
    fn generate(&self, context: &str) -> impl Future<Output = anyhow::Result<Generated>> + Send;
}

// OpenAI-style chat completions client.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmClient")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    // None when no key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Option<Self>> {
        let Some(api_key) = config.llm_api_key.clone() else {
            return Ok(None);
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;
        Ok(Some(Self {
            http,
            api_url: config.llm_api_url.clone(),
            api_key,
            model: config.llm_model.clone(),
        }))
    }
}

impl SuggestionGenerator for LlmClient {
    async fn generate(&self, context: &str) -> anyhow::Result<Generated> {
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "system", "content": SYSTEM_PROMPT },
                    { "role": "user", "content": context },
                ],
                "max_tokens": 500,
                "temperature": 0.7,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error {}: {}", status, body);
        }

        let body: serde_json::Value = response.json().await?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .context("LLM reply has no message content")?;

        Ok(parse_reply(content))
    }
}

/// Split a free-form reply into suggestions and summary.
///
/// Bulleted or numbered lines after a "suggestion"/"improvement" heading
/// are suggestions; a "summary" heading ends that section, and lines
/// outside the suggestion section are folded into the summary.
pub fn parse_reply(content: &str) -> Generated {
    let mut suggestions = Vec::new();
    let mut summary_lines: Vec<&str> = Vec::new();
    let mut in_suggestions = false;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let is_item = line.starts_with('-')
            || line.starts_with('•')
            || line.starts_with('*')
            || line.chars().next().is_some_and(|c| c.is_ascii_digit());

        if !is_item {
            let lower = line.to_lowercase();
            if lower.contains("suggestion") || lower.contains("improvement") {
                in_suggestions = true;
                continue;
            }
            if lower.contains("summary") {
                in_suggestions = false;
                continue;
            }
        }

        if in_suggestions && is_item {
            let text = line
                .trim_start_matches(|c: char| c.is_ascii_digit() || "-•*.) ".contains(c))
                .to_string();
            if !text.is_empty() {
                suggestions.push(text);
            }
        } else if !in_suggestions {
            summary_lines.push(line);
        }
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    if suggestions.is_empty() {
        suggestions.push(PARSE_FAILURE.to_string());
    }
    let summary = if summary_lines.is_empty() {
        PARSE_FAILURE.to_string()
    } else {
        summary_lines.join(" ")
    };

    Generated {
        suggestions,
        summary,
    }
}

pub fn build_context(
    summary: &DailySummary,
    analytics: &DayAnalytics,
    categories: &[Category],
) -> String {
    let avg_focus = summary
        .avg_focus_productive
        .map(|f| format!("{f:.2}"))
        .unwrap_or_else(|| "N/A".to_string());

    let mut ctx = format!(
        "Date: {}\n\
         Focus score: {:.1} (raw: {:.1}, longest streak: {} blocks, switch penalty: {:.1})\n\
         \n\
         Time spent:\n\
         - productive: {:.2} h ({} blocks)\n\
         - distracting: {:.2} h ({} blocks)\n\
         - neutral: {} blocks\n\
         - distraction ratio: {:.1}%\n\
         \n\
         Average self-rated focus (productive blocks): {}/5.0\n\
         \n\
         Time by category:\n",
        summary.date,
        summary.focus_score,
        summary.raw_score,
        summary.deep_streak_max,
        summary.penalty,
        summary.productive_hours,
        summary.productive_blocks,
        summary.distract_hours,
        summary.distract_blocks,
        summary.neutral_blocks,
        summary.distract_ratio * 100.0,
        avg_focus,
    );

    for share in &analytics.categories {
        let name = categories
            .iter()
            .find(|c| c.code == share.category)
            .map(|c| format!("{} (weight {})", c.label, c.weight))
            .unwrap_or_else(|| share.category.clone());
        ctx.push_str(&format!(
            "- {}: {:.2} h ({:.1}%)\n",
            name, share.hours, share.percentage
        ));
    }

    ctx.push_str("\nProductivity by time of day (mean weight):\n");
    for p in &analytics.time_of_day {
        ctx.push_str(&format!("- {}: {:.1}\n", p.period, p.avg_weight));
    }

    ctx.push_str(&format!(
        "\nCategory switches: {}\n\
         Logged blocks: {}/80\n\
         \n\
         Analyze this person's day and give 3-5 concrete suggestions for \
         improving productivity, followed by a short summary of the day.\n",
        summary.context_switches, summary.total_filled
    ));
    ctx
}

/// LLM suggestions when a generator is available, rule-based otherwise.
pub async fn suggest_with_fallback<G: SuggestionGenerator>(
    generator: Option<&G>,
    summary: &DailySummary,
    context: &str,
) -> Suggestions {
    let Some(generator) = generator else {
        return format_suggestions(summary);
    };

    match generator.generate(context).await {
        Ok(g) => Suggestions {
            suggestions: g.suggestions,
            summary: g.summary,
            is_ai_generated: true,
        },
        Err(e) => {
            tracing::warn!(error = %e, date = %summary.date, "LLM unavailable, using rule-based suggestions");
            let mut fallback = format_suggestions(summary);
            fallback.summary.push_str(FALLBACK_NOTE);
            fallback
        }
    }
}
