//! Response parser - extracts `{id, score}` records from free-form model output.
//!
//! Models wrap their JSON in markdown fences, stop mid-array when they hit the
//! output limit, or emit almost-JSON. Extraction is staged, and each stage is
//! only tried when the previous one failed:
//!
//! 1. **Strict** - parse the bracketed candidate as a JSON array.
//! 2. **Repaired** - drop trailing commas and close the array; failing that,
//!    cut back to the last complete object and close it there.
//! 3. **Pattern rescue** - regex-scan for complete `{"id":"..","score":N}`
//!    records anywhere in the text.
//!
//! Parsing never fails. A review missing from the result is the failure signal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::review::ScoreMap;

static RECORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\{\s*"id"\s*:\s*"([^"\\]+)"\s*,\s*"score"\s*:\s*(-?\d+)\s*\}"#)
        .expect("record pattern is a valid regex")
});

/// Which extraction stage produced the scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStage {
    Strict,
    Repaired,
    PatternRescue,
    /// Nothing recoverable was found.
    Empty,
}

impl ParseStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseStage::Strict => "strict",
            ParseStage::Repaired => "repaired",
            ParseStage::PatternRescue => "pattern_rescue",
            ParseStage::Empty => "empty",
        }
    }
}

/// Scores plus the stage that recovered them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub scores: ScoreMap,
    pub stage: ParseStage,
}

impl ParseOutcome {
    fn new(scores: ScoreMap, stage: ParseStage) -> Self {
        Self { scores, stage }
    }

    fn empty() -> Self {
        Self::new(ScoreMap::new(), ParseStage::Empty)
    }
}

/// Extracts a score map from raw model output.
pub fn parse(raw: &str) -> ScoreMap {
    parse_detailed(raw).scores
}

/// Extracts a score map and reports which stage succeeded.
pub fn parse_detailed(raw: &str) -> ParseOutcome {
    let text = strip_code_fence(raw);

    let Some(candidate) = locate_array(text) else {
        return ParseOutcome::empty();
    };

    if let Some(scores) = parse_strict(candidate) {
        return ParseOutcome::new(scores, ParseStage::Strict);
    }

    if let Some(scores) = repair(candidate) {
        return ParseOutcome::new(scores, ParseStage::Repaired);
    }

    let rescued = rescue_records(text);
    if rescued.is_empty() {
        ParseOutcome::empty()
    } else {
        ParseOutcome::new(rescued, ParseStage::PatternRescue)
    }
}

/// Removes a surrounding markdown fence (with optional info string) and whitespace.
fn strip_code_fence(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }

    let text = text.trim_end();
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// First `[` through the last `]`; through end of text when the array was cut off.
fn locate_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    match text.rfind(']') {
        Some(end) if end > start => Some(&text[start..=end]),
        _ => Some(&text[start..]),
    }
}

fn parse_strict(candidate: &str) -> Option<ScoreMap> {
    match serde_json::from_str::<Value>(candidate).ok()? {
        Value::Array(entries) => Some(entries.iter().filter_map(score_entry).collect()),
        _ => None,
    }
}

fn repair(candidate: &str) -> Option<ScoreMap> {
    let trimmed = trim_trailing_commas(candidate);

    let closed = if trimmed.ends_with(']') {
        trimmed.to_string()
    } else {
        format!("{trimmed}]")
    };
    if let Some(scores) = parse_strict(&closed) {
        return Some(scores);
    }

    // Keep every record up to the last complete object.
    let last_object = trimmed.rfind('}')?;
    let partial = format!("{}]", trim_trailing_commas(&trimmed[..=last_object]));
    parse_strict(&partial)
}

fn trim_trailing_commas(text: &str) -> &str {
    text.trim_end_matches(|c: char| c == ',' || c.is_whitespace())
}

fn rescue_records(text: &str) -> ScoreMap {
    RECORD_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let id = caps.get(1)?.as_str().trim();
            let score = caps.get(2)?.as_str().parse::<i64>().ok()?;
            (!id.is_empty()).then(|| (id.to_string(), score))
        })
        .collect()
}

fn score_entry(entry: &Value) -> Option<(String, i64)> {
    let object = entry.as_object()?;
    let id = coerce_id(object.get("id")?)?;
    let score = coerce_score(object.get("score")?)?;
    Some((id, score))
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => {
            let id = id.trim();
            (!id.is_empty()).then(|| id.to_string())
        }
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Integers pass through, floats truncate toward zero, numeric strings are parsed.
fn coerce_score(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(truncate_float)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(truncate_float))
        }
        _ => None,
    }
}

fn truncate_float(value: f64) -> Option<i64> {
    value.is_finite().then(|| value.trunc() as i64)
}
