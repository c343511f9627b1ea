/// Resilient extraction of structured data from free-form LLM text.
///
/// Each extraction runs an ordered list of parse strategies and keeps the first one
/// that succeeds. Failures are logged and degrade to an empty result; nothing here
/// returns an error to the caller.
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::roadmap::RoadmapNode;

/// Why a single parse strategy rejected the text.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("no surrounding code fence")]
    NoCodeFence,

    #[error("no brace-delimited span")]
    NoBraceSpan,

    #[error("no numbered lines")]
    NoNumberedLines,
}

type ListStrategy = fn(&str) -> Result<Vec<String>, ExtractError>;
type TreeStrategy = fn(&str) -> Result<Map<String, Value>, ExtractError>;

const LIST_STRATEGIES: &[(&str, ListStrategy)] = &[
    ("json_array", parse_json_array),
    ("fenced_json_array", parse_fenced_json_array),
    ("numbered_lines", parse_numbered_lines),
];

const TREE_STRATEGIES: &[(&str, TreeStrategy)] = &[
    ("strict_object", parse_json_object),
    ("balanced_span", parse_balanced_span),
    ("greedy_span", parse_greedy_span),
];

/// The JSON stored under `"roadmap"` together with its typed tree.
///
/// `value` is what the LLM returned, untouched; `{}` when nothing usable was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRoadmap {
    pub value: Value,
    pub tree: RoadmapNode,
}

impl ExtractedRoadmap {
    fn empty() -> Self {
        Self {
            value: Value::Object(Map::new()),
            tree: RoadmapNode::empty(),
        }
    }

    fn from_value(value: Value) -> Self {
        let value = match value {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let tree = RoadmapNode::from_value(&value);
        Self { value, tree }
    }
}

/// Extract a list of course names.
///
/// Tries a JSON array of strings, then the same inside a Markdown code fence, then
/// `N. item` numbered lines. `None` yields an empty list.
pub fn extract_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match first_success(LIST_STRATEGIES, raw) {
        Some((strategy, items)) => {
            debug!(strategy, items = items.len(), "list extracted");
            items
        }
        None => {
            warn!(len = raw.len(), "no course names found in related-course response");
            Vec::new()
        }
    }
}

/// Extract the roadmap tree stored under the top-level `"roadmap"` key.
///
/// Tries the whole text as a JSON object, then the first balanced `{...}` span, then
/// the span from the first `{` to the last `}`. A document that parses but lacks the
/// key yields an empty roadmap, as does text with no parsable JSON object at all.
pub fn extract_tree(raw: Option<&str>) -> ExtractedRoadmap {
    let Some(raw) = raw else {
        return ExtractedRoadmap::empty();
    };
    let Some((strategy, mut document)) = first_success(TREE_STRATEGIES, raw) else {
        warn!(len = raw.len(), "no JSON object found in roadmap response, using empty roadmap");
        return ExtractedRoadmap::empty();
    };
    let Some(value) = document.remove("roadmap") else {
        warn!(strategy, "JSON document has no \"roadmap\" key, using empty roadmap");
        return ExtractedRoadmap::empty();
    };

    let extracted = ExtractedRoadmap::from_value(value);
    if extracted.tree.is_empty() {
        warn!(strategy, "roadmap has no usable entries");
    } else {
        debug!(strategy, "roadmap extracted");
    }
    extracted
}

fn first_success<T>(
    strategies: &[(&'static str, fn(&str) -> Result<T, ExtractError>)],
    raw: &str,
) -> Option<(&'static str, T)> {
    for &(name, strategy) in strategies {
        match strategy(raw) {
            Ok(value) => return Some((name, value)),
            Err(e) => debug!(strategy = name, error = %e, "extraction strategy rejected input"),
        }
    }
    None
}

fn parse_json_array(text: &str) -> Result<Vec<String>, ExtractError> {
    Ok(serde_json::from_str(text)?)
}

fn parse_fenced_json_array(text: &str) -> Result<Vec<String>, ExtractError> {
    let inner = strip_code_fence(text).ok_or(ExtractError::NoCodeFence)?;
    parse_json_array(inner)
}

/// Collects `content` from every line shaped like `12. content`.
fn parse_numbered_lines(text: &str) -> Result<Vec<String>, ExtractError> {
    static NUMBERED: OnceLock<Regex> = OnceLock::new();
    let re = NUMBERED.get_or_init(|| Regex::new(r"^\d+\. (.+)").expect("valid regex"));

    let items: Vec<String> = text
        .trim()
        .lines()
        .filter_map(|line| re.captures(line.trim()))
        .map(|caps| caps[1].trim().to_string())
        .collect();
    if items.is_empty() {
        return Err(ExtractError::NoNumberedLines);
    }
    Ok(items)
}

fn parse_json_object(text: &str) -> Result<Map<String, Value>, ExtractError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        _ => Err(ExtractError::NotAnObject),
    }
}

fn parse_balanced_span(text: &str) -> Result<Map<String, Value>, ExtractError> {
    let span = balanced_brace_span(text).ok_or(ExtractError::NoBraceSpan)?;
    parse_json_object(span)
}

/// Parses the span from the first `{` to the last `}`.
fn parse_greedy_span(text: &str) -> Result<Map<String, Value>, ExtractError> {
    static BRACES: OnceLock<Regex> = OnceLock::new();
    let re = BRACES.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

    let span = re.find(text).ok_or(ExtractError::NoBraceSpan)?;
    parse_json_object(span.as_str())
}

/// From the first `{` to the `}` that closes it. Braces inside JSON strings don't count.
fn balanced_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let body = &text[start..];
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in body.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&body[..=idx]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Body of a ```` ```json ... ``` ```` or ```` ``` ... ``` ```` block.
fn strip_code_fence(text: &str) -> Option<&str> {
    let text = text.trim();
    let body = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))?;
    Some(body.trim_start().strip_suffix("```").unwrap_or(body).trim())
}
