use crate::domain::{GitInfo, SessionMeta};
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

pub const MAX_TITLE_CHARS: usize = 60;
const TITLE_ELLIPSIS: &str = "...";

/// Markers of prompts Codex injects on its own. A user message containing any
/// of them is not a usable title.
pub const BOILERPLATE_MARKERS: &[&str] = &[
    "<environment_context>",
    "</environment_context>",
    "# AGENTS.md instructions",
    "<INSTRUCTIONS>",
    "<user_instructions>",
    "<skills_instructions>",
    "## Skills",
];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

pub fn parse_session_meta_line(line: &str) -> Result<SessionMeta, ParseError> {
    let value: Value = serde_json::from_str(line)?;
    if value.get("type").and_then(Value::as_str) != Some("session_meta") {
        return Err(ParseError::MissingField("type=session_meta"));
    }
    let payload = value
        .get("payload")
        .ok_or(ParseError::MissingField("payload"))?;
    let id = payload
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or(ParseError::MissingField("payload.id"))?;

    let cwd = payload
        .get("cwd")
        .and_then(Value::as_str)
        .filter(|cwd| !cwd.is_empty())
        .map(PathBuf::from);
    let started_at_rfc3339 = payload
        .get("timestamp")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(SessionMeta {
        id: id.to_string(),
        cwd,
        started_at_rfc3339,
        git: payload.get("git").and_then(parse_git_info),
    })
}

fn parse_git_info(value: &Value) -> Option<GitInfo> {
    let object = value.as_object()?;
    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(|text| text.to_string())
    };
    Some(GitInfo {
        repository_url: field("repository_url"),
        branch: field("branch"),
        commit_hash: field("commit_hash"),
    })
}

/// Returns the joined `input_text` fragments of a user message record, or
/// `None` for any other record shape.
pub fn parse_user_message_text(line: &str) -> Result<Option<String>, ParseError> {
    let value: Value = serde_json::from_str(line)?;
    Ok(user_message_text(&value))
}

fn user_message_text(value: &Value) -> Option<String> {
    if value.get("type").and_then(Value::as_str) != Some("response_item") {
        return None;
    }
    let payload = value.get("payload")?;
    if payload.get("type").and_then(Value::as_str) != Some("message") {
        return None;
    }
    if payload.get("role").and_then(Value::as_str) != Some("user") {
        return None;
    }

    let fragments = payload
        .get("content")?
        .as_array()?
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("input_text"))
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>();
    if fragments.is_empty() {
        return None;
    }
    Some(fragments.join(" "))
}

pub fn is_boilerplate(text: &str) -> bool {
    BOILERPLATE_MARKERS.iter().any(|marker| text.contains(marker))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes a user message into a list title, or rejects it.
pub fn derive_title(text: &str) -> Option<String> {
    let normalized = collapse_whitespace(text.trim());
    if normalized.is_empty() || is_boilerplate(&normalized) {
        return None;
    }
    Some(truncate_title(&normalized))
}

pub fn truncate_title(text: &str) -> String {
    if text.chars().count() <= MAX_TITLE_CHARS {
        return text.to_string();
    }
    let keep = MAX_TITLE_CHARS - TITLE_ELLIPSIS.len();
    let mut out = text.chars().take(keep).collect::<String>();
    out.push_str(TITLE_ELLIPSIS);
    out
}

/// First usable title among the records after the `session_meta` line.
/// Lines that are not valid JSON are skipped.
pub fn find_title<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<String> {
    lines
        .into_iter()
        .filter_map(|line| parse_user_message_text(line).ok().flatten())
        .find_map(|text| derive_title(&text))
}
