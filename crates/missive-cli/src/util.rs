use crate::error::invalid_input;
use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use missive_core::domain::{ContactId, TemplateId};
use std::str::FromStr;

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn format_timestamp_datetime(ts: i64) -> String {
    match DateTime::<Utc>::from_timestamp(ts, 0) {
        Some(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        None => ts.to_string(),
    }
}

pub fn parse_contact_id(raw: &str) -> Result<ContactId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("contact id cannot be empty"));
    }
    ContactId::from_str(trimmed).map_err(|_| invalid_input(format!("invalid contact id: {trimmed}")))
}

pub fn parse_template_id(raw: &str) -> Result<TemplateId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid_input("template id cannot be empty"));
    }
    TemplateId::from_str(trimmed).map_err(|_| invalid_input(format!("invalid template id: {trimmed}")))
}

/// Single-line rendering of a multi-line message for list output.
pub fn one_line(text: &str, max_chars: usize) -> String {
    let flat: String = text
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect();
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
