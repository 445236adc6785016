use chrono::{NaiveDate, NaiveTime};
use serde_json::Value;

use super::{Confidence, ExtractedFields, PetMention};
use crate::types::{Recurrence, ReminderKind};

/// Parse the model's extraction reply into [`ExtractedFields`].
///
/// Lenient on purpose: the reply may be bare JSON, JSON inside a code
/// fence, or JSON with prose around it. Unknown or malformed individual
/// fields degrade to null rather than failing the whole parse; `None` is
/// returned only when no JSON object can be recovered at all.
pub fn parse_extraction(text: &str) -> Option<ExtractedFields> {
    let value = extract_json_object(text)?;

    Some(ExtractedFields {
        title: string_field(&value, "title"),
        description: string_field(&value, "description"),
        due_date: string_field(&value, "due_date")
            .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        due_time: string_field(&value, "due_time").and_then(|s| parse_time(&s)),
        kind: string_field(&value, "kind").and_then(|s| ReminderKind::parse(&s)),
        pet: string_field(&value, "pet").map(|s| {
            if s.eq_ignore_ascii_case("all") {
                PetMention::All
            } else {
                PetMention::Named(s)
            }
        }),
        recurrence: string_field(&value, "recurrence").and_then(|s| Recurrence::parse(&s)),
        confidence: string_field(&value, "confidence")
            .and_then(|s| Confidence::parse(&s))
            .unwrap_or_default(),
    })
}

/// Non-empty trimmed string at `key`; JSON null, absent, and "" all read
/// as None.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| !s.eq_ignore_ascii_case("null") && !s.eq_ignore_ascii_case("none"))
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

/// Pull the first JSON object out of the reply, tolerating code fences and
/// surrounding prose.
fn extract_json_object(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    // Fast path: the whole reply is the object.
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Strip a ```json ... ``` fence if present.
    let unfenced = if let Some(rest) = trimmed.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        rest.trim_start_matches(['\r', '\n'])
            .rsplit_once("```")
            .map(|(body, _)| body.trim())
            .unwrap_or(rest)
    } else {
        trimmed
    };
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        if value.is_object() {
            return Some(value);
        }
    }

    // Last resort: widest brace-delimited slice.
    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&unfenced[start..=end])
        .ok()
        .filter(|v| v.is_object())
}
