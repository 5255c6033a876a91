//! Structural acceptance test for model output, plus normalization of the
//! heterogeneous chord representation.
//!
//! The model is asked for `{chords, insights, numerals}` but in practice
//! returns chords either as plain strings or as objects like
//! `{"name": "Am7", "notation": "..."}`. Validation checks the structural
//! contract; normalization collapses every accepted entry to one canonical
//! string so downstream code sees a single shape. `numerals` is requested
//! but not validated.

use serde::Deserialize;
use serde_json::Value;

use crate::contract;

/// Validation outcome. Never an error: on reject the caller routes to the
/// fallback path; there is no repair or partial-accept mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(&'static str),
}

/// Accept iff `chords` is an array of at least [`contract::MIN_CHORDS`]
/// entries, each a string or an object carrying a string `name`, and
/// `insights` is an array of at least [`contract::MIN_INSIGHTS`] strings of
/// at least [`contract::MIN_INSIGHT_CHARS`] characters each.
pub fn validate(response: &Value) -> Verdict {
    let Some(chords) = response.get("chords").and_then(Value::as_array) else {
        return Verdict::Reject("chords missing or not an array");
    };
    if chords.len() < contract::MIN_CHORDS {
        return Verdict::Reject("too few chords");
    }
    if !chords.iter().all(is_usable_chord_entry) {
        return Verdict::Reject("chord entry is neither a string nor an object with a name");
    }

    let Some(insights) = response.get("insights").and_then(Value::as_array) else {
        return Verdict::Reject("insights missing or not an array");
    };
    if insights.len() < contract::MIN_INSIGHTS {
        return Verdict::Reject("too few insights");
    }
    let all_substantial = insights.iter().all(|entry| {
        entry
            .as_str()
            .map(|s| s.chars().count() >= contract::MIN_INSIGHT_CHARS)
            .unwrap_or(false)
    });
    if !all_substantial {
        return Verdict::Reject("insight too short or not a string");
    }

    Verdict::Accept
}

/// One chord entry as the model may return it: a bare symbol string, or an
/// object with a `name` and/or alternative `notation`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChordEntry {
    Symbol(String),
    Object {
        name: Option<String>,
        notation: Option<String>,
    },
}

impl ChordEntry {
    fn into_name(self) -> Option<String> {
        let name = match self {
            ChordEntry::Symbol(s) => s,
            ChordEntry::Object { name, notation } => name.or(notation)?,
        };
        let trimmed = name.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

fn is_usable_chord_entry(entry: &Value) -> bool {
    entry.is_string()
        || entry
            .get("name")
            .map(|name| name.is_string())
            .unwrap_or(false)
}

/// Collapse accepted chord entries to canonical strings. Entries that
/// still fail to yield a name (possible only on unvalidated input) are
/// dropped rather than invented.
pub fn normalize_chords(chords: &[Value]) -> Vec<String> {
    chords
        .iter()
        .filter_map(|entry| {
            serde_json::from_value::<ChordEntry>(entry.clone())
                .ok()
                .and_then(ChordEntry::into_name)
        })
        .collect()
}
