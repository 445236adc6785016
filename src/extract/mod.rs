//! Field extraction contract enforcement.
//!
//! The model behind [`crate::traits::FieldExtractor`] is a black box; this
//! module is where its output stops being trusted. [`sanitize_and_resolve`]
//! drops any field the current turn's raw text cannot support (a title with
//! no actionable phrase, a due date with no temporal expression, a pet the
//! message never names) and converts surviving date/time components into an
//! absolute instant.

mod llm;
mod parse;
mod prompt;

pub use llm::LlmFieldExtractor;
pub use parse::parse_extraction;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::time_utils;
use crate::traits::{Pet, PetRef};
use crate::types::{Recurrence, ReminderKind};

/// How sure the extractor says it is. Logged for operators; never changes
/// control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Confidence {
    High,
    Medium,
    #[default]
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Confidence::High),
            "medium" => Some(Confidence::Medium),
            "low" => Some(Confidence::Low),
            _ => None,
        }
    }
}

/// Pet reference as the extractor reports it, before catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetMention {
    All,
    Named(String),
}

/// Raw candidate fields for one turn, every one independently nullable.
/// Date and time stay separate components here so the resolution rules
/// (bare time, date-only default) run in code rather than in the model.
#[derive(Debug, Clone, Default)]
pub struct ExtractedFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub kind: Option<ReminderKind>,
    pub pet: Option<PetMention>,
    pub recurrence: Option<Recurrence>,
    pub confidence: Confidence,
}

/// Contract-checked, resolved fields ready to merge into the draft.
#[derive(Debug, Clone, Default)]
pub struct ResolvedFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub kind: Option<ReminderKind>,
    pub pet_ref: Option<PetRef>,
    pub pet_display_name: Option<String>,
    pub recurrence: Option<Recurrence>,
}

/// Enforce the extraction contract against the raw message, then resolve
/// date/time components to an absolute instant in the user's zone.
pub fn sanitize_and_resolve(
    message: &str,
    pets: &[Pet],
    fields: ExtractedFields,
    now_local: NaiveDateTime,
    tz: Tz,
) -> ResolvedFields {
    let pet_names: Vec<String> = pets.iter().map(|p| p.name.clone()).collect();

    let title = match fields.title {
        Some(t) if time_utils::has_actionable_content(message, &pet_names) => Some(t),
        Some(t) => {
            debug!(dropped_title = %t, "Message has no actionable phrase, dropping extracted title");
            None
        }
        None => None,
    };

    let (due_date, due_time) = if time_utils::mentions_time(message) {
        (fields.due_date, fields.due_time)
    } else {
        if fields.due_date.is_some() || fields.due_time.is_some() {
            debug!("Message has no temporal expression, dropping extracted date/time");
        }
        (None, None)
    };
    let due_at = time_utils::resolve_due(due_date, due_time, now_local, tz);

    let (pet_ref, pet_display_name) = match fields.pet {
        Some(PetMention::All) => {
            if time_utils::mentions_all_pets(message) {
                (Some(PetRef::All), None)
            } else {
                debug!("Extractor claimed all pets but message has no all/both phrasing");
                (None, None)
            }
        }
        Some(PetMention::Named(named)) => resolve_named_pet(message, pets, &named),
        None => (None, None),
    };

    ResolvedFields {
        title,
        description: fields
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        due_at,
        kind: fields.kind,
        pet_ref,
        pet_display_name,
        recurrence: fields.recurrence,
    }
}

/// A named pet is only accepted when it is a real catalog entry and the
/// message itself mentions that name.
fn resolve_named_pet(
    message: &str,
    pets: &[Pet],
    named: &str,
) -> (Option<PetRef>, Option<String>) {
    let matched = pets
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(named.trim()));
    match matched {
        Some(pet) if time_utils::contains_as_words(message, &pet.name) => (
            Some(PetRef::Pet { id: pet.id.clone() }),
            Some(pet.name.clone()),
        ),
        Some(pet) => {
            warn!(pet = %pet.name, "Extractor named a pet the message does not mention, ignoring");
            (None, None)
        }
        None => {
            warn!(named = %named, "Extractor named a pet that is not in the catalog, ignoring");
            (None, None)
        }
    }
}
