use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::ResolvedFields;
use crate::traits::PetRef;
use crate::types::{Recurrence, ReminderKind};

/// A slot the conversation still has to fill before the reminder can be
/// created. Only these three are ever required; kind, description and
/// recurrence default silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Title,
    DueAt,
    Pet,
}

/// Accumulated reminder fields for one in-progress conversation.
///
/// Owned by the turn handler while a turn runs, then serialized back to the
/// caller as opaque continuation state. Mutated only through [`merge`] and
/// the validator; `missing_fields` and `validation_errors` are recomputed
/// wholesale each turn, never edited in place.
///
/// [`merge`]: ReminderDraft::merge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReminderDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    pub kind: Option<ReminderKind>,
    pub pet_ref: Option<PetRef>,
    pub pet_display_name: Option<String>,
    pub recurrence: Option<Recurrence>,
    #[serde(default)]
    pub missing_fields: Vec<FieldName>,
    #[serde(default)]
    pub validation_errors: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_record_id: Option<String>,
    /// Turns spent in this flow so far, for the abandonment bound.
    #[serde(default)]
    pub turns: u32,
}

impl ReminderDraft {
    /// Overlay this turn's extraction onto the accumulated draft. A present
    /// field overwrites; an absent field never clears what a prior turn
    /// established.
    pub fn merge(&mut self, resolved: ResolvedFields) {
        if let Some(title) = resolved.title {
            self.title = Some(title);
        }
        if let Some(description) = resolved.description {
            self.description = Some(description);
        }
        if let Some(due_at) = resolved.due_at {
            self.due_at = Some(due_at);
        }
        if let Some(kind) = resolved.kind {
            self.kind = Some(kind);
        }
        if let Some(pet_ref) = resolved.pet_ref {
            self.pet_display_name = resolved.pet_display_name;
            self.pet_ref = Some(pet_ref);
        }
        if let Some(recurrence) = resolved.recurrence {
            self.recurrence = Some(recurrence);
        }
    }

    /// Recompute which required slots are still open. `pet` is only a
    /// required slot when the catalog offers a real choice (more than one
    /// pet) and no turn has picked one.
    pub fn recompute_missing(&mut self, catalog_len: usize) {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push(FieldName::Title);
        }
        if self.due_at.is_none() {
            missing.push(FieldName::DueAt);
        }
        if catalog_len > 1 && self.pet_ref.is_none() {
            missing.push(FieldName::Pet);
        }
        self.missing_fields = missing;
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }

    /// Effective kind at creation time; unspecified defaults to `Other`.
    pub fn kind_or_default(&self) -> ReminderKind {
        self.kind.unwrap_or_default()
    }

    /// Effective recurrence at creation time; unspecified defaults to `Once`.
    pub fn recurrence_or_default(&self) -> Recurrence {
        self.recurrence.unwrap_or_default()
    }
}
