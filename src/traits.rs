use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::extract::ExtractedFields;
use crate::types::{Recurrence, ReminderKind, ReminderStatus};

mod provider;
pub use provider::*;

/// A schedulable pet from the user's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
}

/// Which pet(s) a reminder is for. `All` is only ever produced when the
/// user's message explicitly says all/both/every; no mention stays `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum PetRef {
    All,
    Pet { id: String },
}

/// Read-only lookup of the user's schedulable pets.
#[async_trait]
pub trait PetCatalog: Send + Sync {
    async fn pets_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Pet>>;
}

/// User-profile lookup, narrowed to what this subsystem needs. An error or
/// an unparseable zone id degrades to UTC at the call site.
#[async_trait]
pub trait UserProfile: Send + Sync {
    /// IANA timezone identifier, e.g. "America/New_York".
    async fn timezone(&self, user_id: &str) -> anyhow::Result<String>;
}

/// Black-box field extraction over the current turn's message only. The
/// flow enforces the output contract itself (see `extract::sanitize`);
/// implementations are not trusted to follow it.
#[async_trait]
pub trait FieldExtractor: Send + Sync {
    async fn extract(
        &self,
        message: &str,
        pets: &[Pet],
        now_local: NaiveDateTime,
        tz: Tz,
    ) -> anyhow::Result<ExtractedFields>;
}

/// Input to a single reminder creation. One of these per broadcast target.
#[derive(Debug, Clone)]
pub struct NewReminder {
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_at: DateTime<Utc>,
    pub kind: ReminderKind,
    pub recurrence: Recurrence,
    pub pet_id: Option<String>,
}

/// A durable reminder record, as later read by the delivery scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedReminder {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_at: DateTime<Utc>,
    pub recurrence: Recurrence,
    pub kind: ReminderKind,
    pub pet_id: Option<String>,
    pub status: ReminderStatus,
    pub created_at: DateTime<Utc>,
    pub source: String,
}

/// Durable reminder persistence. `create_reminder` must be safe to call
/// once per logical reminder; partial-failure handling across a broadcast
/// lives in the caller, never here.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    async fn create_reminder(&self, new: &NewReminder) -> anyhow::Result<PersistedReminder>;
}
