//! Conversational reminder engine for a pet-care assistant.
//!
//! Takes free-form chat turns ("remind me to give Rex his heartworm pill
//! tomorrow at 8am") and fills a reminder draft slot by slot across turns,
//! resolves user-local time expressions to absolute instants, validates the
//! result, and fans "all my pets" requests out into independent persisted
//! records. The surrounding chat orchestrator owns transport and routing;
//! it calls [`ReminderFlow::process`] once per classified turn and carries
//! the opaque continuation state between turns.

pub mod broadcast;
pub mod composer;
pub mod config;
pub mod db;
pub mod draft;
pub mod extract;
pub mod flow;
pub mod providers;
pub mod state;
pub mod time_utils;
pub mod traits;
pub mod types;
pub mod validator;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use draft::ReminderDraft;
pub use flow::{ReminderFlow, TurnResult};
pub use traits::{
    FieldExtractor, ModelProvider, NewReminder, PersistedReminder, Pet, PetCatalog, PetRef,
    ReminderStore, UserProfile,
};
pub use types::{Recurrence, ReminderKind, ReminderStatus};
