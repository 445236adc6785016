use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use crate::draft::ReminderDraft;
use crate::traits::{NewReminder, Pet, PetRef, ReminderStore};

/// One concrete creation target. `pet` is `None` for a pet-agnostic
/// reminder.
#[derive(Debug, Clone)]
pub struct Target {
    pub pet: Option<Pet>,
}

impl Target {
    pub fn display_name(&self) -> Option<&str> {
        self.pet.as_ref().map(|p| p.name.as_str())
    }
}

/// A record that made it into the store.
#[derive(Debug, Clone)]
pub struct CreatedRecord {
    pub record_id: String,
    pub pet_name: Option<String>,
}

/// A target whose creation call failed. Kept separate from the successes;
/// the operation is never retried or rolled back on its behalf.
#[derive(Debug, Clone)]
pub struct FailedTarget {
    pub pet_name: Option<String>,
    pub error: String,
}

/// Collected results of a fan-out. K-of-N success is partial success.
#[derive(Debug, Clone, Default)]
pub struct BroadcastOutcome {
    pub created: Vec<CreatedRecord>,
    pub failed: Vec<FailedTarget>,
}

impl BroadcastOutcome {
    pub fn any_created(&self) -> bool {
        !self.created.is_empty()
    }

    pub fn all_created(&self) -> bool {
        self.failed.is_empty() && !self.created.is_empty()
    }
}

/// Map the draft's pet reference onto concrete creation targets. `All`
/// fans out to every catalog pet; a single id picks that pet; no reference
/// is one pet-agnostic target. The resolver never guesses a pet.
pub fn resolve_targets(pet_ref: Option<&PetRef>, catalog: &[Pet]) -> Vec<Target> {
    match pet_ref {
        Some(PetRef::All) => catalog
            .iter()
            .map(|p| Target {
                pet: Some(p.clone()),
            })
            .collect(),
        Some(PetRef::Pet { id }) => {
            let pet = catalog.iter().find(|p| &p.id == id).cloned();
            if pet.is_none() {
                warn!(pet_id = %id, "Draft references a pet no longer in the catalog, creating without one");
            }
            vec![Target { pet }]
        }
        None => vec![Target { pet: None }],
    }
}

/// Issue one creation call per target, concurrently and independently,
/// each under its own timeout. Failures are isolated: they never abort,
/// retry, or roll back the sibling calls.
pub async fn broadcast_create(
    store: Arc<dyn ReminderStore>,
    user_id: &str,
    draft: &ReminderDraft,
    targets: Vec<Target>,
    create_timeout: Duration,
) -> BroadcastOutcome {
    let title = draft.title.clone().unwrap_or_default();
    let calls = targets.into_iter().map(|target| {
        let store = Arc::clone(&store);
        let new = NewReminder {
            user_id: user_id.to_string(),
            title: title.clone(),
            description: draft.description.clone(),
            due_at: draft.due_at.unwrap_or_default(),
            kind: draft.kind_or_default(),
            recurrence: draft.recurrence_or_default(),
            pet_id: target.pet.as_ref().map(|p| p.id.clone()),
        };
        async move {
            let result = tokio::time::timeout(create_timeout, store.create_reminder(&new)).await;
            let pet_name = target.display_name().map(|s| s.to_string());
            match result {
                Ok(Ok(record)) => {
                    info!(record_id = %record.id, pet = ?pet_name, "Reminder created");
                    Ok(CreatedRecord {
                        record_id: record.id,
                        pet_name,
                    })
                }
                Ok(Err(e)) => {
                    warn!(pet = ?pet_name, "Reminder creation failed: {}", e);
                    Err(FailedTarget {
                        pet_name,
                        error: e.to_string(),
                    })
                }
                Err(_) => {
                    warn!(pet = ?pet_name, "Reminder creation timed out");
                    Err(FailedTarget {
                        pet_name,
                        error: "creation timed out".to_string(),
                    })
                }
            }
        }
    });

    let mut outcome = BroadcastOutcome::default();
    for result in join_all(calls).await {
        match result {
            Ok(created) => outcome.created.push(created),
            Err(failed) => outcome.failed.push(failed),
        }
    }
    outcome
}
