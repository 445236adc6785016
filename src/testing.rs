//! Scripted collaborator doubles for flow and broadcast tests.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::extract::ExtractedFields;
use crate::traits::{
    FieldExtractor, NewReminder, PersistedReminder, Pet, PetCatalog, ReminderStore, UserProfile,
};
use crate::types::ReminderStatus;

pub fn make_pets(names: &[&str]) -> Vec<Pet> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Pet {
            id: format!("pet-{}", i + 1),
            name: name.to_string(),
            species: None,
        })
        .collect()
}

/// Catalog with a fixed pet list; counts lookups so tests can assert the
/// per-conversation cache.
pub struct FixedCatalog {
    pets: Vec<Pet>,
    pub calls: AtomicUsize,
}

impl FixedCatalog {
    pub fn new(pets: Vec<Pet>) -> Self {
        Self {
            pets,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PetCatalog for FixedCatalog {
    async fn pets_for_user(&self, _user_id: &str) -> anyhow::Result<Vec<Pet>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.pets.clone())
    }
}

pub struct FixedProfile(pub String);

#[async_trait]
impl UserProfile for FixedProfile {
    async fn timezone(&self, _user_id: &str) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}

pub struct FailingProfile;

#[async_trait]
impl UserProfile for FailingProfile {
    async fn timezone(&self, _user_id: &str) -> anyhow::Result<String> {
        anyhow::bail!("profile service unavailable")
    }
}

/// Pops one scripted result per turn; returns empty fields once the script
/// runs out.
pub struct ScriptedExtractor {
    script: StdMutex<VecDeque<anyhow::Result<ExtractedFields>>>,
}

impl ScriptedExtractor {
    pub fn new(steps: Vec<anyhow::Result<ExtractedFields>>) -> Self {
        Self {
            script: StdMutex::new(steps.into()),
        }
    }
}

#[async_trait]
impl FieldExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        _message: &str,
        _pets: &[Pet],
        _now_local: NaiveDateTime,
        _tz: Tz,
    ) -> anyhow::Result<ExtractedFields> {
        let next = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        next.unwrap_or_else(|| Ok(ExtractedFields::default()))
    }
}

/// Never answers inside any sane timeout.
pub struct SlowExtractor;

#[async_trait]
impl FieldExtractor for SlowExtractor {
    async fn extract(
        &self,
        _message: &str,
        _pets: &[Pet],
        _now_local: NaiveDateTime,
        _tz: Tz,
    ) -> anyhow::Result<ExtractedFields> {
        tokio::time::sleep(std::time::Duration::from_secs(300)).await;
        Ok(ExtractedFields::default())
    }
}

pub fn persisted_from(new: &NewReminder) -> PersistedReminder {
    PersistedReminder {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: new.user_id.clone(),
        title: new.title.clone(),
        description: new.description.clone(),
        due_at: new.due_at,
        recurrence: new.recurrence,
        kind: new.kind,
        pet_id: new.pet_id.clone(),
        status: ReminderStatus::Pending,
        created_at: Utc::now(),
        source: "conversational".to_string(),
    }
}

/// Accepts every create and remembers what it was asked to write.
#[derive(Default)]
pub struct RecordingStore {
    created: StdMutex<Vec<NewReminder>>,
}

impl RecordingStore {
    pub fn created(&self) -> Vec<NewReminder> {
        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ReminderStore for RecordingStore {
    async fn create_reminder(&self, new: &NewReminder) -> anyhow::Result<PersistedReminder> {
        self.created
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(new.clone());
        Ok(persisted_from(new))
    }
}

/// Fails creates for a chosen set of pet ids, records the rest.
pub struct FlakyStore {
    fail_pet_ids: HashSet<String>,
    inner: RecordingStore,
}

impl FlakyStore {
    pub fn failing_for(pet_ids: &[&str]) -> Self {
        Self {
            fail_pet_ids: pet_ids.iter().map(|s| s.to_string()).collect(),
            inner: RecordingStore::default(),
        }
    }

    pub fn created(&self) -> Vec<NewReminder> {
        self.inner.created()
    }
}

#[async_trait]
impl ReminderStore for FlakyStore {
    async fn create_reminder(&self, new: &NewReminder) -> anyhow::Result<PersistedReminder> {
        if let Some(pet_id) = &new.pet_id {
            if self.fail_pet_ids.contains(pet_id) {
                anyhow::bail!("simulated write failure for {}", pet_id);
            }
        }
        self.inner.create_reminder(new).await
    }
}

/// Rejects every create.
pub struct FailingStore;

#[async_trait]
impl ReminderStore for FailingStore {
    async fn create_reminder(&self, _new: &NewReminder) -> anyhow::Result<PersistedReminder> {
        anyhow::bail!("database unavailable")
    }
}
