use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::broadcast::{broadcast_create, resolve_targets};
use crate::composer::{compose, TurnOutcome};
use crate::config::FlowConfig;
use crate::draft::ReminderDraft;
use crate::extract::{sanitize_and_resolve, ExtractedFields};
use crate::time_utils;
use crate::traits::{FieldExtractor, Pet, PetCatalog, ReminderStore, UserProfile};
use crate::validator::validate;

/// What the orchestrator gets back from one turn. `continuation_state` is
/// the opaque serialized draft; its absence means the flow is finished and
/// subsequent turns should not be routed here.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub response_text: String,
    pub continuation_state: Option<String>,
    pub completed: bool,
}

/// The per-turn engine: catalog lookup, extraction, merge, validation,
/// fan-out, response composition.
///
/// Turns for the same conversation are serialized on a per-conversation
/// lock; turns for different conversations run concurrently and share
/// nothing mutable beyond the read-only catalog cache.
pub struct ReminderFlow {
    catalog: Arc<dyn PetCatalog>,
    extractor: Arc<dyn FieldExtractor>,
    store: Arc<dyn ReminderStore>,
    profile: Arc<dyn UserProfile>,
    config: FlowConfig,
    turn_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
    catalog_cache: RwLock<HashMap<String, Arc<Vec<Pet>>>>,
}

impl ReminderFlow {
    pub fn new(
        catalog: Arc<dyn PetCatalog>,
        extractor: Arc<dyn FieldExtractor>,
        store: Arc<dyn ReminderStore>,
        profile: Arc<dyn UserProfile>,
        config: FlowConfig,
    ) -> Self {
        Self {
            catalog,
            extractor,
            store,
            profile,
            config,
            turn_locks: StdMutex::new(HashMap::new()),
            catalog_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Handle one classified turn. Never errors outward: an unexpected
    /// internal fault degrades to a generic try-again response with the
    /// prior continuation state returned untouched.
    pub async fn process(
        &self,
        user_id: &str,
        conversation_id: &str,
        message: &str,
        prior_state: Option<&str>,
    ) -> TurnResult {
        let lock = self.conversation_lock(conversation_id);
        let _guard = lock.lock().await;

        let draft = match prior_state {
            Some(raw) => match serde_json::from_str::<ReminderDraft>(raw) {
                Ok(draft) => draft,
                Err(e) => {
                    warn!(conversation_id = %conversation_id, "Discarding unparseable continuation state: {}", e);
                    ReminderDraft::default()
                }
            },
            None => ReminderDraft::default(),
        };

        match self.run_turn(user_id, conversation_id, message, draft).await {
            Ok((outcome, continuation)) => {
                let finished = continuation.is_none();
                if finished {
                    self.forget_conversation(conversation_id).await;
                }
                let completed = matches!(outcome, TurnOutcome::Created { .. });
                let continuation_state = continuation
                    .as_ref()
                    .and_then(|draft| match serde_json::to_string(draft) {
                        Ok(json) => Some(json),
                        Err(e) => {
                            error!("Failed to serialize continuation state: {}", e);
                            None
                        }
                    });
                TurnResult {
                    response_text: compose(&outcome),
                    continuation_state,
                    completed,
                }
            }
            Err(e) => {
                error!(conversation_id = %conversation_id, "Turn failed: {:#}", e);
                // Hand the prior state back untouched; a failed turn must
                // not lose what earlier turns accumulated.
                TurnResult {
                    response_text: compose(&TurnOutcome::Failed),
                    continuation_state: prior_state.map(String::from),
                    completed: false,
                }
            }
        }
    }

    /// One pass through the slot-filling machine:
    /// COLLECTING -> VALIDATING -> RESOLVING -> CREATING -> COMPLETE,
    /// exiting early back to COLLECTING whenever slots are open or
    /// validation rejects.
    async fn run_turn(
        &self,
        user_id: &str,
        conversation_id: &str,
        message: &str,
        mut draft: ReminderDraft,
    ) -> anyhow::Result<(TurnOutcome, Option<ReminderDraft>)> {
        let tz = self.user_timezone(user_id).await;
        let pets = self.pets_cached(user_id, conversation_id).await?;

        let now = Utc::now();
        let now_local = now.with_timezone(&tz).naive_local();

        let extracted = self.extract_bounded(message, &pets, now_local, tz).await;
        let resolved = sanitize_and_resolve(message, &pets, extracted, now_local, tz);

        draft.merge(resolved);
        draft.turns += 1;
        draft.recompute_missing(pets.len());
        debug!(
            user_id = %user_id,
            turns = draft.turns,
            missing = ?draft.missing_fields,
            "Turn merged"
        );

        if !draft.is_complete() {
            if draft.turns >= self.config.max_turns {
                info!(conversation_id = %conversation_id, turns = draft.turns, "Giving up on reminder flow");
                return Ok((TurnOutcome::Abandoned, None));
            }
            let outcome = TurnOutcome::NeedsFields {
                missing: draft.missing_fields.clone(),
                pet_names: pets.iter().map(|p| p.name.clone()).collect(),
            };
            return Ok((outcome, Some(draft)));
        }

        draft.validation_errors = validate(&draft, now);
        if !draft.validation_errors.is_empty() {
            if draft.turns >= self.config.max_turns {
                info!(conversation_id = %conversation_id, turns = draft.turns, "Giving up on reminder flow");
                return Ok((TurnOutcome::Abandoned, None));
            }
            let outcome = TurnOutcome::Invalid {
                errors: draft.validation_errors.clone(),
            };
            return Ok((outcome, Some(draft)));
        }

        let targets = resolve_targets(draft.pet_ref.as_ref(), &pets);
        let outcome = broadcast_create(
            Arc::clone(&self.store),
            user_id,
            &draft,
            targets,
            Duration::from_secs(self.config.create_timeout_secs),
        )
        .await;

        if !outcome.any_created() {
            warn!(conversation_id = %conversation_id, "No reminder could be persisted this turn");
            return Ok((TurnOutcome::StoreFailed, Some(draft)));
        }

        draft.completed = true;
        draft.created_record_id = outcome.created.first().map(|c| c.record_id.clone());
        info!(
            user_id = %user_id,
            created = outcome.created.len(),
            failed = outcome.failed.len(),
            "Reminder flow complete"
        );

        let outcome = TurnOutcome::Created {
            title: draft.title.clone().unwrap_or_default(),
            due_at: draft.due_at.unwrap_or(now),
            tz,
            created: outcome.created,
            failed: outcome.failed,
        };
        Ok((outcome, None))
    }

    /// Extraction under a bounded timeout. Any failure — transport error,
    /// unparseable reply, timeout — degrades to "nothing extracted this
    /// turn" so the flow can fall back to asking for the open slots.
    async fn extract_bounded(
        &self,
        message: &str,
        pets: &[Pet],
        now_local: chrono::NaiveDateTime,
        tz: Tz,
    ) -> ExtractedFields {
        let timeout = Duration::from_secs(self.config.extract_timeout_secs);
        match tokio::time::timeout(timeout, self.extractor.extract(message, pets, now_local, tz))
            .await
        {
            Ok(Ok(fields)) => fields,
            Ok(Err(e)) => {
                warn!("Field extraction failed, treating as empty: {:#}", e);
                ExtractedFields::default()
            }
            Err(_) => {
                warn!(timeout_secs = self.config.extract_timeout_secs, "Field extraction timed out");
                ExtractedFields::default()
            }
        }
    }

    async fn user_timezone(&self, user_id: &str) -> Tz {
        match self.profile.timezone(user_id).await {
            Ok(raw) => match time_utils::parse_timezone(&raw) {
                Some(tz) => tz,
                None => {
                    warn!(user_id = %user_id, zone = %raw, "Unparseable timezone, falling back to UTC");
                    chrono_tz::UTC
                }
            },
            Err(e) => {
                warn!(user_id = %user_id, "Timezone lookup failed, falling back to UTC: {}", e);
                chrono_tz::UTC
            }
        }
    }

    /// Catalog lookup, cached for the lifetime of the conversation.
    async fn pets_cached(
        &self,
        user_id: &str,
        conversation_id: &str,
    ) -> anyhow::Result<Arc<Vec<Pet>>> {
        if let Some(pets) = self.catalog_cache.read().await.get(conversation_id) {
            return Ok(Arc::clone(pets));
        }
        let pets = Arc::new(self.catalog.pets_for_user(user_id).await?);
        self.catalog_cache
            .write()
            .await
            .insert(conversation_id.to_string(), Arc::clone(&pets));
        Ok(pets)
    }

    fn conversation_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .turn_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(
            locks
                .entry(conversation_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Drop per-conversation bookkeeping once the flow terminates.
    async fn forget_conversation(&self, conversation_id: &str) {
        self.catalog_cache.write().await.remove(conversation_id);
        let mut locks = self
            .turn_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.remove(conversation_id);
    }
}
