use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use chrono_tz::Tz;
use tracing::debug;

use super::{parse_extraction, prompt, ExtractedFields};
use crate::traits::{FieldExtractor, ModelProvider, Pet};

/// The one real [`FieldExtractor`]: prompt an LLM with the current message,
/// the pet catalog and the local clock, then leniently parse its JSON.
/// Contract enforcement happens in the caller, not here.
pub struct LlmFieldExtractor {
    provider: Arc<dyn ModelProvider>,
    model: String,
}

impl LlmFieldExtractor {
    pub fn new(provider: Arc<dyn ModelProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl FieldExtractor for LlmFieldExtractor {
    async fn extract(
        &self,
        message: &str,
        pets: &[Pet],
        now_local: NaiveDateTime,
        tz: Tz,
    ) -> anyhow::Result<ExtractedFields> {
        let system = prompt::build_system_prompt(pets, now_local, tz);
        let reply = self.provider.complete(&self.model, &system, message).await?;

        match parse_extraction(&reply) {
            Some(fields) => {
                debug!(confidence = fields.confidence.as_str(), "Extraction parsed");
                Ok(fields)
            }
            None => anyhow::bail!(
                "Extraction reply contained no parseable JSON object ({} chars)",
                reply.len()
            ),
        }
    }
}
