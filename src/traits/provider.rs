use async_trait::async_trait;

/// Model provider — sends a system + user prompt to an LLM, gets back the
/// raw completion text. The extraction layer owns prompt construction and
/// output parsing; this seam stays transport-only.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, model: &str, system: &str, user: &str) -> anyhow::Result<String>;
}
