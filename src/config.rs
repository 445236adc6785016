use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub flow: FlowConfig,
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config at {}: {}", path.display(), e))?;
        let config: AppConfig = toml::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse config at {}: {}", path.display(), e))?;
        Ok(config)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_request_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "petminder.db".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FlowConfig {
    /// Upper bound on a single extraction call. A timed-out extraction is
    /// treated as "nothing extracted this turn", not a failed turn.
    #[serde(default = "default_extract_timeout_secs")]
    pub extract_timeout_secs: u64,
    /// Upper bound on each reminder creation call.
    #[serde(default = "default_create_timeout_secs")]
    pub create_timeout_secs: u64,
    /// Correction round-trips before the flow gives up and stops asking.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            extract_timeout_secs: default_extract_timeout_secs(),
            create_timeout_secs: default_create_timeout_secs(),
            max_turns: default_max_turns(),
        }
    }
}

fn default_extract_timeout_secs() -> u64 {
    20
}
fn default_create_timeout_secs() -> u64 {
    10
}
fn default_max_turns() -> u32 {
    8
}
