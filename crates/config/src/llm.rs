//! Upstream model provider configuration.

use std::time::Duration;

use duration_str::deserialize_duration;
use secrecy::SecretString;
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings of the OpenAI-compatible provider all requests are forwarded to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Base URL of the provider API, without the trailing endpoint path.
    pub base_url: String,

    /// Bearer key sent with every provider request.
    pub api_key: Option<SecretString>,

    /// Model used for single-message and multi-turn chat.
    pub chat_model: String,

    /// Model used for image generation. The provider default is used when not set.
    pub image_model: Option<String>,

    /// Timeout applied to every provider request.
    #[serde(deserialize_with = "deserialize_duration")]
    pub timeout: Duration,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            image_model: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl LlmConfig {
    /// Whether a provider key has been configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}
