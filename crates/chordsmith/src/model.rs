//! The generative-model client seam.
//!
//! The orchestrator depends on the [`ChordModel`] trait; production wires
//! in [`OpenAiChordModel`] (any OpenAI-compatible chat-completions API),
//! tests substitute canned or failing implementations.

use async_trait::async_trait;
use serde::Deserialize;
use shedconf::{ConfigError, ModelConfig};
use thiserror::Error;

/// Sampling temperature for every generation request
pub const TEMPERATURE: f32 = 0.7;

/// Faults from the model call. These are recovered locally by the
/// fallback path and never surface past the orchestrator.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("model response carried no content")]
    MissingContent,
}

/// A single-shot progression model call: one prompt in, one raw JSON
/// document out. Implementations must be safe to share across concurrent
/// requests - the orchestrator holds no other state.
#[async_trait]
pub trait ChordModel: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ModelError>;
}

/// Client for an OpenAI-compatible chat-completions backend
/// (deepseek, ollama, and friends).
pub struct OpenAiChordModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChordModel {
    /// Build from configuration. Missing credentials are a fatal
    /// configuration fault - there is no fallback for them.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::InvalidModelClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChordModel for OpenAiChordModel {
    #[tracing::instrument(skip(self, system, prompt), fields(model = %self.model))]
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ModelError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "temperature": TEMPERATURE,
            "response_format": {"type": "json_object"},
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletion = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ModelError::MissingContent)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_requires_api_key() {
        let config = ModelConfig {
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: "deepseek-chat".to_string(),
            api_key: None,
            timeout_secs: 30,
        };
        assert!(matches!(
            OpenAiChordModel::from_config(&config),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn from_config_strips_trailing_slash() {
        let config = ModelConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            model: "llama3".to_string(),
            api_key: Some("unused".to_string()),
            timeout_secs: 5,
        };
        let client = OpenAiChordModel::from_config(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn completion_shape_parses() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{}"}}]}"#;
        let completion: ChatCompletion = serde_json::from_str(raw).unwrap();
        assert_eq!(completion.choices[0].message.content.as_deref(), Some("{}"));
    }
}
