//! Ollama client implementation.
//!
//! Sends each prompt as a single user message to Ollama's `/api/chat`
//! endpoint with streaming disabled, which is what the SQL generator and the
//! flow summarizer need: one prompt in, one complete answer out.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::local::OllamaClient;
//! use llm::{LocalLlmConfig, TextCompletion};
//!
//! let config = LocalLlmConfig::new("http://localhost:11434", "llama3");
//! let client = OllamaClient::new(config)?;
//! let sql = client.complete("Return only SQL ...").await?;
//! ```

use crate::completion::TextCompletion;
use crate::config::LocalLlmConfig;
use crate::error::{LlmError, Result};
use crate::provider_utils::{ModelInfo, ProviderUtils};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Ollama client for local LLM inference.
#[derive(Clone)]
pub struct OllamaClient {
    config: LocalLlmConfig,
    client: Client,
}

impl OllamaClient {
    /// Create a new Ollama client with the given configuration.
    pub fn new(config: LocalLlmConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Check if Ollama server is running.
    pub async fn check_health(&self) -> Result<bool> {
        let url = self.config.endpoint("/api/tags");
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Build the request body for a single prompt.
    fn build_request(&self, prompt: &str) -> OllamaRequest {
        let mut options = HashMap::new();
        options.insert("temperature", serde_json::Value::from(self.config.temperature));

        OllamaRequest {
            model: self.config.model.clone(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options: Some(options),
        }
    }

    /// Map a transport failure onto the provider taxonomy.
    fn classify_transport(&self, err: reqwest::Error) -> LlmError {
        if err.is_timeout() {
            LlmError::Timeout(format!(
                "Ollama did not answer within {:?}",
                self.config.timeout
            ))
        } else if err.is_connect() {
            LlmError::ServiceUnavailable(format!(
                "Cannot reach Ollama at {}: {}",
                self.config.base_url, err
            ))
        } else {
            LlmError::HttpError(err)
        }
    }
}

#[async_trait]
impl TextCompletion for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = self.config.endpoint("/api/chat");
        let req_body = self.build_request(prompt);

        debug!(model = %self.config.model, prompt_len = prompt.len(), "Sending prompt to Ollama");

        let response = self
            .client
            .post(&url)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(LlmError::ModelNotFound(format!(
                    "{}: {}",
                    self.config.model, error_text
                )));
            }
            return Err(LlmError::ProviderError(format!(
                "Ollama API error {}: {}",
                status, error_text
            )));
        }

        let ollama_resp: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        debug!(
            model = %ollama_resp.model,
            eval_count = ollama_resp.eval_count.unwrap_or(0),
            "Ollama completion received"
        );

        Ok(ollama_resp.message.content)
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<HashMap<&'static str, serde_json::Value>>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    eval_count: Option<usize>,
}

#[async_trait]
impl ProviderUtils for OllamaClient {
    async fn ping(&self) -> Result<bool> {
        self.check_health().await
    }

    async fn fetch_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.config.endpoint("/api/tags");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        if !response.status().is_success() {
            return Err(LlmError::ProviderError(
                "Failed to fetch models from Ollama".to_string(),
            ));
        }

        #[derive(Deserialize)]
        struct OllamaModelsResponse {
            models: Vec<OllamaModelInfo>,
        }

        #[derive(Deserialize)]
        struct OllamaModelInfo {
            name: String,
            #[serde(default)]
            size: Option<u64>,
            #[serde(default)]
            modified_at: Option<String>,
        }

        let models_response: OllamaModelsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Ok(models_response
            .models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name,
                size: m.size,
                modified_at: m.modified_at,
            })
            .collect())
    }

    fn current_model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let config = LocalLlmConfig::new("http://localhost:11434", "llama3");
        assert!(OllamaClient::new(config).is_ok());
    }

    #[test]
    fn test_client_rejects_bad_url() {
        let config = LocalLlmConfig::new("ollama:11434", "llama3");
        assert!(matches!(
            OllamaClient::new(config),
            Err(LlmError::ConfigError(_))
        ));
    }

    #[test]
    fn test_request_is_single_user_message() {
        let config = LocalLlmConfig::new("http://localhost:11434", "llama3");
        let client = OllamaClient::new(config).unwrap();

        let req = client.build_request("SELECT please");
        assert_eq!(req.model, "llama3");
        assert!(!req.stream);
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, "user");
        assert_eq!(req.messages[0].content, "SELECT please");
    }

    #[test]
    fn test_request_carries_temperature() {
        let config =
            LocalLlmConfig::new("http://localhost:11434", "llama3").with_temperature(0.0);
        let client = OllamaClient::new(config).unwrap();

        let body = serde_json::to_value(client.build_request("x")).unwrap();
        assert_eq!(body["options"]["temperature"], serde_json::json!(0.0));
        assert_eq!(body["stream"], serde_json::json!(false));
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "model": "llama3",
            "created_at": "2024-05-01T10:00:00Z",
            "message": {"role": "assistant", "content": "SELECT 1;"},
            "done": true,
            "eval_count": 4
        }"#;

        let resp: OllamaResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.message.content, "SELECT 1;");
        assert_eq!(resp.eval_count, Some(4));
    }

    #[test]
    fn test_current_model() {
        let config = LocalLlmConfig::new("http://localhost:11434", "mistral")
            .with_timeout(Duration::from_secs(5));
        let client = OllamaClient::new(config).unwrap();
        assert_eq!(client.current_model(), "mistral");
    }

    /// Requires a running Ollama server.
    #[tokio::test]
    #[ignore]
    async fn test_health_check() {
        let config = LocalLlmConfig::new("http://localhost:11434", "llama3");
        let client = OllamaClient::new(config).unwrap();

        let is_healthy = client.check_health().await.unwrap();
        println!("Ollama health: {}", is_healthy);
    }
}
