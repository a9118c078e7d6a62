//! Generation boundary for the requirements pipeline.
//!
//! The engine depends on the external text generator only through the
//! `TextGenerator` trait: prompt plus ordered context in, raw text out.
//! Output is untrusted; callers own logging and structural validation.
//! Supports a blocking HTTP implementation (Ollama or OpenAI-compatible)
//! and a scripted fake for deterministic tests.

use crate::types::{ChatRole, LogEntry};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// Generation errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenError {
    #[error("generation is disabled in configuration")]
    Disabled,

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("generation quota exceeded")]
    QuotaExceeded,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("generator returned an empty response")]
    EmptyResponse,
}

impl GenError {
    /// Transport-level failures are worth retrying; everything else is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenError::Timeout(_) | GenError::QuotaExceeded | GenError::Http(_)
        )
    }
}

/// Generic text-generator trait
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the prompt, with the interaction log as
    /// conversational context. No side effects on any store.
    fn generate(&self, prompt: &str, context: &[LogEntry]) -> Result<String, GenError>;
}

/// Real generator implementation using blocking HTTP
pub struct HttpGenerator {
    config: GenConfig,
    client: reqwest::blocking::Client,
}

impl HttpGenerator {
    pub fn new(config: GenConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    /// Check if endpoint is Ollama-style
    fn is_ollama_endpoint(&self) -> bool {
        self.config.endpoint.contains("11434") || self.config.endpoint.contains("ollama")
    }

    fn send_error(&self, e: reqwest::Error) -> GenError {
        if e.is_timeout() {
            GenError::Timeout(self.config.timeout_secs)
        } else {
            GenError::Http(format!("Request failed: {}", e))
        }
    }

    fn status_error(&self, status: reqwest::StatusCode) -> GenError {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            GenError::QuotaExceeded
        } else {
            GenError::Http(format!("HTTP {} from generator", status))
        }
    }

    /// Call Ollama-style API. Context is folded into the prompt since the
    /// generate endpoint takes no message list.
    fn call_ollama(&self, prompt: &str, context: &[LogEntry]) -> Result<String, GenError> {
        let url = format!("{}/api/generate", self.config.endpoint);

        let mut full_prompt = String::new();
        for entry in context {
            let role = match entry.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
            };
            full_prompt.push_str(&format!("[{}]\n{}\n\n", role, entry.content));
        }
        full_prompt.push_str(prompt);

        let request_body = serde_json::json!({
            "model": self.config.model,
            "prompt": full_prompt,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(self.status_error(response.status()));
        }

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| GenError::Http(format!("Failed to parse response: {}", e)))?;

        response_json
            .get("response")
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or(GenError::EmptyResponse)
    }

    /// Call OpenAI-compatible chat API with the context as messages.
    fn call_openai_compatible(
        &self,
        prompt: &str,
        context: &[LogEntry],
    ) -> Result<String, GenError> {
        let url = format!("{}/v1/chat/completions", self.config.endpoint);

        let mut messages: Vec<serde_json::Value> = context
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "role": match entry.role {
                        ChatRole::User => "user",
                        ChatRole::Assistant => "assistant",
                    },
                    "content": entry.content,
                })
            })
            .collect();
        messages.push(serde_json::json!({"role": "user", "content": prompt}));

        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
        });

        let mut request = self.client.post(&url).json(&request_body);

        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(self.status_error(response.status()));
        }

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| GenError::Http(format!("Failed to parse response: {}", e)))?;

        response_json
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .ok_or(GenError::EmptyResponse)
    }
}

impl TextGenerator for HttpGenerator {
    fn generate(&self, prompt: &str, context: &[LogEntry]) -> Result<String, GenError> {
        if !self.config.enabled {
            return Err(GenError::Disabled);
        }

        if self.is_ollama_endpoint() {
            match self.call_ollama(prompt, context) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::debug!("Ollama API failed, trying OpenAI-compatible: {}", e);
                }
            }
        }

        self.call_openai_compatible(prompt, context)
    }
}

/// Fake generator for testing
pub struct FakeGenerator {
    responses: std::sync::Mutex<Vec<Result<String, GenError>>>,
    call_count: std::sync::Mutex<usize>,
}

impl FakeGenerator {
    /// Create a fake with a script of responses. The last response repeats
    /// once the script runs dry.
    pub fn from_script(responses: Vec<Result<String, GenError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            call_count: std::sync::Mutex::new(0),
        }
    }

    /// Create a fake that always returns the same text
    pub fn always(text: &str) -> Self {
        Self::from_script(vec![Ok(text.to_string())])
    }

    /// Create a fake that always returns an error
    pub fn always_error(error: GenError) -> Self {
        Self::from_script(vec![Err(error)])
    }

    /// Get the number of calls made
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl TextGenerator for FakeGenerator {
    fn generate(&self, _prompt: &str, _context: &[LogEntry]) -> Result<String, GenError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err(GenError::EmptyResponse);
        }

        if responses.len() == 1 {
            // Keep returning the same response
            responses[0].clone()
        } else {
            responses.remove(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_config_default() {
        let config = GenConfig::default();
        assert!(config.enabled);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.model, "llama3.2:3b");
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(GenError::Timeout(30).is_retryable());
        assert!(GenError::QuotaExceeded.is_retryable());
        assert!(GenError::Http("503".to_string()).is_retryable());
        assert!(!GenError::Disabled.is_retryable());
        assert!(!GenError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_fake_always() {
        let fake = FakeGenerator::always("hello");

        assert_eq!(fake.generate("p", &[]).unwrap(), "hello");
        assert_eq!(fake.generate("p", &[]).unwrap(), "hello");
        assert_eq!(fake.call_count(), 2);
    }

    #[test]
    fn test_fake_always_error() {
        let fake = FakeGenerator::always_error(GenError::QuotaExceeded);

        assert!(fake.generate("p", &[]).is_err());
        assert_eq!(fake.call_count(), 1);
    }

    #[test]
    fn test_fake_script_order() {
        let fake = FakeGenerator::from_script(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
            Err(GenError::Timeout(30)),
        ]);

        assert_eq!(fake.generate("", &[]).unwrap(), "first");
        assert_eq!(fake.generate("", &[]).unwrap(), "second");
        assert!(fake.generate("", &[]).is_err());
        // Last script entry repeats
        assert!(fake.generate("", &[]).is_err());
        assert_eq!(fake.call_count(), 4);
    }
}
