//! OpenAI-compatible chat-completions client
//!
//! Works against any endpoint speaking the OpenAI chat API (OpenAI, Ollama,
//! vLLM, LM Studio, etc.). One HTTP request per call: no retries, no
//! streaming.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::OpenAiSettings;
use crate::error::{Error, Result};

use super::{ChatMessage, ChatModel};

// ─────────────────────────────────────────────────────────────────
// OpenAI API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────

/// Chat-completions client bound to one base URL, key and model
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client from the `[openai]` settings
    pub fn new(settings: &OpenAiSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if settings.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(settings.timeout_secs));
        }
        let client = builder
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/chat/completions",
            settings.base_url.trim_end_matches('/')
        );

        info!(
            endpoint = %endpoint,
            model = %settings.model,
            authenticated = !settings.api_key.is_empty(),
            "Chat-completions client created"
        );

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.api_key))
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        let mut req = self.client.post(&self.endpoint).json(&body);
        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        debug!(messages = messages.len(), model = %self.model, "Sending chat completion");

        let response = req
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Request error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(format!("API error {}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Failed to parse API response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream("No choices in API response"))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let settings = OpenAiSettings {
            base_url: "http://localhost:11434/v1/".to_string(),
            ..Default::default()
        };
        let client = OpenAiClient::new(&settings).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.model_id(), "gpt-4o-mini");
    }

    #[test]
    fn test_auth_header() {
        let settings = OpenAiSettings {
            api_key: "sk-test-123".to_string(),
            ..Default::default()
        };
        let client = OpenAiClient::new(&settings).unwrap();
        assert_eq!(client.auth_header(), Some("Bearer sk-test-123".to_string()));

        let no_key = OpenAiClient::new(&OpenAiSettings::default()).unwrap();
        assert_eq!(no_key.auth_header(), None);
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("ctx"), ChatMessage::user("hi")];
        let body = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &messages,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hi");
    }

    #[test]
    fn test_response_with_null_content() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":null},"finish_reason":"stop"}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_connection_failure_is_upstream_error() {
        // Port 9 (discard) on localhost is not expected to be listening
        let settings = OpenAiSettings {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            timeout_secs: 5,
            ..Default::default()
        };
        let client = OpenAiClient::new(&settings).unwrap();
        let err = client.complete(&[ChatMessage::user("hi")]).await.unwrap_err();
        assert!(matches!(err, Error::Upstream { .. }));
    }
}
