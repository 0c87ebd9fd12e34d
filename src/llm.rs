use crate::config::LlmConfig;
use crate::error::{AgentError, Result};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Text-in, text-out access to a chat model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl LlmClient {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url,
            model,
            temperature: 0.2,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| AgentError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AgentError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, system_prompt: &str, user_prompt: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt}
            ],
        });

        // Reasoning models spend tokens before answering and only accept the default temperature
        if is_reasoning_model(&self.model) {
            body["max_completion_tokens"] = serde_json::json!(4000);
        } else {
            body["max_tokens"] = serde_json::json!(1500);
            body["temperature"] = serde_json::json!(self.temperature);
        }

        body
    }
}

fn is_reasoning_model(model: &str) -> bool {
    ["gpt-5", "o1", "o3", "o4"]
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        debug!("Sending request to model {}", self.model);

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(system_prompt, user_prompt))
            .send()
            .await
            .map_err(|e| AgentError::Llm(format!("LLM API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AgentError::Llm(format!("LLM API error ({}): {}", status, error_text)));
        }

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AgentError::Llm(format!("Failed to parse LLM response: {}", e)))?;

        extract_content(&response_json)
    }
}

/// Pull the assistant message out of a chat completion payload.
fn extract_content(response_json: &serde_json::Value) -> Result<String> {
    if let Some(error) = response_json.get("error") {
        return Err(AgentError::Llm(format!("LLM API error: {}", error)));
    }

    let choice = response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| AgentError::Llm("No choices in LLM response".to_string()))?;

    match choice.get("finish_reason").and_then(|r| r.as_str()) {
        Some("length") => warn!("LLM response was truncated due to length limit"),
        Some("content_filter") => {
            return Err(AgentError::Llm(
                "LLM response was filtered by content policy".to_string(),
            ))
        }
        _ => {}
    }

    let content = choice["message"]["content"]
        .as_str()
        .ok_or_else(|| AgentError::Llm("No content in LLM response".to_string()))?;

    if content.is_empty() {
        return Err(AgentError::Llm("Empty content in LLM response".to_string()));
    }

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_content() {
        let payload = json!({
            "choices": [{"message": {"content": "SELECT 1"}, "finish_reason": "stop"}]
        });
        assert_eq!(extract_content(&payload).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_extract_content_rejects_api_error() {
        let payload = json!({"error": {"message": "invalid api key"}});
        let err = extract_content(&payload).unwrap_err();
        assert!(err.to_string().contains("invalid api key"));
    }

    #[test]
    fn test_extract_content_rejects_filtered_and_empty() {
        let filtered = json!({
            "choices": [{"message": {"content": "x"}, "finish_reason": "content_filter"}]
        });
        assert!(extract_content(&filtered).is_err());

        let empty = json!({"choices": [{"message": {"content": ""}}]});
        assert!(extract_content(&empty).is_err());

        let no_choices = json!({"choices": []});
        assert!(extract_content(&no_choices).is_err());
    }

    #[test]
    fn test_from_config_requires_api_key() {
        let config = LlmConfig::default();
        assert!(matches!(LlmClient::from_config(&config), Err(AgentError::Config(_))));
    }

    #[test]
    fn test_request_body_uses_configured_model() {
        let client = LlmClient::new("k".into(), "gpt-4o".into(), "http://localhost".into());
        let body = client.request_body("sys", "user");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
        assert!(body.get("max_tokens").is_some());
        assert!(body.get("temperature").is_some());
    }

    #[test]
    fn test_reasoning_models_omit_temperature() {
        let client = LlmClient::new("k".into(), "o1-mini".into(), "http://localhost".into());
        let body = client.request_body("sys", "user");
        assert!(body.get("temperature").is_none());
        assert_eq!(body["max_completion_tokens"], 4000);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_reasoning_model_matched_by_prefix() {
        assert!(is_reasoning_model("gpt-5"));
        assert!(is_reasoning_model("o3-mini"));
        assert!(!is_reasoning_model("gpt-4o"));
        assert!(!is_reasoning_model("gpt-4o1-custom"));
    }
}
