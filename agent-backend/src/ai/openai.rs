use crate::ai::types::AiError;
use crate::ai::{CompletionClient, CompletionRequest};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    auth_headers: header::HeaderMap,
    endpoint: String,
    model: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAICompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    messages: Vec<OpenAIMessage>,
    max_completion_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAICompletionResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, endpoint: Option<&str>, model: Option<&str>) -> Result<Self, String> {
        let endpoint_url = endpoint
            .unwrap_or("https://api.openai.com/v1/chat/completions")
            .to_string();

        let mut auth_headers = header::HeaderMap::new();
        auth_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // Only add auth header if API key is provided and not empty
        if !api_key.is_empty() {
            let auth_value = header::HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?;
            auth_headers.insert(header::AUTHORIZATION, auth_value);
        }

        let model_name = match model {
            Some(m) if !m.is_empty() => Some(m.to_string()),
            _ => None,
        };

        Ok(Self {
            client: Client::new(),
            auth_headers,
            endpoint: endpoint_url,
            model: model_name,
        })
    }

    fn build_request(&self, request: CompletionRequest) -> OpenAICompletionRequest {
        OpenAICompletionRequest {
            model: self.model.clone(),
            messages: request
                .messages
                .into_iter()
                .map(|m| OpenAIMessage {
                    role: m.role.to_string(),
                    content: m.content,
                })
                .collect(),
            max_completion_tokens: request.max_completion_tokens,
            temperature: request.temperature,
        }
    }
}

/// Turn a non-success body into a readable message, skipping HTML error pages
fn describe_error_body(status: reqwest::StatusCode, error_text: &str) -> String {
    if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(error_text) {
        return format!("OpenAI API error: {}", error_response.error.message);
    }

    let trimmed = error_text.trim_start();
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        format!("OpenAI API returned error status: {} (HTML error page)", status)
    } else {
        let truncated: String = if error_text.chars().count() > 200 {
            format!("{}...", error_text.chars().take(200).collect::<String>())
        } else {
            error_text.to_string()
        };
        format!("OpenAI API returned error status: {}, body: {}", status, truncated)
    }
}

/// First choice's content, or an error when the provider returned none
fn extract_content(response_text: &str) -> Result<String, AiError> {
    let response_data: OpenAICompletionResponse = serde_json::from_str(response_text)
        .map_err(|e| AiError::new(format!("Failed to parse OpenAI response: {} - body: {}", e, response_text)))?;

    let choice = response_data
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::new("OpenAI API returned no choices"))?;

    log::info!(
        "[OPENAI] Response - content_len: {}, finish_reason: {:?}",
        choice.message.content.as_ref().map(|c| c.len()).unwrap_or(0),
        choice.finish_reason
    );

    Ok(choice.message.content.unwrap_or_default())
}

#[async_trait]
impl CompletionClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
        let request = self.build_request(request);

        log::info!(
            "[OPENAI] Sending request to {} with model {} ({} messages, max_completion_tokens={}, temperature={})",
            self.endpoint,
            self.model.as_deref().unwrap_or("(provider default)"),
            request.messages.len(),
            request.max_completion_tokens,
            request.temperature
        );
        log::debug!(
            "[OPENAI] Full request:\n{}",
            serde_json::to_string_pretty(&request).unwrap_or_default()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.auth_headers.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| AiError::new(format!("OpenAI API request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AiError::with_status(
                describe_error_body(status, &error_text),
                status.as_u16(),
            ));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| AiError::new(format!("Failed to read OpenAI response: {}", e)))?;

        log::debug!("[OPENAI] Raw response:\n{}", response_text);

        extract_content(&response_text)
    }
}
