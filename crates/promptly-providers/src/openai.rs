//! Cliente HTTP para APIs de chat compatibles con OpenAI.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::ProviderConfig;
use crate::provider::{ChatProvider, ChatRequest};
use crate::ProviderError;

const DEFAULT_STATUS_MESSAGE: &str = "LLM request failed";

/// Una petición por llamada; no hay reintentos.
#[derive(Clone)]
pub struct OpenAiProvider {
  api_key: String,
  base_url: String,
  model: String,
  client: Client,
}

impl std::fmt::Debug for OpenAiProvider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OpenAiProvider")
     .field("base_url", &self.base_url)
     .field("model", &self.model)
     .field("api_key", &"[REDACTED]")
     .finish()
  }
}

impl OpenAiProvider {
  pub fn new(api_key: String, config: &ProviderConfig) -> Result<Self, ProviderError> {
    let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs))
                                  .build()
                                  .map_err(|e| ProviderError::Http { message: format!("Failed to create HTTP client: {}", e),
                                                                     status: None })?;
    Ok(Self { api_key,
              base_url: config.base_url.trim_end_matches('/').to_string(),
              model: config.model.clone(),
              client })
  }

  fn endpoint(&self) -> String {
    format!("{}/chat/completions", self.base_url)
  }

  async fn send_request(&self, body: &ApiRequest<'_>) -> Result<JsonValue, ProviderError> {
    let response = self.client
                       .post(self.endpoint())
                       .bearer_auth(&self.api_key)
                       .header(CONTENT_TYPE, "application/json")
                       .json(body)
                       .send()
                       .await
                       .map_err(|e| ProviderError::Http { message: format!("HTTP request failed: {}", e),
                                                          status: None })?;

    let status = response.status();
    let body_text = response.text().await.unwrap_or_default();

    if !status.is_success() {
      let message = extract_error_message(&body_text).unwrap_or_else(|| {
                                                       if !body_text.trim().is_empty() {
                                                         body_text.clone()
                                                       } else if status.as_u16() == 429 {
                                                         "Rate limited".to_string()
                                                       } else if status.is_server_error() {
                                                         "Server error".to_string()
                                                       } else {
                                                         DEFAULT_STATUS_MESSAGE.to_string()
                                                       }
                                                     });
      return Err(ProviderError::Http { message, status: Some(status.as_u16()) });
    }

    let parsed: ApiResponse = serde_json::from_str(&body_text).map_err(|e| {
                                ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
                              })?;
    let content = parsed.choices
                        .into_iter()
                        .next()
                        .and_then(|c| c.message.content)
                        .filter(|c| !c.is_empty())
                        .unwrap_or_else(|| "{}".to_string());

    serde_json::from_str(&content).map_err(|e| {
                                    ProviderError::InvalidResponse(format!("Model did not return valid JSON: {}", e))
                                  })
  }
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
  model: &'a str,
  response_format: ResponseFormat,
  messages: Vec<ApiMessage<'a>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
  #[serde(rename = "type")]
  kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
  role: &'static str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
  #[serde(default)]
  choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
  message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
  #[serde(default)]
  content: Option<String>,
}

fn extract_error_message(body: &str) -> Option<String> {
  if body.trim().is_empty() {
    return None;
  }

  let parsed = serde_json::from_str::<JsonValue>(body).ok()?;

  if let Some(msg) = parsed.get("error")
                           .and_then(|error| error.get("message"))
                           .and_then(|message| message.as_str())
  {
    return Some(msg.to_string());
  }

  parsed.get("message").and_then(|message| message.as_str()).map(ToOwned::to_owned)
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
  fn default_model(&self) -> &str {
    &self.model
  }

  fn is_enabled(&self) -> bool {
    true
  }

  async fn chat_json(&self, request: ChatRequest) -> Result<JsonValue, ProviderError> {
    let model = request.model.as_deref().unwrap_or(&self.model);
    let body = ApiRequest { model,
                            response_format: ResponseFormat { kind: "json_object" },
                            messages: vec![ApiMessage { role: "system", content: &request.system },
                                           ApiMessage { role: "user", content: &request.user }],
                            temperature: request.temperature,
                            max_tokens: request.max_tokens };
    log::debug!("chat_json model={} endpoint={}", model, self.endpoint());
    self.send_request(&body).await
  }
}
