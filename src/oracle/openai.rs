use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, instrument};

use super::{GenerationError, JsonOracle, OracleRequest};
use crate::config::OpenAiConfig;

const TEMPERATURE: f32 = 0.2;
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<Value>,
}

/// Chat-completions client that requests `json_schema` structured output.
#[derive(Clone)]
pub struct OpenAiOracle {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiOracle {
    pub fn new(config: &OpenAiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Message content is either a plain string or a list of parts, each either a
/// string or an object with a `text` field.
fn extract_content(content: Option<&Value>) -> String {
    match content {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(parts)) => parts
            .iter()
            .map(|part| match part {
                Value::String(s) => s.as_str(),
                Value::Object(map) => map.get("text").and_then(Value::as_str).unwrap_or(""),
                _ => "",
            })
            .collect(),
        _ => String::new(),
    }
}

fn response_format(request: &OracleRequest) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": request.schema_name,
            "strict": true,
            "schema": request.schema,
        }
    })
}

#[async_trait]
impl JsonOracle for OpenAiOracle {
    #[instrument(skip(self, request), fields(schema = request.schema_name, model = %self.model))]
    async fn generate(&self, request: &OracleRequest) -> Result<Value, GenerationError> {
        let body = CompletionRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            response_format: response_format(request),
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "completion request failed");
                GenerationError::RequestFailed(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::RequestFailed(e.to_string()))?;
        if !status.is_success() {
            let preview: String = text.chars().take(500).collect();
            error!(%status, body = %preview, "completion rejected");
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: CompletionResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
        let content = extract_content(
            parsed
                .choices
                .first()
                .and_then(|c| c.message.content.as_ref()),
        );
        if content.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        debug!(bytes = content.len(), "completion received");

        serde_json::from_str(&content)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))
    }
}
