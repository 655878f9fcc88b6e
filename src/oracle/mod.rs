//! Schema-constrained JSON generation.
//!
//! The plan pipeline only sees [`JsonOracle`]; the OpenAI adapter lives in
//! [`openai`]. A call is made exactly once: there is no retry or backoff.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub mod openai;

pub use openai::OpenAiOracle;

/// One generation call: the schema is the only acceptable output shape.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub schema_name: &'static str,
    pub schema: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    RequestFailed(String),
    #[error("generation service answered {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("generation service returned no content")]
    EmptyResponse,
    #[error("generation service returned malformed JSON: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait JsonOracle: Send + Sync {
    async fn generate(&self, request: &OracleRequest) -> Result<Value, GenerationError>;
}

/// Run `request` and decode the result into `T`. A shape mismatch counts as a
/// malformed response.
pub async fn generate_typed<T: DeserializeOwned>(
    oracle: &dyn JsonOracle,
    request: &OracleRequest,
) -> Result<T, GenerationError> {
    let value = oracle.generate(request).await?;
    serde_json::from_value(value).map_err(|e| GenerationError::MalformedResponse(e.to_string()))
}
