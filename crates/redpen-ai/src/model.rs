//! Text-generation provider abstraction.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use redpen_core::AnalysisKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompts;

#[derive(Debug, Error)]
pub enum ModelError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("response blocked by provider: {reason}")]
    Blocked { reason: String },

    #[error("provider returned no text")]
    EmptyResponse,

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One non-streaming generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl GenerateRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: None,
            user_prompt: user_prompt.into(),
            max_tokens: 2048,
            temperature: 0.2,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// A language-model provider: text in, text out, or a reason it failed.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Model identifier, for logs.
    fn id(&self) -> &str;

    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError>;
}

/// Canned-response model for tests and offline runs.
pub struct MockModel {
    model_id: String,
    default_response: String,
    by_system_prompt: HashMap<String, String>,
    fail_with: Option<String>,
    call_count: AtomicU32,
}

impl MockModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            default_response: response.into(),
            by_system_prompt: HashMap::new(),
            fail_with: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// Answer requests for `kind` with `response` instead of the default.
    pub fn with_response_for(mut self, kind: AnalysisKind, response: impl Into<String>) -> Self {
        self.by_system_prompt
            .insert(prompts::system_prompt(kind).to_string(), response.into());
        self
    }

    /// Make every call fail as if the provider blocked it.
    pub fn with_block_reason(mut self, reason: impl Into<String>) -> Self {
        self.fail_with = Some(reason.into());
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextModel for MockModel {
    fn id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, ModelError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = &self.fail_with {
            return Err(ModelError::Blocked {
                reason: reason.clone(),
            });
        }

        let response = request
            .system_prompt
            .as_ref()
            .and_then(|p| self.by_system_prompt.get(p))
            .unwrap_or(&self.default_response);
        Ok(response.clone())
    }
}
