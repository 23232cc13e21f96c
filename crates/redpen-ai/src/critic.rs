//! Critique runs: prompt the model, then hand its raw output to the core
//! pipeline.

use redpen_core::{Analysis, AnalysisError, AnalysisKind, analyze};
use thiserror::Error;
use tracing::{info, warn};

use crate::model::{GenerateRequest, ModelError, TextModel};
use crate::prompts;

#[derive(Debug, Error)]
pub enum CritiqueError {
    #[error("no text to analyse")]
    EmptyInput,

    #[error("model call failed: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Runs analyses of either kind against one model.
pub struct Critic<M> {
    model: M,
    max_tokens: u32,
    temperature: f32,
}

impl<M: TextModel> Critic<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            max_tokens: 2048,
            temperature: 0.2,
        }
    }

    /// Override the generation budget and sampling temperature.
    pub fn with_generation(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run one analysis of `kind` over `text`.
    pub async fn analyze(
        &self,
        kind: AnalysisKind,
        text: &str,
    ) -> Result<Analysis, CritiqueError> {
        if text.trim().is_empty() {
            return Err(CritiqueError::EmptyInput);
        }

        let request = GenerateRequest {
            system_prompt: Some(prompts::system_prompt(kind).to_string()),
            user_prompt: prompts::user_prompt(text),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        info!(%kind, model = self.model.id(), chars = text.len(), "requesting critique");
        let raw = self.model.generate(request).await.inspect_err(|e| {
            warn!(%kind, error = %e, "model call failed");
        })?;

        Ok(analyze(kind, text, &raw)?)
    }

    /// Run both kinds concurrently. Each result is an independent run.
    pub async fn analyze_both(
        &self,
        text: &str,
    ) -> (
        Result<Analysis, CritiqueError>,
        Result<Analysis, CritiqueError>,
    ) {
        tokio::join!(
            self.analyze(AnalysisKind::Rules, text),
            self.analyze(AnalysisKind::General, text),
        )
    }
}
