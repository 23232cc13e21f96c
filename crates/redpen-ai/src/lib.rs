//! Language-model layer: prompt templates, provider clients, and critique runs
//! that feed model output into the core pipeline.

mod critic;
mod model;
pub mod prompts;

#[cfg(feature = "http")]
pub mod gemini;

pub use critic::{Critic, CritiqueError};
pub use model::{GenerateRequest, MockModel, ModelError, TextModel};

#[cfg(feature = "http")]
pub use gemini::GeminiClient;
