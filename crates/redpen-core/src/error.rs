use thiserror::Error;

/// Failure to turn a raw model response into a validated annotation list.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("response contained no payload")]
    EmptyPayload,

    #[error("malformed JSON payload: {message}")]
    MalformedJson { payload: String, message: String },

    #[error("expected a JSON array, found {found}")]
    NotAnArray { found: &'static str },

    #[error("element {index} matches no annotation shape: {element}")]
    SchemaMismatch {
        index: usize,
        element: serde_json::Value,
    },
}

/// An analysis run that could not be built from the model's response.
///
/// Shown to the user as a single generic message; `raw` keeps the
/// untouched response for diagnostics.
#[derive(Debug, Error)]
#[error("could not parse analysis")]
pub struct AnalysisError {
    pub raw: String,
    #[source]
    pub source: ExtractError,
}
