//! Annotation extraction and text overlay: model response → validated records →
//! lossless segment partition of the original text, with per-run resolution state.

pub mod analysis;
mod error;
pub mod locate;
pub mod normalize;
pub mod record;
pub mod store;
pub mod validate;

pub use analysis::{Analysis, Progress, Session, analyze};
pub use error::{AnalysisError, ExtractError};
pub use locate::{Segment, locate};
pub use normalize::normalize;
pub use record::{AnalysisKind, AnnotationRecord, Critique, Shape};
pub use store::{IdMinter, OccurrenceId, ResolutionStore, RunId};
pub use validate::{extract, validate};
