//! Text-analysis capability.
//!
//! Feature extraction delegates its language understanding to an external
//! model behind the [`TextAnalysisProvider`] trait.

mod ollama;
mod provider;

pub use ollama::OllamaAnalysisProvider;
pub use provider::{AnalysisError, CompletionOptions, TextAnalysisProvider};
