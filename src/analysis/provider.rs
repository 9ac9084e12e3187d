//! Text-analysis provider trait definition.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Options for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Temperature for sampling (0.0 = deterministic).
    pub temperature: f32,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Errors that can occur when calling a text-analysis backend.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timeout")]
    Timeout,
}

/// Trait for text-analysis backends.
///
/// Implementations connect to different model servers while exposing a
/// single prompt-in, text-out interface. The caller owns prompt
/// construction and response parsing.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait TextAnalysisProvider: Send + Sync {
    /// Get the provider's name (e.g., "ollama").
    fn name(&self) -> &str;

    /// Get the model being used.
    fn model(&self) -> &str;

    /// Complete a single prompt and return the raw model output.
    async fn complete(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, AnalysisError>;
}
