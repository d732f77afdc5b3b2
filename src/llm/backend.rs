//! Backend trait for remote text generation.
//!
//! Defines the [`GenerationBackend`] trait that remote model APIs satisfy.
//! The resolver talks only to this trait, so tests substitute scripted
//! backends for the HTTP adapter.

use async_trait::async_trait;

use super::error::LlmError;
use crate::attachment::ImageAttachment;

/// One generation request against one named model.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// Model identifier, e.g. `"gemini-2.5-pro"`.
    pub model: &'a str,
    /// Fully assembled prompt text.
    pub prompt: &'a str,
    /// Inline image, only set for image-capable candidates.
    pub image: Option<&'a ImageAttachment>,
}

/// Trait for remote generation backends.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Returns the backend name (e.g. `"gemini"`).
    fn name(&self) -> &str;

    /// Generate a complete reply for `request`.
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, LlmError>;
}
