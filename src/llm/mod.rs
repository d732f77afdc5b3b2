//! Remote generation backends.
//!
//! - [`error`]: error taxonomy with stable codes
//! - [`backend`]: the [`GenerationBackend`](backend::GenerationBackend) trait
//! - [`gemini`]: Google Gemini `generateContent` adapter

pub mod backend;
pub mod error;
pub mod gemini;

pub use backend::{GenerationBackend, GenerationRequest};
pub use error::LlmError;
pub use gemini::GeminiAdapter;
