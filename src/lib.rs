//! Tutor: an adaptive AI tutor core.
//!
//! A learner asks questions at one of four learning levels. Each turn is
//! shaped into a level-specific prompt and sent to a remote generation
//! backend; when every remote model fails, the tutor switches to local
//! template replies until it is explicitly reset.
//!
//! # Architecture
//!
//! - **Store** ([`store`]): reducer-driven state (history, achievements,
//!   settings, stats) mutated only through [`store::Action`]s
//! - **Resolver** ([`resolver`]): ordered remote candidates, then a sticky
//!   local fallback
//! - **Backends** ([`llm`]): the [`llm::GenerationBackend`] trait and the
//!   Gemini adapter
//! - **Voice** ([`voice`]): speech capability seam and command-line synthesis
//! - **Session** ([`session`]): runs turns end to end over all of the above

pub mod attachment;
pub mod config;
pub mod error;
pub mod level;
pub mod llm;
pub mod prompts;
pub mod resolver;
pub mod session;
pub mod store;
pub mod voice;

pub use attachment::ImageAttachment;
pub use config::TutorConfig;
pub use error::{Result, TutorError};
pub use level::{AudienceLevel, Emotion, LearningLevel};
pub use resolver::{Reply, ReplySource, ResolverMode, ResponseResolver, Utterance};
pub use session::TutorSession;
pub use store::{Action, AppState, ConversationStore};
pub use voice::{VoiceAdapter, VoicePlatform};
