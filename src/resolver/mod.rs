//! Response resolution: remote candidates first, local fallback last.
//!
//! [`ResponseResolver`] builds the level-shaped prompt, walks the configured
//! model candidates in order, and returns the first success. When every
//! candidate fails it switches into fallback mode and answers locally.
//!
//! Fallback mode is sticky. Once engaged, later turns skip the remote path
//! entirely until [`ResolverModeHandle::reset`] is called. Nothing resets it
//! automatically.

pub mod chain;
pub mod local;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::attachment::ImageAttachment;
use crate::config::{ModelCandidate, TutorConfig};
use crate::error::{Result, TutorError};
use crate::level::{Emotion, LearningLevel};
use crate::llm::{GeminiAdapter, GenerationBackend, GenerationRequest, LlmError};
use crate::prompts::build_prompt;

pub use chain::CandidateChain;
pub use local::LocalResponder;

/// Question text used when the learner sends only an image.
const IMAGE_ONLY_QUESTION: &str = "Please explain what this image shows.";

/// What the learner sent in one turn.
#[derive(Debug, Clone, Default)]
pub struct Utterance {
    pub text: String,
    pub image: Option<ImageAttachment>,
}

impl Utterance {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageAttachment) -> Self {
        self.image = Some(image);
        self
    }

    /// `true` when there is neither non-blank text nor an image.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty() && self.image.is_none()
    }
}

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReplySource {
    Remote { model: String },
    Fallback,
}

/// A resolved reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub source: ReplySource,
}

impl Reply {
    pub fn is_fallback(&self) -> bool {
        self.source == ReplySource::Fallback
    }
}

/// Result of one candidate attempt.
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(String),
    Failure(LlmError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverMode {
    RemoteActive,
    FallbackActive,
}

/// Shared view of the resolver's sticky mode flag.
#[derive(Debug, Clone, Default)]
pub struct ResolverModeHandle {
    fallback: Arc<AtomicBool>,
}

impl ResolverModeHandle {
    pub fn mode(&self) -> ResolverMode {
        if self.is_fallback() {
            ResolverMode::FallbackActive
        } else {
            ResolverMode::RemoteActive
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.load(Ordering::Acquire)
    }

    /// Return to remote mode. Returns `true` if the mode changed.
    pub fn reset(&self) -> bool {
        let changed = self.fallback.swap(false, Ordering::AcqRel);
        if changed {
            info!("resolver reset to remote mode");
        }
        changed
    }

    fn engage_fallback(&self) -> bool {
        !self.fallback.swap(true, Ordering::AcqRel)
    }
}

/// Resolves learner turns into tutor replies.
pub struct ResponseResolver {
    remote: Option<Arc<dyn GenerationBackend>>,
    candidates: Vec<ModelCandidate>,
    attempt_timeout: Duration,
    local: LocalResponder,
    mode: ResolverModeHandle,
}

impl std::fmt::Debug for ResponseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseResolver")
            .field("remote", &self.remote.as_ref().map(|b| b.name().to_owned()))
            .field("candidates", &self.candidates)
            .field("attempt_timeout", &self.attempt_timeout)
            .field("mode", &self.mode.mode())
            .finish()
    }
}

impl ResponseResolver {
    /// Resolver over an explicit backend. `None` means every turn falls back.
    pub fn new(
        remote: Option<Arc<dyn GenerationBackend>>,
        candidates: Vec<ModelCandidate>,
        local: LocalResponder,
    ) -> Self {
        Self {
            remote,
            candidates,
            attempt_timeout: Duration::from_secs(30),
            local,
            mode: ResolverModeHandle::default(),
        }
    }

    /// Build the Gemini-backed resolver described by `config`.
    ///
    /// A missing API key is not an error: the resolver starts without a
    /// remote backend and the first turn engages fallback mode.
    pub fn from_config(config: &TutorConfig) -> Self {
        let remote: Option<Arc<dyn GenerationBackend>> =
            match GeminiAdapter::from_config(&config.gemini) {
                Ok(adapter) => Some(Arc::new(adapter)),
                Err(e) => {
                    warn!(code = e.code(), "remote backend disabled: {}", e.message());
                    None
                }
            };
        Self::new(
            remote,
            config.gemini.models.clone(),
            LocalResponder::new(&config.fallback),
        )
        .with_attempt_timeout(config.gemini.request_timeout())
    }

    #[must_use]
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn mode(&self) -> ResolverMode {
        self.mode.mode()
    }

    pub fn mode_handle(&self) -> ResolverModeHandle {
        self.mode.clone()
    }

    /// Manual return to remote mode. Returns `true` if the mode changed.
    pub fn reset(&self) -> bool {
        self.mode.reset()
    }

    /// Resolve one turn without external cancellation.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::EmptyUtterance`] when there is neither text nor
    /// an image. Every other failure is absorbed by the local fallback.
    pub async fn resolve(
        &self,
        utterance: &Utterance,
        level: LearningLevel,
        emotion: Option<Emotion>,
    ) -> Result<Reply> {
        self.resolve_with_cancel(utterance, level, emotion, &CancellationToken::new())
            .await
    }

    /// Resolve one turn; cancelling `cancel` abandons the remote attempt.
    ///
    /// A cancelled turn is answered locally but does not engage fallback
    /// mode, since no candidate actually failed.
    ///
    /// # Errors
    ///
    /// Returns [`TutorError::EmptyUtterance`] when there is neither text nor
    /// an image.
    pub async fn resolve_with_cancel(
        &self,
        utterance: &Utterance,
        level: LearningLevel,
        emotion: Option<Emotion>,
        cancel: &CancellationToken,
    ) -> Result<Reply> {
        if utterance.is_empty() {
            return Err(TutorError::EmptyUtterance);
        }
        let audience = level.audience();

        if self.mode.is_fallback() {
            debug!("fallback mode active; skipping remote candidates");
            return Ok(self.answer_locally(audience, utterance).await);
        }

        let question = match utterance.text.trim() {
            "" => IMAGE_ONLY_QUESTION,
            text => text,
        };
        let prompt = build_prompt(audience, emotion, question);
        let mut chain = CandidateChain::new(&self.candidates);

        if let Some(backend) = &self.remote {
            while let Some(candidate) = chain.next_candidate() {
                if cancel.is_cancelled() {
                    info!("turn cancelled; answering locally");
                    return Ok(self.answer_locally(audience, utterance).await);
                }
                debug!(
                    model = candidate.name.as_str(),
                    audience = audience.as_str(),
                    "trying candidate"
                );
                match self
                    .attempt(backend.as_ref(), candidate, &prompt, utterance, cancel)
                    .await
                {
                    AttemptOutcome::Success(text) => {
                        info!(model = candidate.name.as_str(), "candidate answered");
                        return Ok(Reply {
                            text,
                            source: ReplySource::Remote {
                                model: candidate.name.clone(),
                            },
                        });
                    }
                    AttemptOutcome::Failure(LlmError::Cancelled(_)) => {
                        info!("turn cancelled; answering locally");
                        return Ok(self.answer_locally(audience, utterance).await);
                    }
                    AttemptOutcome::Failure(e) => chain.report_failure(e),
                }
            }
        }

        if self.mode.engage_fallback() {
            warn!(
                attempted = chain.failures().len(),
                remote = self.remote.is_some(),
                "all remote candidates failed; switching to fallback mode"
            );
        }
        Ok(self.answer_locally(audience, utterance).await)
    }

    async fn attempt(
        &self,
        backend: &dyn GenerationBackend,
        candidate: &ModelCandidate,
        prompt: &str,
        utterance: &Utterance,
        cancel: &CancellationToken,
    ) -> AttemptOutcome {
        let image = utterance.image.as_ref().filter(|_| candidate.accepts_images);
        if utterance.text.trim().is_empty() && image.is_none() {
            return AttemptOutcome::Failure(LlmError::UnsupportedModel(format!(
                "{} does not accept images",
                candidate.name
            )));
        }

        let request = GenerationRequest {
            model: &candidate.name,
            prompt,
            image,
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                AttemptOutcome::Failure(LlmError::Cancelled("turn cancelled".into()))
            }
            result = tokio::time::timeout(self.attempt_timeout, backend.generate(request)) => {
                match result {
                    Ok(Ok(text)) => AttemptOutcome::Success(text),
                    Ok(Err(e)) => AttemptOutcome::Failure(e),
                    Err(_) => AttemptOutcome::Failure(LlmError::TimeoutError(format!(
                        "no reply within {}s",
                        self.attempt_timeout.as_secs_f32()
                    ))),
                }
            }
        }
    }

    async fn answer_locally(
        &self,
        audience: crate::level::AudienceLevel,
        utterance: &Utterance,
    ) -> Reply {
        Reply {
            text: self.local.respond(audience, utterance).await,
            source: ReplySource::Fallback,
        }
    }
}
