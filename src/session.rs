//! One learner's tutoring session.
//!
//! [`TutorSession`] owns the conversation store, the response resolver and
//! the voice adapter, and runs a turn end to end: record the question,
//! resolve a reply, record the reply, unlock whatever the new stats earn.
//! At most one turn runs at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::attachment::ImageAttachment;
use crate::config::TutorConfig;
use crate::error::{Result, TutorError};
use crate::level::{Emotion, LearningLevel};
use crate::resolver::{Reply, ResolverMode, ResponseResolver, Utterance};
use crate::store::achievements::newly_unlocked;
use crate::store::{Action, AppState, ChatMessage, ConversationStore, Role, StatsPatch};
use crate::voice::VoiceAdapter;

/// Shown in place of a reply when a turn fails outright.
pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again.";

/// Clears the busy flag and the turn's cancel token when the turn ends,
/// however it ends.
struct TurnGuard<'a> {
    busy: &'a AtomicBool,
    cancel: &'a Mutex<Option<CancellationToken>>,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        *self.cancel.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.busy.store(false, Ordering::Release);
    }
}

pub struct TutorSession {
    store: Mutex<ConversationStore>,
    resolver: ResponseResolver,
    voice: VoiceAdapter,
    emotion: Mutex<Emotion>,
    busy: AtomicBool,
    turn_cancel: Mutex<Option<CancellationToken>>,
}

impl std::fmt::Debug for TutorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorSession")
            .field("resolver", &self.resolver)
            .field("voice", &self.voice)
            .field("processing", &self.is_processing())
            .finish()
    }
}

impl TutorSession {
    pub fn new(resolver: ResponseResolver, voice: VoiceAdapter) -> Self {
        Self {
            store: Mutex::new(ConversationStore::new()),
            resolver,
            voice,
            emotion: Mutex::new(Emotion::default()),
            busy: AtomicBool::new(false),
            turn_cancel: Mutex::new(None),
        }
    }

    /// Session wired to Gemini and the configured speech command.
    pub fn from_config(config: &TutorConfig) -> Self {
        Self::new(
            ResponseResolver::from_config(config),
            VoiceAdapter::from_config(&config.voice),
        )
    }

    fn store(&self) -> MutexGuard<'_, ConversationStore> {
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply one action to the conversation store.
    pub fn dispatch(&self, action: Action) {
        self.store().dispatch(action);
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.store().state().clone()
    }

    pub fn learning_level(&self) -> LearningLevel {
        self.store().state().learning_level
    }

    pub fn emotion(&self) -> Emotion {
        *self.emotion.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Emotion hint sent with later turns.
    pub fn set_emotion(&self, emotion: Emotion) {
        *self.emotion.lock().unwrap_or_else(|e| e.into_inner()) = emotion;
    }

    pub fn is_processing(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn using_fallback(&self) -> bool {
        self.resolver.mode() == ResolverMode::FallbackActive
    }

    /// Leave fallback mode so the next turn tries remote models again.
    pub fn reset_to_remote(&self) -> bool {
        self.resolver.reset()
    }

    /// Abandon the remote attempt of the turn in flight, if any.
    pub fn cancel_turn(&self) -> bool {
        match self
            .turn_cancel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn voice(&self) -> &VoiceAdapter {
        &self.voice
    }

    /// Claim the session for one turn.
    fn begin_turn(&self) -> Result<TurnGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TutorError::TurnInProgress);
        }
        Ok(TurnGuard {
            busy: &self.busy,
            cancel: &self.turn_cancel,
        })
    }

    /// Run one turn.
    ///
    /// # Errors
    ///
    /// [`TutorError::EmptyUtterance`] for a turn with neither text nor image,
    /// [`TutorError::TurnInProgress`] while another turn is running. A turn
    /// that fails after it was recorded also leaves an apology in history.
    pub async fn send_message(
        &self,
        text: impl Into<String>,
        image: Option<ImageAttachment>,
    ) -> Result<Reply> {
        let utterance = Utterance {
            text: text.into(),
            image,
        };
        if utterance.is_empty() {
            return Err(TutorError::EmptyUtterance);
        }
        let _turn = self.begin_turn()?;
        self.run_turn(&utterance).await
    }

    /// Resolve `utterance` with the turn already claimed.
    async fn run_turn(&self, utterance: &Utterance) -> Result<Reply> {
        let (level, sent_before) = {
            let mut store = self.store();
            let level = store.state().learning_level;
            let sent_before = store.state().user_stats.messages_sent;
            store.dispatch(Action::AddChatMessage(ChatMessage::user(
                history_text(utterance),
                level,
            )));
            (level, sent_before)
        };

        let cancel = CancellationToken::new();
        *self.turn_cancel.lock().unwrap_or_else(|e| e.into_inner()) = Some(cancel.clone());
        let resolved = self
            .resolver
            .resolve_with_cancel(utterance, level, Some(self.emotion()), &cancel)
            .await;

        let mut store = self.store();
        let reply_text = match &resolved {
            Ok(reply) => {
                debug!(source = ?reply.source, "turn resolved");
                reply.text.as_str()
            }
            Err(e) => {
                warn!("turn failed: {e}");
                APOLOGY
            }
        };
        store.dispatch(Action::AddChatMessage(ChatMessage::ai(reply_text, level)));
        // One question and its reply count as a single sent message.
        store.dispatch(Action::UpdateUserStats(StatsPatch {
            messages_sent: Some(sent_before.saturating_add(1)),
            ..StatsPatch::default()
        }));
        sync_achievements(&mut store);
        resolved
    }

    /// Listen for one spoken question and answer it.
    ///
    /// The session stays busy while listening, so a typed turn cannot start
    /// mid-listen. Returns `Ok(None)` when nothing was said.
    ///
    /// # Errors
    ///
    /// [`TutorError::TurnInProgress`] while a turn is running, plus any
    /// voice or turn error.
    pub async fn voice_turn(&self) -> Result<Option<Reply>> {
        let _turn = self.begin_turn()?;
        let transcript = self.voice.start_listening().await?;
        let transcript = transcript.trim();
        if transcript.is_empty() {
            debug!("empty transcript; no turn");
            return Ok(None);
        }
        self.run_turn(&Utterance::text(transcript)).await.map(Some)
    }

    /// Read the latest tutor reply aloud. Returns `false` if there is none.
    ///
    /// # Errors
    ///
    /// Any error from the voice adapter.
    pub async fn speak_last_reply(&self) -> Result<bool> {
        let last = self
            .store()
            .state()
            .chat_history
            .iter()
            .rev()
            .find(|m| m.role == Role::Ai)
            .map(|m| m.content.clone());
        match last {
            Some(text) => {
                self.voice.speak(&text).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

fn history_text(utterance: &Utterance) -> String {
    let text = utterance.text.trim();
    match (&utterance.image, text.is_empty()) {
        (Some(image), true) => format!(
            "[image: {}]",
            image.name.as_deref().unwrap_or("attachment")
        ),
        _ => text.to_owned(),
    }
}

fn sync_achievements(store: &mut ConversationStore) {
    for id in newly_unlocked(store.state()) {
        info!(achievement = id.as_str(), "achievement unlocked");
        store.dispatch(Action::UpdateAchievement { id, unlocked: true });
    }
}
