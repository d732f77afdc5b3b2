//! End-to-end session turns over in-process backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tutor::config::{FallbackConfig, ModelCandidate};
use tutor::llm::{GenerationBackend, GenerationRequest, LlmError};
use tutor::resolver::LocalResponder;
use tutor::store::{FontSize, Language, Role, SettingsPatch};
use tutor::voice::VoicePlatform;
use tutor::{
    Action, LearningLevel, ReplySource, ResponseResolver, TutorError, TutorSession, VoiceAdapter,
};

/// Answers only after `release` is notified.
struct GatedBackend {
    release: Notify,
}

#[async_trait]
impl GenerationBackend for GatedBackend {
    fn name(&self) -> &str {
        "gated"
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> Result<String, LlmError> {
        self.release.notified().await;
        Ok(format!("{} says hello", request.model))
    }
}

struct EchoBackend;

#[async_trait]
impl GenerationBackend for EchoBackend {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, _request: GenerationRequest<'_>) -> Result<String, LlmError> {
        Ok("remote answer".into())
    }
}

/// Hears a fixed transcript; speaks into a log.
struct ScriptedVoice {
    transcript: String,
    spoken: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl VoicePlatform for ScriptedVoice {
    fn name(&self) -> &str {
        "scripted"
    }

    fn supports_recognition(&self) -> bool {
        true
    }

    fn supports_synthesis(&self) -> bool {
        true
    }

    async fn listen(&self, _stop: CancellationToken) -> tutor::Result<String> {
        Ok(self.transcript.clone())
    }

    async fn speak(&self, text: &str) -> tutor::Result<()> {
        self.spoken.lock().unwrap().push(text.to_owned());
        Ok(())
    }

    async fn cancel_speech(&self) {}
}

fn instant_local() -> LocalResponder {
    LocalResponder::seeded(
        3,
        &FallbackConfig {
            min_delay_ms: 0,
            max_delay_ms: 0,
        },
    )
}

fn session_with(backend: Arc<dyn GenerationBackend>, voice: VoiceAdapter) -> TutorSession {
    TutorSession::new(
        ResponseResolver::new(Some(backend), vec![ModelCandidate::text("m")], instant_local()),
        voice,
    )
}

#[tokio::test]
async fn second_turn_is_rejected_while_first_is_pending() {
    let backend = Arc::new(GatedBackend {
        release: Notify::new(),
    });
    let session = Arc::new(session_with(backend.clone(), VoiceAdapter::silent()));

    let first = {
        let session = session.clone();
        tokio::spawn(async move { session.send_message("first", None).await })
    };
    while !session.is_processing() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let err = session.send_message("second", None).await.unwrap_err();
    assert!(matches!(err, TutorError::TurnInProgress));

    backend.release.notify_one();
    let reply = first.await.unwrap().unwrap();
    assert_eq!(reply.text, "m says hello");
    assert!(!session.is_processing());

    let history = session.snapshot().chat_history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "first");
}

#[tokio::test]
async fn cancelled_turn_is_answered_locally() {
    let backend = Arc::new(GatedBackend {
        release: Notify::new(),
    });
    let session = Arc::new(session_with(backend, VoiceAdapter::silent()));

    let turn = {
        let session = session.clone();
        tokio::spawn(async move { session.send_message("slow question", None).await })
    };
    while !session.cancel_turn() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let reply = turn.await.unwrap().unwrap();
    assert_eq!(reply.source, ReplySource::Fallback);
    assert!(!session.using_fallback());
}

#[tokio::test]
async fn messages_carry_the_level_at_send_time() {
    let session = session_with(Arc::new(EchoBackend), VoiceAdapter::silent());

    session.send_message("one", None).await.unwrap();
    session.dispatch(Action::SetLearningLevel(LearningLevel::Expert));
    session.send_message("two", None).await.unwrap();

    let state = session.snapshot();
    let levels: Vec<_> = state.chat_history.iter().map(|m| m.learning_level).collect();
    assert_eq!(
        levels,
        vec![
            LearningLevel::Intermediate,
            LearningLevel::Intermediate,
            LearningLevel::Expert,
            LearningLevel::Expert,
        ]
    );
    assert_eq!(state.user_stats.messages_sent, 2);
}

#[tokio::test]
async fn clearing_history_keeps_stats_and_achievements() {
    let session = session_with(Arc::new(EchoBackend), VoiceAdapter::silent());
    session.send_message("hi", None).await.unwrap();
    session.dispatch(Action::ClearChatHistory);

    let state = session.snapshot();
    assert!(state.chat_history.is_empty());
    assert_eq!(state.user_stats.messages_sent, 1);
    assert!(state.achievements.iter().any(|a| a.id == "first-steps" && a.unlocked));
}

#[tokio::test]
async fn settings_patch_touches_only_named_keys() {
    let session = session_with(Arc::new(EchoBackend), VoiceAdapter::silent());
    let before = session.snapshot().settings;

    session.dispatch(Action::UpdateSettings(SettingsPatch {
        font_size: Some(FontSize::Large),
        ..SettingsPatch::default()
    }));

    let after = session.snapshot().settings;
    assert_eq!(after.font_size, FontSize::Large);
    assert_eq!(after.language, Language::English);
    assert_eq!(after.notifications, before.notifications);
    assert_eq!(after.dark_mode, before.dark_mode);
}

#[tokio::test]
async fn voice_turn_sends_transcript_and_speaks_reply() {
    let platform = Arc::new(ScriptedVoice {
        transcript: "  what is a cell?  ".into(),
        spoken: std::sync::Mutex::new(Vec::new()),
    });
    let session = session_with(Arc::new(EchoBackend), VoiceAdapter::new(platform.clone()));

    let reply = session.voice_turn().await.unwrap().unwrap();
    assert_eq!(reply.text, "remote answer");
    let state = session.snapshot();
    assert_eq!(state.chat_history[0].role, Role::User);
    assert_eq!(state.chat_history[0].content, "what is a cell?");

    assert!(session.speak_last_reply().await.unwrap());
    assert_eq!(*platform.spoken.lock().unwrap(), vec!["remote answer"]);
}

#[tokio::test]
async fn silent_transcript_starts_no_turn() {
    let platform = Arc::new(ScriptedVoice {
        transcript: "   ".into(),
        spoken: std::sync::Mutex::new(Vec::new()),
    });
    let session = session_with(Arc::new(EchoBackend), VoiceAdapter::new(platform));

    assert!(session.voice_turn().await.unwrap().is_none());
    assert!(session.snapshot().chat_history.is_empty());
}

/// Hears nothing until stopped, then returns the scripted words.
struct StoppableVoice {
    words: String,
}

#[async_trait]
impl VoicePlatform for StoppableVoice {
    fn name(&self) -> &str {
        "stoppable"
    }

    fn supports_recognition(&self) -> bool {
        true
    }

    fn supports_synthesis(&self) -> bool {
        false
    }

    async fn listen(&self, stop: CancellationToken) -> tutor::Result<String> {
        stop.cancelled().await;
        Ok(self.words.clone())
    }

    async fn speak(&self, _text: &str) -> tutor::Result<()> {
        Err(TutorError::VoiceUnsupported("synthesis"))
    }

    async fn cancel_speech(&self) {}
}

#[tokio::test]
async fn typed_turn_is_rejected_while_listening() {
    let voice = VoiceAdapter::new(Arc::new(StoppableVoice {
        words: "why is ice slippery?".into(),
    }));
    let session = Arc::new(session_with(Arc::new(EchoBackend), voice));

    let listening = {
        let session = session.clone();
        tokio::spawn(async move { session.voice_turn().await })
    };
    while !session.voice().is_listening() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert!(session.is_processing());

    let err = session.send_message("typed meanwhile", None).await.unwrap_err();
    assert!(matches!(err, TutorError::TurnInProgress));

    assert!(session.voice().stop_listening());
    let reply = listening.await.unwrap().unwrap().unwrap();
    assert_eq!(reply.text, "remote answer");

    let history = session.snapshot().chat_history;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "why is ice slippery?");
    assert!(!session.is_processing());
}
