//! Voice input and output.
//!
//! [`VoicePlatform`] is the seam to whatever speech engine the host offers.
//! [`VoiceAdapter`] wraps a platform and enforces the rules the rest of the
//! tutor relies on: capabilities are checked before use, only one listen is
//! outstanding at a time, and starting speech cancels whatever is playing.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::VoiceConfig;
use crate::error::{Result, TutorError};

/// Platform speech capabilities.
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    fn name(&self) -> &str;

    fn supports_recognition(&self) -> bool;

    fn supports_synthesis(&self) -> bool;

    /// Wait for one finalized transcript.
    ///
    /// When `stop` fires, return whatever partial transcript is available,
    /// possibly empty.
    async fn listen(&self, stop: CancellationToken) -> Result<String>;

    /// Start speaking `text`. Returns once playback has started.
    async fn speak(&self, text: &str) -> Result<()>;

    /// Stop any current playback. No-op when nothing is playing.
    async fn cancel_speech(&self);
}

/// Rule-enforcing wrapper around a [`VoicePlatform`].
pub struct VoiceAdapter {
    platform: Arc<dyn VoicePlatform>,
    listening: Mutex<Option<CancellationToken>>,
}

impl std::fmt::Debug for VoiceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceAdapter")
            .field("platform", &self.platform.name())
            .field("listening", &self.is_listening())
            .finish()
    }
}

/// Clears the outstanding-listen slot even if the listen future is dropped.
struct ListenSlot<'a> {
    slot: &'a Mutex<Option<CancellationToken>>,
}

impl Drop for ListenSlot<'_> {
    fn drop(&mut self) {
        *self.slot.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

impl VoiceAdapter {
    pub fn new(platform: Arc<dyn VoicePlatform>) -> Self {
        Self {
            platform,
            listening: Mutex::new(None),
        }
    }

    /// Adapter with no capabilities.
    pub fn silent() -> Self {
        Self::new(Arc::new(SilentPlatform))
    }

    /// Speech output through the configured command, or silence when the
    /// command is empty.
    pub fn from_config(config: &VoiceConfig) -> Self {
        match CommandSpeech::from_config(config) {
            Some(speech) => Self::new(Arc::new(speech)),
            None => Self::silent(),
        }
    }

    pub fn supports_recognition(&self) -> bool {
        self.platform.supports_recognition()
    }

    pub fn supports_synthesis(&self) -> bool {
        self.platform.supports_synthesis()
    }

    pub fn is_listening(&self) -> bool {
        self.listening
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Listen for one transcript.
    ///
    /// # Errors
    ///
    /// [`TutorError::VoiceUnsupported`] without recognition support,
    /// [`TutorError::ListenInProgress`] if another listen is outstanding, or
    /// whatever the platform reports.
    pub async fn start_listening(&self) -> Result<String> {
        if !self.platform.supports_recognition() {
            return Err(TutorError::VoiceUnsupported("recognition"));
        }

        let stop = {
            let mut slot = self.listening.lock().unwrap_or_else(|e| e.into_inner());
            if slot.is_some() {
                return Err(TutorError::ListenInProgress);
            }
            let token = CancellationToken::new();
            *slot = Some(token.clone());
            token
        };
        let _slot = ListenSlot {
            slot: &self.listening,
        };

        debug!(platform = self.platform.name(), "listening");
        let transcript = self.platform.listen(stop).await?;
        debug!(chars = transcript.len(), "transcript received");
        Ok(transcript)
    }

    /// Stop an in-flight listen. Returns `false` when nothing was listening.
    pub fn stop_listening(&self) -> bool {
        match self
            .listening
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

    /// Speak `text`, cutting off anything already playing.
    ///
    /// Blank text is ignored.
    ///
    /// # Errors
    ///
    /// [`TutorError::VoiceUnsupported`] without synthesis support, or
    /// whatever the platform reports.
    pub async fn speak(&self, text: &str) -> Result<()> {
        if !self.platform.supports_synthesis() {
            return Err(TutorError::VoiceUnsupported("synthesis"));
        }
        let text = text.trim();
        if text.is_empty() {
            debug!("skipping empty utterance");
            return Ok(());
        }
        self.platform.cancel_speech().await;
        self.platform.speak(text).await
    }

    pub async fn cancel_speech(&self) {
        self.platform.cancel_speech().await;
    }
}

/// Platform with no speech support at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentPlatform;

#[async_trait]
impl VoicePlatform for SilentPlatform {
    fn name(&self) -> &str {
        "silent"
    }

    fn supports_recognition(&self) -> bool {
        false
    }

    fn supports_synthesis(&self) -> bool {
        false
    }

    async fn listen(&self, _stop: CancellationToken) -> Result<String> {
        Err(TutorError::VoiceUnsupported("recognition"))
    }

    async fn speak(&self, _text: &str) -> Result<()> {
        Err(TutorError::VoiceUnsupported("synthesis"))
    }

    async fn cancel_speech(&self) {}
}

/// Speech output through a system synthesizer command (`say`, `espeak`).
///
/// Output only; recognition is unsupported.
#[derive(Debug)]
pub struct CommandSpeech {
    program: String,
    rate_wpm: u32,
    current: tokio::sync::Mutex<Option<Child>>,
}

impl CommandSpeech {
    pub fn new(program: impl Into<String>, rate_wpm: u32) -> Self {
        Self {
            program: program.into(),
            rate_wpm,
            current: tokio::sync::Mutex::new(None),
        }
    }

    /// `None` when no command is configured.
    pub fn from_config(config: &VoiceConfig) -> Option<Self> {
        let program = config.command.trim();
        if program.is_empty() {
            return None;
        }
        Some(Self::new(program, config.rate_wpm))
    }

    fn rate_flag(&self) -> &'static str {
        let base = std::path::Path::new(&self.program)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        if base == "say" { "-r" } else { "-s" }
    }
}

#[async_trait]
impl VoicePlatform for CommandSpeech {
    fn name(&self) -> &str {
        &self.program
    }

    fn supports_recognition(&self) -> bool {
        false
    }

    fn supports_synthesis(&self) -> bool {
        true
    }

    async fn listen(&self, _stop: CancellationToken) -> Result<String> {
        Err(TutorError::VoiceUnsupported("recognition"))
    }

    async fn speak(&self, text: &str) -> Result<()> {
        let mut current = self.current.lock().await;
        if let Some(mut previous) = current.take() {
            if let Err(e) = previous.kill().await {
                warn!(program = self.program.as_str(), "failed to stop previous speech: {e}");
            }
        }

        let child = Command::new(&self.program)
            .arg(self.rate_flag())
            .arg(self.rate_wpm.to_string())
            .arg(text)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TutorError::Voice(format!("failed to start {}: {e}", self.program)))?;
        *current = Some(child);
        Ok(())
    }

    async fn cancel_speech(&self) {
        let mut current = self.current.lock().await;
        if let Some(mut child) = current.take() {
            if let Err(e) = child.kill().await {
                warn!(program = self.program.as_str(), "failed to stop speech: {e}");
            }
        }
    }
}
