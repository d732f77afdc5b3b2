//! Conversation store: the single owner of tutor state.
//!
//! All mutation goes through [`ConversationStore::dispatch`], which applies
//! exactly one [`Action`] via the pure [`reduce`] function. The store does no
//! I/O of its own.

pub mod achievements;
pub mod action;
pub mod progress;
pub mod state;

pub use action::Action;
pub use state::{
    Achievement, AchievementCategory, AppState, ChatMessage, FontSize, Language, Role, Settings,
    SettingsPatch, StatsPatch, UserStats,
};

use tracing::debug;

/// Apply one action to `state`.
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::SetActiveTab(tab) => state.active_tab = tab,
        Action::SetLearningLevel(level) => state.learning_level = level,
        Action::AddChatMessage(message) => {
            state.chat_history.push(message);
            state.user_stats.messages_sent = state.user_stats.messages_sent.saturating_add(1);
        }
        Action::ClearChatHistory => state.chat_history.clear(),
        Action::UpdateAchievement { id, unlocked } => {
            let Some(achievement) = state.achievements.iter_mut().find(|a| a.id == id) else {
                debug!(id = id.as_str(), "ignoring update for unknown achievement");
                return;
            };
            if achievement.unlocked && !unlocked {
                debug!(id = id.as_str(), "achievements cannot be re-locked");
                return;
            }
            achievement.unlocked = unlocked;
        }
        Action::UpdateSettings(patch) => state.settings.merge(&patch),
        Action::UpdateUserStats(patch) => state.user_stats.merge(&patch),
        Action::Unknown => debug!("ignoring unrecognized action"),
    }
}

/// Owns an [`AppState`] and serializes every change through `dispatch`.
#[derive(Debug, Default)]
pub struct ConversationStore {
    state: AppState,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) {
        debug!(action = action.kind(), "dispatch");
        reduce(&mut self.state, action);
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}
