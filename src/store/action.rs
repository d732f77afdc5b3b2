//! Tagged actions accepted by the conversation store.

use serde::{Deserialize, Serialize};

use super::state::{ChatMessage, SettingsPatch, StatsPatch};
use crate::level::{ActiveTab, LearningLevel};

/// A single state transition request.
///
/// On the wire an action is `{"type": "ADD_CHAT_MESSAGE", "payload": {...}}`.
/// Any tag this build does not know deserializes to [`Action::Unknown`],
/// which the reducer ignores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetActiveTab(ActiveTab),
    SetLearningLevel(LearningLevel),
    AddChatMessage(ChatMessage),
    ClearChatHistory,
    UpdateAchievement { id: String, unlocked: bool },
    UpdateSettings(SettingsPatch),
    UpdateUserStats(StatsPatch),
    #[serde(other)]
    Unknown,
}

impl Action {
    /// Wire tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetActiveTab(_) => "SET_ACTIVE_TAB",
            Self::SetLearningLevel(_) => "SET_LEARNING_LEVEL",
            Self::AddChatMessage(_) => "ADD_CHAT_MESSAGE",
            Self::ClearChatHistory => "CLEAR_CHAT_HISTORY",
            Self::UpdateAchievement { .. } => "UPDATE_ACHIEVEMENT",
            Self::UpdateSettings(_) => "UPDATE_SETTINGS",
            Self::UpdateUserStats(_) => "UPDATE_USER_STATS",
            Self::Unknown => "UNKNOWN",
        }
    }
}
