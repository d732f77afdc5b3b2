//! State owned by the conversation store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::level::{ActiveTab, LearningLevel};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// One entry in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Level that was active when the message was sent.
    pub learning_level: LearningLevel,
}

impl ChatMessage {
    /// A message typed or spoken by the learner.
    pub fn user(content: impl Into<String>, learning_level: LearningLevel) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            learning_level,
        }
    }

    /// A reply from the tutor.
    pub fn ai(content: impl Into<String>, learning_level: LearningLevel) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
            timestamp: Utc::now(),
            learning_level,
        }
    }
}

/// Grouping shown on the achievements view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AchievementCategory {
    Learning,
    Engagement,
    Mastery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub unlocked: bool,
    pub icon: String,
    pub category: AchievementCategory,
}

impl Achievement {
    fn locked(
        id: &str,
        title: &str,
        description: &str,
        icon: &str,
        category: AchievementCategory,
    ) -> Self {
        Self {
            id: id.to_owned(),
            title: title.to_owned(),
            description: description.to_owned(),
            unlocked: false,
            icon: icon.to_owned(),
            category,
        }
    }
}

/// Counters that only ever move forward in normal use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub messages_sent: u32,
    pub lessons_completed: u32,
    pub current_streak: u32,
    pub total_points: u32,
}

/// Partial update for [`UserStats`]; `None` fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct StatsPatch {
    pub messages_sent: Option<u32>,
    pub lessons_completed: Option<u32>,
    pub current_streak: Option<u32>,
    pub total_points: Option<u32>,
}

impl UserStats {
    /// Merge `patch` into these stats.
    pub fn merge(&mut self, patch: &StatsPatch) {
        if let Some(v) = patch.messages_sent {
            self.messages_sent = v;
        }
        if let Some(v) = patch.lessons_completed {
            self.lessons_completed = v;
        }
        if let Some(v) = patch.current_streak {
            self.current_streak = v;
        }
        if let Some(v) = patch.total_points {
            self.total_points = v;
        }
    }
}

/// Interface language.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Spanish,
    French,
}

/// Chat font size in points. Serialized as the bare number.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl FontSize {
    pub fn points(self) -> u8 {
        match self {
            Self::Small => 14,
            Self::Medium => 16,
            Self::Large => 18,
        }
    }
}

impl TryFrom<u8> for FontSize {
    type Error = String;

    fn try_from(points: u8) -> Result<Self, Self::Error> {
        match points {
            14 => Ok(Self::Small),
            16 => Ok(Self::Medium),
            18 => Ok(Self::Large),
            other => Err(format!("unsupported font size {other} (expected 14, 16 or 18)")),
        }
    }
}

impl From<FontSize> for u8 {
    fn from(size: FontSize) -> Self {
        size.points()
    }
}

/// User-facing preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub notifications: bool,
    pub sound: bool,
    pub dark_mode: bool,
    pub auto_save: bool,
    pub language: Language,
    pub font_size: FontSize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            notifications: true,
            sound: true,
            dark_mode: false,
            auto_save: true,
            language: Language::English,
            font_size: FontSize::Medium,
        }
    }
}

/// Partial update for [`Settings`]; `None` fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub notifications: Option<bool>,
    pub sound: Option<bool>,
    pub dark_mode: Option<bool>,
    pub auto_save: Option<bool>,
    pub language: Option<Language>,
    pub font_size: Option<FontSize>,
}

impl Settings {
    /// Merge `patch` into these settings.
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.notifications {
            self.notifications = v;
        }
        if let Some(v) = patch.sound {
            self.sound = v;
        }
        if let Some(v) = patch.dark_mode {
            self.dark_mode = v;
        }
        if let Some(v) = patch.auto_save {
            self.auto_save = v;
        }
        if let Some(v) = patch.language {
            self.language = v;
        }
        if let Some(v) = patch.font_size {
            self.font_size = v;
        }
    }
}

/// Everything the front end renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub active_tab: ActiveTab,
    pub learning_level: LearningLevel,
    pub chat_history: Vec<ChatMessage>,
    pub achievements: Vec<Achievement>,
    pub settings: Settings,
    pub user_stats: UserStats,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_tab: ActiveTab::Learn,
            learning_level: LearningLevel::Intermediate,
            chat_history: Vec::new(),
            achievements: default_achievements(),
            settings: Settings::default(),
            user_stats: UserStats::default(),
        }
    }
}

/// The achievement catalogue a fresh session starts with.
pub fn default_achievements() -> Vec<Achievement> {
    vec![
        Achievement::locked(
            "first-steps",
            "First Steps",
            "Send your first message",
            "🎯",
            AchievementCategory::Engagement,
        ),
        Achievement::locked(
            "quick-learner",
            "Quick Learner",
            "Send 10 messages",
            "⚡",
            AchievementCategory::Learning,
        ),
        Achievement::locked(
            "knowledge-seeker",
            "Knowledge Seeker",
            "Ask 20 questions",
            "🔍",
            AchievementCategory::Learning,
        ),
    ]
}
