//! Learning levels, audience tiers, emotion hints and navigation tabs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier chosen by the user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LearningLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

impl LearningLevel {
    /// Every level in ascending order.
    pub const ALL: [LearningLevel; 4] = [
        LearningLevel::Beginner,
        LearningLevel::Intermediate,
        LearningLevel::Advanced,
        LearningLevel::Expert,
    ];

    /// The audience tier the remote backend and fallback templates use.
    pub fn audience(self) -> AudienceLevel {
        match self {
            Self::Beginner => AudienceLevel::Child,
            Self::Intermediate => AudienceLevel::Teen,
            Self::Advanced => AudienceLevel::College,
            Self::Expert => AudienceLevel::Expert,
        }
    }

    /// Position on the level dial, `1..=4`.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Beginner => 1,
            Self::Intermediate => 2,
            Self::Advanced => 3,
            Self::Expert => 4,
        }
    }

    /// Name shown on the level dial.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Beginner => "Young Learner",
            Self::Intermediate => "High School",
            Self::Advanced => "University",
            Self::Expert => "Advanced",
        }
    }

    /// One-line description shown under the dial.
    pub fn description(self) -> &'static str {
        match self {
            Self::Beginner => "Ages 6-12: Basic concepts with fun examples",
            Self::Intermediate => "Ages 13-18: Real-world examples and modern references",
            Self::Advanced => "Ages 18-22: Advanced concepts and critical thinking",
            Self::Expert => "Ages 22+: Expert-level analysis and research",
        }
    }

    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for LearningLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            "expert" => Ok(Self::Expert),
            other => Err(format!("unknown learning level: {other}")),
        }
    }
}

/// Audience tier used when talking to the generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceLevel {
    Child,
    Teen,
    College,
    Expert,
}

impl AudienceLevel {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Teen => "teen",
            Self::College => "college",
            Self::Expert => "expert",
        }
    }
}

/// Emotional state hint attached to a turn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Curious,
    Confused,
    Frustrated,
    Excited,
    Neutral,
    Engaged,
    Bored,
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "curious" => Ok(Self::Curious),
            "confused" => Ok(Self::Confused),
            "frustrated" => Ok(Self::Frustrated),
            "excited" => Ok(Self::Excited),
            "neutral" => Ok(Self::Neutral),
            "engaged" => Ok(Self::Engaged),
            "bored" => Ok(Self::Bored),
            other => Err(format!("unknown emotion: {other}")),
        }
    }
}

/// Navigable view of the front end.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveTab {
    #[default]
    Learn,
    Progress,
    Achievements,
    Settings,
}

impl FromStr for ActiveTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "learn" => Ok(Self::Learn),
            "progress" => Ok(Self::Progress),
            "achievements" => Ok(Self::Achievements),
            "settings" => Ok(Self::Settings),
            other => Err(format!("unknown tab: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_one_to_one_onto_audiences() {
        let audiences: Vec<AudienceLevel> =
            LearningLevel::ALL.iter().map(|l| l.audience()).collect();
        assert_eq!(
            audiences,
            vec![
                AudienceLevel::Child,
                AudienceLevel::Teen,
                AudienceLevel::College,
                AudienceLevel::Expert
            ]
        );
    }

    #[test]
    fn ordinals_ascend() {
        let ordinals: Vec<u8> = LearningLevel::ALL.iter().map(|l| l.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4]);
    }

    #[test]
    fn default_level_is_intermediate() {
        assert_eq!(LearningLevel::default(), LearningLevel::Intermediate);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Expert".parse::<LearningLevel>(), Ok(LearningLevel::Expert));
        assert_eq!(" bored ".parse::<Emotion>(), Ok(Emotion::Bored));
        assert_eq!("SETTINGS".parse::<ActiveTab>(), Ok(ActiveTab::Settings));
        assert!("wizard".parse::<LearningLevel>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&LearningLevel::Advanced).unwrap_or_default();
        assert_eq!(json, "\"advanced\"");
        let tab: ActiveTab = serde_json::from_str("\"achievements\"").unwrap_or_default();
        assert_eq!(tab, ActiveTab::Achievements);
    }
}
