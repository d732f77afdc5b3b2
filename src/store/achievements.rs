//! Achievement unlock rules.
//!
//! Unlock state and progress are pure functions of [`UserStats`]; nothing
//! here is cached, so the values can never drift from the counters.

use super::state::{Achievement, AppState, UserStats};

/// A message-count threshold that unlocks one achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockRule {
    pub id: &'static str,
    pub messages_required: u32,
}

/// Rules for the built-in catalogue.
pub const RULES: &[UnlockRule] = &[
    UnlockRule {
        id: "first-steps",
        messages_required: 1,
    },
    UnlockRule {
        id: "quick-learner",
        messages_required: 10,
    },
    UnlockRule {
        id: "knowledge-seeker",
        messages_required: 20,
    },
];

fn rule(id: &str) -> Option<&'static UnlockRule> {
    RULES.iter().find(|r| r.id == id)
}

/// Whether the stats satisfy the rule for `id`. Unknown ids are never earned.
pub fn is_earned(id: &str, stats: &UserStats) -> bool {
    rule(id).is_some_and(|r| stats.messages_sent >= r.messages_required)
}

/// Progress toward `id` as a percentage in `0.0..=100.0`.
pub fn achievement_progress(id: &str, stats: &UserStats) -> f64 {
    let Some(rule) = rule(id) else {
        return 0.0;
    };
    let ratio = f64::from(stats.messages_sent) / f64::from(rule.messages_required);
    ratio.min(1.0) * 100.0
}

/// Ids whose rule is satisfied but whose stored flag is still locked.
pub fn newly_unlocked(state: &AppState) -> Vec<String> {
    state
        .achievements
        .iter()
        .filter(|a| !a.unlocked && is_earned(&a.id, &state.user_stats))
        .map(|a| a.id.clone())
        .collect()
}

/// Share of unlocked achievements, `0.0..=100.0`.
pub fn completion_percent(achievements: &[Achievement]) -> f64 {
    if achievements.is_empty() {
        return 0.0;
    }
    let unlocked = achievements.iter().filter(|a| a.unlocked).count();
    unlocked as f64 / achievements.len() as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::state::default_achievements;

    fn stats(messages_sent: u32) -> UserStats {
        UserStats {
            messages_sent,
            ..UserStats::default()
        }
    }

    #[test]
    fn thresholds_unlock_at_one_ten_twenty() {
        assert!(!is_earned("first-steps", &stats(0)));
        assert!(is_earned("first-steps", &stats(1)));
        assert!(!is_earned("quick-learner", &stats(9)));
        assert!(is_earned("quick-learner", &stats(10)));
        assert!(!is_earned("knowledge-seeker", &stats(19)));
        assert!(is_earned("knowledge-seeker", &stats(20)));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let s = stats(12);
        let first: Vec<bool> = RULES.iter().map(|r| is_earned(r.id, &s)).collect();
        let second: Vec<bool> = RULES.iter().map(|r| is_earned(r.id, &s)).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![true, true, false]);
    }

    #[test]
    fn progress_caps_at_one_hundred() {
        assert!((achievement_progress("quick-learner", &stats(5)) - 50.0).abs() < f64::EPSILON);
        assert!((achievement_progress("first-steps", &stats(40)) - 100.0).abs() < f64::EPSILON);
        assert!(achievement_progress("unknown", &stats(40)).abs() < f64::EPSILON);
    }

    #[test]
    fn newly_unlocked_skips_already_unlocked() {
        let mut state = AppState {
            user_stats: stats(10),
            ..AppState::default()
        };
        assert_eq!(newly_unlocked(&state), vec!["first-steps", "quick-learner"]);

        state.achievements[0].unlocked = true;
        assert_eq!(newly_unlocked(&state), vec!["quick-learner"]);
    }

    #[test]
    fn completion_counts_unlocked_share() {
        let mut achievements = default_achievements();
        assert!(completion_percent(&achievements).abs() < f64::EPSILON);
        achievements[0].unlocked = true;
        let pct = completion_percent(&achievements);
        assert!((pct - 100.0 / 3.0).abs() < 1e-9);
        assert!(completion_percent(&[]).abs() < f64::EPSILON);
    }
}
