//! Progress dashboard metrics, derived from state on every read.

use serde::Serialize;

use super::achievements::completion_percent;
use super::state::AppState;

/// Messages needed to fill the "messages sent" bar.
pub const MESSAGES_GOAL: u32 = 50;

/// Points needed to fill the "total points" bar.
pub const POINTS_GOAL: u32 = 1000;

/// One bar on the progress view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressMetric {
    pub label: &'static str,
    pub value: String,
    /// `0.0..=100.0`
    pub percent: f64,
    pub icon: &'static str,
}

fn capped_percent(value: u32, goal: u32) -> f64 {
    (f64::from(value) / f64::from(goal) * 100.0).min(100.0)
}

/// The four dashboard bars for `state`.
pub fn dashboard(state: &AppState) -> Vec<ProgressMetric> {
    let level = state.learning_level;
    let stats = &state.user_stats;
    let unlocked = state.achievements.iter().filter(|a| a.unlocked).count();

    vec![
        ProgressMetric {
            label: "Learning Level",
            value: level.display_name().to_owned(),
            percent: f64::from(level.ordinal()) / 4.0 * 100.0,
            icon: "🎓",
        },
        ProgressMetric {
            label: "Messages Sent",
            value: stats.messages_sent.to_string(),
            percent: capped_percent(stats.messages_sent, MESSAGES_GOAL),
            icon: "💬",
        },
        ProgressMetric {
            label: "Total Points",
            value: stats.total_points.to_string(),
            percent: capped_percent(stats.total_points, POINTS_GOAL),
            icon: "⭐",
        },
        ProgressMetric {
            label: "Achievements",
            value: format!("{unlocked}/{}", state.achievements.len()),
            percent: completion_percent(&state.achievements),
            icon: "🏆",
        },
    ]
}
