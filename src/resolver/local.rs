//! Local fallback responder.
//!
//! Picks one canned opener for the learner's audience tier uniformly at
//! random, echoes the question back, and flags the reply as a substitute.
//! A short random pause keeps perceived latency close to the remote path.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Mutex;
use std::time::Duration;

use super::Utterance;
use crate::config::FallbackConfig;
use crate::level::AudienceLevel;

/// Appended to every fallback reply.
pub const SUBSTITUTE_NOTICE: &str =
    "[Note: This is a local substitute response - the AI tutor service is currently unavailable]";

const CHILD_TEMPLATES: &[&str] = &[
    "That's a wonderful question! 🌟 Let me explain it in a fun and simple way...",
    "You're such a curious learner! 🦸 Here's how that works in a way you'll understand...",
    "I love your question! 🎯 Let me tell you an interesting story about this...",
    "What a great question! 🎉 Here's a simple explanation that will make perfect sense...",
];

const TEEN_TEMPLATES: &[&str] = &[
    "That's actually a really interesting topic. Here's how it works in the real world...",
    "Good thinking! This concept is used in many modern apps and technologies...",
    "I remember learning this too. The key thing to understand is...",
    "That's a smart question! Let me break it down in a way that makes sense...",
];

const COLLEGE_TEMPLATES: &[&str] = &[
    "From an academic perspective, this involves some fascinating concepts...",
    "The theoretical framework for this is quite interesting when examined closely...",
    "This topic has some compelling research behind it that's worth exploring...",
    "In academic settings, we approach this by considering multiple aspects...",
];

const EXPERT_TEMPLATES: &[&str] = &[
    "At a research level, this involves some sophisticated concepts and interactions...",
    "The current research in this area reveals some nuanced considerations...",
    "From a technical standpoint, this requires understanding some advanced principles...",
    "When we examine this at an expert level, we find several complex factors at play...",
];

/// Openers available for an audience tier.
pub fn templates(audience: AudienceLevel) -> &'static [&'static str] {
    match audience {
        AudienceLevel::Child => CHILD_TEMPLATES,
        AudienceLevel::Teen => TEEN_TEMPLATES,
        AudienceLevel::College => COLLEGE_TEMPLATES,
        AudienceLevel::Expert => EXPERT_TEMPLATES,
    }
}

/// Always-succeeding substitute for the remote backend.
#[derive(Debug)]
pub struct LocalResponder {
    rng: Mutex<StdRng>,
    delay_ms: RangeInclusive<u64>,
}

impl LocalResponder {
    /// Responder seeded from OS entropy with the configured delay window.
    pub fn new(config: &FallbackConfig) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            delay_ms: delay_window(config),
        }
    }

    /// Deterministic responder for tests and replays.
    pub fn seeded(seed: u64, config: &FallbackConfig) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            delay_ms: delay_window(config),
        }
    }

    /// Produce a substitute reply for `utterance`.
    pub async fn respond(&self, audience: AudienceLevel, utterance: &Utterance) -> String {
        let (opener, delay) = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            let opener = templates(audience)
                .choose(&mut *rng)
                .copied()
                .unwrap_or_default();
            let delay = rng.gen_range(self.delay_ms.clone());
            (opener, Duration::from_millis(delay))
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        format!(
            "{opener}\n\n{}\n\n{SUBSTITUTE_NOTICE}",
            acknowledgment(utterance)
        )
    }
}

fn delay_window(config: &FallbackConfig) -> RangeInclusive<u64> {
    let low = config.min_delay_ms.min(config.max_delay_ms);
    let high = config.min_delay_ms.max(config.max_delay_ms);
    low..=high
}

fn acknowledgment(utterance: &Utterance) -> String {
    let text = utterance.text.trim();
    match (&utterance.image, text.is_empty()) {
        (Some(image), true) => {
            let name = image.name.as_deref().unwrap_or("an image");
            format!("You shared: {name}")
        }
        (Some(image), false) => {
            let name = image.name.as_deref().unwrap_or("an image");
            format!("You asked: \"{text}\" (with {name})")
        }
        (None, _) => format!("You asked: \"{text}\""),
    }
}
