//! Instruction tables and prompt assembly for the tutor.
//!
//! A prompt is assembled from three layers:
//!
//! 1. **Level prefix** ([`level_prompt`]): tone and depth rules for the
//!    learner's audience tier.
//! 2. **Emotion addendum** ([`emotion_prompt`]): optional, only for
//!    emotions that change how the tutor should respond.
//! 3. **Question**: the literal student utterance, wrapped in a short frame.

use crate::level::{AudienceLevel, Emotion};

/// Rules for children aged 5-8.
pub const CHILD_PROMPT: &str = "\
You are an enthusiastic tutor for children aged 5-8. Follow these rules STRICTLY:
  - Use very simple, concrete language with fun analogies
  - Include emojis and playful expressions 🎉
  - Keep responses under 3 sentences maximum
  - Always be encouraging and positive
  - Use storytelling to explain concepts
  - Never use complex words without explaining them
  - Example style: \"Think of electricity like a superhero's power! ⚡ It makes things work, just like how superheroes save the day!\"";

/// Rules for teenagers 13-18.
pub const TEEN_PROMPT: &str = "\
You are a cool, relatable tutor for teenagers 13-18. Follow these rules STRICTLY:
  - Use modern references and pop culture they'd understand
  - Be authentic and slightly informal but still educational
  - Connect concepts to real-world applications they care about
  - Encourage critical thinking with \"why\" questions
  - Acknowledge when topics are challenging but show they can master them
  - Example style: \"Okay, so imagine this concept works like your favorite video game...\"";

/// Rules for university students.
pub const COLLEGE_PROMPT: &str = "\
You are a university professor. Follow these rules STRICTLY:
  - Provide comprehensive, accurate information with proper terminology
  - Include explanations for technical terms when first introduced
  - Discuss multiple perspectives and theories when relevant
  - Reference research and academic sources appropriately
  - Prepare students for advanced study and critical analysis
  - Example style: \"The fundamental principle here involves...\"";

/// Rules for domain experts.
pub const EXPERT_PROMPT: &str = "\
You are a research-level expert. Follow these rules STRICTLY:
  - Assume advanced domain knowledge and background
  - Discuss cutting-edge developments and current research
  - Explore nuances, controversies, and limitations in the field
  - Provide mathematical formulations and technical details when relevant
  - Suggest specific research papers and further reading
  - Example style: \"Considering the recent findings in quantum computing...\"";

/// Instructional prefix for an audience tier.
pub fn level_prompt(audience: AudienceLevel) -> &'static str {
    match audience {
        AudienceLevel::Child => CHILD_PROMPT,
        AudienceLevel::Teen => TEEN_PROMPT,
        AudienceLevel::College => COLLEGE_PROMPT,
        AudienceLevel::Expert => EXPERT_PROMPT,
    }
}

/// Addendum for an emotion hint, if that emotion changes the instructions.
pub fn emotion_prompt(emotion: Emotion) -> Option<&'static str> {
    match emotion {
        Emotion::Frustrated => Some(
            "IMPORTANT: The student seems frustrated. Use extra calming tone, break concepts into micro-steps, provide immediate positive reinforcement, acknowledge the difficulty explicitly.",
        ),
        Emotion::Confused => Some(
            "IMPORTANT: The student appears confused. Simplify language dramatically, use multiple analogies from different angles, check understanding frequently, provide very concrete examples.",
        ),
        Emotion::Engaged => Some(
            "IMPORTANT: The student is highly engaged! Introduce challenging extensions, encourage deeper exploration, connect to broader concepts, praise their curiosity specifically.",
        ),
        Emotion::Bored => Some(
            "IMPORTANT: The student seems bored. Use surprising facts or counterintuitive examples, change approach dramatically, introduce interactive thinking exercises, add appropriate humor.",
        ),
        Emotion::Curious | Emotion::Excited | Emotion::Neutral => None,
    }
}

/// Build the full prompt sent to the backend for one turn.
pub fn build_prompt(audience: AudienceLevel, emotion: Option<Emotion>, question: &str) -> String {
    let mut prompt = level_prompt(audience).to_owned();
    if let Some(addendum) = emotion.and_then(emotion_prompt) {
        prompt.push_str("\n\n");
        prompt.push_str(addendum);
    }
    prompt.push_str("\n\nStudent's question: ");
    prompt.push_str(question);
    prompt.push_str(
        "\n\nPlease provide a helpful, engaging response that matches the selected learning level.",
    );
    prompt
}
