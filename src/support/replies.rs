//! Canned reply texts and the random source used to pick among them.

use rand::Rng;

pub const GREETING: &str = "Hello! I'm Vza. How are you feeling today?";

pub const FOLLOW_UP_QUESTIONS: [&str; 8] = [
    "Can you tell me more about that?",
    "How does that make you feel?",
    "What else is on your mind?",
    "Why do you think that is?",
    "How long have you felt this way?",
    "What do you think could help?",
    "What's been bothering you the most?",
    "How has this affected you?",
];

pub const ACKNOWLEDGMENTS: [&str; 8] = [
    "I see.",
    "Go on.",
    "Understood.",
    "I'm here for you.",
    "I understand.",
    "Hmm.",
    "Right.",
    "Okay.",
];

/// Chance that a listening reply is a follow-up question rather than an acknowledgment.
pub const FOLLOW_UP_PROBABILITY: f64 = 0.3;

pub const TECHNIQUES_HEADER: &str = "Based on what you've shared, here are some techniques that might help:";

pub const GENERAL_SUPPORT_MESSAGE: &str = "I'm here to support you. Sometimes, engaging in self-care activities like taking a walk or talking to a friend can help.";

pub const FEEDBACK_PROMPT: &str = "Did you find this helpful? (yes/no)";

pub const FEEDBACK_RETRY: &str = "Please answer with 'yes' or 'no'.";

pub const FEEDBACK_THANKS: &str = "Thank you for your feedback. Feel free to share anything else on your mind.\nIf you'd like more suggestions or strategies at any time, just type '/advice'.";

pub const FAREWELL: &str = "Conversation ended. Take care!";

/// Format matched techniques as a bulleted reply.
pub fn techniques_message(techniques: &[&str]) -> String {
    let lines: Vec<String> = techniques.iter().map(|t| format!("- {t}")).collect();
    format!("{TECHNIQUES_HEADER}\n{}", lines.join("\n"))
}

/// Source of randomness for reply selection.
pub trait RandomSource: Send + Sync {
    /// True with the given probability.
    fn chance(&self, probability: f64) -> bool;

    /// Uniform index in `0..len`. `len` is never zero.
    fn index(&self, len: usize) -> usize;
}

/// Thread-local RNG backed source.
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn chance(&self, probability: f64) -> bool {
        rand::thread_rng().gen_bool(probability.clamp(0.0, 1.0))
    }

    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Pick one entry of `options` using `random`.
pub fn pick(random: &dyn RandomSource, options: &[&'static str]) -> &'static str {
    let i = random.index(options.len());
    options.get(i).copied().unwrap_or(options[0])
}

/// Reply to a message received while listening.
pub fn listening_reply(random: &dyn RandomSource) -> &'static str {
    if random.chance(FOLLOW_UP_PROBABILITY) {
        pick(random, &FOLLOW_UP_QUESTIONS)
    } else {
        pick(random, &ACKNOWLEDGMENTS)
    }
}
