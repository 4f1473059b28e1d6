//! Static keyword-to-technique catalog.

use std::collections::HashSet;

/// Technique text recorded when no keyword matched.
pub const GENERAL_SUPPORT: &str = "General Support Provided";

/// Keyword → advice, in match order. Several keywords share the same advice.
pub const CATALOG: &[(&str, &str)] = &[
    ("negative", "Cognitive Restructuring: Challenge and reframe negative thoughts."),
    ("anxious", "Mindfulness Meditation: Focus on the present moment to reduce anxiety."),
    ("anxiety", "Mindfulness Meditation: Focus on the present moment to reduce anxiety."),
    ("motivation", "Behavioral Activation: Engage in activities that bring you joy."),
    ("stressed", "Deep Breathing Exercises: Practice controlled breathing to alleviate stress."),
    ("stress", "Deep Breathing Exercises: Practice controlled breathing to alleviate stress."),
    ("self-criticism", "Self-Compassion: Treat yourself with kindness and understanding."),
    ("fear", "Exposure Therapy: Gradually face fears in a controlled environment."),
    ("decision", "Pros and Cons List: Weigh options to make informed decisions."),
];

/// Advice for every catalog keyword present in `tokens`, in catalog order.
///
/// Identical advice reached through two keywords is returned twice.
pub fn match_techniques(tokens: &HashSet<String>) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|(keyword, _)| tokens.contains(*keyword))
        .map(|(_, advice)| *advice)
        .collect()
}
