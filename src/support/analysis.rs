//! Sentiment scoring and keyword tokenization.
//!
//! The engine only sees the [`TextAnalyzer`] trait. [`LexiconAnalyzer`] is the
//! production implementation: the VADER compound polarity from the
//! `vader_sentiment` crate, rounded to 4 decimals, in `-1.0..=1.0`.

use regex::Regex;
use std::collections::HashSet;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Result of analyzing one piece of conversation text.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub sentiment: f64,
    pub tokens: HashSet<String>,
}

/// Sentiment and tokenization capability used by the conversation engine.
pub trait TextAnalyzer: Send + Sync {
    /// Compound polarity of `text`, in `-1.0..=1.0`.
    fn polarity(&self, text: &str) -> f64;

    /// Distinct lowercase tokens of `text`.
    fn tokenize(&self, text: &str) -> HashSet<String>;

    fn analyze(&self, text: &str) -> Analysis {
        Analysis {
            sentiment: self.polarity(text),
            tokens: self.tokenize(text),
        }
    }
}

/// Characters that always stand alone as tokens. Everything else stays inside
/// its word, so `self-criticism`, `i'm` and `stress/anxiety` are single tokens.
const SPLIT_CHARS: &str = r#",;:@#$%&?!()\[\]{}<>""#;

/// Valence scorer backed by the VADER lexicon and rules.
pub struct LexiconAnalyzer {
    vader: SentimentIntensityAnalyzer<'static>,
    token_pattern: Regex,
}

impl LexiconAnalyzer {
    pub fn new() -> Self {
        // A comma or colon followed by a digit stays in the word ("1,000", "10:30")
        let pattern = format!(r"(?:[^\s{SPLIT_CHARS}]|[:,]\d)+|[{SPLIT_CHARS}]");
        Self {
            vader: SentimentIntensityAnalyzer::new(),
            token_pattern: Regex::new(&pattern).unwrap(),
        }
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAnalyzer for LexiconAnalyzer {
    fn polarity(&self, text: &str) -> f64 {
        let scores = self.vader.polarity_scores(text);
        let score = |key: &str| scores.get(key).copied().unwrap_or(0.0);
        // Punctuation emphasis alone carries no polarity
        if score("pos") == 0.0 && score("neg") == 0.0 {
            return 0.0;
        }
        (score("compound") * 10_000.0).round() / 10_000.0
    }

    /// Treebank-style split: brackets, quotes and most punctuation become
    /// their own tokens, a trailing run of periods is split off the word.
    /// Contractions are not split.
    fn tokenize(&self, text: &str) -> HashSet<String> {
        let lower = text.to_lowercase();
        let mut tokens = HashSet::new();
        for m in self.token_pattern.find_iter(&lower) {
            let token = m.as_str();
            let word = token.trim_end_matches('.');
            if !word.is_empty() && word.len() < token.len() {
                tokens.insert(word.to_string());
                tokens.insert(token[word.len()..].to_string());
            } else {
                tokens.insert(token.to_string());
            }
        }
        tokens
    }
}
