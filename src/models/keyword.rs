use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::core::SentimentLabel;

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "terrific",
    "outstanding", "superb", "nice", "love", "happy", "best", "awesome", "brilliant",
    "perfect", "enjoy", "pleased", "delighted",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "poor", "disappointing", "worst", "hate",
    "dislike", "sad", "angry", "upset", "annoying", "frustrating", "mediocre", "inferior",
    "useless", "waste", "fail",
];

static POSITIVE: Lazy<HashSet<&'static str>> =
    Lazy::new(|| POSITIVE_WORDS.iter().copied().collect());
static NEGATIVE: Lazy<HashSet<&'static str>> =
    Lazy::new(|| NEGATIVE_WORDS.iter().copied().collect());

/// Keyword-count classifier substituted when no registered model loads.
///
/// Counts the distinct positive and distinct negative keywords present as
/// whole tokens. Positive only on a strict majority; ties and texts with no
/// keyword at all are negative.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSentimentModel;

impl KeywordSentimentModel {
    pub fn new() -> Self {
        Self
    }

    /// `(positive, negative)` distinct keyword hits.
    pub fn score(&self, normalized: &str) -> (usize, usize) {
        let tokens: HashSet<String> = normalized
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();
        let positive = tokens.iter().filter(|t| POSITIVE.contains(t.as_str())).count();
        let negative = tokens.iter().filter(|t| NEGATIVE.contains(t.as_str())).count();
        (positive, negative)
    }

    pub fn predict(&self, normalized: &str) -> SentimentLabel {
        let (positive, negative) = self.score(normalized);
        if positive > negative {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        }
    }
}
