use once_cell::sync::Lazy;
use regex::Regex;

use super::lemmatizer::lemmatize;
use super::stop_words::is_stop_word;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+|www\.\S+").expect("URL pattern is a valid regex"));

/// Arabic semicolon, deleted outright instead of being turned into a space.
const ARABIC_SEMICOLON: char = '\u{061B}';

/// Deterministic text canonicalization shared by training and inference.
///
/// The output contains only lowercase alphabetic tokens separated by single
/// spaces, and `normalize(normalize(x)) == normalize(x)` for every input.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Run the full pipeline over one document.
    ///
    /// URL-like substrings are stripped while the punctuation that makes them
    /// recognizable is still present; once punctuation is split away a URL is
    /// indistinguishable from ordinary words. The last step drops stop words
    /// that only became separate tokens after punctuation splitting.
    pub fn normalize(&self, text: &str) -> String {
        let text = self.lower_case(text);
        let text = self.remove_stop_words(&text);
        let text = self.remove_numbers(&text);
        let text = self.remove_urls(&text);
        let text = self.remove_punctuation(&text);
        self.lemmatize(&text)
    }

    /// Lowercase every whitespace-separated token and rejoin with single spaces.
    pub fn lower_case(&self, text: &str) -> String {
        text.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn remove_stop_words(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|token| !is_stop_word(token))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Character-level filter: `"abc123"` becomes `"abc"`.
    pub fn remove_numbers(&self, text: &str) -> String {
        text.chars().filter(|c| !c.is_numeric()).collect()
    }

    pub fn remove_urls(&self, text: &str) -> String {
        URL_PATTERN.replace_all(text, "").into_owned()
    }

    /// Every non-alphabetic, non-whitespace character becomes a separator, as
    /// does any uppercase letter left over from lowercasing (letters with no
    /// lowercase mapping, such as `𝐀`). Whitespace runs are collapsed and the
    /// ends trimmed.
    pub fn remove_punctuation(&self, text: &str) -> String {
        let spaced: String = text
            .chars()
            .filter(|&c| c != ARABIC_SEMICOLON)
            .map(|c| {
                if (c.is_alphabetic() && !c.is_uppercase()) || c.is_whitespace() {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        spaced.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn lemmatize(&self, text: &str) -> String {
        text.split_whitespace()
            .filter(|token| !is_stop_word(token))
            .map(lemmatize)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Normalize with the default pipeline.
pub fn normalize_text(text: &str) -> String {
    TextNormalizer.normalize(text)
}
