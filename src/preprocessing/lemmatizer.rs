//! Rule-based noun lemmatizer.
//!
//! Reduces inflected nouns to their dictionary form the way WordNet's noun
//! morphology does: an exception table for irregular plurals, a list of words
//! that only look plural, and ordered suffix rules for regular plurals. Words
//! that match no rule are returned unchanged, so adjectives and verbs such as
//! "amazing" or "love" pass through untouched.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;

use super::stop_words::is_stop_word;

static IRREGULAR: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("men", "man"),
        ("women", "woman"),
        ("children", "child"),
        ("people", "person"),
        ("feet", "foot"),
        ("teeth", "tooth"),
        ("geese", "goose"),
        ("mice", "mouse"),
        ("oxen", "ox"),
        ("lives", "life"),
        ("wives", "wife"),
        ("knives", "knife"),
        ("leaves", "leaf"),
        ("loaves", "loaf"),
        ("wolves", "wolf"),
        ("halves", "half"),
        ("shelves", "shelf"),
        ("thieves", "thief"),
        ("data", "datum"),
        ("criteria", "criterion"),
        ("phenomena", "phenomenon"),
        ("analyses", "analysis"),
        ("crises", "crisis"),
        ("theses", "thesis"),
        ("diagnoses", "diagnosis"),
        ("indices", "index"),
        ("matrices", "matrix"),
        ("cacti", "cactus"),
        ("fungi", "fungus"),
        ("alumni", "alumnus"),
        ("buses", "bus"),
        ("goes", "go"),
        ("heroes", "hero"),
        ("potatoes", "potato"),
        ("tomatoes", "tomato"),
        ("echoes", "echo"),
    ]
    .into_iter()
    .collect()
});

/// Words ending in "s" that are already in base form.
static INVARIANT: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "news", "series", "species", "physics", "mathematics", "economics", "politics", "ethics",
        "electronics", "genetics", "athletics", "means", "lens", "always", "perhaps", "towards",
        "afterwards", "sometimes", "besides", "whereas", "thanks", "chaos", "alias", "canvas",
        "atlas", "bias", "yes",
    ]
    .into_iter()
    .collect()
});

/// "-ies" plurals whose singular keeps the "ie".
static IE_PLURALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "movies", "cookies", "zombies", "calories", "rookies", "hippies", "selfies", "smoothies",
        "brownies", "ties", "lies", "pies", "dies", "freebies", "goalies", "pixies",
    ]
    .into_iter()
    .collect()
});

/// "-ches" plurals whose singular ends in "che".
static CHE_PLURALS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "aches", "headaches", "toothaches", "caches", "niches", "moustaches", "avalanches",
        "quiches", "cliches", "psyches",
    ]
    .into_iter()
    .collect()
});

const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("zzes", "zz"),
    ("xes", "x"),
    ("shes", "sh"),
    ("ches", "ch"),
];

/// Lemmatize a single lowercase token.
///
/// Always idempotent: a candidate base form is only accepted when it is
/// itself a fixed point of the rules, is at least two characters long and is
/// not a stop word. Otherwise the token is returned unchanged.
pub fn lemmatize(token: &str) -> String {
    match base_form(token) {
        Some(base) if is_stable(&base) => base,
        _ => token.to_string(),
    }
}

fn is_stable(base: &str) -> bool {
    base.chars().count() >= 2 && !is_stop_word(base) && base_form(base).is_none()
}

/// Candidate base form, or `None` when no rule changes the word.
fn base_form(word: &str) -> Option<String> {
    if let Some(base) = IRREGULAR.get(word) {
        return Some((*base).to_string());
    }
    if word.chars().count() <= 3 || INVARIANT.contains(word) {
        return None;
    }
    if let Some(stem) = word.strip_suffix("ies") {
        return Some(if IE_PLURALS.contains(word) {
            format!("{stem}ie")
        } else {
            format!("{stem}y")
        });
    }
    if CHE_PLURALS.contains(word) {
        return word.strip_suffix('s').map(str::to_string);
    }
    for (suffix, replacement) in SUFFIX_RULES {
        if let Some(stem) = word.strip_suffix(suffix) {
            if !stem.is_empty() {
                return Some(format!("{stem}{replacement}"));
            }
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return None;
    }
    word.strip_suffix('s').map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        assert_eq!(lemmatize("cats"), "cat");
        assert_eq!(lemmatize("products"), "product");
        assert_eq!(lemmatize("classes"), "class");
        assert_eq!(lemmatize("boxes"), "box");
        assert_eq!(lemmatize("churches"), "church");
        assert_eq!(lemmatize("stories"), "story");
        assert_eq!(lemmatize("movies"), "movie");
        assert_eq!(lemmatize("headaches"), "headache");
    }

    #[test]
    fn test_irregular_plurals() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("mice"), "mouse");
        assert_eq!(lemmatize("crises"), "crisis");
    }

    #[test]
    fn test_base_forms_pass_through() {
        for word in ["amazing", "love", "best", "useless", "status", "analysis", "news", "bus"] {
            assert_eq!(lemmatize(word), word);
        }
    }

    #[test]
    fn test_lemmatize_is_idempotent() {
        for word in [
            "cats", "glasses", "stories", "ties", "leaves", "heroes", "buses", "dresses", "quizzes",
            "series", "ss", "sses", "ies", "ьвs",
        ] {
            let once = lemmatize(word);
            assert_eq!(lemmatize(&once), once, "not idempotent for {word}");
        }
    }

    #[test]
    fn test_never_produces_stop_word() {
        // "ains" would reduce to the stop word "ain"
        assert_eq!(lemmatize("ains"), "ains");
    }
}
