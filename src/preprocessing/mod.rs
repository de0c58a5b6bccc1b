//! Text normalization shared by the training stages and the inference
//! service.
//!
//! ## Main Types
//!
//! - [`TextNormalizer`] - The canonicalization pipeline (lowercase, stop
//!   words, numbers, URLs, punctuation, lemmatization)
//! - [`ReviewRecord`] - A labelled review row
//!
//! ## Usage Example
//!
//! ```rust
//! use sentiment_ops::preprocessing::TextNormalizer;
//!
//! let normalizer = TextNormalizer::new();
//! assert_eq!(normalizer.normalize("I have 2 cats!"), "cat");
//! ```

pub mod dataset;
pub mod lemmatizer;
pub mod normalizer;
pub mod stop_words;

pub use dataset::{
    filter_short_rows, preprocess_records, PreprocessOptions, ReviewRecord, MIN_SENTENCE_TOKENS,
};
pub use normalizer::{normalize_text, TextNormalizer};
