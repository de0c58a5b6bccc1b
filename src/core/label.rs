use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::SentimentError;

/// Binary sentiment class. `1` is positive, `0` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SentimentLabel {
    Negative,
    Positive,
}

impl SentimentLabel {
    pub fn as_u8(self) -> u8 {
        match self {
            SentimentLabel::Negative => 0,
            SentimentLabel::Positive => 1,
        }
    }

    /// Label used by the prediction counter (`"0"` / `"1"`).
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "0",
            SentimentLabel::Positive => "1",
        }
    }

    pub fn from_probability(p: f32) -> Self {
        if p >= 0.5 {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        }
    }
}

impl From<SentimentLabel> for u8 {
    fn from(value: SentimentLabel) -> Self {
        value.as_u8()
    }
}

impl TryFrom<u8> for SentimentLabel {
    type Error = SentimentError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(SentimentLabel::Negative),
            1 => Ok(SentimentLabel::Positive),
            other => Err(SentimentError::InvalidLabel(other.to_string())),
        }
    }
}

/// Maps the dataset label strings at the preprocessing boundary.
impl FromStr for SentimentLabel {
    type Err = SentimentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "1" => Ok(SentimentLabel::Positive),
            "negative" | "0" => Ok(SentimentLabel::Negative),
            _ => Err(SentimentError::InvalidLabel(s.to_string())),
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
