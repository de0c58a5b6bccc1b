pub mod config;
pub mod error;
pub mod label;

pub use config::AppConfig;
pub use error::{Result, SentimentError};
pub use label::SentimentLabel;
