//! Review Vibes - hospitality business intelligence from guest reviews.
//!
//! Each review's positive and negative fragments go through sentiment
//! classification, keyword-based category matching and keyphrase extraction.
//! The corpus pass then rolls them up into a summary, per-category insights,
//! top strengths and areas for improvement.
//!
//! Model inference sits behind two traits, [`SentimentInference`] and
//! [`KeyphraseInference`]. [`HfSentimentBackend`] and [`LlmKeyphraseBackend`]
//! are the shipped adapters.

pub mod aggregate;
pub mod api_types;
pub mod budget;
pub mod categorize;
pub mod config;
pub mod error;
pub mod input;
pub mod keywords;
pub mod llm;
pub mod models;
pub mod processor;
pub mod prompts;
pub mod render;
pub mod sample;
pub mod sentiment;

pub use aggregate::CorpusAggregator;
pub use categorize::CategoryMatcher;
pub use config::{AnalyzerSettings, CategoryTable, LabelPreset};
pub use error::{AnalysisError, InferenceError};
pub use keywords::{Extraction, KeyphraseInference, KeywordExtractor, LlmKeyphraseBackend};
pub use models::{
    CategoryInsight, CategoryTag, DetailedReview, NegativeSentiment, Report, Review,
    SentimentLabel, SentimentResult, Summary,
};
pub use processor::{ProcessedReview, ReviewRecordProcessor};
pub use sentiment::{HfSentimentBackend, RawSentiment, SentimentClassifier, SentimentInference};
