use itertools::Itertools;
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

use crate::categorize::CategoryMatcher;
use crate::config::AnalyzerSettings;
use crate::error::InferenceError;
use crate::keywords::{KeyphraseInference, KeywordExtractor};
use crate::models::{CategoryTag, DetailedReview, NegativeSentiment, Review, SentimentResult};
use crate::sentiment::{SentimentClassifier, SentimentInference};

fn make_review_id(review: &Review) -> String {
    let seed = format!(
        "{}|{}|{}",
        review.title,
        review.positive_text.as_deref().unwrap_or(""),
        review.negative_text.as_deref().unwrap_or("")
    );
    format!("{:016x}", xxh3_64(seed.as_bytes()))
}

/// Per-review output plus what the corpus pass needs to tally.
#[derive(Debug, Clone)]
pub struct ProcessedReview {
    pub detailed: DetailedReview,
    /// Every sentiment computed for this review, positive fragment first.
    pub sentiments: Vec<SentimentResult>,
    /// Positive-fragment sentiment with the categories that fragment matched.
    pub tagged: Option<(SentimentResult, Vec<CategoryTag>)>,
}

pub struct ReviewRecordProcessor<S, K> {
    classifier: SentimentClassifier<S>,
    matcher: CategoryMatcher,
    extractor: KeywordExtractor<K>,
    null_sentinels: Vec<String>,
}

impl<S: SentimentInference, K: KeyphraseInference> ReviewRecordProcessor<S, K> {
    pub fn new(sentiment: S, keyphrases: K, settings: &AnalyzerSettings) -> Self {
        Self {
            classifier: SentimentClassifier::new(sentiment, settings.label_preset),
            matcher: CategoryMatcher::new(&settings.categories),
            extractor: KeywordExtractor::new(keyphrases, settings),
            null_sentinels: settings.null_sentinels.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Blank, or one of the "nothing to complain about" literals.
    fn is_absent_negative(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();
        lowered.is_empty() || self.null_sentinels.iter().any(|s| *s == lowered)
    }

    pub async fn process(&self, review: &Review) -> Result<ProcessedReview, InferenceError> {
        let mut detailed = DetailedReview {
            review_id: make_review_id(review),
            title: review.title.clone(),
            positive_sentiment: None,
            negative_sentiment: NegativeSentiment::Absent,
            categories_mentioned: Vec::new(),
            key_strengths: Vec::new(),
            key_issues: Vec::new(),
            degraded_extraction: false,
        };
        let mut sentiments = Vec::with_capacity(2);
        let mut tagged = None;

        // 1) positive fragment: sentiment, categories, strengths
        if let Some(pos) = review.positive_text.as_deref().filter(|t| !t.is_empty()) {
            let analysis = self.classifier.classify(pos).await?;
            detailed.positive_sentiment = Some(analysis.label);
            sentiments.push(analysis);

            let categories = self.matcher.categorize(pos);
            detailed.categories_mentioned.extend(categories.iter().copied());

            let extraction = self.extractor.extract(pos, false).await;
            detailed.degraded_extraction |= extraction.is_degraded();
            detailed.key_strengths = extraction.into_keywords();

            tagged = Some((analysis, categories));
        }

        // 2) negative fragment: sentiment, issues (sentinels mean "no complaint")
        match review.negative_text.as_deref() {
            Some(neg) if !self.is_absent_negative(neg) => {
                let analysis = self.classifier.classify(neg).await?;
                detailed.negative_sentiment = NegativeSentiment::Present(analysis.label);
                sentiments.push(analysis);

                let extraction = self.extractor.extract(neg, true).await;
                detailed.degraded_extraction |= extraction.is_degraded();
                detailed.key_issues = extraction.into_keywords();
            }
            _ => {
                detailed.negative_sentiment = NegativeSentiment::Absent;
            }
        }

        // 3) dedupe, first occurrence wins
        detailed.categories_mentioned =
            detailed.categories_mentioned.into_iter().unique().collect();

        debug!(
            "Review processed - id={}, positive={:?}, negative={}, categories={}, strengths={}, issues={}",
            detailed.review_id,
            detailed.positive_sentiment,
            detailed.negative_sentiment,
            detailed.categories_mentioned.len(),
            detailed.key_strengths.len(),
            detailed.key_issues.len()
        );

        Ok(ProcessedReview {
            detailed,
            sentiments,
            tagged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::tests::{FailingKeyphrases, StubKeyphrases};
    use crate::models::SentimentLabel;
    use crate::sentiment::tests::StubSentiment;

    fn processor() -> ReviewRecordProcessor<StubSentiment, StubKeyphrases> {
        ReviewRecordProcessor::new(
            StubSentiment::default(),
            StubKeyphrases::default(),
            &AnalyzerSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_pool_review_without_negative() {
        let p = processor();
        let review = Review::new("Ottimo", Some("Ci è piaciuto tanto che ha la piscina."), None);
        let out = p.process(&review).await.unwrap();

        assert!(out.detailed.categories_mentioned.contains(&CategoryTag::Facilities));
        assert_eq!(out.detailed.negative_sentiment, NegativeSentiment::Absent);
        assert_eq!(out.detailed.positive_sentiment, Some(SentimentLabel::Positive));
        assert!(!out.detailed.key_strengths.is_empty());
        assert!(out.detailed.key_issues.is_empty());
        assert_eq!(out.sentiments.len(), 1);
    }

    #[tokio::test]
    async fn test_null_sentinels_skip_negative_analysis() {
        let p = processor();
        let sentinels = [
            None,
            Some(""),
            Some("  "),
            Some("nulla"),
            Some("NULL"),
            Some("Nulla, tutto perfetto!"),
        ];
        for neg in sentinels {
            let review = Review::new("Eccezionale", Some("Staff eccellente."), neg);
            let out = p.process(&review).await.unwrap();
            assert_eq!(out.detailed.negative_sentiment, NegativeSentiment::Absent, "{:?}", neg);
            assert!(out.detailed.key_issues.is_empty());
            assert_eq!(out.sentiments.len(), 1);
        }
        // one keyphrase call per review, all for the positive side
        assert_eq!(p.extractor.backend().calls.get(), 6);
    }

    #[tokio::test]
    async fn test_negative_fragment_analyzed() {
        let p = processor();
        let review = Review::new(
            "Bellissimo",
            Some("Tutto"),
            Some("Il letto era rotto e troppo piccolo, camera rumorosa"),
        );
        let out = p.process(&review).await.unwrap();
        assert_eq!(
            out.detailed.negative_sentiment,
            NegativeSentiment::Present(SentimentLabel::Negative)
        );
        assert!(!out.detailed.key_issues.is_empty());
        assert!(out.detailed.key_issues.len() <= 3);
        // "Tutto" is too short for keywords and negative text is never categorized
        assert!(out.detailed.key_strengths.is_empty());
        assert!(out.detailed.categories_mentioned.is_empty());
        assert_eq!(out.sentiments.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_positive_is_absent() {
        let p = processor();
        let review = Review::new("", None, Some("Colazione così così, poca scelta"));
        let out = p.process(&review).await.unwrap();
        assert_eq!(out.detailed.positive_sentiment, None);
        assert!(out.tagged.is_none());
        assert_eq!(
            out.detailed.negative_sentiment,
            NegativeSentiment::Present(SentimentLabel::Neutral)
        );
    }

    #[tokio::test]
    async fn test_degraded_extraction_flagged() {
        let p = ReviewRecordProcessor::new(
            StubSentiment::default(),
            FailingKeyphrases,
            &AnalyzerSettings::default(),
        );
        let review = Review::new("Eccezionale", Some("Pulizia delle stanze ottimale"), None);
        let out = p.process(&review).await.unwrap();
        assert!(out.detailed.degraded_extraction);
        assert_eq!(out.detailed.key_strengths, vec!["pulizia", "stanze", "ottimale"]);
    }

    #[tokio::test]
    async fn test_review_id_is_stable() {
        let p = processor();
        let review = Review::new("Eccellente", Some("Camere pulite"), None);
        let a = p.process(&review).await.unwrap();
        let b = p.process(&review).await.unwrap();
        assert_eq!(a.detailed.review_id, b.detailed.review_id);
        assert_eq!(a.detailed.review_id.len(), 16);
    }
}
