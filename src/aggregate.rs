use std::collections::{BTreeMap, HashMap};
use tracing::{debug, error, info};

use crate::config::AnalyzerSettings;
use crate::error::AnalysisError;
use crate::keywords::KeyphraseInference;
use crate::models::{
    CategoryInsight, CategoryTag, DetailedReview, KeywordCount, Report, Review, SentimentLabel,
    SentimentResult, Summary,
};
use crate::processor::{ProcessedReview, ReviewRecordProcessor};
use crate::sentiment::{round3, SentimentInference};

/// Multiset that remembers first-seen order, for stable tie-breaks.
#[derive(Debug, Default, Clone)]
pub struct KeywordTally {
    index: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl KeywordTally {
    pub fn add(&mut self, keyword: &str) {
        match self.index.get(keyword) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(keyword.to_string(), self.counts.len());
                self.counts.push((keyword.to_string(), 1));
            }
        }
    }

    pub fn extend<'a>(&mut self, keywords: impl IntoIterator<Item = &'a String>) {
        for k in keywords {
            self.add(k);
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count descending, ties by first-seen; `keep` filters before truncation.
    pub fn top(&self, n: usize, keep: impl Fn(&str) -> bool) -> Vec<KeywordCount> {
        let mut ranked: Vec<&(String, usize)> = self.counts.iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1)); // stable
        ranked
            .into_iter()
            .filter(|(k, _)| keep(k.as_str()))
            .take(n)
            .map(|(k, c)| KeywordCount {
                keyword: k.clone(),
                count: *c,
            })
            .collect()
    }
}

/// Most frequent label; ties go to the label seen first.
pub fn dominant_label(results: &[SentimentResult]) -> SentimentLabel {
    let mut seen: Vec<(SentimentLabel, usize)> = Vec::new();
    for r in results {
        match seen.iter_mut().find(|(l, _)| *l == r.label) {
            Some(entry) => entry.1 += 1,
            None => seen.push((r.label, 1)),
        }
    }
    let mut best: Option<(SentimentLabel, usize)> = None;
    for (label, count) in seen {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(l, _)| l).unwrap_or(SentimentLabel::Neutral)
}

pub fn mean_confidence(results: &[SentimentResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    round3(results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64)
}

/// Accumulators owned by one `analyze` call.
#[derive(Default)]
struct CorpusTally {
    detailed: Vec<DetailedReview>,
    all_sentiments: Vec<SentimentResult>,
    category_sentiments: BTreeMap<CategoryTag, Vec<SentimentResult>>,
    category_mentions: BTreeMap<CategoryTag, usize>,
    positive_keywords: KeywordTally,
    negative_keywords: KeywordTally,
}

impl CorpusTally {
    fn ingest(&mut self, processed: ProcessedReview) {
        let ProcessedReview {
            detailed,
            sentiments,
            tagged,
        } = processed;

        if let Some((analysis, categories)) = tagged {
            for cat in categories {
                self.category_sentiments.entry(cat).or_default().push(analysis);
                *self.category_mentions.entry(cat).or_insert(0) += 1;
            }
        }
        self.positive_keywords.extend(&detailed.key_strengths);
        self.negative_keywords.extend(&detailed.key_issues);
        self.all_sentiments.extend(sentiments);
        self.detailed.push(detailed);
    }

    fn finish(self, total_reviews: usize, settings: &AnalyzerSettings) -> Report {
        let positive_reviews = self
            .detailed
            .iter()
            .filter(|r| r.negative_sentiment.is_non_actionable())
            .count();

        let (overall_sentiment, positive_percentage) = if total_reviews == 0 {
            (SentimentLabel::Neutral, 0.0)
        } else {
            let ratio = positive_reviews as f64 / total_reviews as f64;
            let overall = if ratio > settings.very_positive_threshold {
                SentimentLabel::VeryPositive
            } else {
                SentimentLabel::Positive
            };
            (overall, (ratio * 1000.0).round_ties_even() / 10.0)
        };

        let summary = Summary {
            total_reviews,
            overall_sentiment,
            average_confidence: mean_confidence(&self.all_sentiments),
            positive_percentage,
        };

        let categories: BTreeMap<CategoryTag, CategoryInsight> = self
            .category_sentiments
            .iter()
            .filter(|(_, results)| !results.is_empty())
            .map(|(cat, results)| {
                let insight = CategoryInsight {
                    mentions: self.category_mentions.get(cat).copied().unwrap_or(0),
                    avg_sentiment: dominant_label(results),
                    confidence: mean_confidence(results),
                };
                (*cat, insight)
            })
            .collect();

        let strength_blacklist = &settings.strength_blacklist;
        let strengths = self.positive_keywords.top(settings.top_strengths, |k| {
            k.chars().count() > settings.min_strength_len
                && !strength_blacklist.iter().any(|b| b == k)
        });
        let issue_blacklist = &settings.issue_blacklist;
        let areas_for_improvement = self
            .negative_keywords
            .top(settings.top_issues, |k| !issue_blacklist.iter().any(|b| b == k));

        Report {
            summary,
            categories,
            strengths,
            areas_for_improvement,
            detailed_reviews: self.detailed,
        }
    }
}

pub struct CorpusAggregator<S, K> {
    processor: ReviewRecordProcessor<S, K>,
    settings: AnalyzerSettings,
}

impl<S: SentimentInference, K: KeyphraseInference> CorpusAggregator<S, K> {
    pub fn new(sentiment: S, keyphrases: K, settings: AnalyzerSettings) -> Self {
        Self {
            processor: ReviewRecordProcessor::new(sentiment, keyphrases, &settings),
            settings,
        }
    }

    /// Analyze a batch. Reviews are processed in batches of `concurrency`
    /// and tallied strictly in input order; the first sentiment failure (in
    /// input order) aborts the run.
    pub async fn analyze(&self, reviews: &[Review]) -> Result<Report, AnalysisError> {
        let start = std::time::Instant::now();
        let batch_size = self.settings.concurrency.max(1);
        info!(
            "Analysis started - reviews={}, batch_size={}",
            reviews.len(),
            batch_size
        );

        let mut tally = CorpusTally::default();
        let mut completed = 0usize;

        for (batch_idx, batch) in reviews.chunks(batch_size).enumerate() {
            let tasks = batch.iter().map(|r| self.processor.process(r));
            let results = futures::future::join_all(tasks).await;

            for (i, result) in results.into_iter().enumerate() {
                let index = batch_idx * batch_size + i;
                match result {
                    Ok(processed) => tally.ingest(processed),
                    Err(source) => {
                        let title = reviews[index].title.clone();
                        error!(
                            "Review analysis failed - index={}, title={:?}, error={}",
                            index, title, source
                        );
                        return Err(AnalysisError::Inference {
                            index,
                            title,
                            source,
                        });
                    }
                }
            }

            completed += batch.len();
            debug!("Analysis progress: {}/{}", completed, reviews.len());
        }

        debug!(
            "Tallies - sentiments={}, categories={}, positive_keywords={}, negative_keywords={}",
            tally.all_sentiments.len(),
            tally.category_mentions.len(),
            tally.positive_keywords.len(),
            tally.negative_keywords.len()
        );

        let report = tally.finish(reviews.len(), &self.settings);
        info!(
            "Analysis completed - duration={:.2}s, reviews={}, overall={}, positive_pct={}",
            start.elapsed().as_secs_f32(),
            report.summary.total_reviews,
            report.summary.overall_sentiment,
            report.summary.positive_percentage
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;
    use crate::keywords::tests::StubKeyphrases;
    use crate::models::NegativeSentiment;
    use crate::sample::sample_reviews;
    use crate::sentiment::tests::StubSentiment;
    use crate::sentiment::RawSentiment;
    use async_trait::async_trait;

    fn aggregator() -> CorpusAggregator<StubSentiment, StubKeyphrases> {
        CorpusAggregator::new(
            StubSentiment::default(),
            StubKeyphrases::default(),
            AnalyzerSettings::default(),
        )
    }

    fn result(label: SentimentLabel, confidence: f64) -> SentimentResult {
        SentimentResult { label, confidence }
    }

    /// Keyphrases are the words of the fragment, in order.
    struct WordKeyphrases;

    #[async_trait(?Send)]
    impl KeyphraseInference for WordKeyphrases {
        async fn infer_keyphrases(
            &self,
            text: &str,
            _ngram_range: (usize, usize),
            max_candidates: usize,
        ) -> Result<Vec<(String, f64)>, InferenceError> {
            Ok(text
                .to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
                .take(max_candidates)
                .map(|t| (t.to_string(), 0.5))
                .collect())
        }
    }

    /// Fails on any text containing "boom".
    struct ExplodingSentiment;

    #[async_trait(?Send)]
    impl SentimentInference for ExplodingSentiment {
        async fn infer_sentiment(&self, text: &str) -> Result<RawSentiment, InferenceError> {
            if text.contains("boom") {
                Err(InferenceError::Status {
                    status: 503,
                    body: "overloaded".into(),
                })
            } else {
                Ok(RawSentiment {
                    label: "LABEL_2".into(),
                    score: 0.9,
                })
            }
        }
    }

    #[test]
    fn test_tally_ties_break_by_first_seen() {
        let mut t = KeywordTally::default();
        for k in ["staff", "piscina", "colazione", "piscina", "staff", "terrazza"] {
            t.add(k);
        }
        let top = t.top(3, |_| true);
        let keys: Vec<_> = top.iter().map(|k| (k.keyword.as_str(), k.count)).collect();
        assert_eq!(keys, vec![("staff", 2), ("piscina", 2), ("colazione", 1)]);
    }

    #[test]
    fn test_tally_filter_before_truncation() {
        let mut t = KeywordTally::default();
        for k in ["tutto", "tutto", "piscina", "staff"] {
            t.add(k);
        }
        let top = t.top(2, |k| k != "tutto");
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].keyword, "piscina");
    }

    #[test]
    fn test_dominant_label_first_encountered_tie() {
        use SentimentLabel::*;
        let rs = [
            result(Neutral, 0.5),
            result(Positive, 0.9),
            result(Positive, 0.9),
            result(Neutral, 0.4),
        ];
        assert_eq!(dominant_label(&rs), Neutral);
        let rs = [result(Positive, 0.5), result(Neutral, 0.5), result(Neutral, 0.5)];
        assert_eq!(dominant_label(&rs), Neutral);
    }

    #[test]
    fn test_mean_confidence_exact() {
        use SentimentLabel::*;
        let rs = [result(Positive, 0.9), result(Positive, 0.8), result(Negative, 0.7)];
        assert_eq!(mean_confidence(&rs), 0.8);
        assert_eq!(mean_confidence(&[]), 0.0);
        // 0.8125 is an exact half: rounds to even
        let rs = [result(Positive, 0.75), result(Positive, 0.875)];
        assert_eq!(mean_confidence(&rs), 0.812);
    }

    #[tokio::test]
    async fn test_empty_corpus_defaults() {
        let report = aggregator().analyze(&[]).await.unwrap();
        assert_eq!(report.summary.total_reviews, 0);
        assert_eq!(report.summary.overall_sentiment, SentimentLabel::Neutral);
        assert_eq!(report.summary.average_confidence, 0.0);
        assert_eq!(report.summary.positive_percentage, 0.0);
        assert!(report.categories.is_empty());
        assert!(report.strengths.is_empty());
    }

    #[tokio::test]
    async fn test_single_pool_review() {
        let reviews = [Review::new(
            "Ottimo",
            Some("Ci è piaciuto tanto che ha la piscina."),
            None,
        )];
        let report = aggregator().analyze(&reviews).await.unwrap();

        let d = &report.detailed_reviews[0];
        assert!(d.categories_mentioned.contains(&CategoryTag::Facilities));
        assert_eq!(d.negative_sentiment, NegativeSentiment::Absent);
        assert!(!report.strengths.is_empty());
        assert!(report.areas_for_improvement.is_empty());
        assert_eq!(report.categories[&CategoryTag::Facilities].mentions, 1);
        assert_eq!(report.summary.overall_sentiment, SentimentLabel::VeryPositive);
        assert_eq!(report.summary.positive_percentage, 100.0);
    }

    fn corpus(total: usize, complaints: usize) -> Vec<Review> {
        (0..total)
            .map(|i| {
                let neg = (i < complaints).then_some("Letto rotto e bagno pessimo");
                Review::new(format!("Review {}", i), Some("Staff eccellente"), neg)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_overall_threshold_is_strict() {
        let agg = aggregator();

        // 4/5 = 0.8 exactly
        let report = agg.analyze(&corpus(5, 1)).await.unwrap();
        assert_eq!(report.summary.overall_sentiment, SentimentLabel::Positive);
        assert_eq!(report.summary.positive_percentage, 80.0);

        // 15/19 ~ 0.789
        let report = agg.analyze(&corpus(19, 4)).await.unwrap();
        assert_eq!(report.summary.overall_sentiment, SentimentLabel::Positive);
        assert_eq!(report.summary.positive_percentage, 78.9);

        // 16/19 ~ 0.842
        let report = agg.analyze(&corpus(19, 3)).await.unwrap();
        assert_eq!(report.summary.overall_sentiment, SentimentLabel::VeryPositive);
        assert_eq!(report.summary.positive_percentage, 84.2);
    }

    #[tokio::test]
    async fn test_positive_percentage_half_rounds_to_even() {
        // 1/16 = 6.25%
        let report = aggregator().analyze(&corpus(16, 15)).await.unwrap();
        assert_eq!(report.summary.positive_percentage, 6.2);
        assert_eq!(report.summary.overall_sentiment, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_neutral_negative_counts_as_positive_review() {
        let reviews = [
            Review::new("A", Some("Staff eccellente"), Some("Colazione così così")),
            Review::new("B", Some("Staff eccellente"), Some("Letto rotto")),
        ];
        let report = aggregator().analyze(&reviews).await.unwrap();
        assert_eq!(report.summary.positive_percentage, 50.0);
    }

    #[tokio::test]
    async fn test_category_insight_and_average_confidence() {
        // stub: positive fragments -> (Positive, 0.8), "rotto" -> (Negative, 0.9)
        let reviews = [
            Review::new("A", Some("Bella piscina e spa"), None),
            Review::new("B", Some("Piscina enorme"), Some("Ascensore rotto")),
            Review::new("C", Some("Colazione abbondante"), None),
        ];
        let report = aggregator().analyze(&reviews).await.unwrap();

        let facilities = &report.categories[&CategoryTag::Facilities];
        assert_eq!(facilities.mentions, 2);
        assert_eq!(facilities.avg_sentiment, SentimentLabel::Positive);
        assert_eq!(facilities.confidence, 0.8);
        assert_eq!(report.categories[&CategoryTag::Breakfast].mentions, 1);
        assert!(!report.categories.contains_key(&CategoryTag::Location));

        // (0.8 * 3 + 0.9) / 4 = 0.825
        assert_eq!(report.summary.average_confidence, 0.825);
    }

    #[tokio::test]
    async fn test_strengths_and_issues_ranking() {
        let agg = CorpusAggregator::new(
            StubSentiment::default(),
            WordKeyphrases,
            AnalyzerSettings::default(),
        );
        let reviews = [
            Review::new("A", Some("tutto piscina staff colazione"), Some("meno piscina affollata")),
            Review::new("B", Some("tutto staff terrazza vista"), Some("meno piscina affollata")),
            Review::new("C", Some("tutto staff piscina bar"), Some("colazione lento servizio")),
        ];
        let report = agg.analyze(&reviews).await.unwrap();

        let strengths: Vec<_> = report
            .strengths
            .iter()
            .map(|k| (k.keyword.as_str(), k.count))
            .collect();
        // "tutto" is blacklisted, "bar" is too short
        assert_eq!(
            strengths,
            vec![("staff", 3), ("piscina", 2), ("colazione", 1), ("terrazza", 1), ("vista", 1)]
        );

        let issues: Vec<_> = report
            .areas_for_improvement
            .iter()
            .map(|k| (k.keyword.as_str(), k.count))
            .collect();
        // negative filter keeps piscina/affollata/colazione/lento/servizio, "meno" never survives
        assert_eq!(issues, vec![("piscina", 2), ("affollata", 2), ("colazione", 1)]);
    }

    #[tokio::test]
    async fn test_idempotent_orderings() {
        let agg = aggregator();
        let reviews = sample_reviews();
        let a = agg.analyze(&reviews).await.unwrap();
        let b = agg.analyze(&reviews).await.unwrap();

        assert_eq!(a.categories, b.categories);
        assert_eq!(a.strengths, b.strengths);
        assert_eq!(a.areas_for_improvement, b.areas_for_improvement);
        assert_eq!(a.summary, b.summary);
    }

    #[tokio::test]
    async fn test_concurrency_does_not_change_report() {
        let reviews = sample_reviews();
        let sequential = CorpusAggregator::new(
            StubSentiment::default(),
            StubKeyphrases::default(),
            AnalyzerSettings {
                concurrency: 1,
                ..AnalyzerSettings::default()
            },
        );
        let batched = CorpusAggregator::new(
            StubSentiment::default(),
            StubKeyphrases::default(),
            AnalyzerSettings {
                concurrency: 7,
                ..AnalyzerSettings::default()
            },
        );
        let a = sequential.analyze(&reviews).await.unwrap();
        let b = batched.analyze(&reviews).await.unwrap();

        assert_eq!(a.categories, b.categories);
        assert_eq!(a.strengths, b.strengths);
        let titles = |r: &Report| {
            r.detailed_reviews
                .iter()
                .map(|d| d.title.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(titles(&a), titles(&b));
        assert_eq!(titles(&a)[0], "Consigliatissimo!!!");
    }

    #[tokio::test]
    async fn test_sample_corpus_summary() {
        let report = aggregator().analyze(&sample_reviews()).await.unwrap();
        assert_eq!(report.summary.total_reviews, 19);
        assert_eq!(report.detailed_reviews.len(), 19);
        // "Nulla, tutto perfetto!" is a sentinel, so the first review has no complaint
        assert_eq!(report.detailed_reviews[0].negative_sentiment, NegativeSentiment::Absent);
        assert!(report.categories[&CategoryTag::Facilities].mentions >= 5);
        for d in &report.detailed_reviews {
            let mut cats = d.categories_mentioned.clone();
            cats.dedup();
            assert_eq!(cats.len(), d.categories_mentioned.len());
        }
    }

    #[tokio::test]
    async fn test_first_failure_aborts_batch() {
        let agg = CorpusAggregator::new(
            ExplodingSentiment,
            StubKeyphrases::default(),
            AnalyzerSettings {
                concurrency: 3,
                ..AnalyzerSettings::default()
            },
        );
        let reviews = [
            Review::new("ok", Some("Staff eccellente"), None),
            Review::new("first", Some("boom"), None),
            Review::new("second", None, Some("boom again")),
        ];
        let err = agg.analyze(&reviews).await.unwrap_err();
        match err {
            AnalysisError::Inference { index, title, .. } => {
                assert_eq!(index, 1);
                assert_eq!(title, "first");
            }
        }
    }
}
