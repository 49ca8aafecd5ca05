use async_trait::async_trait;
use awful_aj::{config::AwfulJadeConfig, template::ChatTemplate};
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::api_types::ApiKeyphrases;
use crate::budget::cap_fragment;
use crate::config::AnalyzerSettings;
use crate::error::InferenceError;
use crate::llm::{extract_json, llm_call};
use crate::prompts::user_keyphrases;

/// Phrase extraction boundary. Results are ranked by score, descending.
#[async_trait(?Send)]
pub trait KeyphraseInference {
    async fn infer_keyphrases(
        &self,
        text: &str,
        ngram_range: (usize, usize),
        max_candidates: usize,
    ) -> Result<Vec<(String, f64)>, InferenceError>;
}

/// Which path produced a keyword list.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Extracted(Vec<String>),
    Degraded { keywords: Vec<String>, reason: String },
}

impl Extraction {
    pub fn keywords(&self) -> &[String] {
        match self {
            Extraction::Extracted(kws) => kws,
            Extraction::Degraded { keywords, .. } => keywords,
        }
    }

    pub fn into_keywords(self) -> Vec<String> {
        match self {
            Extraction::Extracted(kws) => kws,
            Extraction::Degraded { keywords, .. } => keywords,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Extraction::Degraded { .. })
    }
}

pub struct KeywordExtractor<K> {
    backend: K,
    min_text_len: usize,
    max_positive: usize,
    max_negative: usize,
    ngram_range: (usize, usize),
    max_candidates: usize,
    issue_terms: Vec<String>,
    facility_terms: Vec<String>,
    stopwords: HashSet<String>,
    word_re: Regex,
}

impl<K: KeyphraseInference> KeywordExtractor<K> {
    pub fn new(backend: K, settings: &AnalyzerSettings) -> Self {
        let lower = |xs: &[String]| xs.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>();
        Self {
            backend,
            min_text_len: settings.min_keyword_text_len,
            max_positive: settings.max_positive_keywords,
            max_negative: settings.max_negative_keywords,
            ngram_range: (1, settings.max_ngram.max(1)),
            max_candidates: settings.max_candidates,
            issue_terms: lower(&settings.issue_terms),
            facility_terms: lower(&settings.facility_terms),
            stopwords: settings.stopword_set(),
            word_re: Regex::new(r"\b\w{4,}\b").expect("static regex"),
        }
    }

    /// Ranked keywords for one fragment. Never fails: boundary errors fall back
    /// to deterministic tokenization and are reported as `Degraded`.
    pub async fn extract(&self, text: &str, is_negative: bool) -> Extraction {
        let text = text.trim();
        if text.chars().count() < self.min_text_len {
            return Extraction::Extracted(Vec::new());
        }

        match self
            .backend
            .infer_keyphrases(text, self.ngram_range, self.max_candidates)
            .await
        {
            Ok(ranked) => {
                let phrases = ranked.into_iter().map(|(phrase, _)| phrase);
                let keywords: Vec<String> = if is_negative {
                    phrases
                        .filter(|p| self.is_actionable_issue(p))
                        .take(self.max_negative)
                        .collect()
                } else {
                    phrases.take(self.max_positive).collect()
                };
                debug!(
                    "Keywords extracted - negative={}, count={}",
                    is_negative,
                    keywords.len()
                );
                Extraction::Extracted(keywords)
            }
            Err(e) => {
                if matches!(e, InferenceError::Unconfigured) {
                    debug!("No keyphrase backend, using fallback");
                } else {
                    warn!("Keyphrase extraction failed, using fallback - error={}", e);
                }
                Extraction::Degraded {
                    keywords: self.fallback(text, is_negative),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Known issue term, any multi-word phrase, or a facility named in a complaint.
    fn is_actionable_issue(&self, phrase: &str) -> bool {
        let p = phrase.to_lowercase();
        self.issue_terms.iter().any(|t| p.contains(t.as_str()))
            || p.contains(' ')
            || self.facility_terms.iter().any(|t| p.contains(t.as_str()))
    }

    fn fallback(&self, text: &str, is_negative: bool) -> Vec<String> {
        let cap = if is_negative { self.max_negative } else { self.max_positive };
        let lowered = text.to_lowercase();
        self.word_re
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|w| !self.stopwords.contains(*w))
            .take(cap)
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
impl<K> KeywordExtractor<K> {
    pub(crate) fn backend(&self) -> &K {
        &self.backend
    }
}

/// Keyphrases from an OpenAI-compatible chat model through awful_aj.
pub struct LlmKeyphraseBackend {
    cfg: AwfulJadeConfig,
    tpl: ChatTemplate,
    max_tokens: usize,
}

impl LlmKeyphraseBackend {
    pub fn new(cfg: AwfulJadeConfig, tpl: ChatTemplate, max_tokens: usize) -> Self {
        Self {
            cfg,
            tpl,
            max_tokens,
        }
    }
}

/// Parse the strict-JSON answer, enforce the n-gram bound, rank and cap.
pub fn parse_keyphrases(
    answer: &str,
    ngram_range: (usize, usize),
    max_candidates: usize,
) -> Result<Vec<(String, f64)>, InferenceError> {
    let json = extract_json(answer)
        .ok_or_else(|| InferenceError::Decode("no JSON object in LLM answer".into()))?;
    let parsed: ApiKeyphrases =
        serde_json::from_str(json).map_err(|e| InferenceError::Decode(e.to_string()))?;

    let (min_n, max_n) = ngram_range;
    let mut seen = HashSet::new();
    let mut phrases: Vec<(String, f64)> = parsed
        .keyphrases
        .into_iter()
        .map(|k| (k.phrase.trim().to_lowercase(), k.score))
        .filter(|(p, _)| {
            let n = p.split_whitespace().count();
            n >= min_n.max(1) && n <= max_n
        })
        .filter(|(p, _)| seen.insert(p.clone()))
        .collect();

    // stable: equal scores keep the model's order
    phrases.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    phrases.truncate(max_candidates);
    Ok(phrases)
}

#[async_trait(?Send)]
impl KeyphraseInference for LlmKeyphraseBackend {
    async fn infer_keyphrases(
        &self,
        text: &str,
        ngram_range: (usize, usize),
        max_candidates: usize,
    ) -> Result<Vec<(String, f64)>, InferenceError> {
        let fragment = cap_fragment(text, self.max_tokens);
        let user = user_keyphrases(fragment, ngram_range.1, max_candidates);
        let answer = llm_call(&self.cfg, &self.tpl, &user).await?;
        parse_keyphrases(&answer, ngram_range, max_candidates)
    }
}

/// A missing backend always fails, so every fragment takes the fallback path.
#[async_trait(?Send)]
impl<K: KeyphraseInference> KeyphraseInference for Option<K> {
    async fn infer_keyphrases(
        &self,
        text: &str,
        ngram_range: (usize, usize),
        max_candidates: usize,
    ) -> Result<Vec<(String, f64)>, InferenceError> {
        match self {
            Some(backend) => {
                backend
                    .infer_keyphrases(text, ngram_range, max_candidates)
                    .await
            }
            None => Err(InferenceError::Unconfigured),
        }
    }
}
