use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::api_types::{ApiClassifyRequest, ApiClassifyResponse};
use crate::budget::cap_fragment;
use crate::config::LabelPreset;
use crate::error::InferenceError;
use crate::models::SentimentResult;

/// Raw answer of a sentiment model, before label mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentiment {
    pub label: String,
    pub score: f64,
}

/// Sentiment inference boundary. Must accept non-empty Italian or English text.
#[async_trait(?Send)]
pub trait SentimentInference {
    async fn infer_sentiment(&self, text: &str) -> Result<RawSentiment, InferenceError>;
}

/// Three decimals, exact halves to even.
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round_ties_even() / 1000.0
}

pub struct SentimentClassifier<S> {
    backend: S,
    labels: LabelPreset,
}

impl<S: SentimentInference> SentimentClassifier<S> {
    pub fn new(backend: S, labels: LabelPreset) -> Self {
        Self { backend, labels }
    }

    /// Blank text short-circuits to `{Neutral, 0.0}`; inference errors propagate.
    pub async fn classify(&self, text: &str) -> Result<SentimentResult, InferenceError> {
        if text.trim().is_empty() {
            return Ok(SentimentResult::neutral());
        }

        let raw = self.backend.infer_sentiment(text).await?;
        let label = match self.labels.map(&raw.label) {
            Some(label) => label,
            None => {
                let fallback = self.labels.fallback();
                warn!("Unmapped sentiment label - raw={}, fallback={}", raw.label, fallback);
                fallback
            }
        };

        Ok(SentimentResult {
            label,
            confidence: round3(raw.score.clamp(0.0, 1.0)),
        })
    }
}

/// Hugging Face Inference API text-classification backend.
pub struct HfSentimentBackend {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    max_tokens: usize,
}

impl HfSentimentBackend {
    pub const DEFAULT_API_BASE: &'static str = "https://api-inference.huggingface.co/";
    pub const DEFAULT_MODEL: &'static str = "cardiffnlp/twitter-xlm-roberta-base-sentiment";

    pub fn new(
        client: Client,
        api_base: &str,
        model: &str,
        token: Option<String>,
        max_tokens: usize,
    ) -> Result<Self, url::ParseError> {
        let base = if api_base.ends_with('/') {
            Url::parse(api_base)?
        } else {
            Url::parse(&format!("{}/", api_base))?
        };
        let endpoint = base.join(&format!("models/{}", model))?;
        Ok(Self {
            client,
            endpoint,
            token,
            max_tokens,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait(?Send)]
impl SentimentInference for HfSentimentBackend {
    async fn infer_sentiment(&self, text: &str) -> Result<RawSentiment, InferenceError> {
        let start = std::time::Instant::now();
        let inputs = cap_fragment(text, self.max_tokens);

        let mut req = self
            .client
            .post(self.endpoint.clone())
            .json(&ApiClassifyRequest { inputs });
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ApiClassifyResponse = resp
            .json()
            .await
            .map_err(|e| InferenceError::Decode(e.to_string()))?;
        let top = parsed.top().map_err(InferenceError::Api)?.ok_or(InferenceError::Empty)?;

        debug!(
            "Sentiment inference completed - duration={:.2}s, label={}, score={:.3}",
            start.elapsed().as_secs_f32(),
            top.label,
            top.score
        );

        Ok(RawSentiment {
            label: top.label,
            score: top.score,
        })
    }
}
