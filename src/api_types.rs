use serde::{Deserialize, Serialize};

/// Request body for a Hugging Face text-classification endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ApiClassifyRequest<'a> {
    pub inputs: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiLabelScore {
    pub label: String, // "LABEL_2", "positive", "4 stars", ...
    pub score: f64,
}

/// The hosted API answers either `[{..}]` or `[[{..}]]` (one list per input),
/// or `{"error": ".."}` while the model is loading or the input is rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiClassifyResponse {
    Batched(Vec<Vec<ApiLabelScore>>),
    Flat(Vec<ApiLabelScore>),
    Error { error: String },
}

impl ApiClassifyResponse {
    /// Highest scoring label, or the endpoint's error message.
    pub fn top(self) -> Result<Option<ApiLabelScore>, String> {
        let scores = match self {
            ApiClassifyResponse::Batched(mut xs) => {
                if xs.is_empty() {
                    Vec::new()
                } else {
                    xs.swap_remove(0)
                }
            }
            ApiClassifyResponse::Flat(xs) => xs,
            ApiClassifyResponse::Error { error } => return Err(error),
        };
        Ok(scores
            .into_iter()
            .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal)))
    }
}

/// Strict JSON the keyphrase prompt asks the LLM for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyphrases {
    #[serde(default)]
    pub keyphrases: Vec<ApiKeyphrase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyphrase {
    pub phrase: String,
    #[serde(default)]
    pub score: f64, // [0.0, 1.0]
}
