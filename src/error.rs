use thiserror::Error;

/// Failure raised by an inference boundary (sentiment or keyphrases).
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("inference endpoint reported an error: {0}")]
    Api(String),

    #[error("could not decode inference response: {0}")]
    Decode(String),

    #[error("LLM call failed: {0}")]
    Llm(String),

    #[error("inference returned no results")]
    Empty,

    #[error("no inference backend configured")]
    Unconfigured,
}

/// Failure of a whole `analyze` run. No partial report is produced.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sentiment inference failed on review #{index} ({title:?}): {source}")]
    Inference {
        index: usize,
        title: String,
        #[source]
        source: InferenceError,
    },
}
