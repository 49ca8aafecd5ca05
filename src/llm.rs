use awful_aj::{api::ask, config::AwfulJadeConfig, template::ChatTemplate};
use tracing::{debug, info};

use crate::error::InferenceError;

pub async fn llm_call(
    cfg: &AwfulJadeConfig,
    tpl: &ChatTemplate,
    user: &str,
) -> Result<String, InferenceError> {
    let start = std::time::Instant::now();

    debug!("LLM call starting - prompt_length={} chars", user.len());

    // Map Box<dyn StdError> -> InferenceError *before* `?`
    let answer = ask(cfg, user.to_string(), tpl, None, None, false)
        .await
        .map_err(|e| InferenceError::Llm(e.to_string()))?;

    let elapsed = start.elapsed();
    info!(
        "LLM API call completed - duration={:.2}s, response_length={} chars",
        elapsed.as_secs_f32(),
        answer.len()
    );

    Ok(answer)
}

/// Cut the outermost JSON object out of a chatty LLM answer.
pub fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    (end > start).then(|| &response[start..=end])
}
