use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::models::Review;

/// Load a review batch from a local JSON file or an http(s) URL.
pub async fn load_reviews(client: &Client, source: &str) -> Result<Vec<Review>> {
    let start = std::time::Instant::now();

    let reviews: Vec<Review> = match Url::parse(source) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            debug!("Fetching reviews - url={}", url);
            client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("Request failed for {}", url))?
                .error_for_status()
                .with_context(|| format!("HTTP error for {}", url))?
                .json()
                .await
                .with_context(|| format!("Decoding JSON for {}", url))?
        }
        _ => {
            debug!("Reading reviews - path={}", source);
            let raw = tokio::fs::read_to_string(source)
                .await
                .with_context(|| format!("Reading reviews from {}", source))?;
            serde_json::from_str(&raw).with_context(|| format!("Decoding JSON from {}", source))?
        }
    };

    info!(
        "Reviews loaded - source={}, duration={:.2}s, reviews={}",
        source,
        start.elapsed().as_secs_f32(),
        reviews.len()
    );
    Ok(normalize_reviews(reviews))
}

pub fn normalize_reviews(mut reviews: Vec<Review>) -> Vec<Review> {
    for r in reviews.iter_mut() {
        r.title = r.title.trim().to_string();
    }
    reviews
}
