// src/render.rs
use crate::models::Report;

pub fn render_report_markdown(r: &Report) -> String {
    let mut md = String::new();
    md.push_str("# Guest Review Analysis\n\n");

    let s = &r.summary;
    md.push_str("## Summary\n");
    md.push_str(&format!("- Total reviews: {}\n", s.total_reviews));
    md.push_str(&format!("- Overall sentiment: {}\n", s.overall_sentiment));
    md.push_str(&format!("- Positive rate: {}%\n", s.positive_percentage));
    md.push_str(&format!("- Average confidence: {}\n\n", s.average_confidence));

    if !r.categories.is_empty() {
        md.push_str("## Categories\n");
        for (cat, insight) in &r.categories {
            md.push_str(&format!(
                "- **{}**: {} mentions | {} | conf {}\n",
                cat.display_name(),
                insight.mentions,
                insight.avg_sentiment,
                insight.confidence
            ));
        }
        md.push('\n');
    }

    md.push_str("## Top Strengths\n");
    if r.strengths.is_empty() {
        md.push_str("_No specific strengths identified._\n");
    }
    for (i, k) in r.strengths.iter().enumerate() {
        md.push_str(&format!("{}. {} (mentioned {} times)\n", i + 1, k.keyword, k.count));
    }
    md.push('\n');

    md.push_str("## Areas for Improvement\n");
    if r.areas_for_improvement.is_empty() {
        md.push_str("_No specific issues identified._\n");
    }
    for (i, k) in r.areas_for_improvement.iter().enumerate() {
        md.push_str(&format!("{}. {} (mentioned {} times)\n", i + 1, k.keyword, k.count));
    }
    md.push('\n');

    if !r.detailed_reviews.is_empty() {
        md.push_str("## Detailed Reviews\n");
        for d in &r.detailed_reviews {
            md.push_str(&format!("\n### {}\n", d.title.trim()));
            let pos = d.positive_sentiment.map(|l| l.as_str()).unwrap_or("None");
            md.push_str(&format!("- Positive: {}\n", pos));
            md.push_str(&format!("- Negative: {}\n", d.negative_sentiment));
            if !d.categories_mentioned.is_empty() {
                let cats: Vec<&str> = d.categories_mentioned.iter().map(|c| c.as_str()).collect();
                md.push_str(&format!("- Categories: {}\n", cats.join(", ")));
            }
            if !d.key_strengths.is_empty() {
                md.push_str(&format!("- Key strengths: {}\n", d.key_strengths.join(", ")));
            }
            if !d.key_issues.is_empty() {
                md.push_str(&format!("- Key issues: {}\n", d.key_issues.join(", ")));
            }
            if d.degraded_extraction {
                md.push_str("- _Keywords from fallback extraction_\n");
            }
        }
    }

    md
}
