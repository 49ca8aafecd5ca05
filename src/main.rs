use anyhow::{Context, Result};
use awful_aj::{config, template};
use chrono::Utc;
use chrono_tz::Europe::Rome;
use clap::Parser;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use review_vibes::input::load_reviews;
use review_vibes::render::render_report_markdown;
use review_vibes::sample::sample_reviews;
use review_vibes::{
    AnalyzerSettings, CorpusAggregator, HfSentimentBackend, LabelPreset, LlmKeyphraseBackend,
    Report,
};

/// Review Vibes - guest review analysis for hospitality teams
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Reviews JSON (file path or http(s) URL); defaults to the built-in sample corpus
    #[arg(short, long)]
    input: Option<String>,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: String,

    /// Analyzer settings JSON (category table, word lists, thresholds)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Path to awful_aj config file for keyphrase extraction (overrides AJ_CONFIG)
    #[arg(short, long)]
    config: Option<String>,

    /// Chat template name for keyphrase extraction (overrides AJ_TEMPLATE_KEYPHRASES)
    #[arg(long)]
    template: Option<String>,

    /// Hugging Face Inference API base URL
    #[arg(long, default_value = HfSentimentBackend::DEFAULT_API_BASE)]
    hf_api_base: String,

    /// Sentiment model id on the inference API
    #[arg(long, default_value = HfSentimentBackend::DEFAULT_MODEL)]
    sentiment_model: String,

    /// Use the five-class (1-5 stars) label table instead of the three-class one
    #[arg(long)]
    five_class: bool,

    /// Reviews analyzed concurrently per batch (overrides settings)
    #[arg(long)]
    concurrency: Option<usize>,
}

fn resolve_paths() -> Result<(PathBuf, PathBuf, PathBuf)> {
    // 1) Base config dir: prefer env override, else awful_aj::config_dir()
    let base_dir = if let Ok(dir) = std::env::var("AJ_CONFIG_DIR") {
        PathBuf::from(dir)
    } else {
        awful_aj::config_dir().map_err(|e| anyhow::anyhow!(e.to_string()))?
    };

    // 2) Config file: prefer AJ_CONFIG, else <base>/config.yaml
    let cfg_path = if let Ok(p) = std::env::var("AJ_CONFIG") {
        PathBuf::from(p)
    } else {
        base_dir.join("config.yaml")
    };

    // 3) Template dir: prefer AJ_TEMPLATE_DIR, else <base>/templates
    let tpl_dir = if let Ok(p) = std::env::var("AJ_TEMPLATE_DIR") {
        PathBuf::from(p)
    } else {
        let d = base_dir.join("templates");
        // make it visible to awful_aj::template loader
        std::env::set_var("AJ_TEMPLATE_DIR", &d);
        d
    };

    Ok((base_dir, cfg_path, tpl_dir))
}

async fn load_keyphrase_backend(args: &Args, max_tokens: usize) -> Result<LlmKeyphraseBackend> {
    // Determine config path: CLI arg > resolve_paths logic
    let cfg_path = if let Some(ref config_path) = args.config {
        debug!("Using config file from --config argument: {}", config_path);
        PathBuf::from(config_path)
    } else {
        let (_base_dir, cfg_path, _tpl_dir) = resolve_paths()?;
        debug!("Using config file from environment/default: {}", cfg_path.display());
        cfg_path
    };

    // Friendlier error if missing
    if !cfg_path.exists() {
        return Err(anyhow::anyhow!(
            "awful_aj config not found at {}\n\
             Use --config to specify a config file, or set AJ_CONFIG environment variable.\n\
             Example config.yaml:\n\
             api_key: \"YOUR_KEY\"\napi_base: \"http://localhost:5001/v1\"\nmodel: \"qwen3_30b_a3\"\n",
            cfg_path.display()
        ));
    }

    let cfg = config::load_config(
        cfg_path
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("invalid config path"))?,
    )
    .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let tpl_name = args.template.clone().unwrap_or_else(|| {
        std::env::var("AJ_TEMPLATE_KEYPHRASES").unwrap_or_else(|_| "review_keyphrases".to_string())
    });
    let tpl = template::load_template(&tpl_name)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))
        .with_context(|| format!("load template {}", tpl_name))?;
    debug!("Loaded keyphrase template: {}", tpl_name);

    Ok(LlmKeyphraseBackend::new(cfg, tpl, max_tokens))
}

fn persist(report: &Report, output_dir: &str) -> Result<PathBuf> {
    let today = Utc::now().with_timezone(&Rome).format("%Y-%m-%d").to_string();
    let date_dir = Path::new(output_dir).join(&today);
    std::fs::create_dir_all(&date_dir)
        .with_context(|| format!("create {}", date_dir.display()))?;
    debug!("Output directory: {}", date_dir.display());

    std::fs::write(date_dir.join("report.json"), serde_json::to_vec_pretty(report)?)?;
    debug!("Wrote report.json");

    std::fs::write(date_dir.join("report.md"), render_report_markdown(report).as_bytes())?;
    debug!("Wrote report.md");

    Ok(date_dir)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting review_vibes");

    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => AnalyzerSettings::load(path)?,
        None => AnalyzerSettings::default(),
    };
    if args.five_class {
        settings.label_preset = LabelPreset::FiveClass;
    }
    if let Some(n) = args.concurrency {
        settings.concurrency = n;
    }

    let client = Client::builder().build()?;

    let reviews = match &args.input {
        Some(source) => load_reviews(&client, source).await?,
        None => {
            info!("No --input given, analyzing built-in sample corpus");
            sample_reviews()
        }
    };

    let token = std::env::var("HF_API_TOKEN").ok();
    if token.is_none() {
        debug!("HF_API_TOKEN not set, calling inference API anonymously");
    }
    let sentiment = HfSentimentBackend::new(
        client.clone(),
        &args.hf_api_base,
        &args.sentiment_model,
        token,
        settings.max_fragment_tokens,
    )
    .context("invalid sentiment inference endpoint")?;
    info!(
        "Sentiment backend - endpoint={}, labels={:?}",
        sentiment.endpoint(),
        settings.label_preset
    );
    let keyphrases = match load_keyphrase_backend(&args, settings.max_fragment_tokens).await {
        Ok(backend) => Some(backend),
        Err(e) => {
            warn!("Keyphrase LLM unavailable, using fallback keywords only - error={:#}", e);
            None
        }
    };

    let aggregator = CorpusAggregator::new(sentiment, keyphrases, settings);
    let report = aggregator.analyze(&reviews).await?;

    let date_dir = persist(&report, &args.output_dir)?;

    let s = &report.summary;
    info!(
        "Report written - directory={}, reviews={}, overall={}, positive_pct={}, avg_confidence={}, strengths={}, issues={}",
        date_dir.display(),
        s.total_reviews,
        s.overall_sentiment,
        s.positive_percentage,
        s.average_confidence,
        report.strengths.len(),
        report.areas_for_improvement.len()
    );
    Ok(())
}
