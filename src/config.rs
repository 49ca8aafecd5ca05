use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::debug;

use crate::models::{CategoryTag, SentimentLabel};

/// Category -> trigger keywords. Keywords are tested in listed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTable(BTreeMap<CategoryTag, Vec<String>>);

impl CategoryTable {
    pub fn new(entries: impl IntoIterator<Item = (CategoryTag, Vec<String>)>) -> Self {
        Self(entries.into_iter().collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryTag, &Vec<String>)> {
        self.0.iter()
    }

    pub fn keywords(&self, tag: CategoryTag) -> &[String] {
        self.0.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn words(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|s| s.to_string()).collect()
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new([
            (
                CategoryTag::StaffService,
                words(&[
                    "staff", "personale", "servizio", "accoglienza", "reception",
                    "gentile", "cortese", "professionale", "disponibile", "danilo",
                ]),
            ),
            (
                CategoryTag::Cleanliness,
                words(&["pulizia", "pulito", "pulitissimo", "pulite", "igiene", "ordinato"]),
            ),
            (
                CategoryTag::Facilities,
                words(&[
                    "piscina", "spa", "wellness", "palestra", "terrazza", "ristorante",
                    "bar", "padel", "idromassaggio", "aria condizionata",
                ]),
            ),
            (
                CategoryTag::RoomQuality,
                words(&[
                    "camera", "stanza", "letto", "balcone", "vista", "moderna",
                    "elegante", "ampia", "insonorizzata", "condizionatore",
                ]),
            ),
            (
                CategoryTag::Breakfast,
                words(&["colazione", "breakfast", "dolce", "salata", "scelta", "qualità"]),
            ),
            (
                CategoryTag::Location,
                words(&[
                    "posizione", "villa pamphili", "parco", "centro", "navetta",
                    "trasporto", "fermata", "collegamento", "parcheggio",
                ]),
            ),
            (
                CategoryTag::ValuePrice,
                words(&["prezzo", "rapporto", "qualità/prezzo", "valore", "costo"]),
            ),
        ])
    }
}

/// Raw model label -> closed label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPreset {
    /// cardiffnlp/twitter-xlm-roberta-base-sentiment
    #[default]
    ThreeClass,
    /// nlptown/bert-base-multilingual-uncased-sentiment
    FiveClass,
}

impl LabelPreset {
    pub fn map(&self, raw: &str) -> Option<SentimentLabel> {
        use SentimentLabel::*;
        let raw = raw.trim();
        match self {
            LabelPreset::ThreeClass => match raw {
                "LABEL_0" | "negative" => Some(Negative),
                "LABEL_1" | "neutral" => Some(Neutral),
                "LABEL_2" | "positive" => Some(Positive),
                _ => None,
            },
            LabelPreset::FiveClass => match raw {
                "LABEL_1" | "1 star" => Some(VeryNegative),
                "LABEL_2" | "2 stars" => Some(Negative),
                "LABEL_3" | "3 stars" => Some(Neutral),
                "LABEL_4" | "4 stars" => Some(Positive),
                "LABEL_5" | "5 stars" => Some(VeryPositive),
                _ => None,
            },
        }
    }

    /// Label used when the model returns something outside the table.
    pub fn fallback(&self) -> SentimentLabel {
        match self {
            LabelPreset::ThreeClass => SentimentLabel::Positive,
            LabelPreset::FiveClass => SentimentLabel::Neutral,
        }
    }

    pub fn resolve(&self, raw: &str) -> SentimentLabel {
        self.map(raw).unwrap_or_else(|| self.fallback())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    pub categories: CategoryTable,
    pub label_preset: LabelPreset,
    /// Fragments shorter than this (in chars, trimmed) yield no keywords.
    pub min_keyword_text_len: usize,
    pub max_positive_keywords: usize,
    pub max_negative_keywords: usize,
    pub max_ngram: usize,
    pub max_candidates: usize,
    pub top_strengths: usize,
    pub top_issues: usize,
    /// Strength keywords must be longer than this many chars.
    pub min_strength_len: usize,
    pub very_positive_threshold: f64,
    pub null_sentinels: Vec<String>,
    pub issue_terms: Vec<String>,
    pub facility_terms: Vec<String>,
    pub fallback_stopwords: Vec<String>,
    pub strength_blacklist: Vec<String>,
    pub issue_blacklist: Vec<String>,
    pub concurrency: usize,
    pub max_fragment_tokens: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            categories: CategoryTable::default(),
            label_preset: LabelPreset::default(),
            min_keyword_text_len: 10,
            max_positive_keywords: 5,
            max_negative_keywords: 3,
            max_ngram: 2,
            max_candidates: 10,
            top_strengths: 5,
            top_issues: 3,
            min_strength_len: 3,
            very_positive_threshold: 0.8,
            null_sentinels: words(&["null", "nulla", "nulla, tutto perfetto!"]),
            issue_terms: words(&[
                "rumoroso", "piccolo", "affollata", "disorganizzato", "lento",
                "sporco", "freddo", "caldo", "rotto", "mancante", "difficile",
            ]),
            facility_terms: words(&["piscina", "colazione", "camera", "servizio", "trasporto"]),
            fallback_stopwords: words(&[
                "questo", "quello", "molto", "tutto", "sempre", "anche", "dalla",
                "nella", "della", "delle", "degli", "sono", "stata", "stato",
                "erano", "aveva", "avuto", "fatto", "dire", "detto", "bene",
                "male", "più", "meno", "come", "quando", "dove", "cosa", "che",
                "nostro", "vostra", "essere", "avere", "fare", "andare", "venire",
            ]),
            strength_blacklist: words(&["tutto", "molto", "bene"]),
            issue_blacklist: words(&["meno", "poco"]),
            concurrency: 4,
            max_fragment_tokens: 512,
        }
    }
}

impl AnalyzerSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Reading settings from {}", path.display()))?;
        let settings: AnalyzerSettings = serde_json::from_str(&raw)
            .with_context(|| format!("Decoding settings JSON from {}", path.display()))?;
        debug!(
            "Settings loaded - path={}, label_preset={:?}, concurrency={}",
            path.display(),
            settings.label_preset,
            settings.concurrency
        );
        Ok(settings)
    }

    pub fn stopword_set(&self) -> HashSet<String> {
        self.fallback_stopwords.iter().map(|s| s.to_lowercase()).collect()
    }
}
