use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One guest review as it arrives from the booking platform export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "ReviewRecord")]
pub struct Review {
    pub title: String,
    pub positive_text: Option<String>,
    pub negative_text: Option<String>,
}

/// Wire shape of a review. Accepts English or Italian keys; missing or null
/// fields default, and the English key wins when both are present.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReviewRecord {
    title: Option<String>,
    titolo: Option<String>,
    positive_text: Option<String>,
    contenuto_positivo: Option<String>,
    negative_text: Option<String>,
    contenuto_negativo: Option<String>,
}

impl From<ReviewRecord> for Review {
    fn from(r: ReviewRecord) -> Self {
        Self {
            title: r.title.or(r.titolo).unwrap_or_default(),
            positive_text: r.positive_text.or(r.contenuto_positivo),
            negative_text: r.negative_text.or(r.contenuto_negativo),
        }
    }
}

impl Review {
    pub fn new(
        title: impl Into<String>,
        positive_text: Option<&str>,
        negative_text: Option<&str>,
    ) -> Self {
        Self {
            title: title.into(),
            positive_text: positive_text.map(str::to_string),
            negative_text: negative_text.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Very Negative")]
    VeryNegative,
    Negative,
    Neutral,
    Positive,
    #[serde(rename = "Very Positive")]
    VeryPositive,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryNegative => "Very Negative",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::VeryPositive => "Very Positive",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub confidence: f64, // [0.0, 1.0], 3 decimals
}

impl SentimentResult {
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }
}

/// Sentiment of the negative fragment. `Absent` renders as the `"None"` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NegativeSentiment {
    #[default]
    Absent,
    Present(SentimentLabel),
}

impl NegativeSentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            NegativeSentiment::Absent => "None",
            NegativeSentiment::Present(label) => label.as_str(),
        }
    }

    /// No actionable complaint: absent or neutral.
    pub fn is_non_actionable(&self) -> bool {
        matches!(
            self,
            NegativeSentiment::Absent | NegativeSentiment::Present(SentimentLabel::Neutral)
        )
    }
}

impl Serialize for NegativeSentiment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for NegativeSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryTag {
    StaffService,
    Cleanliness,
    Facilities,
    RoomQuality,
    Breakfast,
    Location,
    ValuePrice,
}

impl CategoryTag {
    pub const ALL: [CategoryTag; 7] = [
        CategoryTag::StaffService,
        CategoryTag::Cleanliness,
        CategoryTag::Facilities,
        CategoryTag::RoomQuality,
        CategoryTag::Breakfast,
        CategoryTag::Location,
        CategoryTag::ValuePrice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryTag::StaffService => "staff_service",
            CategoryTag::Cleanliness => "cleanliness",
            CategoryTag::Facilities => "facilities",
            CategoryTag::RoomQuality => "room_quality",
            CategoryTag::Breakfast => "breakfast",
            CategoryTag::Location => "location",
            CategoryTag::ValuePrice => "value_price",
        }
    }

    /// "staff_service" -> "Staff Service"
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .map(|w| {
                let mut cs = w.chars();
                match cs.next() {
                    Some(first) => first.to_uppercase().chain(cs).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DetailedReview {
    pub review_id: String, // xxh3 of title + fragments
    pub title: String,
    pub positive_sentiment: Option<SentimentLabel>,
    pub negative_sentiment: NegativeSentiment,
    pub categories_mentioned: Vec<CategoryTag>,
    pub key_strengths: Vec<String>,
    pub key_issues: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub degraded_extraction: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInsight {
    pub mentions: usize,
    pub avg_sentiment: SentimentLabel, // mode, not a mean
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_reviews: usize,
    pub overall_sentiment: SentimentLabel,
    pub average_confidence: f64,
    pub positive_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub categories: BTreeMap<CategoryTag, CategoryInsight>,
    pub strengths: Vec<KeywordCount>,
    pub areas_for_improvement: Vec<KeywordCount>,
    pub detailed_reviews: Vec<DetailedReview>,
}
