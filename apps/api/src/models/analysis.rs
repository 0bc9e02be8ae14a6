use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured verdict returned by the Gemini analysis call. Cached verbatim
/// once produced; error-shaped variants carry their marker in
/// `overall_conclusion.headline` and are never cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub creative_description: String,
    pub effectiveness_score: f64,
    pub effectiveness_justification: String,
    pub clarity_score: f64,
    pub clarity_justification: String,
    pub text_to_image_ratio: f64,
    pub text_to_image_ratio_justification: String,
    pub funnel_stage: String,
    pub funnel_stage_justification: String,
    pub recommendations: Vec<RecommendationItem>,
    pub advantage_plus_analysis: Vec<AdvantagePlusRecommendation>,
    pub placement_summaries: Vec<PlacementSummary>,
    pub overall_conclusion: OverallConclusion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub headline: String,
    pub points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvantagePlusRecommendation {
    pub enhancement: String,
    /// "ACTIVATE" or "CAUTION".
    pub applicable: String,
    pub justification: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementSummary {
    pub placement_id: String,
    pub summary: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChecklistSeverity {
    Critical,
    Actionable,
    Positive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub severity: ChecklistSeverity,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallConclusion {
    pub headline: String,
    pub checklist: Vec<ChecklistItem>,
}

/// Cached analysis with its write time. Freshness is re-checked on every
/// read; expired entries are left in place and overwritten by later writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedAnalysis {
    pub result: AnalysisResult,
    /// Epoch milliseconds at write time.
    pub timestamp: i64,
}

/// Record of a past successful analysis. Doubles as the dedup lookup for
/// re-uploaded creatives and as prompt context for later analyses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHistoryEntry {
    pub client_id: String,
    pub filename: String,
    pub hash: String,
    pub size: u64,
    pub date: DateTime<Utc>,
    pub description: String,
}
