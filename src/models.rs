// =============================================================================
// models.rs: THE DATA STRUCTURES OF AI VISIBILITY
// =============================================================================
//
// Every value here is created fresh per analysis call and handed back to the
// caller. Nothing is persisted, nothing is shared, nothing has identity
// except the citation records (and those only because the dashboard wants
// to sort them by something).
//
// Analysis payloads serialize in camelCase because the dashboard charts were
// written against that shape. Monitoring results and citation records use
// snake_case because that's what the database rows look like. Two casing
// conventions in one file. We contain multitudes.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::EngineError;

/// The closed set of languages we monitor in. Each one has its own
/// ranking vocabulary, query corpus and substitution table in the
/// keyword registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Arabic,
    Kurdish,
    Farsi,
}

impl Language {
    /// Every language, in monitoring priority order.
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::Arabic,
        Language::Kurdish,
        Language::Farsi,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Arabic => "arabic",
            Language::Kurdish => "kurdish",
            Language::Farsi => "farsi",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "arabic" | "ar" => Ok(Language::Arabic),
            "kurdish" | "ku" | "ckb" => Ok(Language::Kurdish),
            "farsi" | "fa" | "persian" => Ok(Language::Farsi),
            _ => Err(EngineError::UnknownLanguage(s.to_string())),
        }
    }
}

/// A registered competitor spotted in a response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorMention {
    /// The registered full company name (not the casing found in the text).
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    pub context: String,
    /// 0.8 when a context window could be extracted, 0.5 otherwise.
    pub confidence: f64,
}

/// The verdict on one AI response: were we mentioned, how confidently,
/// how high, and how nicely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CitationAnalysis {
    pub cited: bool,
    /// 0.0 ..= 1.0, always 0.0 when not cited
    pub confidence: f64,
    /// Inferred rank, 1 = first. Absent when not cited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    /// Up to three sentences around the first mention.
    pub context: String,
    /// -1.0 ..= 1.0, measured over `context` only
    pub sentiment_score: f64,
    /// Competitors in order of first appearance. Reported even when we
    /// weren't cited, because their visibility doesn't depend on ours.
    pub competitor_mentions: Vec<CompetitorMention>,
    /// 0.0 ..= 1.0, always 0.0 when not cited
    pub quality_score: f64,
}

/// Single-response positioning summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionAnalysis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directdrive_position: Option<u32>,
    pub total_companies: usize,
    pub market_share: f64,
    pub confidence: f64,
}

/// Aggregated picture of one company across a batch of responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorProfile {
    pub name: String,
    pub mention_frequency: u32,
    /// Mean observed rank; 10.0 means "never ranked".
    pub average_position: f64,
    pub sentiment_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    /// Percentage of all tracked mentions, 0.0 ..= 100.0
    pub market_share: f64,
}

/// Output of one competitive landscape run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    /// Top five mentioned competitors by composite score.
    pub market_leaders: Vec<CompetitorProfile>,
    pub directdrive_profile: CompetitorProfile,
    pub market_gaps: Vec<String>,
    pub opportunities: Vec<String>,
    pub threats: Vec<String>,
    pub recommendations: Vec<String>,
}

/// The lightweight scoreboard: best rank, visibility and dominance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directdrive_rank: Option<u32>,
    /// Largest competitor count seen in any single response.
    pub total_competitors: usize,
    pub market_visibility: f64,
    pub competitive_gap: f64,
    pub dominance_score: f64,
    pub improvement_potential: f64,
}

/// One language's worth of rephrasings of a base query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariation {
    pub original: String,
    pub variations: Vec<String>,
    pub language: Language,
    /// Lower is more important. English 1, Arabic/Kurdish 2, Farsi 3.
    pub priority: u8,
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuerySet {
    pub base_query: String,
    pub variations: Vec<QueryVariation>,
    pub total_queries: usize,
}

/// How often a scheduled query gets asked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleEntry {
    pub query: String,
    pub frequency: Frequency,
    /// "english" or "mixed"
    pub language: String,
}

/// The AI models whose answers we grade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AiModel {
    #[serde(rename = "chatgpt")]
    ChatGpt,
    #[serde(rename = "google-ai")]
    GoogleAi,
    #[serde(rename = "perplexity")]
    Perplexity,
}

impl AiModel {
    pub const ALL: [AiModel; 3] = [AiModel::ChatGpt, AiModel::GoogleAi, AiModel::Perplexity];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiModel::ChatGpt => "chatgpt",
            AiModel::GoogleAi => "google-ai",
            AiModel::Perplexity => "perplexity",
        }
    }
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiModel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chatgpt" | "openai" => Ok(AiModel::ChatGpt),
            "google-ai" | "google_ai" | "gemini" => Ok(AiModel::GoogleAi),
            "perplexity" => Ok(AiModel::Perplexity),
            _ => Err(EngineError::UnknownModel(s.to_string())),
        }
    }
}

/// One (query, response) pair as delivered by the orchestration layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseRecord {
    pub query: String,
    pub response: String,
    #[serde(default, alias = "aiModel", skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<AiModel>,
}

impl ResponseRecord {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            ai_model: None,
        }
    }

    pub fn with_model(mut self, model: AiModel) -> Self {
        self.ai_model = Some(model);
        self
    }
}

/// What a model adapter reports for one response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitoringResult {
    pub cited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    pub response_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// A citation row ready for the persistence layer to store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<u64>,
    pub ai_model: AiModel,
    pub query_text: String,
    pub cited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    pub monitored_at: DateTime<Utc>,
}

impl CitationRecord {
    /// Stamp a monitoring result with a fresh UUID and the current time.
    pub fn new(
        ai_model: AiModel,
        query_text: String,
        result: &MonitoringResult,
        content_id: Option<u64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content_id,
            ai_model,
            query_text,
            cited: result.cited,
            citation_context: result.citation_context.clone(),
            position: result.position,
            monitored_at: Utc::now(),
        }
    }
}

impl fmt::Display for CitationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.cited { "CITED" } else { "not cited" };
        match self.position {
            Some(rank) => write!(
                f,
                "[{}] {} on \"{}\": {} at #{}",
                self.id, self.ai_model, self.query_text, verdict, rank
            ),
            None => write!(
                f,
                "[{}] {} on \"{}\": {}",
                self.id, self.ai_model, self.query_text, verdict
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_labels_round_trip_through_from_str() {
        for language in Language::ALL {
            assert_eq!(language.as_str().parse::<Language>().unwrap(), language);
        }
        assert!(matches!(
            "klingon".parse::<Language>(),
            Err(EngineError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_response_record_accepts_camel_case_model_field() {
        let record: ResponseRecord = serde_json::from_str(
            r#"{"query":"q","response":"r","aiModel":"google-ai"}"#,
        )
        .unwrap();
        assert_eq!(record.ai_model, Some(AiModel::GoogleAi));
    }

    #[test]
    fn test_citation_record_copies_monitoring_result() {
        let result = MonitoringResult {
            cited: true,
            citation_context: Some("DirectDrive Logistics is fast".to_string()),
            position: Some(2),
            response_text: "DirectDrive Logistics is fast.".to_string(),
            sources: vec![],
        };
        let record = CitationRecord::new(AiModel::Perplexity, "q".to_string(), &result, Some(7));
        assert!(record.cited);
        assert_eq!(record.position, Some(2));
        assert_eq!(record.content_id, Some(7));
        assert!(Uuid::parse_str(&record.id).is_ok());
    }

    #[test]
    fn test_analysis_serializes_in_camel_case() {
        let profile = CompetitorProfile {
            name: "X".to_string(),
            mention_frequency: 0,
            average_position: 10.0,
            sentiment_score: 0.0,
            strengths: vec![],
            weaknesses: vec![],
            market_share: 0.0,
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"mentionFrequency\":0"));
        assert!(json.contains("\"averagePosition\":10.0"));
    }
}
