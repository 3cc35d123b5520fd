// =============================================================================
// monitors/mod.rs: ONE DETECTOR, THREE PERSONALITIES
// =============================================================================
//
// ChatGPT, Gemini and Perplexity all get asked the same market questions,
// but not in the same way. ChatGPT gets a friendly English prompt. Gemini
// gets asked in Arabic, because that's where regional answers come from.
// Perplexity gets told to cite its sources, because that's its whole thing.
//
// What they do NOT get is their own keyword search. Every answer goes
// through the one CitationDetector. A model's personality is data: a
// detection language, a rank-bucket table, a system prompt and a handful
// of curated prompts. That's a ModelProfile. Wrap it with a detector and
// you have a ResponseAdapter.
//
// The network clients that actually talk to these models live elsewhere.
// By the time text reaches us it is just a string and maybe some URLs.
// =============================================================================

pub mod chatgpt;
pub mod google_ai;
pub mod perplexity;

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::citation_detector::{CitationDetector, PositionThresholds};
use crate::error::Result;
use crate::keywords::KeywordSet;
use crate::models::{AiModel, CitationAnalysis, CitationRecord, Language, MonitoringResult};

/// Placeholder in fallback prompts that receives the raw query.
const QUERY_SLOT: &str = "{query}";

/// Everything that makes one model's monitoring different from another's.
#[derive(Debug, Clone)]
pub struct ModelProfile {
    pub model: AiModel,
    /// Language whose ranking vocabulary is used on this model's answers.
    pub detection_language: Language,
    pub thresholds: PositionThresholds,
    pub system_prompt: Option<String>,
    /// Hand-written prompts for the canonical queries, keyed by query.
    pub curated_prompts: HashMap<String, String>,
    /// Used for any other query; `{query}` is replaced with the query.
    pub fallback_prompt: String,
}

impl ModelProfile {
    pub(crate) fn from_parts(
        model: AiModel,
        detection_language: Language,
        thresholds: PositionThresholds,
        system_prompt: Option<&str>,
        curated: &[(&str, &str)],
        fallback_prompt: &str,
    ) -> Self {
        Self {
            model,
            detection_language,
            thresholds,
            system_prompt: system_prompt.map(str::to_string),
            curated_prompts: curated
                .iter()
                .map(|(q, p)| (q.to_string(), p.to_string()))
                .collect(),
            fallback_prompt: fallback_prompt.to_string(),
        }
    }

    pub fn build_prompt(&self, query: &str) -> String {
        self.curated_prompts
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.fallback_prompt.replace(QUERY_SLOT, query))
    }
}

/// A model profile bound to the shared detector.
#[derive(Clone)]
pub struct ResponseAdapter {
    profile: ModelProfile,
    detector: CitationDetector,
}

impl ResponseAdapter {
    pub fn new(profile: ModelProfile, keywords: Arc<KeywordSet>) -> Self {
        let detector = CitationDetector::new(keywords).with_thresholds(profile.thresholds);
        Self { profile, detector }
    }

    pub fn profile(&self) -> &ModelProfile {
        &self.profile
    }

    pub fn model(&self) -> AiModel {
        self.profile.model
    }

    /// Detection with this model's language and rank thresholds.
    pub fn detect(&self, response_text: &str) -> CitationAnalysis {
        self.detector
            .detect_citation(response_text, self.profile.detection_language)
    }

    /// Grade one model answer. Context and position are only reported for
    /// cited answers.
    pub fn analyze_response(&self, response_text: &str, sources: Vec<String>) -> MonitoringResult {
        self.monitoring_result(self.detect(response_text), response_text, sources)
    }

    /// Build the monitoring row from an analysis already run by [`Self::detect`].
    pub fn monitoring_result(
        &self,
        analysis: CitationAnalysis,
        response_text: &str,
        sources: Vec<String>,
    ) -> MonitoringResult {
        debug!(
            model = %self.profile.model,
            cited = analysis.cited,
            position = ?analysis.position,
            sources = sources.len(),
            "Model response analyzed"
        );

        if !analysis.cited {
            return MonitoringResult {
                cited: false,
                citation_context: None,
                position: None,
                response_text: response_text.to_string(),
                sources,
            };
        }

        MonitoringResult {
            cited: true,
            citation_context: Some(analysis.context),
            position: analysis.position,
            response_text: response_text.to_string(),
            sources,
        }
    }

    pub fn create_citation_record(
        &self,
        query: &str,
        result: &MonitoringResult,
        content_id: Option<u64>,
    ) -> CitationRecord {
        CitationRecord::new(self.profile.model, query.to_string(), result, content_id)
    }
}

/// One adapter per supported model.
pub struct AdapterSet {
    /// Indexed by `AiModel as usize`.
    adapters: [ResponseAdapter; 3],
}

impl AdapterSet {
    pub fn new(keywords: Arc<KeywordSet>) -> Result<Self> {
        Ok(Self {
            adapters: [
                ResponseAdapter::new(chatgpt::profile()?, Arc::clone(&keywords)),
                ResponseAdapter::new(google_ai::profile()?, Arc::clone(&keywords)),
                ResponseAdapter::new(perplexity::profile()?, keywords),
            ],
        })
    }

    pub fn adapter(&self, model: AiModel) -> &ResponseAdapter {
        &self.adapters[model as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResponseAdapter> {
        self.adapters.iter()
    }
}
