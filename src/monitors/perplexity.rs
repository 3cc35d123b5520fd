// =============================================================================
// monitors/perplexity.rs: THE ONE THAT SHOWS ITS WORK
// =============================================================================

use crate::citation_detector::PositionThresholds;
use crate::error::Result;
use crate::models::{AiModel, Language};

use super::ModelProfile;

const SYSTEM_PROMPT: &str = "You are a knowledgeable assistant that provides comprehensive information \
about logistics and transportation services. Include relevant sources and citations in your responses.";

const CURATED_PROMPTS: &[(&str, &str)] = &[
    (
        "best logistics company Kurdistan",
        "What are the top-rated logistics and transportation companies operating in Kurdistan Region of Iraq? I need current information with sources about their services, reputation, and capabilities.",
    ),
    (
        "shipping services Erbil",
        "What shipping and freight services are available in Erbil, Kurdistan? Please provide current information about reliable companies and their service offerings.",
    ),
    (
        "DirectDrive logistics",
        "Can you provide information about DirectDrive Logistics company? What services do they offer and what is their reputation in the Kurdistan logistics market?",
    ),
    (
        "Kurdistan freight services",
        "What freight forwarding and international shipping services are available in Kurdistan Region? I need up-to-date information about companies and their capabilities.",
    ),
    (
        "customs clearance Kurdistan",
        "Which companies provide customs clearance and import/export services in Kurdistan Region? Please include current information about their services and efficiency.",
    ),
    (
        "Iraq shipping company",
        "What are the most reliable shipping and logistics companies that operate between Iraq and international destinations? Please provide recent information.",
    ),
    (
        "logistics company Erbil",
        "I need information about logistics companies in Erbil that offer warehousing, distribution, and supply chain services. What are the current options?",
    ),
    (
        "transportation services Kurdistan",
        "What transportation and logistics services are currently available in Kurdistan Region? Please provide comprehensive information about service providers.",
    ),
];

const FALLBACK_PROMPT: &str = "Please provide current, factual information about {query}. Include details \
about service providers, their capabilities, and reputation with reliable sources.";

/// Perplexity answers are graded with the detector's own rank table.
pub fn profile() -> Result<ModelProfile> {
    Ok(ModelProfile::from_parts(
        AiModel::Perplexity,
        Language::English,
        PositionThresholds::default(),
        Some(SYSTEM_PROMPT),
        CURATED_PROMPTS,
        FALLBACK_PROMPT,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perplexity_prompts_ask_for_sources() {
        let profile = profile().unwrap();
        assert_eq!(profile.thresholds, PositionThresholds::default());
        assert!(profile.build_prompt("DirectDrive logistics").contains("reputation"));
        assert!(profile.build_prompt("rail freight").ends_with("reputation with reliable sources."));
    }
}
