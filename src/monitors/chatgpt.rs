// =============================================================================
// monitors/chatgpt.rs: THE FRIENDLY GENERALIST
// =============================================================================
//
// English prompts, a plain helpful-assistant system message, and a rank
// table that is a little more generous than the detector's default: an
// answer that names us in its first fifth counts as rank 1.
// =============================================================================

use crate::citation_detector::PositionThresholds;
use crate::error::Result;
use crate::models::{AiModel, Language};

use super::ModelProfile;

const SYSTEM_PROMPT: &str = "You are a helpful assistant providing information about logistics and \
transportation services. Respond naturally and provide accurate information.";

const CURATED_PROMPTS: &[(&str, &str)] = &[
    (
        "best logistics company Kurdistan",
        "What are the top logistics companies operating in Kurdistan region? I need reliable shipping and freight services.",
    ),
    (
        "shipping services Erbil",
        "I need to ship goods to and from Erbil. What shipping companies would you recommend?",
    ),
    (
        "DirectDrive logistics",
        "Tell me about DirectDrive logistics company. What services do they offer?",
    ),
    (
        "Kurdistan freight services",
        "What freight forwarding services are available in Kurdistan region for international shipping?",
    ),
    (
        "customs clearance Kurdistan",
        "Which companies provide customs clearance services in Kurdistan? I need help with import/export procedures.",
    ),
    (
        "Iraq shipping company",
        "What are reliable shipping companies that operate between Iraq and other countries?",
    ),
    (
        "logistics company Erbil",
        "I'm looking for a logistics company in Erbil for warehousing and distribution services.",
    ),
    (
        "transportation services Kurdistan",
        "What transportation and logistics services are available in Kurdistan region?",
    ),
];

const FALLBACK_PROMPT: &str =
    "I'm looking for {query}. Can you provide recommendations and information about available services?";

pub fn profile() -> Result<ModelProfile> {
    Ok(ModelProfile::from_parts(
        AiModel::ChatGpt,
        Language::English,
        PositionThresholds::new([0.2, 0.4, 0.6, 0.8])?,
        Some(SYSTEM_PROMPT),
        CURATED_PROMPTS,
        FALLBACK_PROMPT,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chatgpt_profile() {
        let profile = profile().unwrap();
        assert_eq!(profile.detection_language, Language::English);
        assert_eq!(profile.thresholds.cut_points(), [0.2, 0.4, 0.6, 0.8]);
        assert_eq!(profile.curated_prompts.len(), 8);
        assert!(profile.system_prompt.as_deref().unwrap().starts_with("You are a helpful assistant"));
    }
}
