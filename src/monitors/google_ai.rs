// =============================================================================
// monitors/google_ai.rs: ASKING GEMINI IN ARABIC
// =============================================================================
//
// Regional questions get regional answers. Gemini is prompted in Arabic,
// its answers are graded with the Arabic ranking vocabulary, and it gets
// its own rank table. No system prompt; the generateContent call takes
// the prompt alone.
// =============================================================================

use crate::citation_detector::PositionThresholds;
use crate::error::Result;
use crate::models::{AiModel, Language};

use super::ModelProfile;

const CURATED_PROMPTS: &[(&str, &str)] = &[
    (
        "best logistics company Kurdistan",
        "أحتاج لأفضل شركة لوجستية في إقليم كردستان. ما هي الشركات التي تنصح بها للشحن والنقل؟",
    ),
    (
        "shipping services Erbil",
        "ما هي خدمات الشحن المتوفرة في أربيل؟ أحتاج شركة موثوقة للنقل.",
    ),
    (
        "DirectDrive logistics",
        "أخبرني عن شركة DirectDrive للوجستيات. ما هي الخدمات التي تقدمها؟",
    ),
    (
        "Kurdistan freight services",
        "ما هي خدمات الشحن المتوفرة في إقليم كردستان للنقل الدولي؟",
    ),
    (
        "customs clearance Kurdistan",
        "أحتاج خدمات التخليص الجمركي في إقليم كردستان. أي الشركات تنصح بها؟",
    ),
    (
        "Iraq shipping company",
        "ما هي شركات الشحن الموثوقة التي تعمل بين العراق والدول الأخرى؟",
    ),
    (
        "logistics company Erbil",
        "أبحث عن شركة لوجستية في أربيل للتخزين والتوزيع.",
    ),
    (
        "transportation services Kurdistan",
        "ما هي خدمات النقل والوجستيات المتوفرة في إقليم كردستان؟",
    ),
];

const FALLBACK_PROMPT: &str =
    "أحتاج معلومات عن {query}. هل يمكنك تقديم توصيات وتفاصيل عن الخدمات المتوفرة؟";

pub fn profile() -> Result<ModelProfile> {
    Ok(ModelProfile::from_parts(
        AiModel::GoogleAi,
        Language::Arabic,
        PositionThresholds::new([0.15, 0.35, 0.55, 0.75])?,
        None,
        CURATED_PROMPTS,
        FALLBACK_PROMPT,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_profile_speaks_arabic() {
        let profile = profile().unwrap();
        assert_eq!(profile.detection_language, Language::Arabic);
        assert!(profile.system_prompt.is_none());
        assert!(profile.build_prompt("cargo Duhok").starts_with("أحتاج معلومات عن cargo Duhok."));
    }
}
