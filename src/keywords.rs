// =============================================================================
// keywords.rs: THE MULTILINGUAL LEXICON
// =============================================================================
//
// Everything the engine knows about words lives here:
//
// 1. Who we are. "DirectDrive", "direct drive", "directdrive.com" and the
//    looser spellings people (and models) actually type.
// 2. Who they are. The fifteen regional competitors, by full registered
//    name. Full name only. "Kurdistan Express" is not "Kurdistan Express
//    Logistics" and we refuse to guess.
// 3. How rank is spoken. "first", "#1", "الأول", "یەکەم", "اول" and friends,
//    one regex per rank, per language, in rank order. Index 0 is rank 1.
//    Nobody reorders these. Ever.
// 4. What people ask. A seed corpus of market queries per language, plus the
//    substitution tables and templates the variation generator feeds on.
//
// The whole thing is built once, wrapped in an Arc, and never mutated
// again. Share it across as many threads as you like. Adding a fifth
// language means adding a fifth LanguageProfile, not a fifth if-chain.
// =============================================================================

use aho_corasick::AhoCorasick;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::models::Language;

/// Canonical name of the company we're tracking. Also the key of its
/// profile in competitive analysis.
pub const TARGET_COMPANY: &str = "DirectDrive Logistics";

/// Exact-match identifiers for the target company.
const DIRECTDRIVE_KEYWORDS: &[&str] = &[
    "directdrive",
    "direct drive",
    "directdrive logistics",
    "direct drive logistics",
    "directdrive.com",
    "directdrivelogistic.com",
];

/// Looser spellings. Same matcher, tracked separately.
const DIRECTDRIVE_VARIATIONS: &[&str] = &[
    "direct-drive",
    "direct_drive",
    "dd logistics",
    "directdrive llc",
];

/// The keywords that count as the full company name for confidence scoring.
const DIRECTDRIVE_FULL_NAMES: &[&str] = &["directdrive logistics", "direct drive logistics"];

const COMPETITOR_COMPANIES: &[&str] = &[
    "Kurdistan Express Logistics",
    "Erbil Transport Company",
    "KRG Shipping Services",
    "Kurdistan Freight Solutions",
    "Northern Iraq Logistics",
    "Duhok Transport Services",
    "Sulaymaniyah Shipping",
    "Kurdistan International Freight",
    "Iraq National Transport",
    "Mesopotamia Logistics",
    "Tigris Shipping Company",
    "Euphrates Transport",
    "Baghdad Express",
    "Kurdistan Cargo Services",
    "Erbil International Freight",
];

// -----------------------------------------------------------------------------
// Ranking indicators. One pattern per rank, rank 1 first.
// -----------------------------------------------------------------------------

const ENGLISH_RANKING: &[&str] = &[
    r"(?i)\b(?:1st|first|#1|number 1|top|leading|premier|best)\b",
    r"(?i)\b(?:2nd|second|#2|number 2)\b",
    r"(?i)\b(?:3rd|third|#3|number 3)\b",
    r"(?i)\b(?:4th|fourth|#4|number 4)\b",
    r"(?i)\b(?:5th|fifth|#5|number 5)\b",
    r"(?i)\b(?:6th|sixth|#6|number 6)\b",
    r"(?i)\b(?:7th|seventh|#7|number 7)\b",
    r"(?i)\b(?:8th|eighth|#8|number 8)\b",
    r"(?i)\b(?:9th|ninth|#9|number 9)\b",
    r"(?i)\b(?:10th|tenth|#10|number 10)\b",
];

const ARABIC_RANKING: &[&str] = &[
    r"(?i)\b(?:الأول|أولى|رقم ١|رقم 1|#١|#1)\b",
    r"(?i)\b(?:الثاني|ثاني|رقم ٢|رقم 2|#٢|#2)\b",
    r"(?i)\b(?:الثالث|ثالث|رقم ٣|رقم 3|#٣|#3)\b",
    r"(?i)\b(?:الرابع|رابع|رقم ٤|رقم 4|#٤|#4)\b",
    r"(?i)\b(?:الخامس|خامس|رقم ٥|رقم 5|#٥|#5)\b",
];

const KURDISH_RANKING: &[&str] = &[
    r"(?i)\b(?:یەکەم|یەکەمین|ژمارە ١|ژمارە 1)\b",
    r"(?i)\b(?:دووەم|دووەمین|ژمارە ٢|ژمارە 2)\b",
    r"(?i)\b(?:سێیەم|سێیەمین|ژمارە ٣|ژمارە 3)\b",
];

const FARSI_RANKING: &[&str] = &[
    r"(?i)\b(?:اول|اولین|شماره ١|شماره 1)\b",
    r"(?i)\b(?:دوم|دومین|شماره ٢|شماره 2)\b",
    r"(?i)\b(?:سوم|سومین|شماره ٣|شماره 3)\b",
];

// -----------------------------------------------------------------------------
// Regional query corpus
// -----------------------------------------------------------------------------

const ENGLISH_QUERIES: &[&str] = &[
    "best logistics company Kurdistan",
    "Kurdistan freight services",
    "shipping services Erbil",
    "DirectDrive logistics",
    "customs clearance Kurdistan",
    "Iraq shipping company",
    "logistics company Erbil",
    "transportation services Kurdistan",
    "warehouse services Kurdistan",
    "freight forwarding Kurdistan",
    "international shipping Iraq",
    "cargo services Erbil",
    "supply chain Kurdistan",
    "trucking services Iraq",
    "import export Kurdistan",
];

const ARABIC_QUERIES: &[&str] = &[
    "أفضل شركة شحن في كردستان",
    "شركة الشحن في العراق",
    "خدمات النقل كردستان",
    "التخليص الجمركي كردستان",
    "شركة لوجستية أربيل",
    "خدمات الشحن أربيل",
    "النقل الدولي العراق",
    "شركة النقل كردستان",
    "خدمات التخزين كردستان",
    "الشحن البحري العراق",
    "النقل البري كردستان",
    "سلسلة التوريد العراق",
    "خدمات الاستيراد كردستان",
    "شركة DirectDrive للوجستيات",
    "النقل والشحن أربيل",
];

const KURDISH_QUERIES: &[&str] = &[
    "باشترین کۆمپانیای گواستنەوە لە کوردستان",
    "کۆمپانیای گواستنەوە لە کوردستان",
    "خزمەتگوزاری بارهەڵگرتن",
    "گواستنەوەی نێودەوڵەتی",
    "شرکەتی DirectDrive",
    "خزمەتگوزاری ناردن هەولێر",
    "گواستنەوەی بار کوردستان",
    "کۆمپانیای لۆژیستیک",
    "خزمەتگوزاری گومرک",
    "ناردن و وەرگرتن",
];

const FARSI_QUERIES: &[&str] = &[
    "بهترین شرکت حمل و نقل کردستان",
    "شرکت حمل و نقل عراق",
    "خدمات گمرکی کردستان",
    "حمل و نقل بین المللی",
    "شرکت DirectDrive",
    "خدمات باربری اربیل",
    "لجستیک کردستان",
    "حمل بار عراق",
    "خدمات انبارداری",
    "ترخیص کالا",
];

/// Logistics-domain and region words every language recognizes in English.
const ENGLISH_RELATED_TERMS: &[&str] = &[
    "logistics", "shipping", "freight", "transport", "cargo",
    "kurdistan", "erbil", "iraq",
];

/// A trigger word and what it can turn into.
///
/// Case-sensitive rules only fire on the exact casing ("Erbil", not
/// "erbil"). Case-insensitive rules fire on any casing and, for English,
/// rewrite the lowercased query.
#[derive(Debug, Clone)]
pub struct Substitution {
    pub trigger: String,
    pub terms: Vec<String>,
    pub case_sensitive: bool,
}

impl Substitution {
    fn new(trigger: &str, terms: &[&str], case_sensitive: bool) -> Self {
        Self {
            trigger: trigger.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
            case_sensitive,
        }
    }

    pub fn fires_on(&self, query: &str) -> bool {
        if self.case_sensitive {
            query.contains(&self.trigger)
        } else {
            query.to_lowercase().contains(&self.trigger.to_lowercase())
        }
    }
}

/// Everything language-specific, in one record.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    pub language: Language,
    /// Monitoring priority of this language's variations. Lower is sooner.
    pub priority: u8,
    /// `ranking_indicators[i]` recognizes rank `i + 1`.
    pub ranking_indicators: Vec<Regex>,
    pub query_corpus: Vec<String>,
    pub substitutions: Vec<Substitution>,
    /// Phrase templates with a single `{}` slot. English slots take the whole
    /// query; other languages slot in a substituted term.
    pub templates: Vec<String>,
    /// Lowercase logistics/region fragments that make a query "related".
    pub related_terms: Vec<String>,
}

impl LanguageProfile {
    pub fn new(
        language: Language,
        priority: u8,
        ranking_patterns: &[&str],
        query_corpus: &[&str],
        substitutions: Vec<Substitution>,
        templates: &[&str],
        script_related_terms: &[&str],
    ) -> Result<Self> {
        let ranking_indicators = ranking_patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    EngineError::Config(format!("bad {language} ranking pattern {p:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let related_terms = ENGLISH_RELATED_TERMS
            .iter()
            .chain(script_related_terms.iter())
            .map(|t| t.to_lowercase())
            .collect();

        Ok(Self {
            language,
            priority,
            ranking_indicators,
            query_corpus: query_corpus.iter().map(|q| q.to_string()).collect(),
            substitutions,
            templates: templates.iter().map(|t| t.to_string()).collect(),
            related_terms,
        })
    }

    /// Expand a template's `{}` slot.
    pub fn fill(template: &str, value: &str) -> String {
        template.replacen("{}", value, 1)
    }
}

/// The process-wide, read-only lexicon.
pub struct KeywordSet {
    target_name: String,
    target_keywords: Vec<String>,
    target_variations: Vec<String>,
    target_full_names: Vec<String>,
    competitor_names: Vec<String>,
    /// Indexed by `Language as usize`.
    profiles: [LanguageProfile; 4],
    /// Patterns: keywords first, then variations.
    target_automaton: AhoCorasick,
    competitor_automaton: AhoCorasick,
}

static SHARED: LazyLock<Arc<KeywordSet>> = LazyLock::new(|| {
    Arc::new(KeywordSet::directdrive().expect("built-in DirectDrive lexicon failed to compile"))
});

impl KeywordSet {
    /// Build a lexicon from parts. `profiles` must be given in
    /// `Language::ALL` order.
    pub fn new(
        target_name: &str,
        target_keywords: &[&str],
        target_variations: &[&str],
        target_full_names: &[&str],
        competitor_names: &[&str],
        profiles: [LanguageProfile; 4],
    ) -> Result<Self> {
        for (expected, profile) in Language::ALL.iter().zip(profiles.iter()) {
            if *expected != profile.language {
                return Err(EngineError::Config(format!(
                    "language profiles out of order: expected {expected}, found {}",
                    profile.language
                )));
            }
        }

        let target_patterns: Vec<&str> = target_keywords
            .iter()
            .chain(target_variations.iter())
            .copied()
            .collect();

        let target_automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&target_patterns)
            .map_err(|e| EngineError::Config(format!("target keyword automaton: {e}")))?;

        let competitor_automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(competitor_names)
            .map_err(|e| EngineError::Config(format!("competitor automaton: {e}")))?;

        debug!(
            keywords = target_keywords.len(),
            variations = target_variations.len(),
            competitors = competitor_names.len(),
            "Keyword set compiled"
        );

        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        Ok(Self {
            target_name: target_name.to_string(),
            target_keywords: owned(target_keywords),
            target_variations: owned(target_variations),
            target_full_names: target_full_names.iter().map(|s| s.to_lowercase()).collect(),
            competitor_names: owned(competitor_names),
            profiles,
            target_automaton,
            competitor_automaton,
        })
    }

    /// The built-in DirectDrive / Kurdistan lexicon.
    pub fn directdrive() -> Result<Self> {
        let profiles = [
            english_profile()?,
            arabic_profile()?,
            kurdish_profile()?,
            farsi_profile()?,
        ];
        Self::new(
            TARGET_COMPANY,
            DIRECTDRIVE_KEYWORDS,
            DIRECTDRIVE_VARIATIONS,
            DIRECTDRIVE_FULL_NAMES,
            COMPETITOR_COMPANIES,
            profiles,
        )
    }

    /// The built-in lexicon, compiled on first use and shared afterwards.
    pub fn shared() -> Arc<KeywordSet> {
        Arc::clone(&SHARED)
    }

    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    pub fn target_keywords(&self) -> &[String] {
        &self.target_keywords
    }

    pub fn target_variations(&self) -> &[String] {
        &self.target_variations
    }

    pub fn competitor_names(&self) -> &[String] {
        &self.competitor_names
    }

    pub fn profile(&self, language: Language) -> &LanguageProfile {
        &self.profiles[language as usize]
    }

    pub fn ranking_indicators(&self, language: Language) -> &[Regex] {
        &self.profile(language).ranking_indicators
    }

    pub fn query_corpus(&self, language: Language) -> &[String] {
        &self.profile(language).query_corpus
    }

    pub(crate) fn target_automaton(&self) -> &AhoCorasick {
        &self.target_automaton
    }

    pub(crate) fn competitor_automaton(&self) -> &AhoCorasick {
        &self.competitor_automaton
    }

    /// The keyword text behind a target automaton pattern id.
    pub(crate) fn target_pattern(&self, pattern: usize) -> &str {
        if pattern < self.target_keywords.len() {
            &self.target_keywords[pattern]
        } else {
            &self.target_variations[pattern - self.target_keywords.len()]
        }
    }

    pub(crate) fn is_variation_pattern(&self, pattern: usize) -> bool {
        pattern >= self.target_keywords.len()
    }

    /// Whether a matched keyword is the full company name.
    pub fn is_full_name(&self, keyword: &str) -> bool {
        let lowered = keyword.to_lowercase();
        self.target_full_names.iter().any(|n| *n == lowered)
    }
}

// -----------------------------------------------------------------------------
// Per-language profiles
// -----------------------------------------------------------------------------

fn english_profile() -> Result<LanguageProfile> {
    let substitutions = vec![
        // Place names keep their casing
        Substitution::new(
            "Kurdistan",
            &["Kurdistan Region", "Iraqi Kurdistan", "KRG", "Northern Iraq"],
            true,
        ),
        Substitution::new("Erbil", &["Hawler", "Arbil", "Erbil city"], true),
        Substitution::new("Iraq", &["Iraqi", "Republic of Iraq"], true),
        // Service words match any casing
        Substitution::new("logistics", &["transportation", "shipping", "freight", "cargo"], false),
        Substitution::new("shipping", &["logistics", "transport", "freight", "delivery"], false),
        Substitution::new("freight", &["cargo", "shipping", "logistics", "transport"], false),
        Substitution::new("company", &["service", "provider", "business", "firm"], false),
    ];
    LanguageProfile::new(
        Language::English,
        1,
        ENGLISH_RANKING,
        ENGLISH_QUERIES,
        substitutions,
        &[
            "What is the best {}?",
            "Who provides {}?",
            "Top {} recommendations",
            "Reliable {} options",
        ],
        &[],
    )
}

fn arabic_profile() -> Result<LanguageProfile> {
    let substitutions = vec![
        Substitution::new("logistics", &["اللوجستيات", "النقل والشحن", "خدمات النقل"], false),
        Substitution::new("shipping", &["الشحن", "النقل", "خدمات الشحن"], false),
        Substitution::new("freight", &["الشحن", "النقل البحري", "الشحن الجوي"], false),
        Substitution::new("company", &["شركة", "مؤسسة", "خدمات"], false),
        Substitution::new("Kurdistan", &["كردستان", "إقليم كردستان", "كردستان العراق"], false),
        Substitution::new("Erbil", &["أربيل", "هولير", "مدينة أربيل"], false),
        Substitution::new("Iraq", &["العراق", "جمهورية العراق"], false),
    ];
    LanguageProfile::new(
        Language::Arabic,
        2,
        ARABIC_RANKING,
        ARABIC_QUERIES,
        substitutions,
        &["أفضل {} في كردستان", "{} موثوقة في أربيل", "خدمات {} العراق"],
        &["لوجست", "شحن", "نقل", "كردستان", "أربيل", "العراق"],
    )
}

fn kurdish_profile() -> Result<LanguageProfile> {
    let substitutions = vec![
        Substitution::new("logistics", &["لۆژیستیک", "گواستنەوە", "خزمەتگوزاری گواستنەوە"], false),
        Substitution::new("shipping", &["ناردن", "گواستنەوە", "خزمەتگوزاری ناردن"], false),
        Substitution::new("company", &["کۆمپانیا", "شرکەت", "خزمەتگوزاری"], false),
        Substitution::new("best", &["باشترین", "بەرز", "گرنگترین"], false),
    ];
    LanguageProfile::new(
        Language::Kurdish,
        2,
        KURDISH_RANKING,
        KURDISH_QUERIES,
        substitutions,
        &["{} لە کوردستان", "{} لە هەولێر"],
        &["لۆژیستیک", "گواستنەوە", "ناردن", "کوردستان", "هەولێر", "عێراق"],
    )
}

fn farsi_profile() -> Result<LanguageProfile> {
    let substitutions = vec![
        Substitution::new("logistics", &["لجستیک", "حمل و نقل", "خدمات حمل"], false),
        Substitution::new("shipping", &["حمل", "ارسال", "باربری"], false),
        Substitution::new("company", &["شرکت", "موسسه", "خدمات"], false),
        Substitution::new("best", &["بهترین", "برتر", "اعلا"], false),
    ];
    LanguageProfile::new(
        Language::Farsi,
        3,
        FARSI_RANKING,
        FARSI_QUERIES,
        substitutions,
        &["{} در کردستان", "{} در اربیل", "بهترین {} عراق"],
        &["لجستیک", "حمل", "باربری", "کردستان", "اربیل", "عراق"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lexicon_compiles() {
        let set = KeywordSet::directdrive().unwrap();
        assert_eq!(set.target_name(), TARGET_COMPANY);
        assert_eq!(set.competitor_names().len(), 15);
        assert_eq!(set.ranking_indicators(Language::English).len(), 10);
        assert_eq!(set.ranking_indicators(Language::Arabic).len(), 5);
        assert_eq!(set.ranking_indicators(Language::Kurdish).len(), 3);
        assert_eq!(set.ranking_indicators(Language::Farsi).len(), 3);
    }

    #[test]
    fn test_profiles_are_indexed_by_language() {
        let set = KeywordSet::shared();
        for language in Language::ALL {
            assert_eq!(set.profile(language).language, language);
        }
        assert_eq!(set.profile(Language::English).priority, 1);
        assert_eq!(set.profile(Language::Farsi).priority, 3);
    }

    #[test]
    fn test_ranking_indicators_are_in_rank_order() {
        let set = KeywordSet::shared();
        let english = set.ranking_indicators(Language::English);
        assert!(english[0].is_match("the first choice"));
        assert!(english[1].is_match("the second choice"));
        assert!(!english[1].is_match("the first choice"));
        assert!(english[9].is_match("ranked tenth"));

        let arabic = set.ranking_indicators(Language::Arabic);
        assert!(arabic[0].is_match("الشركة الأول في المنطقة"));
        assert!(arabic[1].is_match("الخيار الثاني"));
    }

    #[test]
    fn test_full_name_detection_is_case_insensitive() {
        let set = KeywordSet::shared();
        assert!(set.is_full_name("DirectDrive Logistics"));
        assert!(set.is_full_name("direct drive logistics"));
        assert!(!set.is_full_name("directdrive"));
    }

    #[test]
    fn test_substitution_case_policy() {
        let sensitive = Substitution::new("Erbil", &["Hawler"], true);
        assert!(sensitive.fires_on("shipping services Erbil"));
        assert!(!sensitive.fires_on("shipping services erbil"));

        let insensitive = Substitution::new("logistics", &["cargo"], false);
        assert!(insensitive.fires_on("DirectDrive LOGISTICS"));
    }

    #[test]
    fn test_out_of_order_profiles_are_rejected() {
        let profiles = [
            arabic_profile().unwrap(),
            english_profile().unwrap(),
            kurdish_profile().unwrap(),
            farsi_profile().unwrap(),
        ];
        let result = KeywordSet::new("X", &["x"], &[], &[], &["Y"], profiles);
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}
