// =============================================================================
// citation_detector.rs: DID THE ROBOT SAY OUR NAME?
// =============================================================================
//
// Given whatever prose an AI model produced, decide:
//
//   - whether DirectDrive is mentioned at all,
//   - how confident we are about that,
//   - where it ranks ("first", "#2", line 3 of a numbered list, or just
//     "mentioned early, probably high"),
//   - how warmly it's described,
//   - which competitors showed up alongside it.
//
// The scoring is a set of hand-tuned linear heuristics. They are not
// statistically validated and they are not supposed to be. Dashboards and
// alert thresholds downstream depend on their exact numeric ranges, so
// changing a constant here is a behaviour change, not a tweak.
//
// One detector per configuration, shared freely across threads. Every call
// allocates its own scratch state and touches nothing global except the
// read-only keyword set.
// =============================================================================

use rayon::prelude::*;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::keywords::KeywordSet;
use crate::models::{CitationAnalysis, CompetitorMention, Language, PositionAnalysis};
use crate::text_scanner::{self, CharCursor, KeywordHit};

/// Ranking words farther than this (in characters) from every mention don't count.
const RANK_PROXIMITY_CHARS: usize = 200;

/// Only the first lines of a response are inspected for list structure.
const LIST_SCAN_LINES: usize = 10;

/// Numbered (`1.` .. `9.`) or bulleted (`-`, `*`, `•`) line start.
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[1-9]\.|[-*•])").expect("list marker pattern is valid")
});

const POSITIVE_WORDS: &[&str] = &[
    "best", "excellent", "top", "leading", "reliable", "trusted", "professional",
    "outstanding", "premier", "quality", "efficient", "recommended", "superior",
    "exceptional", "proven", "established", "reputable", "experienced",
];

const NEGATIVE_WORDS: &[&str] = &[
    "poor", "bad", "worst", "unreliable", "slow", "expensive", "problems",
    "issues", "complaints", "avoid", "disappointing", "subpar", "inadequate",
];

const BUSINESS_KEYWORDS: &[&str] = &[
    "services", "logistics", "shipping", "freight", "transport", "company",
];

/// Cut points for the last-resort rank estimate from where the first
/// mention sits in the text. `relative < cuts[i]` means rank `i + 1`;
/// anything past the last cut is rank 5.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionThresholds([f64; 4]);

impl PositionThresholds {
    /// The detector's documented default table.
    pub const DETECTOR_DEFAULT: PositionThresholds = PositionThresholds([0.10, 0.25, 0.50, 0.75]);

    pub fn new(cuts: [f64; 4]) -> Result<Self> {
        let ascending = cuts.windows(2).all(|w| w[0] < w[1]);
        let in_range = cuts.iter().all(|c| *c > 0.0 && *c <= 1.0);
        if ascending && in_range {
            Ok(Self(cuts))
        } else {
            Err(EngineError::InvalidThresholds(cuts))
        }
    }

    pub fn cut_points(&self) -> [f64; 4] {
        self.0
    }

    /// Map a `first offset / text length` ratio to a rank in 1..=5.
    pub fn rank_for(&self, relative_position: f64) -> u32 {
        self.0
            .iter()
            .position(|cut| relative_position < *cut)
            .map(|i| i as u32 + 1)
            .unwrap_or(5)
    }
}

impl Default for PositionThresholds {
    fn default() -> Self {
        Self::DETECTOR_DEFAULT
    }
}

/// The canonical citation detector. Model adapters configure one of these
/// instead of carrying their own keyword search.
#[derive(Clone)]
pub struct CitationDetector {
    keywords: Arc<KeywordSet>,
    thresholds: PositionThresholds,
}

impl Default for CitationDetector {
    fn default() -> Self {
        Self::new(KeywordSet::shared())
    }
}

impl CitationDetector {
    pub fn new(keywords: Arc<KeywordSet>) -> Self {
        Self {
            keywords,
            thresholds: PositionThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: PositionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn keywords(&self) -> &Arc<KeywordSet> {
        &self.keywords
    }

    pub fn thresholds(&self) -> PositionThresholds {
        self.thresholds
    }

    /// Analyze one AI response. Total over every input, including "".
    pub fn detect_citation(&self, text: &str, language: Language) -> CitationAnalysis {
        let hits = text_scanner::find_target_hits(&self.keywords, text);
        let competitor_mentions = self.find_competitor_mentions(text);

        let Some(primary) = hits.first() else {
            debug!(
                competitors = competitor_mentions.len(),
                "No DirectDrive mention found"
            );
            return CitationAnalysis {
                cited: false,
                confidence: 0.0,
                position: None,
                context: String::new(),
                sentiment_score: 0.0,
                competitor_mentions,
                quality_score: 0.0,
            };
        };

        let context = text_scanner::context_window(text, primary.start);
        let context_chars = text_scanner::char_len(&context);
        let position = self.infer_position(text, &hits, language);
        let sentiment_score = analyze_sentiment(&context);
        let confidence = self.calculate_confidence(&hits, context_chars, sentiment_score);
        let quality_score = calculate_quality(
            &context,
            context_chars,
            sentiment_score,
            !competitor_mentions.is_empty(),
        );

        debug!(
            hits = hits.len(),
            position = ?position,
            confidence = format!("{:.3}", confidence),
            sentiment = format!("{:.2}", sentiment_score),
            quality = format!("{:.3}", quality_score),
            competitors = competitor_mentions.len(),
            language = %language,
            "Citation detected"
        );

        CitationAnalysis {
            cited: true,
            confidence,
            position,
            context,
            sentiment_score,
            competitor_mentions,
            quality_score,
        }
    }

    /// Detect over many responses in parallel. Output order matches input.
    pub fn detect_batch(&self, texts: &[&str], language: Language) -> Vec<CitationAnalysis> {
        texts
            .par_iter()
            .map(|text| self.detect_citation(text, language))
            .collect()
    }

    /// How DirectDrive stacks up inside a single response.
    pub fn analyze_competitive_position(&self, text: &str) -> PositionAnalysis {
        let analysis = self.detect_citation(text, Language::English);
        let total_companies = analysis.competitor_mentions.len() + usize::from(analysis.cited);
        let market_share = if analysis.cited && total_companies > 0 {
            100.0 / total_companies as f64
        } else {
            0.0
        };

        PositionAnalysis {
            directdrive_position: analysis.position,
            total_companies,
            market_share,
            confidence: analysis.confidence,
        }
    }

    fn find_competitor_mentions(&self, text: &str) -> Vec<CompetitorMention> {
        text_scanner::find_competitor_hits(&self.keywords, text)
            .into_iter()
            .map(|hit| {
                let context = text_scanner::context_window(text, hit.start);
                let confidence = if context.is_empty() { 0.5 } else { 0.8 };
                CompetitorMention {
                    company: hit.company,
                    position: None,
                    context,
                    confidence,
                }
            })
            .collect()
    }

    /// Rank inference, strongest signal first:
    ///
    /// 1. a ranking word within 200 characters of any mention; lower ranks
    ///    are checked first and win,
    /// 2. a numbered or bulleted line among the first ten that mentions us,
    /// 3. the relative offset of the first mention, bucketed.
    fn infer_position(&self, text: &str, hits: &[KeywordHit], language: Language) -> Option<u32> {
        let first = hits.first()?;

        for (i, pattern) in self.keywords.ranking_indicators(language).iter().enumerate() {
            let mut cursor = CharCursor::new(text);
            for m in pattern.find_iter(text) {
                let rank_at = cursor.char_offset(m.start());
                if hits
                    .iter()
                    .any(|h| h.char_start.abs_diff(rank_at) <= RANK_PROXIMITY_CHARS)
                {
                    return Some(i as u32 + 1);
                }
            }
        }

        let automaton = self.keywords.target_automaton();
        for (i, line) in text.split('\n').take(LIST_SCAN_LINES).enumerate() {
            if automaton.is_match(line) && LIST_MARKER.is_match(line) {
                return Some(i as u32 + 1);
            }
        }

        let total_chars = text_scanner::char_len(text).max(1);
        let relative = first.char_start as f64 / total_chars as f64;
        Some(self.thresholds.rank_for(relative))
    }

    fn calculate_confidence(&self, hits: &[KeywordHit], context_chars: usize, sentiment: f64) -> f64 {
        let mut confidence = 0.3;

        let extra_hits = hits.len().saturating_sub(1) as f64;
        confidence += (extra_hits * 0.1).min(0.2);

        if hits
            .iter()
            .any(|h| !h.is_variation && self.keywords.is_full_name(&h.keyword))
        {
            confidence += 0.2;
        }

        confidence += (context_chars as f64 / 500.0).min(0.2);

        if sentiment > 0.0 {
            confidence += sentiment * 0.1;
        }

        confidence.min(1.0)
    }
}

/// Polarity of a context: distinct positive words minus distinct negative
/// words, divided by five, clamped to [-1, 1].
pub fn analyze_sentiment(context: &str) -> f64 {
    let lowered = context.to_lowercase();
    let positive = text_scanner::count_terms_present(&lowered, POSITIVE_WORDS) as f64;
    let negative = text_scanner::count_terms_present(&lowered, NEGATIVE_WORDS) as f64;
    ((positive - negative) / 5.0).clamp(-1.0, 1.0)
}

fn calculate_quality(context: &str, context_chars: usize, sentiment: f64, has_competitors: bool) -> f64 {
    let mut quality = (context_chars as f64 / 200.0).min(0.4);

    if sentiment > 0.0 {
        quality += sentiment * 0.3;
    }

    // Named next to competitors means the model knows the market
    if has_competitors {
        quality += 0.2;
    }

    let business = text_scanner::count_terms_present(&context.to_lowercase(), BUSINESS_KEYWORDS);
    quality += (business as f64 * 0.02).min(0.1);

    quality.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> CitationDetector {
        CitationDetector::default()
    }

    fn assert_in_bounds(a: &CitationAnalysis) {
        assert!((0.0..=1.0).contains(&a.confidence));
        assert!((-1.0..=1.0).contains(&a.sentiment_score));
        assert!((0.0..=1.0).contains(&a.quality_score));
        if !a.cited {
            assert_eq!(a.confidence, 0.0);
            assert_eq!(a.quality_score, 0.0);
            assert!(a.position.is_none());
        }
    }

    #[test]
    fn test_detects_directdrive_citation() {
        let text = "DirectDrive Logistics is a leading logistics company in Kurdistan region, \
                    offering comprehensive freight and shipping services.";
        let analysis = detector().detect_citation(text, Language::English);
        assert!(analysis.cited);
        assert!(analysis.confidence > 0.5);
        assert!(analysis.context.contains("DirectDrive"));
        assert!(analysis.position.is_some());
        assert_in_bounds(&analysis);
    }

    #[test]
    fn test_short_competitor_name_is_not_a_mention() {
        let text = "Kurdistan Express is the top logistics provider in the region.";
        let analysis = detector().detect_citation(text, Language::English);
        assert!(!analysis.cited);
        assert_eq!(analysis.confidence, 0.0);
        assert!(analysis.competitor_mentions.is_empty());
        assert_in_bounds(&analysis);
    }

    #[test]
    fn test_uncited_response_still_reports_competitors() {
        let text = "The best logistics companies in Kurdistan include Kurdistan Express Logistics \
                    and Erbil Transport Company.";
        let analysis = detector().detect_citation(text, Language::English);
        assert!(!analysis.cited);
        assert_eq!(analysis.competitor_mentions.len(), 2);
        assert_eq!(analysis.competitor_mentions[0].company, "Kurdistan Express Logistics");
        assert_eq!(analysis.competitor_mentions[1].company, "Erbil Transport Company");
        assert_eq!(analysis.competitor_mentions[0].confidence, 0.8);
    }

    #[test]
    fn test_empty_text_is_not_cited() {
        let analysis = detector().detect_citation("", Language::English);
        assert!(!analysis.cited);
        assert!(analysis.context.is_empty());
        assert!(analysis.competitor_mentions.is_empty());
        assert_in_bounds(&analysis);
    }

    #[test]
    fn test_appending_positive_mention_flips_citation() {
        let base = "Several regional carriers serve the market";
        assert!(!detector().detect_citation(base, Language::English).cited);

        let extended = format!("{base} DirectDrive Logistics is excellent.");
        let analysis = detector().detect_citation(&extended, Language::English);
        assert!(analysis.cited);
        assert!(analysis.sentiment_score > 0.0);
    }

    #[test]
    fn test_numbered_list_gives_rank_one() {
        let text = "1. DirectDrive Logistics\n2. Kurdistan Express";
        assert_eq!(detector().detect_citation(text, Language::English).position, Some(1));
    }

    #[test]
    fn test_list_line_index_is_used_when_no_ranking_word() {
        let text = "1. Kurdistan Express Logistics\n2. DirectDrive Logistics\n3. Erbil Transport Company";
        assert_eq!(detector().detect_citation(text, Language::English).position, Some(2));
    }

    #[test]
    fn test_lowest_nearby_rank_word_wins() {
        let text = "Ranked second overall, and first for customs: DirectDrive Logistics.";
        assert_eq!(detector().detect_citation(text, Language::English).position, Some(1));
    }

    #[test]
    fn test_distant_rank_word_is_ignored() {
        let filler = "x".repeat(300);
        let text = format!("The first thing to know is geography. {filler} Later, DirectDrive appears.");
        let analysis = detector().detect_citation(&text, Language::English);
        // Falls through to the relative-offset table: mention sits late in the text
        assert_eq!(analysis.position, Some(5));
    }

    #[test]
    fn test_relative_offset_fallback_uses_configured_thresholds() {
        let text = format!("{} DirectDrive is here", "y".repeat(30));
        let default_rank = detector().detect_citation(&text, Language::English).position;
        let lenient = detector()
            .with_thresholds(PositionThresholds::new([0.9, 0.95, 0.97, 0.99]).unwrap())
            .detect_citation(&text, Language::English)
            .position;
        assert_eq!(default_rank, Some(4));
        assert_eq!(lenient, Some(1));
    }

    #[test]
    fn test_sentiment_polarity() {
        let d = detector();
        let positive = d.detect_citation(
            "DirectDrive Logistics is excellent and reliable with outstanding service.",
            Language::English,
        );
        let negative = d.detect_citation(
            "DirectDrive Logistics has poor service and is unreliable.",
            Language::English,
        );
        assert!(positive.sentiment_score > 0.0);
        assert!(negative.sentiment_score < 0.0);
    }

    #[test]
    fn test_sentiment_is_clamped() {
        let gushing = "best excellent top leading reliable trusted professional outstanding";
        assert_eq!(analyze_sentiment(gushing), 1.0);
    }

    #[test]
    fn test_arabic_response_is_detected() {
        let text = "شركة DirectDrive للوجستيات هي من أفضل الشركات في كردستان.";
        let analysis = detector().detect_citation(text, Language::Arabic);
        assert!(analysis.cited);
        assert!(analysis.context.contains("DirectDrive"));
    }

    #[test]
    fn test_arabic_ranking_word_near_mention() {
        let text = "الخيار الثاني هو DirectDrive في أربيل";
        assert_eq!(detector().detect_citation(text, Language::Arabic).position, Some(2));
    }

    #[test]
    fn test_richer_context_scores_higher_quality() {
        let d = detector();
        let rich = d.detect_citation(
            "DirectDrive Logistics is a professional logistics company offering freight, customs \
             clearance, and warehousing services in Kurdistan region with excellent customer service.",
            Language::English,
        );
        let thin = d.detect_citation("DirectDrive is mentioned.", Language::English);
        assert!(rich.quality_score > thin.quality_score);
    }

    #[test]
    fn test_context_never_exceeds_one_neighbour_each_side() {
        let text = "First filler. Second filler. DirectDrive Logistics ships. Fourth filler. Fifth filler.";
        let analysis = detector().detect_citation(text, Language::English);
        assert_eq!(analysis.context, "Second filler. DirectDrive Logistics ships. Fourth filler");
    }

    #[test]
    fn test_confidence_formula() {
        // one variation hit, short context, neutral
        let analysis = detector().detect_citation("Direct-Drive", Language::English);
        let expected = 0.3 + 12.0 / 500.0;
        assert!((analysis.confidence - expected).abs() < 1e-9);
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn test_full_name_sentence_scores_exactly() {
        // two hits (+0.1), full name (+0.2), context capped (+0.2), "leading" (+0.02)
        let text = "DirectDrive Logistics is a leading logistics company in Kurdistan region, \
                    offering comprehensive freight and shipping services.";
        let analysis = detector().detect_citation(text, Language::English);
        assert_close(analysis.confidence, 0.82);
        // context capped (0.4), sentiment (0.06), five business words (0.1)
        assert_close(analysis.quality_score, 0.56);
    }

    #[test]
    fn test_extra_hit_bonus_is_capped() {
        let analysis =
            detector().detect_citation("DirectDrive. DirectDrive. DirectDrive. DirectDrive.", Language::English);
        assert_eq!(analysis.context, "DirectDrive. DirectDrive");
        assert_close(analysis.confidence, 0.3 + 0.2 + 24.0 / 500.0);
    }

    #[test]
    fn test_only_positive_sentiment_adds_confidence() {
        let d = detector();

        let warm = d.detect_citation("DirectDrive is excellent", Language::English);
        assert_close(warm.sentiment_score, 0.2);
        assert_close(warm.confidence, 0.3 + 24.0 / 500.0 + 0.02);
        assert_close(warm.quality_score, 24.0 / 200.0 + 0.06);

        let cold = d.detect_citation("DirectDrive is slow", Language::English);
        assert_close(cold.sentiment_score, -0.2);
        assert_close(cold.confidence, 0.3 + 19.0 / 500.0);
        assert_close(cold.quality_score, 19.0 / 200.0);
    }

    #[test]
    fn test_quality_rewards_competitors_and_caps_business_terms() {
        let text = "DirectDrive and Erbil Transport Company offer logistics, shipping, freight, \
                    transport and courier services";
        let analysis = detector().detect_citation(text, Language::English);
        assert_eq!(analysis.competitor_mentions.len(), 1);
        assert_close(analysis.confidence, 0.5);
        // context capped (0.4), competitors (0.2), six business words capped (0.1)
        assert_close(analysis.quality_score, 0.7);
    }

    #[test]
    fn test_kurdish_ranking_word_near_mention() {
        let text = "دووەم DirectDrive";
        let d = detector();
        assert_eq!(d.detect_citation(text, Language::Kurdish).position, Some(2));
        assert_eq!(d.detect_citation(text, Language::English).position, Some(3));
    }

    #[test]
    fn test_farsi_ranking_word_near_mention() {
        let text = "گزینه دوم DirectDrive است";
        let d = detector();
        assert_eq!(d.detect_citation(text, Language::Farsi).position, Some(2));
        assert_eq!(d.detect_citation(text, Language::English).position, Some(3));
    }

    #[test]
    fn test_competitive_position_shares_market_among_named_companies() {
        let text = "Options: Kurdistan Express Logistics, Erbil Transport Company and DirectDrive Logistics.";
        let position = detector().analyze_competitive_position(text);
        assert_eq!(position.total_companies, 3);
        assert!((position.market_share - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_batch_detection_preserves_order() {
        let texts = ["DirectDrive rocks", "nothing here", "direct drive logistics"];
        let results = detector().detect_batch(&texts, Language::English);
        assert_eq!(results.len(), 3);
        assert!(results[0].cited);
        assert!(!results[1].cited);
        assert!(results[2].cited);
    }

    #[test]
    fn test_invalid_thresholds_are_rejected() {
        assert!(PositionThresholds::new([0.5, 0.4, 0.6, 0.8]).is_err());
        assert!(PositionThresholds::new([0.0, 0.4, 0.6, 0.8]).is_err());
        assert_eq!(PositionThresholds::default().rank_for(0.05), 1);
        assert_eq!(PositionThresholds::default().rank_for(0.9), 5);
    }
}
