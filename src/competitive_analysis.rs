// =============================================================================
// competitive_analysis.rs: WHO'S WINNING THE AI POPULARITY CONTEST
// =============================================================================
//
// One citation tells you almost nothing. A few hundred of them, across
// queries and models, tell you who the models think runs logistics in
// Kurdistan. This module is the reduction:
//
//   1. Detect every response in parallel (rayon). Detection is pure and
//      per-response, so there is nothing to coordinate.
//   2. Fold the results into per-entity tallies: mentions, ranks,
//      sentiments, contexts. Every registered competitor plus us.
//   3. Turn the tallies into profiles, shares, leaders, gaps, threats and
//      the recommendations a marketing team will actually read.
//
// All of it is keyword heuristics. "Reliability" is a strength because the
// contexts said "reliable" and "consistent", not because anybody measured
// on-time delivery. Treat the output as a conversation starter.
// =============================================================================

use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::citation_detector::CitationDetector;
use crate::keywords::KeywordSet;
use crate::models::{
    CitationAnalysis, CompetitiveMetrics, CompetitorProfile, Language, MarketAnalysis,
    ResponseRecord,
};
use crate::text_scanner;

/// Average position for an entity nobody ranked.
pub const UNRANKED_POSITION: f64 = 10.0;

const MARKET_LEADER_COUNT: usize = 5;
const THREAT_WINDOW: usize = 3;

const COMPETITOR_POSITIVE_WORDS: &[&str] = &["best", "excellent", "top", "leading", "reliable", "trusted"];
const COMPETITOR_NEGATIVE_WORDS: &[&str] = &["poor", "bad", "unreliable", "expensive", "slow"];

/// (label, trigger words). Two triggers make a strength.
const STRENGTH_INDICATORS: &[(&str, &[&str])] = &[
    ("Customer Service", &["service", "support", "helpful", "responsive"]),
    ("Pricing", &["affordable", "competitive", "value", "cost-effective"]),
    ("Reliability", &["reliable", "dependable", "consistent", "on-time"]),
    ("Experience", &["experienced", "established", "years", "expertise"]),
    ("Technology", &["modern", "technology", "digital", "advanced"]),
    ("Speed", &["fast", "quick", "rapid", "express"]),
    ("Coverage", &["wide", "extensive", "network", "coverage"]),
];

/// (label, trigger phrases). One trigger makes a weakness.
const WEAKNESS_INDICATORS: &[(&str, &[&str])] = &[
    ("Pricing", &["expensive", "costly", "overpriced"]),
    ("Speed", &["slow", "delayed", "late"]),
    ("Service", &["poor service", "bad support", "unresponsive"]),
    ("Reliability", &["unreliable", "inconsistent", "problems"]),
];

const LOW_VISIBILITY: &str = "Low visibility";
const BRAND_AWARENESS: &str = "Brand awareness";
const GROWTH_OPPORTUNITY: &str = "Significant market share growth potential";

/// Running tallies for one entity during a single analysis run.
#[derive(Debug, Default)]
struct EntityStats {
    mentions: u32,
    positions: Vec<u32>,
    sentiments: Vec<f64>,
    contexts: Vec<String>,
}

impl EntityStats {
    fn record(&mut self, position: Option<u32>, sentiment: f64, context: &str) {
        self.mentions += 1;
        if let Some(p) = position {
            self.positions.push(p);
        }
        self.sentiments.push(sentiment);
        self.contexts.push(context.to_string());
    }

    fn into_profile(self, name: &str, total_mentions: u32) -> CompetitorProfile {
        let average_position = mean(self.positions.iter().map(|p| *p as f64)).unwrap_or(UNRANKED_POSITION);
        let sentiment_score = mean(self.sentiments.iter().copied()).unwrap_or(0.0);
        let market_share = if total_mentions > 0 {
            self.mentions as f64 / total_mentions as f64 * 100.0
        } else {
            0.0
        };

        CompetitorProfile {
            name: name.to_string(),
            mention_frequency: self.mentions,
            average_position,
            sentiment_score,
            strengths: identify_strengths(&self.contexts),
            weaknesses: identify_weaknesses(&self.contexts, average_position),
            market_share,
        }
    }
}

/// Stats for every tracked entity, in registry order: competitors first,
/// then the target company.
struct StatsTable {
    names: Vec<String>,
    stats: Vec<EntityStats>,
    index: HashMap<String, usize>,
}

impl StatsTable {
    fn new(keywords: &KeywordSet) -> Self {
        let names: Vec<String> = keywords
            .competitor_names()
            .iter()
            .cloned()
            .chain(std::iter::once(keywords.target_name().to_string()))
            .collect();
        let index = names.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
        let stats = names.iter().map(|_| EntityStats::default()).collect();
        Self { names, stats, index }
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut EntityStats> {
        let i = *self.index.get(name)?;
        self.stats.get_mut(i)
    }

    fn total_mentions(&self) -> u32 {
        self.stats.iter().map(|s| s.mentions).sum()
    }
}

pub struct CompetitiveAnalyzer {
    detector: CitationDetector,
    /// Ranking vocabulary used when the analyzer runs detection itself.
    language: Language,
}

impl Default for CompetitiveAnalyzer {
    fn default() -> Self {
        Self::new(KeywordSet::shared())
    }
}

impl CompetitiveAnalyzer {
    pub fn new(keywords: Arc<KeywordSet>) -> Self {
        Self::with_detector(CitationDetector::new(keywords))
    }

    pub fn with_detector(detector: CitationDetector) -> Self {
        Self {
            detector,
            language: Language::English,
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn detector(&self) -> &CitationDetector {
        &self.detector
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn detect(&self, response: &ResponseRecord) -> CitationAnalysis {
        self.detector.detect_citation(&response.response, self.language)
    }

    fn detect_all(&self, responses: &[ResponseRecord]) -> Vec<CitationAnalysis> {
        responses.par_iter().map(|r| self.detect(r)).collect()
    }

    /// Full market picture from a batch of responses.
    pub fn analyze_competitive_landscape(&self, responses: &[ResponseRecord]) -> MarketAnalysis {
        self.summarize_landscape(responses, &self.detect_all(responses))
    }

    /// Landscape over analyses the caller already ran, one per response.
    pub fn summarize_landscape(
        &self,
        responses: &[ResponseRecord],
        analyses: &[CitationAnalysis],
    ) -> MarketAnalysis {
        let keywords = self.detector.keywords();
        let target = keywords.target_name().to_string();
        let mut table = StatsTable::new(keywords);

        for analysis in analyses {
            if analysis.cited {
                if let Some(stats) = table.get_mut(&target) {
                    stats.record(analysis.position, analysis.sentiment_score, &analysis.context);
                }
            }
            for mention in &analysis.competitor_mentions {
                if let Some(stats) = table.get_mut(&mention.company) {
                    let sentiment = estimate_competitor_sentiment(&mention.context);
                    stats.record(mention.position, sentiment, &mention.context);
                }
            }
        }

        let total_mentions = table.total_mentions();
        let mut directdrive_profile = None;
        let mut leaders = Vec::new();

        for (name, stats) in table.names.iter().zip(table.stats) {
            let mentioned = stats.mentions > 0;
            let profile = stats.into_profile(name, total_mentions);
            if *name == target {
                directdrive_profile = Some(profile);
            } else if mentioned {
                leaders.push(profile);
            }
        }

        let directdrive_profile = directdrive_profile
            .unwrap_or_else(|| EntityStats::default().into_profile(&target, total_mentions));

        // Stable sort keeps registry order among equal scores
        leaders.sort_by(|a, b| competitor_score(b).total_cmp(&competitor_score(a)));

        let market_gaps = identify_market_gaps(responses);
        let opportunities = identify_opportunities(&directdrive_profile, &leaders);
        let threats = identify_threats(&leaders);
        let recommendations = generate_recommendations(&directdrive_profile, &leaders, &opportunities);

        leaders.truncate(MARKET_LEADER_COUNT);

        debug!(
            responses = responses.len(),
            total_mentions,
            leaders = leaders.len(),
            directdrive_share = format!("{:.1}", directdrive_profile.market_share),
            gaps = market_gaps.len(),
            "Competitive landscape analyzed"
        );

        MarketAnalysis {
            market_leaders: leaders,
            directdrive_profile,
            market_gaps,
            opportunities,
            threats,
            recommendations,
        }
    }

    /// The lightweight scoreboard: best rank, crowding, visibility.
    pub fn calculate_competitive_metrics(&self, responses: &[ResponseRecord]) -> CompetitiveMetrics {
        self.summarize_metrics(&self.detect_all(responses))
    }

    pub fn summarize_metrics(&self, analyses: &[CitationAnalysis]) -> CompetitiveMetrics {
        let mut best_rank: Option<u32> = None;
        let mut total_competitors = 0usize;
        let mut directdrive_mentions = 0usize;
        let mut competitor_mentions = 0usize;

        for analysis in analyses {
            if analysis.cited {
                directdrive_mentions += 1;
                if let Some(p) = analysis.position {
                    best_rank = Some(best_rank.map_or(p, |b| b.min(p)));
                }
            }
            let competitors = analysis.competitor_mentions.len();
            total_competitors = total_competitors.max(competitors);
            competitor_mentions += competitors;
        }

        let total_mentions = directdrive_mentions + competitor_mentions;
        let market_visibility = if total_mentions > 0 {
            directdrive_mentions as f64 / total_mentions as f64 * 100.0
        } else {
            0.0
        };

        let competitive_gap = best_rank.map_or(10.0, |r| r.saturating_sub(1) as f64);
        let dominance_score = (100.0 - competitive_gap * 10.0 - (100.0 - market_visibility)).max(0.0);
        let improvement_potential = (100.0 - dominance_score).min(100.0);

        debug!(
            responses = analyses.len(),
            rank = ?best_rank,
            visibility = format!("{:.1}", market_visibility),
            dominance = format!("{:.1}", dominance_score),
            "Competitive metrics calculated"
        );

        CompetitiveMetrics {
            directdrive_rank: best_rank,
            total_competitors,
            market_visibility,
            competitive_gap,
            dominance_score,
            improvement_potential,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Coarser sentiment for competitor contexts: distinct hits over three.
fn estimate_competitor_sentiment(context: &str) -> f64 {
    let lowered = context.to_lowercase();
    let positive = text_scanner::count_terms_present(&lowered, COMPETITOR_POSITIVE_WORDS) as f64;
    let negative = text_scanner::count_terms_present(&lowered, COMPETITOR_NEGATIVE_WORDS) as f64;
    ((positive - negative) / 3.0).clamp(-1.0, 1.0)
}

fn identify_strengths(contexts: &[String]) -> Vec<String> {
    let combined = contexts.join(" ").to_lowercase();
    STRENGTH_INDICATORS
        .iter()
        .filter(|(_, triggers)| text_scanner::count_terms_present(&combined, triggers) >= 2)
        .map(|(label, _)| label.to_string())
        .collect()
}

fn identify_weaknesses(contexts: &[String], average_position: f64) -> Vec<String> {
    let mut weaknesses = Vec::new();
    if average_position > 5.0 {
        weaknesses.push(LOW_VISIBILITY.to_string());
    }
    if contexts.is_empty() {
        weaknesses.push(BRAND_AWARENESS.to_string());
    }

    let combined = contexts.join(" ").to_lowercase();
    weaknesses.extend(
        WEAKNESS_INDICATORS
            .iter()
            .filter(|(_, triggers)| text_scanner::count_terms_present(&combined, triggers) >= 1)
            .map(|(label, _)| label.to_string()),
    );
    weaknesses
}

/// Sort key for market leaders. Never reported.
fn competitor_score(profile: &CompetitorProfile) -> f64 {
    (profile.mention_frequency as f64 * 10.0).min(40.0)
        + (30.0 - profile.average_position * 3.0).max(0.0)
        + (profile.sentiment_score + 1.0) * 10.0
        + profile.market_share.min(10.0)
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

fn identify_market_gaps(responses: &[ResponseRecord]) -> Vec<String> {
    let mut gaps = Vec::new();
    for record in responses {
        let response = record.response.to_lowercase();
        if text_scanner::contains_term(&response, "no reliable")
            || text_scanner::contains_term(&response, "limited options")
        {
            push_unique(&mut gaps, "Market reliability gap");
        }
        if text_scanner::contains_term(&response, "expensive") || text_scanner::contains_term(&response, "costly") {
            push_unique(&mut gaps, "Pricing competitiveness gap");
        }
        if text_scanner::contains_term(&record.query, "technology")
            && !text_scanner::contains_term(&response, "digital")
        {
            push_unique(&mut gaps, "Technology adoption gap");
        }
    }
    gaps
}

fn identify_opportunities(directdrive: &CompetitorProfile, competitors: &[CompetitorProfile]) -> Vec<String> {
    let mut opportunities = Vec::new();

    if directdrive.market_share < 10.0 {
        opportunities.push(GROWTH_OPPORTUNITY.to_string());
    }
    if directdrive.average_position > 3.0 {
        opportunities.push("Improve AI visibility and ranking".to_string());
    }

    let mut seen: Vec<&str> = Vec::new();
    for weakness in competitors.iter().flat_map(|c| c.weaknesses.iter()) {
        if seen.contains(&weakness.as_str()) {
            continue;
        }
        seen.push(weakness);
        if !directdrive.weaknesses.contains(weakness) {
            opportunities.push(format!("Capitalize on competitor {}", weakness.to_lowercase()));
        }
    }

    for strength in &directdrive.strengths {
        opportunities.push(format!("Leverage {} advantage", strength.to_lowercase()));
    }

    opportunities
}

fn identify_threats(leaders: &[CompetitorProfile]) -> Vec<String> {
    let mut threats = Vec::new();
    for competitor in leaders.iter().take(THREAT_WINDOW) {
        if competitor.market_share > 20.0 {
            threats.push(format!("{} market dominance", competitor.name));
        }
        if competitor.average_position <= 2.0 {
            threats.push(format!("{} high AI visibility", competitor.name));
        }
    }
    threats
}

fn weakness_mitigation(weakness: &str) -> Option<&'static str> {
    match weakness {
        BRAND_AWARENESS => Some("Implement targeted brand awareness campaign in Kurdistan market"),
        LOW_VISIBILITY => Some("Optimize content for AI model queries and citations"),
        "Pricing" => Some("Publish transparent pricing and value comparisons"),
        "Speed" => Some("Highlight transit times and delivery guarantees"),
        "Service" => Some("Showcase customer support responsiveness and testimonials"),
        "Reliability" => Some("Publish on-time delivery records and case studies"),
        _ => None,
    }
}

fn generate_recommendations(
    directdrive: &CompetitorProfile,
    leaders: &[CompetitorProfile],
    opportunities: &[String],
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if directdrive.average_position > 5.0 {
        recommendations.push("Increase high-quality content production targeting key logistics queries".to_string());
    }

    if let Some(top) = leaders.first() {
        if top.market_share > directdrive.market_share * 2.0 {
            recommendations.push(format!("Study and differentiate from {} market approach", top.name));
        }
    }

    for strength in &directdrive.strengths {
        recommendations.push(format!("Amplify {} in content and messaging", strength.to_lowercase()));
    }

    recommendations.extend(
        directdrive
            .weaknesses
            .iter()
            .filter_map(|w| weakness_mitigation(w))
            .map(str::to_string),
    );

    for opportunity in opportunities {
        if opportunity.contains("growth potential") {
            recommendations.push("Develop market penetration strategy focusing on underserved segments".to_string());
        }
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> CompetitiveAnalyzer {
        CompetitiveAnalyzer::default()
    }

    fn record(query: &str, response: &str) -> ResponseRecord {
        ResponseRecord::new(query, response)
    }

    fn all_profiles(analysis: &MarketAnalysis) -> Vec<&CompetitorProfile> {
        analysis
            .market_leaders
            .iter()
            .chain(std::iter::once(&analysis.directdrive_profile))
            .collect()
    }

    #[test]
    fn test_empty_batch_is_zeroed() {
        let analysis = analyzer().analyze_competitive_landscape(&[]);
        assert!(analysis.market_leaders.is_empty());

        let dd = &analysis.directdrive_profile;
        assert_eq!(dd.name, "DirectDrive Logistics");
        assert_eq!(dd.mention_frequency, 0);
        assert_eq!(dd.market_share, 0.0);
        assert_eq!(dd.average_position, UNRANKED_POSITION);
        assert!(dd.weaknesses.contains(&"Brand awareness".to_string()));
        assert!(dd.weaknesses.contains(&"Low visibility".to_string()));
        assert!(analysis.market_gaps.is_empty());
        assert!(analysis.threats.is_empty());
    }

    #[test]
    fn test_market_share_sums_to_one_hundred() {
        let responses = vec![
            record(
                "best logistics company Kurdistan",
                "Top picks: Kurdistan Express Logistics, Erbil Transport Company and DirectDrive Logistics.",
            ),
            record(
                "shipping services Erbil",
                "Erbil Transport Company is reliable. Mesopotamia Logistics is also used.",
            ),
        ];
        let analysis = analyzer().analyze_competitive_landscape(&responses);
        let sum: f64 = all_profiles(&analysis).iter().map(|p| p.market_share).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(analysis.directdrive_profile.mention_frequency, 1);
        assert!((analysis.directdrive_profile.market_share - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_market_leaders_sorted_by_mentions() {
        let responses = vec![
            record("q", "Erbil Transport Company and Baghdad Express."),
            record("q", "Erbil Transport Company is an option."),
            record("q", "Erbil Transport Company again."),
        ];
        let analysis = analyzer().analyze_competitive_landscape(&responses);
        assert_eq!(analysis.market_leaders.len(), 2);
        assert_eq!(analysis.market_leaders[0].name, "Erbil Transport Company");
        assert_eq!(analysis.market_leaders[0].mention_frequency, 3);
        assert!(analysis
            .threats
            .contains(&"Erbil Transport Company market dominance".to_string()));
        assert!(analysis
            .recommendations
            .contains(&"Study and differentiate from Erbil Transport Company market approach".to_string()));
    }

    #[test]
    fn test_market_gaps_detected() {
        let responses = vec![
            record("technology logistics Kurdistan", "There are limited options and most are expensive."),
            record("Technology check", "Nothing digital here."),
        ];
        let gaps = analyzer().analyze_competitive_landscape(&responses).market_gaps;
        assert_eq!(
            gaps,
            vec![
                "Market reliability gap".to_string(),
                "Pricing competitiveness gap".to_string(),
                "Technology adoption gap".to_string(),
            ]
        );
    }

    #[test]
    fn test_strengths_need_two_triggers() {
        let contexts = vec!["Reliable and consistent service with helpful support".to_string()];
        let strengths = identify_strengths(&contexts);
        assert!(strengths.contains(&"Reliability".to_string()));
        assert!(strengths.contains(&"Customer Service".to_string()));
        assert!(!strengths.contains(&"Speed".to_string()));
    }

    #[test]
    fn test_weaknesses_need_one_trigger() {
        let contexts = vec!["Shipments were delayed and a bit costly".to_string()];
        let weaknesses = identify_weaknesses(&contexts, 2.0);
        assert_eq!(weaknesses, vec!["Pricing".to_string(), "Speed".to_string()]);
    }

    #[test]
    fn test_opportunities_and_recommendations_for_low_share() {
        let responses = vec![record(
            "q",
            "Kurdistan Express Logistics is slow and expensive. Erbil Transport Company is fine.",
        )];
        let analysis = analyzer().analyze_competitive_landscape(&responses);
        assert!(analysis.opportunities.contains(&GROWTH_OPPORTUNITY.to_string()));
        assert!(analysis
            .opportunities
            .contains(&"Capitalize on competitor pricing".to_string()));
        assert!(analysis
            .recommendations
            .contains(&"Develop market penetration strategy focusing on underserved segments".to_string()));
        assert!(analysis
            .recommendations
            .contains(&"Implement targeted brand awareness campaign in Kurdistan market".to_string()));
    }

    #[test]
    fn test_competitor_sentiment_uses_short_lists() {
        assert!((estimate_competitor_sentiment("The best and most trusted") - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(estimate_competitor_sentiment("poor, bad, slow, expensive"), -1.0);
    }

    #[test]
    fn test_metrics_rank_two_scenario() {
        let responses = vec![
            record(
                "best logistics company Kurdistan",
                "1. Kurdistan Express Logistics\n2. DirectDrive Logistics\n3. Erbil Transport Company",
            ),
            record(
                "DirectDrive logistics",
                "For regional freight, many shippers say that DirectDrive Logistics is excellent.",
            ),
        ];
        let metrics = analyzer().calculate_competitive_metrics(&responses);
        assert_eq!(metrics.directdrive_rank, Some(2));
        assert_eq!(metrics.total_competitors, 2);
        assert!((metrics.market_visibility - 50.0).abs() < 1e-9);
        assert_eq!(metrics.competitive_gap, 1.0);
        assert!(metrics.dominance_score > 0.0 && metrics.dominance_score < 100.0);
        assert!((metrics.dominance_score - 40.0).abs() < 1e-9);
        assert!((metrics.improvement_potential - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_detection_language_drives_ranking_vocabulary() {
        let responses = vec![record("أفضل شركة لوجستية", "الخيار الثاني هو DirectDrive في أربيل")];

        let english = analyzer().analyze_competitive_landscape(&responses);
        assert_eq!(english.directdrive_profile.average_position, 3.0);

        let arabic = analyzer()
            .with_language(Language::Arabic)
            .analyze_competitive_landscape(&responses);
        assert_eq!(arabic.directdrive_profile.average_position, 2.0);

        let metrics = analyzer()
            .with_language(Language::Arabic)
            .calculate_competitive_metrics(&responses);
        assert_eq!(metrics.directdrive_rank, Some(2));
    }

    #[test]
    fn test_summaries_match_self_detected_reports() {
        let responses = vec![
            record("q1", "1. Kurdistan Express Logistics\n2. DirectDrive Logistics"),
            record("q2", "Erbil Transport Company handles most routes."),
        ];
        let a = analyzer();
        let analyses: Vec<_> = responses.iter().map(|r| a.detect(r)).collect();

        let summarized = a.summarize_landscape(&responses, &analyses);
        let direct = a.analyze_competitive_landscape(&responses);
        assert_eq!(
            summarized.directdrive_profile.mention_frequency,
            direct.directdrive_profile.mention_frequency
        );
        assert_eq!(summarized.market_leaders.len(), direct.market_leaders.len());
        assert_eq!(
            a.summarize_metrics(&analyses).directdrive_rank,
            a.calculate_competitive_metrics(&responses).directdrive_rank
        );
    }

    #[test]
    fn test_metrics_on_empty_batch() {
        let metrics = analyzer().calculate_competitive_metrics(&[]);
        assert_eq!(metrics.directdrive_rank, None);
        assert_eq!(metrics.market_visibility, 0.0);
        assert_eq!(metrics.competitive_gap, 10.0);
        assert_eq!(metrics.dominance_score, 0.0);
        assert_eq!(metrics.improvement_potential, 100.0);
    }
}
