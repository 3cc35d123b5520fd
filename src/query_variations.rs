// =============================================================================
// query_variations.rs: ONE QUESTION, FORTY WAYS TO ASK IT
// =============================================================================
//
// Nobody types "best logistics company Kurdistan" the same way twice. Some
// say Hawler, some say Erbil. Some ask in Arabic. Some ask a chatbot to
// recommend "reliable freight options". If we only monitor the canonical
// phrasing, we only learn how the models answer the canonical phrasing.
//
// So each base query fans out per language:
//
//   English:   rewrite the query itself. Place names swap in their
//              original casing, service words swap on the lowercased query,
//              then four question templates wrap the whole thing.
//   Others:    every trigger word found in the (English) query turns into
//              native-script terms dropped into native templates, plus the
//              regional corpus if the query is about logistics or the region
//              at all.
//
// The schedule and the high-priority list at the bottom are static tables.
// They're product decisions, not computed results.
// =============================================================================

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::debug;

use crate::keywords::{KeywordSet, LanguageProfile};
use crate::models::{Frequency, Language, QuerySet, QueryVariation, ScheduleEntry};

const REGION: &str = "Kurdistan";

const HIGH_PRIORITY_QUERIES: &[&str] = &[
    "best logistics company Kurdistan",
    "DirectDrive logistics",
    "shipping services Erbil",
    "Kurdistan freight services",
    "customs clearance Kurdistan",
    "أفضل شركة شحن في كردستان",
    "شركة DirectDrive للوجستيات",
    "باشترین کۆمپانیای گواستنەوە لە کوردستان",
    "بهترین شرکت حمل و نقل کردستان",
];

const DAILY_QUERIES: &[&str] = &[
    "best logistics company Kurdistan",
    "DirectDrive logistics",
    "shipping services Erbil",
];

const WEEKLY_QUERIES: &[&str] = &[
    "أفضل شركة شحن في كردستان",
    "باشترین کۆمپانیای گواستنەوە لە کوردستان",
    "Kurdistan freight services",
    "customs clearance Kurdistan",
];

const MONTHLY_QUERIES: &[&str] = &[
    "logistics company Erbil",
    "transportation services Kurdistan",
    "warehouse services Kurdistan",
];

/// Insertion-ordered set of strings.
#[derive(Default)]
struct OrderedSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl OrderedSet {
    fn insert(&mut self, value: String) {
        if self.seen.insert(value.clone()) {
            self.items.push(value);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.items
    }
}

pub struct QueryVariationGenerator {
    keywords: Arc<KeywordSet>,
}

impl Default for QueryVariationGenerator {
    fn default() -> Self {
        Self::new(KeywordSet::shared())
    }
}

impl QueryVariationGenerator {
    pub fn new(keywords: Arc<KeywordSet>) -> Self {
        Self { keywords }
    }

    /// Expand a base query into per-language variation lists. Languages
    /// that produce nothing are left out.
    pub fn generate_variations(&self, base_query: &str) -> QuerySet {
        let variations: Vec<QueryVariation> = Language::ALL
            .iter()
            .filter_map(|&language| {
                let profile = self.keywords.profile(language);
                let list = match language {
                    Language::English => rewrite_variations(profile, base_query),
                    _ => phrase_variations(profile, base_query),
                };
                (!list.is_empty()).then(|| QueryVariation {
                    original: base_query.to_string(),
                    variations: list,
                    language,
                    priority: profile.priority,
                    region: REGION.to_string(),
                })
            })
            .collect();

        let total_queries = variations.iter().map(|v| v.variations.len()).sum();

        debug!(
            base_query,
            languages = variations.len(),
            total_queries,
            "Query variations generated"
        );

        QuerySet {
            base_query: base_query.to_string(),
            variations,
            total_queries,
        }
    }

    /// Curated seed set for the most frequent monitoring cadence.
    pub fn get_high_priority_queries(&self) -> Vec<String> {
        HIGH_PRIORITY_QUERIES.iter().map(|q| q.to_string()).collect()
    }

    pub fn generate_monitoring_schedule(&self) -> Vec<ScheduleEntry> {
        let tier = |queries: &'static [&'static str], frequency: Frequency, language: &'static str| {
            queries.iter().map(move |q| ScheduleEntry {
                query: q.to_string(),
                frequency,
                language: language.to_string(),
            })
        };

        tier(DAILY_QUERIES, Frequency::Daily, "english")
            .chain(tier(WEEKLY_QUERIES, Frequency::Weekly, "mixed"))
            .chain(tier(MONTHLY_QUERIES, Frequency::Monthly, "english"))
            .collect()
    }

    /// A QuerySet for every English corpus query, keyed
    /// `english_<query with whitespace runs replaced by _>`.
    pub fn get_all_query_sets(&self) -> BTreeMap<String, QuerySet> {
        self.keywords
            .query_corpus(Language::English)
            .iter()
            .map(|query| {
                let key = format!("english_{}", query.split_whitespace().collect::<Vec<_>>().join("_"));
                (key, self.generate_variations(query))
            })
            .collect()
    }
}

/// Rewrite the query itself, then wrap it in templates. The original query
/// never appears in the output.
fn rewrite_variations(profile: &LanguageProfile, base_query: &str) -> Vec<String> {
    let mut out = OrderedSet::default();
    let lowered = base_query.to_lowercase();

    for rule in profile.substitutions.iter().filter(|r| r.fires_on(base_query)) {
        for term in &rule.terms {
            let rewritten = if rule.case_sensitive {
                base_query.replacen(&rule.trigger, term, 1)
            } else {
                lowered.replacen(&rule.trigger.to_lowercase(), term, 1)
            };
            out.insert(rewritten);
        }
    }

    for template in &profile.templates {
        out.insert(LanguageProfile::fill(template, base_query));
    }

    out.into_vec()
        .into_iter()
        .filter(|v| v != base_query)
        .collect()
}

/// Native-script phrases for each trigger in the query, plus the regional
/// corpus when the query is related.
fn phrase_variations(profile: &LanguageProfile, base_query: &str) -> Vec<String> {
    let mut out = OrderedSet::default();

    for rule in profile.substitutions.iter().filter(|r| r.fires_on(base_query)) {
        for term in &rule.terms {
            for template in &profile.templates {
                out.insert(LanguageProfile::fill(template, term));
            }
        }
    }

    if is_related(profile, base_query) {
        for query in &profile.query_corpus {
            out.insert(query.clone());
        }
    }

    out.into_vec()
}

/// A query is related if any of its words contains a logistics or region term.
fn is_related(profile: &LanguageProfile, base_query: &str) -> bool {
    base_query
        .to_lowercase()
        .split_whitespace()
        .any(|word| profile.related_terms.iter().any(|term| word.contains(term.as_str())))
}
