// =============================================================================
// text_scanner.rs: THE LOW-LEVEL TEXT MACHINERY
// =============================================================================
//
// The primitives every analysis step is built from:
//
// 1. Aho-Corasick keyword scans. Every DirectDrive spelling (or every
//    competitor name) in a single pass, ASCII case-insensitive, against the
//    ORIGINAL text. No lowercased copy, so every offset we report points
//    into the string the caller gave us and the context we cut out keeps
//    its casing and punctuation.
//
// 2. A punctuation sentence splitter that remembers where each sentence
//    lives. Runs of `.`, `!`, `?` are boundaries and never part of a
//    sentence.
//
// 3. memchr substring checks for the "does this context mention 'reliable'"
//    questions the scorers ask a few dozen times per response.
//
// Offsets are bytes internally. Anything that talks about "characters"
// (proximity windows, relative position, context length) converts first,
// because Arabic and Kurdish letters are two bytes each and the thresholds
// were tuned on characters.
// =============================================================================

use std::collections::HashMap;

use crate::keywords::KeywordSet;

/// One occurrence of a target keyword or variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordHit {
    /// The registered keyword that matched (lexicon casing).
    pub keyword: String,
    /// Byte offset into the original text.
    pub start: usize,
    pub end: usize,
    /// Character offset of `start`.
    pub char_start: usize,
    /// Matched via the looser variation list rather than the exact list.
    pub is_variation: bool,
}

/// The first occurrence of one registered competitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitorHit {
    pub company: String,
    pub start: usize,
}

/// A sentence's byte span in the original text, boundary punctuation excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceSpan {
    pub start: usize,
    pub end: usize,
}

/// Find every target keyword/variation occurrence, sorted by offset.
///
/// Overlapping hits are all reported: "DirectDrive Logistics" yields both
/// `directdrive` and `directdrive logistics` at the same offset.
pub fn find_target_hits(keywords: &KeywordSet, text: &str) -> Vec<KeywordHit> {
    let mut raw: Vec<(usize, usize, usize)> = keywords
        .target_automaton()
        .find_overlapping_iter(text)
        .map(|m| (m.start(), m.end(), m.pattern().as_usize()))
        .collect();

    raw.sort_by_key(|&(start, _, pattern)| (start, pattern));

    let mut hits = Vec::with_capacity(raw.len());
    let mut cursor = CharCursor::new(text);
    for (start, end, pattern) in raw {
        hits.push(KeywordHit {
            keyword: keywords.target_pattern(pattern).to_string(),
            start,
            end,
            char_start: cursor.char_offset(start),
            is_variation: keywords.is_variation_pattern(pattern),
        });
    }
    hits
}

/// First occurrence of each registered competitor, in order of appearance.
/// Names must match in full; "Kurdistan Express" alone is not a hit for
/// "Kurdistan Express Logistics".
pub fn find_competitor_hits(keywords: &KeywordSet, text: &str) -> Vec<CompetitorHit> {
    let mut first_seen: HashMap<usize, usize> = HashMap::new();
    for m in keywords.competitor_automaton().find_overlapping_iter(text) {
        first_seen
            .entry(m.pattern().as_usize())
            .and_modify(|s| *s = (*s).min(m.start()))
            .or_insert(m.start());
    }

    let names = keywords.competitor_names();
    let mut hits: Vec<CompetitorHit> = first_seen
        .into_iter()
        .map(|(pattern, start)| CompetitorHit {
            company: names[pattern].clone(),
            start,
        })
        .collect();
    hits.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.company.cmp(&b.company)));
    hits
}

/// Split on runs of `.`, `!` and `?`. Every fragment between boundaries is
/// returned, empty ones included, so indices line up with the text.
pub fn split_sentences(text: &str) -> Vec<SentenceSpan> {
    let mut spans = Vec::new();
    let mut start = 0;
    let mut in_boundary = false;

    for (i, b) in text.bytes().enumerate() {
        let is_boundary = matches!(b, b'.' | b'!' | b'?');
        if is_boundary && !in_boundary {
            spans.push(SentenceSpan { start, end: i });
            in_boundary = true;
        } else if !is_boundary && in_boundary {
            start = i;
            in_boundary = false;
        }
    }

    if in_boundary {
        spans.push(SentenceSpan { start: text.len(), end: text.len() });
    } else {
        spans.push(SentenceSpan { start, end: text.len() });
    }
    spans
}

/// The sentence containing `offset`, plus one neighbour on each side,
/// trimmed and joined with ". ". Empty neighbours are skipped.
pub fn context_window(text: &str, offset: usize) -> String {
    let spans = split_sentences(text);
    let Some(idx) = spans
        .iter()
        .position(|s| offset >= s.start && offset <= s.end)
    else {
        return String::new();
    };

    let lo = idx.saturating_sub(1);
    let hi = (idx + 1).min(spans.len() - 1);

    spans[lo..=hi]
        .iter()
        .map(|s| text[s.start..s.end].trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

/// SIMD substring check. Both sides are expected to be case-folded already.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    memchr::memmem::find(haystack.as_bytes(), term.as_bytes()).is_some()
}

/// How many of `terms` appear at least once in `haystack`.
pub fn count_terms_present(haystack: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|t| contains_term(haystack, t)).count()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Converts ascending byte offsets to character offsets without rescanning
/// from the start each time.
pub struct CharCursor<'a> {
    text: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharCursor<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, byte: 0, chars: 0 }
    }

    /// Character offset of `byte_offset`. Offsets must be char boundaries;
    /// a smaller offset than the last one restarts the scan.
    pub fn char_offset(&mut self, byte_offset: usize) -> usize {
        if byte_offset < self.byte {
            self.byte = 0;
            self.chars = 0;
        }
        self.chars += self.text[self.byte..byte_offset].chars().count();
        self.byte = byte_offset;
        self.chars
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_hits_report_overlapping_keywords() {
        let set = KeywordSet::shared();
        let hits = find_target_hits(&set, "Try DirectDrive Logistics today");
        let keywords: Vec<&str> = hits.iter().map(|h| h.keyword.as_str()).collect();
        assert_eq!(keywords, vec!["directdrive", "directdrive logistics"]);
        assert!(hits.iter().all(|h| h.start == 4));
    }

    #[test]
    fn test_target_hits_flag_variations() {
        let set = KeywordSet::shared();
        let hits = find_target_hits(&set, "ask Direct-Drive about it");
        assert_eq!(hits.len(), 1);
        assert!(hits[0].is_variation);
    }

    #[test]
    fn test_target_hits_use_character_offsets() {
        let set = KeywordSet::shared();
        let text = "شركة DirectDrive للوجستيات";
        let hits = find_target_hits(&set, text);
        assert_eq!(hits[0].char_start, 5);
        assert!(hits[0].start > hits[0].char_start);
    }

    #[test]
    fn test_competitor_hits_require_full_name() {
        let set = KeywordSet::shared();
        assert!(find_competitor_hits(&set, "Kurdistan Express is the top logistics provider.").is_empty());

        let hits = find_competitor_hits(
            &set,
            "Erbil Transport Company and kurdistan express logistics, then Erbil Transport Company again",
        );
        let names: Vec<&str> = hits.iter().map(|h| h.company.as_str()).collect();
        assert_eq!(names, vec!["Erbil Transport Company", "Kurdistan Express Logistics"]);
    }

    #[test]
    fn test_split_sentences_excludes_punctuation() {
        let text = "One. Two!? Three";
        let spans = split_sentences(text);
        let parts: Vec<&str> = spans.iter().map(|s| &text[s.start..s.end]).collect();
        assert_eq!(parts, vec!["One", " Two", " Three"]);
    }

    #[test]
    fn test_context_window_takes_one_neighbour_each_side() {
        let text = "A one. B two. C three. D four. E five.";
        let offset = text.find("C three").unwrap();
        assert_eq!(context_window(text, offset), "B two. C three. D four");
    }

    #[test]
    fn test_context_window_single_sentence() {
        let text = "DirectDrive is mentioned.";
        assert_eq!(context_window(text, 0), "DirectDrive is mentioned");
    }

    #[test]
    fn test_count_terms_present_counts_distinct_terms() {
        assert_eq!(count_terms_present("fast and fast and reliable", &["fast", "reliable", "cheap"]), 2);
        assert!(contains_term("top logistics", "logistics"));
    }

    #[test]
    fn test_char_cursor_tracks_multibyte_text() {
        let text = "أربيل DirectDrive";
        let mut cursor = CharCursor::new(text);
        let byte = text.find("DirectDrive").unwrap();
        assert_eq!(cursor.char_offset(byte), 6);
        assert_eq!(char_len(text), 17);
    }
}
