use std::sync::OnceLock;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use super::document::{CardId, FeedDocument};
use crate::settings::Settings;

/// Substrings that mark a paid placement.
pub const SPONSORED_KEYWORDS: &[&str] = &["sponsored", "promoted"];

/// Whole-word phrases that mark a live stream card.
pub const LIVE_KEYWORDS: &[&str] = &["live now", "live"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Verdict {
    pub sponsored: bool,
    pub live: bool,
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        self.sponsored || self.live
    }

    pub fn label(&self) -> &'static str {
        match (self.sponsored, self.live) {
            (false, false) => "allowed",
            (true, false) => "sponsored",
            (false, true) => "live",
            (true, true) => "both",
        }
    }
}

/// Classify a card under the current toggles.
///
/// Reads the card's text and, when live skipping is on, its nested markers.
/// A card with no text is always allowed.
pub fn classify<D: FeedDocument + ?Sized>(doc: &D, card: CardId, settings: &Settings) -> Verdict {
    let text = doc.card_text(card).unwrap_or_default();
    classify_text(&text, || doc.has_live_marker(card), settings)
}

/// Text-level classification. `live_marker` is only consulted when the text
/// is non-empty and live skipping is enabled.
pub fn classify_text<F>(text: &str, live_marker: F, settings: &Settings) -> Verdict
where
    F: FnOnce() -> bool,
{
    let text = normalize(text);
    if text.is_empty() {
        return Verdict::default();
    }

    let sponsored = settings.sponsored_enabled && contains_sponsored_keyword(&text);
    let live = settings.live_enabled && (live_marker() || contains_live_keyword(&text));

    Verdict { sponsored, live }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn build_automaton(patterns: &[&str]) -> Option<AhoCorasick> {
    AhoCorasickBuilder::new()
        .match_kind(MatchKind::LeftmostLongest)
        .build(patterns)
        .ok()
}

fn sponsored_automaton() -> Option<&'static AhoCorasick> {
    static AUTOMATON: OnceLock<Option<AhoCorasick>> = OnceLock::new();
    AUTOMATON
        .get_or_init(|| build_automaton(SPONSORED_KEYWORDS))
        .as_ref()
}

fn live_automaton() -> Option<&'static AhoCorasick> {
    static AUTOMATON: OnceLock<Option<AhoCorasick>> = OnceLock::new();
    AUTOMATON.get_or_init(|| build_automaton(LIVE_KEYWORDS)).as_ref()
}

fn contains_sponsored_keyword(text: &str) -> bool {
    match sponsored_automaton() {
        Some(ac) => ac.is_match(text),
        None => SPONSORED_KEYWORDS.iter().any(|kw| text.contains(kw)),
    }
}

fn contains_live_keyword(text: &str) -> bool {
    match live_automaton() {
        Some(ac) => ac
            .find_iter(text)
            .any(|m| is_whole_word(text, m.start(), m.end())),
        None => LIVE_KEYWORDS.iter().any(|kw| {
            text.match_indices(kw)
                .any(|(start, hit)| is_whole_word(text, start, start + hit.len()))
        }),
    }
}

fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
