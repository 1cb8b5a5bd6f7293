//! In-memory feed document.
//!
//! Cards stack vertically, each one viewport tall unless told otherwise, and
//! scrolling moves a single window offset. Scroll requests are applied
//! instantly and recorded so tests can assert on them.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::document::{CardId, CardRect, FeedDocument};
use super::markers::{matches_any, CARD_MARKERS, LIVE_MARKERS};
use crate::watch::InsertedCard;

#[derive(Debug, Clone, PartialEq)]
pub enum ScrollAction {
    IntoView(CardId),
    WindowBy(f64),
}

/// Blueprint for one element pushed into a [`SimulatedFeed`].
#[derive(Debug, Clone, Default)]
pub struct SimCard {
    attrs: Vec<(String, String)>,
    text: String,
    children: Vec<Vec<(String, String)>>,
    height: Option<f64>,
}

impl SimCard {
    /// A standard "For You" feed card.
    pub fn video(text: &str) -> Self {
        Self::marked("feed-video", text)
    }

    /// A card whose `data-e2e` attribute is `marker`.
    pub fn marked(marker: &str, text: &str) -> Self {
        Self {
            attrs: vec![("data-e2e".into(), marker.into())],
            text: text.into(),
            ..Self::default()
        }
    }

    /// An element that is not a card.
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_live_badge(self) -> Self {
        self.with_child(&[("data-e2e", "live-tag")])
    }

    pub fn with_child(mut self, attrs: &[(&str, &str)]) -> Self {
        self.children.push(
            attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }

    fn is_card(&self) -> bool {
        matches_any(CARD_MARKERS, &self.attrs)
    }
}

struct Entry {
    id: CardId,
    card: SimCard,
}

struct SimState {
    next_id: u64,
    entries: Vec<Entry>,
    viewport_height: f64,
    scroll_y: f64,
    scrolls: Vec<ScrollAction>,
}

impl SimState {
    fn height_of(&self, entry: &Entry) -> f64 {
        entry.card.height.unwrap_or(self.viewport_height)
    }

    /// Document-relative top and height.
    fn extent(&self, id: CardId) -> Option<(f64, f64)> {
        let mut top = 0.0;
        for entry in &self.entries {
            let height = self.height_of(entry);
            if entry.id == id {
                return Some((top, height));
            }
            top += height;
        }
        None
    }

    fn entry(&self, id: CardId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }
}

/// Cloneable handle; clones share one document.
#[derive(Clone)]
pub struct SimulatedFeed {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedFeed {
    pub fn new(viewport_height: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                next_id: 1,
                entries: Vec::new(),
                viewport_height,
                scroll_y: 0.0,
                scrolls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an element at the end of the document.
    pub fn push(&self, card: SimCard) -> CardId {
        let mut state = self.lock();
        let id = CardId(state.next_id);
        state.next_id += 1;
        state.entries.push(Entry { id, card });
        id
    }

    /// Append `card` as an inserted subtree root, reporting it the way a
    /// mutation watcher would.
    pub fn append(&self, card: SimCard) -> Vec<InsertedCard> {
        let is_card = card.is_card();
        let id = self.push(card);
        if is_card {
            vec![InsertedCard { card: id, nested: false }]
        } else {
            Vec::new()
        }
    }

    /// Append `cards` inside a non-card wrapper, reporting the cards among
    /// them as nested insertions.
    pub fn append_wrapped(&self, cards: Vec<SimCard>) -> Vec<InsertedCard> {
        cards
            .into_iter()
            .filter_map(|card| {
                let is_card = card.is_card();
                let id = self.push(card);
                is_card.then_some(InsertedCard { card: id, nested: true })
            })
            .collect()
    }

    pub fn remove(&self, id: CardId) {
        self.lock().entries.retain(|e| e.id != id);
    }

    pub fn set_text(&self, id: CardId, text: &str) {
        let mut state = self.lock();
        if let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) {
            entry.card.text = text.into();
        }
    }

    pub fn scroll_to(&self, y: f64) {
        self.lock().scroll_y = y.max(0.0);
    }

    pub fn scroll_y(&self) -> f64 {
        self.lock().scroll_y
    }

    pub fn scrolls(&self) -> Vec<ScrollAction> {
        self.lock().scrolls.clone()
    }

    /// Fraction of the card inside the viewport, `0.0..=1.0`.
    pub fn visible_ratio(&self, id: CardId) -> Option<f64> {
        let state = self.lock();
        let (top, height) = state.extent(id)?;
        if height <= 0.0 {
            return Some(0.0);
        }
        let view_top = state.scroll_y;
        let view_bottom = view_top + state.viewport_height;
        let overlap = (top + height).min(view_bottom) - top.max(view_top);
        Some((overlap.max(0.0) / height).min(1.0))
    }
}

impl FeedDocument for SimulatedFeed {
    fn locate_cards(&self) -> Vec<CardId> {
        self.lock()
            .entries
            .iter()
            .filter(|e| e.card.is_card())
            .map(|e| e.id)
            .collect()
    }

    fn card_text(&self, card: CardId) -> Option<String> {
        self.lock().entry(card).map(|e| e.card.text.clone())
    }

    fn has_live_marker(&self, card: CardId) -> bool {
        self.lock()
            .entry(card)
            .map(|e| {
                e.card
                    .children
                    .iter()
                    .any(|attrs| matches_any(LIVE_MARKERS, attrs))
            })
            .unwrap_or(false)
    }

    fn card_rect(&self, card: CardId) -> Option<CardRect> {
        let state = self.lock();
        let (top, height) = state.extent(card)?;
        let top = top - state.scroll_y;
        Some(CardRect {
            top,
            bottom: top + height,
        })
    }

    fn viewport_height(&self) -> f64 {
        self.lock().viewport_height
    }

    fn scroll_card_into_view(&self, card: CardId) {
        let mut state = self.lock();
        if let Some((top, height)) = state.extent(card) {
            let centered = top + height / 2.0 - state.viewport_height / 2.0;
            state.scroll_y = centered.max(0.0);
        }
        state.scrolls.push(ScrollAction::IntoView(card));
    }

    fn scroll_window_by(&self, dy: f64) {
        let mut state = self.lock();
        state.scroll_y = (state.scroll_y + dy).max(0.0);
        state.scrolls.push(ScrollAction::WindowBy(dy));
    }
}
