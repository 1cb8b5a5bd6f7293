use std::fmt;

/// Stable identity of one card element for the lifetime of the page.
///
/// Hosts hand these out; the watch loop only ever compares and hashes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// Viewport-relative vertical extent of a card, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub top: f64,
    pub bottom: f64,
}

/// The slice of the host document the skipper reads and scrolls.
///
/// Every method is infallible: a card that has left the document simply has
/// no text, no rect and no markers.
pub trait FeedDocument {
    /// All elements carrying a card marker, in document order.
    fn locate_cards(&self) -> Vec<CardId>;

    /// Rendered text of the card, untrimmed. `None` when the card is gone.
    fn card_text(&self, card: CardId) -> Option<String>;

    /// Whether any descendant of the card carries a live marker.
    fn has_live_marker(&self, card: CardId) -> bool;

    fn card_rect(&self, card: CardId) -> Option<CardRect>;

    fn viewport_height(&self) -> f64;

    /// Smoothly scroll `card` to the vertical center of the viewport.
    fn scroll_card_into_view(&self, card: CardId);

    /// Smoothly scroll the window down by `dy` pixels.
    fn scroll_window_by(&self, dy: f64);
}
