use std::sync::OnceLock;

use super::document::{CardId, FeedDocument};
use super::markers::{selector_list, CARD_MARKERS};

/// CSS selector matching every card marker.
pub fn card_selector() -> &'static str {
    static SELECTOR: OnceLock<String> = OnceLock::new();
    SELECTOR.get_or_init(|| selector_list(CARD_MARKERS))
}

/// All cards currently in the document, in document order.
pub fn locate<D: FeedDocument + ?Sized>(doc: &D) -> Vec<CardId> {
    doc.locate_cards()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::sim::{SimCard, SimulatedFeed};
    use pretty_assertions::assert_eq;

    #[test]
    fn locates_marked_cards_in_order() {
        let feed = SimulatedFeed::new(800.0);
        let a = feed.push(SimCard::video("first"));
        feed.push(SimCard::plain("sidebar"));
        let b = feed.push(SimCard::marked("browse-video", "second"));
        let c = feed.push(SimCard::marked("search-card-item", "third"));

        assert_eq!(locate(&feed), vec![a, b, c]);
    }

    #[test]
    fn empty_document_has_no_cards() {
        let feed = SimulatedFeed::new(800.0);
        assert!(locate(&feed).is_empty());
    }

    #[test]
    fn selector_is_stable() {
        assert!(card_selector().starts_with(r#"[data-e2e*="feed-video"]"#));
        assert!(std::ptr::eq(card_selector(), card_selector()));
    }
}
