use super::document::{CardId, FeedDocument};
use super::locator::locate;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Where a skip lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavTarget {
    /// Center another card. `from`/`to` are document-order indices.
    Card {
        card: CardId,
        from: usize,
        to: usize,
    },
    /// Scroll the window itself down by `dy` pixels.
    Window { dy: f64, reason: FallbackReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The blocked card is no longer in the document.
    CardMissing,
    /// It is the only card in the document.
    NoNeighbour,
}

/// Pick the card after `current`, else the one before it, else a window
/// scroll of `fallback_fraction` viewports.
pub fn plan_advance(
    cards: &[CardId],
    current: CardId,
    viewport_height: f64,
    fallback_fraction: f64,
) -> NavTarget {
    let fallback = |reason| NavTarget::Window {
        dy: viewport_height * fallback_fraction,
        reason,
    };

    let Some(idx) = cards.iter().position(|&c| c == current) else {
        return fallback(FallbackReason::CardMissing);
    };

    let to = if idx + 1 < cards.len() {
        idx + 1
    } else if idx > 0 {
        idx - 1
    } else {
        return fallback(FallbackReason::NoNeighbour);
    };

    NavTarget::Card {
        card: cards[to],
        from: idx,
        to,
    }
}

/// Move the feed past `card` and report where it went.
///
/// Centering the neighbour directly outruns the feed's own snap scrolling,
/// which would otherwise settle back onto the blocked card.
pub fn advance_from<D: FeedDocument + ?Sized>(
    doc: &D,
    card: CardId,
    fallback_fraction: f64,
) -> NavTarget {
    let cards = locate(doc);
    let target = plan_advance(&cards, card, doc.viewport_height(), fallback_fraction);

    match target {
        NavTarget::Card { card: next, from, to } => {
            log_info!("→ Scrolling to next video card (fromIndex={from}, toIndex={to})");
            doc.scroll_card_into_view(next);
        }
        NavTarget::Window { dy, reason } => {
            match reason {
                FallbackReason::CardMissing => log_warn!(
                    "Could not find current card index, falling back to window scroll."
                ),
                FallbackReason::NoNeighbour => log_warn!(
                    "No next/previous card found, falling back to window scroll."
                ),
            }
            doc.scroll_window_by(dy);
        }
    }

    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::sim::{ScrollAction, SimCard, SimulatedFeed};
    use pretty_assertions::assert_eq;

    const A: CardId = CardId(1);
    const B: CardId = CardId(2);
    const C: CardId = CardId(3);

    #[test]
    fn middle_card_goes_forward() {
        assert_eq!(
            plan_advance(&[A, B, C], B, 1000.0, 0.9),
            NavTarget::Card {
                card: C,
                from: 1,
                to: 2,
            }
        );
    }

    #[test]
    fn last_card_falls_back_to_previous() {
        assert_eq!(
            plan_advance(&[A, B, C], C, 1000.0, 0.9),
            NavTarget::Card {
                card: B,
                from: 2,
                to: 1,
            }
        );
    }

    #[test]
    fn missing_card_scrolls_window() {
        assert_eq!(
            plan_advance(&[A, B], C, 1000.0, 0.9),
            NavTarget::Window {
                dy: 900.0,
                reason: FallbackReason::CardMissing,
            }
        );
    }

    #[test]
    fn lone_card_scrolls_window() {
        assert_eq!(
            plan_advance(&[A], A, 500.0, 0.9),
            NavTarget::Window {
                dy: 450.0,
                reason: FallbackReason::NoNeighbour,
            }
        );
    }

    #[test]
    fn advance_from_performs_exactly_one_scroll() {
        let feed = SimulatedFeed::new(800.0);
        let a = feed.push(SimCard::video("one"));
        let b = feed.push(SimCard::video("two"));

        advance_from(&feed, a, 0.9);
        assert_eq!(feed.scrolls(), vec![ScrollAction::IntoView(b)]);

        feed.remove(a);
        advance_from(&feed, a, 0.9);
        assert_eq!(
            feed.scrolls(),
            vec![ScrollAction::IntoView(b), ScrollAction::WindowBy(720.0)]
        );
    }
}
