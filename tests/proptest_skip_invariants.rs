//! Property-based invariant tests for classification and navigation.
//!
//! Verifies:
//! 1. Sponsored skipping off: no text is ever flagged sponsored
//! 2. Live skipping off: no text or badge is ever flagged live
//! 3. Any text containing "sponsored"/"promoted" (any case) is flagged when on
//! 4. Classification is idempotent for an unchanged card
//! 5. Navigation from a located card always lands on an adjacent card
//! 6. Navigation from an unknown card always scrolls the window by 0.9 viewports
//! 7. Epoch reset never clears blocked history

use feedskip::feed::classifier::classify_text;
use feedskip::feed::sim::{SimCard, SimulatedFeed};
use feedskip::feed::{classify, plan_advance, CardId, FallbackReason, NavTarget};
use feedskip::settings::Settings;
use feedskip::watch::CardMarks;
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

fn arb_settings() -> impl Strategy<Value = Settings> {
    (any::<bool>(), any::<bool>()).prop_map(|(sponsored_enabled, live_enabled)| Settings {
        sponsored_enabled,
        live_enabled,
    })
}

fn arb_caption() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9 ·#@!]{0,60}",
        Just(String::new()),
        Just("LIVE now".to_string()),
        Just("Sponsored".to_string()),
    ]
}

fn arb_keyword_casing() -> impl Strategy<Value = String> {
    (prop_oneof![Just("sponsored"), Just("promoted")], any::<u16>()).prop_map(|(kw, mask)| {
        kw.chars()
            .enumerate()
            .map(|(i, c)| {
                if mask & (1 << (i % 16)) != 0 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    })
}

fn cards(n: usize) -> Vec<CardId> {
    (1..=n as u64).map(CardId).collect()
}

// ── Classifier ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn sponsored_off_never_flags(text in arb_caption(), marker in any::<bool>(), live in any::<bool>()) {
        let settings = Settings { sponsored_enabled: false, live_enabled: live };
        prop_assert!(!classify_text(&text, || marker, &settings).sponsored);
    }

    #[test]
    fn live_off_never_flags(text in arb_caption(), marker in any::<bool>(), sponsored in any::<bool>()) {
        let settings = Settings { sponsored_enabled: sponsored, live_enabled: false };
        prop_assert!(!classify_text(&text, || marker, &settings).live);
    }

    #[test]
    fn keyword_anywhere_flags_sponsored(
        prefix in "[a-z ]{0,20}",
        keyword in arb_keyword_casing(),
        suffix in "[a-z ]{0,20}",
        live in any::<bool>(),
    ) {
        let text = format!("{prefix}{keyword}{suffix}");
        let settings = Settings { sponsored_enabled: true, live_enabled: live };
        prop_assert!(classify_text(&text, || false, &settings).sponsored);
    }

    #[test]
    fn classify_is_idempotent(text in arb_caption(), badge in any::<bool>(), settings in arb_settings()) {
        let feed = SimulatedFeed::new(800.0);
        let card = if badge {
            SimCard::video(&text).with_live_badge()
        } else {
            SimCard::video(&text)
        };
        let card = feed.push(card);

        let first = classify(&feed, card, &settings);
        for _ in 0..3 {
            prop_assert_eq!(classify(&feed, card, &settings), first);
        }
    }
}

// ── Navigator ─────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn advance_lands_on_neighbour(len in 2usize..40, pick in any::<prop::sample::Index>()) {
        let cards = cards(len);
        let idx = pick.index(len);
        match plan_advance(&cards, cards[idx], 900.0, 0.9) {
            NavTarget::Card { card, from, to } => {
                prop_assert_eq!(from, idx);
                prop_assert_eq!(card, cards[to]);
                if idx + 1 < len {
                    prop_assert_eq!(to, idx + 1);
                } else {
                    prop_assert_eq!(to, idx - 1);
                }
            }
            other => prop_assert!(false, "expected a card target, got {:?}", other),
        }
    }

    #[test]
    fn unknown_card_scrolls_window(len in 0usize..20, viewport in 100.0f64..4000.0) {
        let target = plan_advance(&cards(len), CardId(10_000), viewport, 0.9);
        prop_assert_eq!(
            target,
            NavTarget::Window { dy: viewport * 0.9, reason: FallbackReason::CardMissing }
        );
    }
}

// ── Marks ─────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn reset_keeps_blocked(ops in prop::collection::vec((0u64..8, any::<bool>()), 0..40)) {
        let mut marks = CardMarks::new();
        for (raw, blocked) in &ops {
            let card = CardId(*raw);
            if marks.begin_check(card) && *blocked {
                marks.mark_blocked(card);
            }
        }
        let blocked_before = marks.blocked_count();

        marks.reset_epoch();
        prop_assert_eq!(marks.checked_count(), 0);
        prop_assert_eq!(marks.blocked_count(), blocked_before);
    }
}
