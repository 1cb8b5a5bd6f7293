use std::collections::HashSet;

use crate::feed::{advance_from, classify, locate, CardId, FeedDocument};
use crate::settings::{Settings, SettingsNotice};

use super::config::WatchConfig;
use super::event::{Effect, InsertedCard, WatchEvent};
use super::state::CardMarks;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Page-lifetime watch state: the settings snapshot, the per-card marks and
/// the set of cards registered with the visibility watcher.
///
/// All three signal sources funnel into [`WatchSession::handle`], which runs
/// to completion before the next event is taken, so a card is claimed before
/// anything else can look at it.
pub struct WatchSession<D> {
    doc: D,
    config: WatchConfig,
    settings: Settings,
    marks: CardMarks,
    observed: HashSet<CardId>,
}

impl<D: FeedDocument> WatchSession<D> {
    pub fn new(doc: D, settings: Settings, config: WatchConfig) -> Self {
        Self {
            doc,
            config,
            settings,
            marks: CardMarks::new(),
            observed: HashSet::new(),
        }
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn marks(&self) -> &CardMarks {
        &self.marks
    }

    pub fn is_observed(&self, card: CardId) -> bool {
        self.observed.contains(&card)
    }

    /// Register every card already in the document with the visibility
    /// watcher.
    pub fn start(&mut self) -> Vec<Effect> {
        let cards = locate(&self.doc);
        let effects: Vec<Effect> = cards
            .into_iter()
            .filter_map(|card| self.observe(card))
            .collect();
        log_info!(
            "Attached observer to {} existing video cards.",
            effects.len()
        );
        effects
    }

    pub fn handle(&mut self, event: WatchEvent) -> Vec<Effect> {
        match event {
            WatchEvent::Intersection {
                card,
                ratio,
                intersecting,
            } => self.on_intersection(card, ratio, intersecting),
            WatchEvent::Inserted(cards) => self.on_inserted(cards),
            WatchEvent::Sweep => self.on_sweep(),
            WatchEvent::SettingsChanged(notice) => {
                self.on_settings_changed(notice);
                Vec::new()
            }
            WatchEvent::AdvanceDue(card) => {
                advance_from(&self.doc, card, self.config.fallback_scroll_fraction);
                Vec::new()
            }
        }
    }

    fn observe(&mut self, card: CardId) -> Option<Effect> {
        self.observed.insert(card).then_some(Effect::Observe(card))
    }

    fn on_intersection(&mut self, card: CardId, ratio: f64, intersecting: bool) -> Vec<Effect> {
        if !intersecting || ratio < self.config.visibility_threshold {
            return Vec::new();
        }
        self.inspect(card).into_iter().collect()
    }

    fn on_inserted(&mut self, cards: Vec<InsertedCard>) -> Vec<Effect> {
        cards
            .into_iter()
            .filter_map(|InsertedCard { card, nested }| {
                let effect = self.observe(card)?;
                if nested {
                    log_info!("New video card detected (nested): {card}");
                } else {
                    log_info!("New video card detected (root): {card}");
                }
                Some(effect)
            })
            .collect()
    }

    fn on_sweep(&mut self) -> Vec<Effect> {
        let band_bottom = self.doc.viewport_height() * self.config.near_viewport_fraction;
        let due: Vec<CardId> = locate(&self.doc)
            .into_iter()
            .filter(|&card| !self.marks.is_checked(card))
            .filter(|&card| {
                self.doc
                    .card_rect(card)
                    .is_some_and(|rect| rect.top < band_bottom && rect.bottom > 0.0)
            })
            .collect();

        if !due.is_empty() {
            log_debug!("Sweep picked up {} unchecked card(s)", due.len());
        }
        due.into_iter().filter_map(|card| self.inspect(card)).collect()
    }

    fn on_settings_changed(&mut self, notice: SettingsNotice) {
        if notice.area != self.config.settings_area {
            log_debug!("Ignoring settings change in {} storage", notice.area);
            return;
        }
        if !self.settings.apply_changes(&notice.changes) {
            return;
        }
        let cleared = self.marks.reset_epoch();
        log_info!(
            "Settings updated ({}); epoch {} begins, {cleared} card(s) will be re-checked",
            self.settings,
            self.marks.epoch()
        );
    }

    /// Classify `card` unless it was already classified this epoch.
    fn inspect(&mut self, card: CardId) -> Option<Effect> {
        if !self.marks.begin_check(card) {
            return None;
        }

        let verdict = classify(&self.doc, card, &self.settings);
        if !verdict.is_blocked() {
            log_info!("Video status: allowed ({card})");
            return None;
        }

        self.marks.mark_blocked(card);
        log_info!(
            "Video status: {} → skipping ({card})",
            verdict.label().to_uppercase()
        );
        Some(Effect::ScheduleAdvance {
            card,
            delay: self.config.advance_delay,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::sim::{ScrollAction, SimCard, SimulatedFeed};
    use crate::settings::{StorageArea, StorageChange, StorageChanges, LIVE_KEY};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn session(feed: &SimulatedFeed, settings: Settings) -> WatchSession<SimulatedFeed> {
        WatchSession::new(feed.clone(), settings, WatchConfig::default())
    }

    fn seen(card: CardId, ratio: f64) -> WatchEvent {
        WatchEvent::Intersection {
            card,
            ratio,
            intersecting: ratio > 0.0,
        }
    }

    fn live_toggle(area: StorageArea, on: bool) -> WatchEvent {
        let mut changes = StorageChanges::new();
        changes.insert(
            LIVE_KEY.into(),
            StorageChange {
                old_value: Some(json!(!on)),
                new_value: Some(json!(on)),
            },
        );
        WatchEvent::SettingsChanged(SettingsNotice { changes, area })
    }

    fn skip(card: CardId) -> Effect {
        Effect::ScheduleAdvance {
            card,
            delay: WatchConfig::default().advance_delay,
        }
    }

    #[test]
    fn start_observes_existing_cards_once() {
        let feed = SimulatedFeed::new(800.0);
        let a = feed.push(SimCard::video("a"));
        feed.push(SimCard::plain("nav"));
        let b = feed.push(SimCard::video("b"));

        let mut s = session(&feed, Settings::default());
        assert_eq!(s.start(), vec![Effect::Observe(a), Effect::Observe(b)]);
        assert!(s.start().is_empty());
    }

    #[test]
    fn sponsored_card_in_view_schedules_skip() {
        let feed = SimulatedFeed::new(800.0);
        let ad = feed.push(SimCard::video("Sponsored · Buy now"));
        let mut s = session(&feed, Settings::default());

        assert_eq!(s.handle(seen(ad, 0.9)), vec![skip(ad)]);
        assert!(s.marks().get(ad).blocked);
        // Second sighting in the same epoch is ignored.
        assert!(s.handle(seen(ad, 1.0)).is_empty());
    }

    #[test]
    fn low_ratio_does_not_classify() {
        let feed = SimulatedFeed::new(800.0);
        let ad = feed.push(SimCard::video("promoted"));
        let mut s = session(&feed, Settings::default());

        assert!(s.handle(seen(ad, 0.3)).is_empty());
        assert!(!s.marks().is_checked(ad));
        assert!(s
            .handle(WatchEvent::Intersection {
                card: ad,
                ratio: 0.7,
                intersecting: false,
            })
            .is_empty());
    }

    #[test]
    fn insertion_registers_without_classifying() {
        let feed = SimulatedFeed::new(800.0);
        let mut s = session(&feed, Settings::default());

        let inserted = feed.append(SimCard::video("promoted"));
        let card = inserted[0].card;
        assert_eq!(
            s.handle(WatchEvent::Inserted(inserted.clone())),
            vec![Effect::Observe(card)]
        );
        assert!(s.is_observed(card));
        assert!(!s.marks().is_checked(card));
        assert!(s.handle(WatchEvent::Inserted(inserted)).is_empty());
    }

    #[test]
    fn sweep_only_touches_near_viewport_band() {
        let feed = SimulatedFeed::new(1000.0);
        let first = feed.push(SimCard::video("promoted"));
        let second = feed.push(SimCard::video("promoted"));
        let mut s = session(&feed, Settings::default());

        // first spans 0..1000, second 1000..2000: only first is in the band.
        assert_eq!(s.handle(WatchEvent::Sweep), vec![skip(first)]);
        assert!(!s.marks().is_checked(second));

        // Scrolled so second's top sits at 790 (< 800): now it qualifies.
        feed.scroll_to(210.0);
        assert_eq!(s.handle(WatchEvent::Sweep), vec![skip(second)]);
    }

    #[test]
    fn sweep_skips_cards_scrolled_past() {
        let feed = SimulatedFeed::new(1000.0);
        let first = feed.push(SimCard::video("promoted"));
        feed.push(SimCard::video("fine"));
        feed.scroll_to(1000.0);

        let mut s = session(&feed, Settings::default());
        s.handle(WatchEvent::Sweep);
        assert!(!s.marks().is_checked(first));
    }

    #[test]
    fn settings_change_reopens_checked_cards() {
        let feed = SimulatedFeed::new(800.0);
        let stream = feed.push(SimCard::video("cooking stream").with_live_badge());
        let mut s = session(&feed, Settings::default());

        assert!(s.handle(seen(stream, 1.0)).is_empty());
        assert!(s.marks().is_checked(stream));

        assert!(s.handle(live_toggle(StorageArea::Sync, true)).is_empty());
        assert!(s.settings().live_enabled);
        assert!(!s.marks().is_checked(stream));
        assert_eq!(s.marks().epoch(), 1);

        assert_eq!(s.handle(WatchEvent::Sweep), vec![skip(stream)]);
    }

    #[test]
    fn other_storage_area_is_ignored() {
        let feed = SimulatedFeed::new(800.0);
        let card = feed.push(SimCard::video("hello"));
        let mut s = session(&feed, Settings::default());
        s.handle(seen(card, 1.0));

        s.handle(live_toggle(StorageArea::Local, true));
        assert!(!s.settings().live_enabled);
        assert!(s.marks().is_checked(card));
        assert_eq!(s.marks().epoch(), 0);
    }

    #[test]
    fn advance_due_scrolls_to_next_card() {
        let feed = SimulatedFeed::new(800.0);
        let ad = feed.push(SimCard::video("promoted"));
        let next = feed.push(SimCard::video("cat video"));
        let mut s = session(&feed, Settings::default());

        s.handle(seen(ad, 1.0));
        s.handle(WatchEvent::AdvanceDue(ad));
        assert_eq!(feed.scrolls(), vec![ScrollAction::IntoView(next)]);
    }

    #[test]
    fn edited_card_waits_for_next_epoch() {
        let feed = SimulatedFeed::new(800.0);
        let card = feed.push(SimCard::video("morning routine"));
        let mut s = session(&feed, Settings::default());
        assert!(s.handle(seen(card, 1.0)).is_empty());

        feed.set_text(card, "morning routine · Sponsored");
        assert!(s.handle(seen(card, 1.0)).is_empty());
        assert!(s.handle(WatchEvent::Sweep).is_empty());

        s.handle(live_toggle(StorageArea::Sync, true));
        assert_eq!(s.handle(seen(card, 1.0)), vec![skip(card)]);
    }

    #[test]
    fn epoch_reset_keeps_blocked_history() {
        let feed = SimulatedFeed::new(800.0);
        let ad = feed.push(SimCard::video("promoted"));
        let mut s = session(&feed, Settings::default());
        s.handle(seen(ad, 1.0));

        s.handle(live_toggle(StorageArea::Sync, true));
        assert!(s.marks().get(ad).blocked);
        assert!(!s.marks().get(ad).checked);
    }
}
