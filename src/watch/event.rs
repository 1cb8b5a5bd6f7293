use std::time::Duration;

use crate::feed::CardId;
use crate::settings::SettingsNotice;

/// A card found under a freshly inserted DOM subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedCard {
    pub card: CardId,
    /// Found below the inserted node rather than being the node itself.
    pub nested: bool,
}

/// Everything the session reacts to. Hosts translate observer callbacks,
/// timers and storage notifications into these.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Intersection {
        card: CardId,
        ratio: f64,
        intersecting: bool,
    },
    Inserted(Vec<InsertedCard>),
    Sweep,
    SettingsChanged(SettingsNotice),
    /// A scheduled skip has come due.
    AdvanceDue(CardId),
}

/// Work the host performs on the session's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Start reporting intersections for this card.
    Observe(CardId),
    /// Deliver [`WatchEvent::AdvanceDue`] after `delay`. Fire-and-forget.
    ScheduleAdvance { card: CardId, delay: Duration },
}
