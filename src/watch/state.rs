use std::collections::HashMap;

use crate::feed::CardId;

/// Out-of-band annotations for one card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardMark {
    /// Classified during the current epoch.
    pub checked: bool,
    /// Classified as sponsored/live at some point and skipped. Survives
    /// epoch resets.
    pub blocked: bool,
}

/// Side table of [`CardMark`]s keyed by card identity.
#[derive(Debug, Default)]
pub struct CardMarks {
    marks: HashMap<CardId, CardMark>,
    epoch: u64,
}

impl CardMarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn get(&self, card: CardId) -> CardMark {
        self.marks.get(&card).copied().unwrap_or_default()
    }

    pub fn is_checked(&self, card: CardId) -> bool {
        self.get(card).checked
    }

    /// Claim `card` for classification in this epoch.
    ///
    /// Returns false when it was already claimed; the caller must not
    /// classify it again.
    pub fn begin_check(&mut self, card: CardId) -> bool {
        let mark = self.marks.entry(card).or_default();
        if mark.checked {
            return false;
        }
        mark.checked = true;
        true
    }

    pub fn mark_blocked(&mut self, card: CardId) {
        self.marks.entry(card).or_default().blocked = true;
    }

    /// Start a new epoch: every card becomes checkable again. Returns how many
    /// cards had been checked.
    pub fn reset_epoch(&mut self) -> usize {
        self.epoch += 1;
        let mut cleared = 0;
        for mark in self.marks.values_mut() {
            if mark.checked {
                mark.checked = false;
                cleared += 1;
            }
        }
        cleared
    }

    pub fn checked_count(&self) -> usize {
        self.marks.values().filter(|m| m.checked).count()
    }

    pub fn blocked_count(&self) -> usize {
        self.marks.values().filter(|m| m.blocked).count()
    }
}
