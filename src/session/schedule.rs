/// Deferred session actions, fired by tick and guarded by generation.
///
/// The engine's fixed delays (evict a wrong tile, clear feedback, advance
/// after celebration) are entries here rather than ad-hoc timers. Every
/// entry records the session generation it was scheduled under; reloading
/// a word bumps the generation, so an entry from a previous word is
/// silently discarded instead of firing into state it no longer matches.

use crate::domain::tile::TileId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Bounce a mis-seated tile back to the pool. Carries the tile id so a
    /// slot refilled in the meantime is left alone.
    EvictIncorrect { slot: usize, tile: TileId },
    /// End the incorrect-feedback display window.
    ClearFeedback,
    /// Leave celebration and move to the next word (or finish).
    Advance,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    due: u64,
    generation: u64,
    action: Action,
}

#[derive(Debug, Default)]
pub struct Schedule {
    entries: Vec<Entry>,
}

impl Schedule {
    pub fn new() -> Self {
        Schedule { entries: Vec::new() }
    }

    pub fn at(&mut self, due: u64, generation: u64, action: Action) {
        self.entries.push(Entry { due, generation, action });
    }

    /// Remove every entry that is due at `now` and return the ones whose
    /// generation still matches, in due order. Stale entries are dropped.
    pub fn fire(&mut self, now: u64, generation: u64) -> Vec<Action> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due <= now {
                due.push(*e);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| e.due);
        due.into_iter()
            .filter(|e| e.generation == generation)
            .map(|e| e.action)
            .collect()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
