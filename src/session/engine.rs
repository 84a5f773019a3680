/// The puzzle session state machine.
///
/// Single authority for tile placement, correctness evaluation,
/// word-advance sequencing, and score computation. Commands go in,
/// events come out; the presentation layer renders the state it reads
/// back and plays sounds for the events.
///
/// ## Ownership invariant
/// Every tile of the active word lives in exactly one of {pool, one slot}.
/// All moves between the two happen inside this module.
///
/// ## Pacing
/// The engine is tick-driven. The three fixed delays (wrong-tile evict,
/// incorrect-feedback window, celebration → advance) are `Schedule`
/// entries keyed by the session generation; `load_word` bumps the
/// generation so anything scheduled for a previous word is dropped, never
/// fired into state it no longer matches.
///
/// ## Celebration lock
/// While `celebrating` is true every inbound command is a no-op. The lock
/// bridges word completion and the advance to the next word, and in
/// challenge mode it is terminal: the session accepts no further input
/// after the last word until the shell tears it down.

use crate::config::TimingConfig;
use crate::domain::score::challenge_score;
use crate::domain::shuffle::{shuffled, Rng};
use crate::domain::tile::{Tile, TileId};
use crate::domain::word::{Word, WordCatalog};

use super::event::SessionEvent;
use super::schedule::{Action, Schedule};
use super::timer::ModeTimer;

pub const MSG_SLOT_TAKEN: &str = "这个位置已经被占用了！";
pub const MSG_PICK_FIRST: &str = "请先选择一个汉字拼图块！";
pub const MSG_ALL_DONE: &str = "恭喜你完成所有汉字拼图！为你重新开始！";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Practice,
    Challenge,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Feedback {
    Correct,
    Incorrect,
}

/// Inbound commands. Two interaction styles converge here: pick-then-place
/// (`SelectTile` + `PlaceAt`) and grab-and-carry (`BeginDrag` + `DropAt`).
/// Both resolve to the same internal placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    SelectTile(TileId),
    PlaceAt(usize),
    EvictAt(usize),
    ResetCurrentWord,
    JumpToWord(usize),
    BeginDrag(TileId),
    DropAt(Option<usize>),
}

pub struct PuzzleSession {
    catalog: WordCatalog,
    mode: Mode,
    timing: TimingConfig,

    active_word: usize,
    pool: Vec<Tile>,
    slots: Vec<Option<Tile>>,
    /// Pending payload for both interaction styles (a click-selection and a
    /// drag payload are the same thing to the engine).
    selection: Option<TileId>,
    feedback: Option<Feedback>,
    celebrating: bool,
    /// Challenge terminal state: the last word is done and the score has
    /// been reported. `celebrating` stays true alongside.
    finished: bool,

    message: String,
    message_timer: u32,

    tick: u64,
    generation: u64,
    next_tile_id: u32,
    timer: ModeTimer,
    schedule: Schedule,
    rng: Rng,
}

// ── Construction ──

impl PuzzleSession {
    /// Start a session on word 0. The catalog is already validated by
    /// `WordCatalog::new`; an empty one cannot reach this point.
    pub fn new(catalog: WordCatalog, mode: Mode, timing: TimingConfig, seed: u64) -> Self {
        let tps = timing.ticks_per_second();
        let timer = match mode {
            Mode::Challenge => ModeTimer::running(tps),
            Mode::Practice => ModeTimer::stopped(tps),
        };
        let mut session = PuzzleSession {
            catalog,
            mode,
            timing,
            active_word: 0,
            pool: Vec::new(),
            slots: Vec::new(),
            selection: None,
            feedback: None,
            celebrating: false,
            finished: false,
            message: String::new(),
            message_timer: 0,
            tick: 0,
            generation: 0,
            next_tile_id: 0,
            timer,
            schedule: Schedule::new(),
            rng: Rng::new(seed),
        };
        session.load_word(0);
        session
    }
}

// ── Read access for the presentation layer ──

impl PuzzleSession {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn word(&self) -> &Word {
        self.catalog.word(self.active_word)
    }

    pub fn active_word(&self) -> usize {
        self.active_word
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    pub fn pool(&self) -> &[Tile] {
        &self.pool
    }

    pub fn slots(&self) -> &[Option<Tile>] {
        &self.slots
    }

    pub fn selection(&self) -> Option<TileId> {
        self.selection
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn celebrating(&self) -> bool {
        self.celebrating
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }
}

// ── Command surface ──

impl PuzzleSession {
    /// Apply one command. While celebrating (including the challenge
    /// terminal state) every command is a no-op.
    pub fn apply(&mut self, cmd: Command) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.celebrating {
            return events;
        }
        match cmd {
            Command::SelectTile(id) => self.select_tile(id),
            Command::PlaceAt(slot) => self.place_at(slot, &mut events),
            Command::EvictAt(slot) => self.evict_at(slot),
            Command::ResetCurrentWord => self.load_word(self.active_word),
            Command::JumpToWord(index) => self.jump_to_word(index),
            Command::BeginDrag(id) => self.begin_drag(id),
            Command::DropAt(slot) => self.drop_at(slot, &mut events),
        }
        events
    }

    /// Advance the session clock by one tick: timer, message auto-dismiss,
    /// and any due scheduled actions.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.tick += 1;
        self.timer.tick();

        if self.message_timer > 0 {
            self.message_timer -= 1;
            if self.message_timer == 0 {
                self.message.clear();
            }
        }

        for action in self.schedule.fire(self.tick, self.generation) {
            match action {
                Action::EvictIncorrect { slot, tile } => self.evict_incorrect(slot, tile),
                Action::ClearFeedback => {
                    if self.feedback == Some(Feedback::Incorrect) {
                        self.feedback = None;
                    }
                }
                Action::Advance => self.advance_word(&mut events),
            }
        }
        events
    }
}

// ── Interaction adapters ──

impl PuzzleSession {
    /// Pick-then-place: first tap on a pool tile holds it. Re-tapping the
    /// held tile lets it go; tapping a different pool tile takes it instead.
    fn select_tile(&mut self, id: TileId) {
        assert!(self.in_pool(id), "selected tile is not in the pool");
        if self.selection == Some(id) {
            self.selection = None;
        } else {
            self.selection = Some(id);
        }
    }

    fn place_at(&mut self, slot: usize, events: &mut Vec<SessionEvent>) {
        assert!(slot < self.slots.len(), "slot index out of range");
        match self.selection {
            Some(id) => {
                if self.slots[slot].is_some() {
                    // Still holding the tile: the player can retry elsewhere.
                    self.notice(MSG_SLOT_TAKEN, events);
                } else {
                    self.selection = None;
                    self.place(id, slot, events);
                }
            }
            None => {
                if self.slots[slot].is_some() {
                    self.evict(slot);
                } else {
                    self.notice(MSG_PICK_FIRST, events);
                }
            }
        }
    }

    fn evict_at(&mut self, slot: usize) {
        assert!(slot < self.slots.len(), "slot index out of range");
        if self.slots[slot].is_some() {
            self.evict(slot);
        }
    }

    /// Grab-and-carry: designate the payload. The tile stays in the pool
    /// until a drop actually seats it.
    fn begin_drag(&mut self, id: TileId) {
        assert!(self.in_pool(id), "dragged tile is not in the pool");
        self.selection = Some(id);
    }

    fn drop_at(&mut self, slot: Option<usize>, events: &mut Vec<SessionEvent>) {
        let Some(id) = self.selection.take() else {
            // Drop without a grab: spurious, ignore.
            return;
        };
        match slot {
            Some(slot) => {
                assert!(slot < self.slots.len(), "slot index out of range");
                if self.slots[slot].is_some() {
                    // The payload never left the pool; letting go is enough.
                    self.notice(MSG_SLOT_TAKEN, events);
                } else {
                    self.place(id, slot, events);
                }
            }
            None => {}
        }
    }

    fn jump_to_word(&mut self, index: usize) {
        assert!(index < self.catalog.len(), "word index out of range");
        // In-progress placements are discarded silently; the sidebar makes
        // the old word one jump away.
        self.active_word = index;
        self.load_word(index);
    }
}

// ── Placement core ──

impl PuzzleSession {
    fn in_pool(&self, id: TileId) -> bool {
        self.pool.iter().any(|t| t.id == id)
    }

    /// Seat a pool tile into an empty slot. Preconditions are caller bugs,
    /// not user mistakes — the adapters above filter those out first.
    fn place(&mut self, id: TileId, slot: usize, events: &mut Vec<SessionEvent>) {
        assert!(self.slots[slot].is_none(), "place into an occupied slot");
        let idx = self
            .pool
            .iter()
            .position(|t| t.id == id)
            .expect("placed tile is not in the pool");
        let tile = self.pool.remove(idx);
        let correct = tile.glyph == self.word().glyphs[slot];
        let tile_id = tile.id;
        // Optimistic placement: the tile is visibly seated before (and
        // regardless of) the correctness outcome.
        self.slots[slot] = Some(tile);

        if correct {
            events.push(SessionEvent::PlacementSuccess);
        } else {
            events.push(SessionEvent::PlacementError);
            self.schedule.at(
                self.tick + self.timing.evict_delay_ticks,
                self.generation,
                Action::EvictIncorrect { slot, tile: tile_id },
            );
        }
        self.check_completion(events);
    }

    fn evict(&mut self, slot: usize) {
        if let Some(tile) = self.slots[slot].take() {
            self.pool.push(tile);
        }
        self.selection = None;
    }

    /// Scheduled bounce-back of a mis-seated tile. Only fires if that very
    /// tile is still seated; the player may have corrected it by hand in
    /// the meantime.
    fn evict_incorrect(&mut self, slot: usize, id: TileId) {
        let still_seated = matches!(&self.slots[slot], Some(t) if t.id == id);
        if !still_seated {
            return;
        }
        if let Some(tile) = self.slots[slot].take() {
            self.pool.push(tile);
        }
        self.feedback = Some(Feedback::Incorrect);
        self.schedule.at(
            self.tick + self.timing.feedback_ticks,
            self.generation,
            Action::ClearFeedback,
        );
    }

    /// A word is complete iff every slot holds the glyph the word expects
    /// there. All-filled is not enough: a mis-seated tile awaiting its
    /// evict must not trigger a celebration.
    fn check_completion(&mut self, events: &mut Vec<SessionEvent>) {
        if self.celebrating {
            return;
        }
        if self.slots.iter().any(|s| s.is_none()) {
            return;
        }
        let glyphs = &self.catalog.word(self.active_word).glyphs;
        let matched = self
            .slots
            .iter()
            .zip(glyphs.iter())
            .all(|(seated, want)| matches!(seated, Some(t) if t.glyph == *want));
        if !matched {
            return;
        }

        self.celebrating = true;
        self.feedback = Some(Feedback::Correct);
        events.push(SessionEvent::WordCelebration);
        self.schedule.at(
            self.tick + self.timing.celebrate_ticks,
            self.generation,
            Action::Advance,
        );
    }
}

// ── Word advance sequencing ──

impl PuzzleSession {
    /// Second phase of the celebration: leave the lock and move on.
    fn advance_word(&mut self, events: &mut Vec<SessionEvent>) {
        self.feedback = None;

        if self.active_word + 1 < self.catalog.len() {
            self.active_word += 1;
            self.load_word(self.active_word);
            self.celebrating = false;
        } else if self.mode == Mode::Practice {
            // Lap complete: loop back to the first word.
            self.notice(MSG_ALL_DONE, events);
            self.active_word = 0;
            self.load_word(0);
            self.celebrating = false;
        } else {
            // Challenge over. Terminal: celebrating stays set so no
            // further input lands; the shell reads the event and leaves.
            self.timer.stop();
            let elapsed = self.timer.elapsed_seconds();
            events.push(SessionEvent::ChallengeComplete {
                score: challenge_score(self.catalog.len(), elapsed),
                elapsed_seconds: elapsed,
            });
            self.finished = true;
        }
    }

    /// (Re)seat the word at `index`: fresh tiles, shuffled pool, empty
    /// slots. Bumps the generation, cancelling everything scheduled for
    /// the previous word.
    fn load_word(&mut self, index: usize) {
        assert!(index < self.catalog.len(), "word index out of range");
        self.generation += 1;

        let glyphs = self.catalog.word(index).glyphs.clone();
        let tiles: Vec<Tile> = glyphs
            .iter()
            .enumerate()
            .map(|(home, &glyph)| {
                let id = TileId(self.next_tile_id);
                self.next_tile_id += 1;
                Tile::new(id, glyph, home)
            })
            .collect();

        self.pool = shuffled(&tiles, &mut self.rng);
        self.slots = vec![None; glyphs.len()];
        self.selection = None;
        self.feedback = None;
        self.celebrating = false;
    }

    fn notice(&mut self, text: &str, events: &mut Vec<SessionEvent>) {
        self.message = text.to_string();
        self.message_timer = self.timing.notice_ticks;
        events.push(SessionEvent::Notice {
            text: text.to_string(),
        });
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingConfig {
        // Tiny tick counts keep the tests short; ratios match the real ones.
        TimingConfig {
            tick_rate_ms: 50,
            evict_delay_ticks: 2,
            feedback_ticks: 3,
            celebrate_ticks: 4,
            notice_ticks: 5,
        }
    }

    fn catalog(words: &[(&str, &str, &str)]) -> WordCatalog {
        WordCatalog::new(
            words
                .iter()
                .map(|(id, text, pinyin)| Word::new(id, text, pinyin))
                .collect(),
        )
        .unwrap()
    }

    fn two_word_catalog() -> WordCatalog {
        catalog(&[
            ("mujin", "木槿", "mù jǐn"),
            ("xiangrikui", "向日葵", "xiàng rì kuí"),
        ])
    }

    fn session(mode: Mode) -> PuzzleSession {
        PuzzleSession::new(two_word_catalog(), mode, timing(), 7)
    }

    fn pool_tile(s: &PuzzleSession, glyph: char) -> TileId {
        s.pool()
            .iter()
            .find(|t| t.glyph == glyph)
            .map(|t| t.id)
            .expect("glyph not in pool")
    }

    fn run_ticks(s: &mut PuzzleSession, n: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(s.tick());
        }
        events
    }

    /// Sorted tile ids across pool and slots; the ownership invariant says
    /// this is always the exact tile set, no dups, no omissions.
    fn all_tile_ids(s: &PuzzleSession) -> Vec<u32> {
        let mut ids: Vec<u32> = s.pool().iter().map(|t| t.id.0).collect();
        ids.extend(s.slots().iter().flatten().map(|t| t.id.0));
        ids.sort_unstable();
        ids
    }

    fn state_fingerprint(
        s: &PuzzleSession,
    ) -> (Vec<u32>, Vec<Option<u32>>, Option<TileId>, usize, bool) {
        (
            s.pool().iter().map(|t| t.id.0).collect(),
            s.slots().iter().map(|o| o.as_ref().map(|t| t.id.0)).collect(),
            s.selection(),
            s.active_word(),
            s.celebrating(),
        )
    }

    /// Complete the active word by seating every pool tile in its home slot.
    fn solve_current_word(s: &mut PuzzleSession) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(tile) = s.pool().first().copied() {
            events.extend(s.apply(Command::SelectTile(tile.id)));
            events.extend(s.apply(Command::PlaceAt(tile.home_index)));
        }
        events
    }

    // ── Loading ──

    #[test]
    fn load_fills_pool_and_empties_slots() {
        let s = session(Mode::Practice);
        assert_eq!(s.pool().len(), 2);
        assert!(s.slots().iter().all(|o| o.is_none()));
        assert_eq!(s.slots().len(), 2);
        assert_eq!(all_tile_ids(&s).len(), 2);
        assert!(s.selection().is_none());
        assert!(!s.celebrating());
    }

    // ── Placement ──

    #[test]
    fn correct_placement_stays_seated() {
        let mut s = session(Mode::Practice);
        let id = pool_tile(&s, '木');
        s.apply(Command::SelectTile(id));
        let events = s.apply(Command::PlaceAt(0));
        assert_eq!(events, vec![SessionEvent::PlacementSuccess]);
        assert_eq!(s.slots()[0].map(|t| t.glyph), Some('木'));
        assert_eq!(s.pool().len(), 1);
        // No eviction ever fires for a correct tile.
        run_ticks(&mut s, 10);
        assert_eq!(s.slots()[0].map(|t| t.glyph), Some('木'));
    }

    #[test]
    fn incorrect_placement_bounces_back_after_delay() {
        let mut s = session(Mode::Practice);
        let id = pool_tile(&s, '槿');
        s.apply(Command::SelectTile(id));
        let events = s.apply(Command::PlaceAt(0));
        assert_eq!(events, vec![SessionEvent::PlacementError]);
        // Optimistically seated first — the player sees the wrong glyph.
        assert_eq!(s.slots()[0].map(|t| t.glyph), Some('槿'));
        assert!(s.feedback().is_none());

        run_ticks(&mut s, 2); // evict delay
        assert!(s.slots()[0].is_none());
        assert!(s.pool().iter().any(|t| t.id == id));
        assert_eq!(s.feedback(), Some(Feedback::Incorrect));

        run_ticks(&mut s, 3); // feedback window
        assert!(s.feedback().is_none());
        assert_eq!(all_tile_ids(&s).len(), 2);
    }

    #[test]
    fn all_filled_with_mismatch_does_not_complete() {
        let mut s = session(Mode::Practice);
        // Both tiles into the wrong slots: all slots filled, zero matches.
        let jin = pool_tile(&s, '槿');
        s.apply(Command::SelectTile(jin));
        s.apply(Command::PlaceAt(0));
        let mu = pool_tile(&s, '木');
        s.apply(Command::SelectTile(mu));
        let events = s.apply(Command::PlaceAt(1));
        assert_eq!(events, vec![SessionEvent::PlacementError]);
        assert!(!s.celebrating());

        // Both bounce back; still on the same word.
        run_ticks(&mut s, 2);
        assert_eq!(s.pool().len(), 2);
        assert_eq!(s.active_word(), 0);
    }

    #[test]
    fn completion_celebrates_then_advances() {
        let mut s = session(Mode::Practice);
        let events = solve_current_word(&mut s);
        assert!(events.contains(&SessionEvent::WordCelebration));
        assert!(s.celebrating());
        assert_eq!(s.feedback(), Some(Feedback::Correct));
        assert_eq!(s.active_word(), 0); // phase one: acknowledgment, no advance yet

        run_ticks(&mut s, 4); // celebrate delay
        assert_eq!(s.active_word(), 1);
        assert!(!s.celebrating());
        assert!(s.feedback().is_none());
        assert_eq!(s.pool().len(), 3); // 向日葵 freshly shuffled
        assert!(s.slots().iter().all(|o| o.is_none()));
    }

    #[test]
    fn celebrating_locks_every_command() {
        let mut s = session(Mode::Practice);
        solve_current_word(&mut s);
        assert!(s.celebrating());
        let before = state_fingerprint(&s);

        // Tile/slot ids below are valid-shaped but must all be ignored.
        for cmd in [
            Command::SelectTile(TileId(0)),
            Command::BeginDrag(TileId(0)),
            Command::PlaceAt(0),
            Command::EvictAt(0),
            Command::ResetCurrentWord,
            Command::JumpToWord(1),
            Command::DropAt(Some(0)),
            Command::DropAt(None),
        ] {
            assert!(s.apply(cmd).is_empty());
            assert_eq!(state_fingerprint(&s), before);
        }
    }

    #[test]
    fn jump_ignored_while_celebrating_then_advance_wins() {
        let mut s = PuzzleSession::new(
            catalog(&[
                ("mujin", "木槿", "mù jǐn"),
                ("xiangrikui", "向日葵", "xiàng rì kuí"),
                ("yushushu", "玉蜀黍", "yù shǔ shǔ"),
            ]),
            Mode::Practice,
            timing(),
            7,
        );
        solve_current_word(&mut s);
        s.apply(Command::JumpToWord(2)); // rejected: celebrating
        run_ticks(&mut s, 4);
        assert_eq!(s.active_word(), 1); // natural advance, not the jump
    }

    // ── Selection protocol ──

    #[test]
    fn selecting_another_tile_replaces_retap_deselects() {
        let mut s = session(Mode::Practice);
        let mu = pool_tile(&s, '木');
        let jin = pool_tile(&s, '槿');
        s.apply(Command::SelectTile(mu));
        assert_eq!(s.selection(), Some(mu));
        s.apply(Command::SelectTile(jin));
        assert_eq!(s.selection(), Some(jin));
        s.apply(Command::SelectTile(jin));
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn occupied_slot_with_selection_keeps_both() {
        let mut s = session(Mode::Practice);
        let mu = pool_tile(&s, '木');
        s.apply(Command::SelectTile(mu));
        s.apply(Command::PlaceAt(0));

        let jin = pool_tile(&s, '槿');
        s.apply(Command::SelectTile(jin));
        let events = s.apply(Command::PlaceAt(0));
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Notice { text }] if text == MSG_SLOT_TAKEN
        ));
        // Selection and pool unchanged: the player just aims elsewhere.
        assert_eq!(s.selection(), Some(jin));
        assert!(s.pool().iter().any(|t| t.id == jin));
        assert_eq!(s.slots()[0].map(|t| t.glyph), Some('木'));
        assert_eq!(s.message(), MSG_SLOT_TAKEN);
    }

    #[test]
    fn empty_slot_without_selection_asks_to_pick() {
        let mut s = session(Mode::Practice);
        let events = s.apply(Command::PlaceAt(0));
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Notice { text }] if text == MSG_PICK_FIRST
        ));
        assert!(s.slots()[0].is_none());
    }

    #[test]
    fn tapping_occupied_slot_evicts_for_correction() {
        let mut s = session(Mode::Practice);
        let mu = pool_tile(&s, '木');
        s.apply(Command::SelectTile(mu));
        s.apply(Command::PlaceAt(0));
        assert_eq!(s.pool().len(), 1);

        // No selection pending: tapping the seated tile takes it back.
        let events = s.apply(Command::PlaceAt(0));
        assert!(events.is_empty());
        assert!(s.slots()[0].is_none());
        assert_eq!(s.pool().len(), 2);
        assert!(s.selection().is_none());
    }

    #[test]
    fn evict_at_on_empty_slot_is_noop() {
        let mut s = session(Mode::Practice);
        let before = state_fingerprint(&s);
        assert!(s.apply(Command::EvictAt(1)).is_empty());
        assert_eq!(state_fingerprint(&s), before);
    }

    // ── Drag protocol ──

    #[test]
    fn drag_and_click_produce_identical_state() {
        let mut click = session(Mode::Practice);
        let mut drag = session(Mode::Practice);
        // Same seed → same shuffle → same tile ids.
        let mu = pool_tile(&click, '木');

        click.apply(Command::SelectTile(mu));
        click.apply(Command::PlaceAt(0));

        drag.apply(Command::BeginDrag(mu));
        drag.apply(Command::DropAt(Some(0)));

        assert_eq!(state_fingerprint(&click), state_fingerprint(&drag));
    }

    #[test]
    fn drop_outside_returns_tile_to_pool() {
        let mut s = session(Mode::Practice);
        let mu = pool_tile(&s, '木');
        s.apply(Command::BeginDrag(mu));
        assert_eq!(s.selection(), Some(mu));
        let events = s.apply(Command::DropAt(None));
        assert!(events.is_empty());
        assert!(s.selection().is_none());
        assert_eq!(s.pool().len(), 2);
    }

    #[test]
    fn drop_on_occupied_slot_releases_payload() {
        let mut s = session(Mode::Practice);
        let mu = pool_tile(&s, '木');
        s.apply(Command::SelectTile(mu));
        s.apply(Command::PlaceAt(0));

        let jin = pool_tile(&s, '槿');
        s.apply(Command::BeginDrag(jin));
        let events = s.apply(Command::DropAt(Some(0)));
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Notice { text }] if text == MSG_SLOT_TAKEN
        ));
        // Unlike a click-selection, a drop ends the carry either way.
        assert!(s.selection().is_none());
        assert!(s.pool().iter().any(|t| t.id == jin));
    }

    #[test]
    fn drop_without_grab_is_noop() {
        let mut s = session(Mode::Practice);
        let before = state_fingerprint(&s);
        assert!(s.apply(Command::DropAt(Some(0))).is_empty());
        assert_eq!(state_fingerprint(&s), before);
    }

    // ── Reset / jump ──

    #[test]
    fn reset_is_idempotent_up_to_shuffle() {
        let mut s = session(Mode::Practice);
        let mu = pool_tile(&s, '木');
        s.apply(Command::SelectTile(mu));
        s.apply(Command::PlaceAt(0));

        s.apply(Command::ResetCurrentWord);
        let after_one = (s.active_word(), s.pool().len(), all_tile_ids(&s).len());
        assert_eq!(after_one, (0, 2, 2));
        assert!(s.slots().iter().all(|o| o.is_none()));

        s.apply(Command::ResetCurrentWord);
        assert_eq!(s.active_word(), 0);
        assert_eq!(s.pool().len(), 2);
        assert!(s.slots().iter().all(|o| o.is_none()));
    }

    #[test]
    fn reset_cancels_pending_evict() {
        let mut s = session(Mode::Practice);
        let jin = pool_tile(&s, '槿');
        s.apply(Command::SelectTile(jin));
        s.apply(Command::PlaceAt(0)); // schedules an evict

        s.apply(Command::ResetCurrentWord);
        // The stale evict must not fire into the fresh word.
        run_ticks(&mut s, 10);
        assert_eq!(s.pool().len(), 2);
        assert!(s.slots().iter().all(|o| o.is_none()));
        assert!(s.feedback().is_none());
    }

    #[test]
    fn jump_discards_in_progress_placements() {
        let mut s = session(Mode::Practice);
        let mu = pool_tile(&s, '木');
        s.apply(Command::SelectTile(mu));
        s.apply(Command::PlaceAt(0));

        s.apply(Command::JumpToWord(1));
        assert_eq!(s.active_word(), 1);
        assert_eq!(s.pool().len(), 3);
        assert!(s.slots().iter().all(|o| o.is_none()));
        assert!(s.selection().is_none());
    }

    #[test]
    #[should_panic(expected = "word index out of range")]
    fn jump_out_of_range_panics() {
        let mut s = session(Mode::Practice);
        s.apply(Command::JumpToWord(99));
    }

    #[test]
    #[should_panic(expected = "not in the pool")]
    fn selecting_a_seated_tile_panics() {
        let mut s = session(Mode::Practice);
        let mu = pool_tile(&s, '木');
        s.apply(Command::SelectTile(mu));
        s.apply(Command::PlaceAt(0));
        s.apply(Command::SelectTile(mu));
    }

    // ── Manual correction racing the scheduled evict ──

    #[test]
    fn refilled_slot_survives_stale_evict() {
        let mut s = session(Mode::Practice);
        let jin = pool_tile(&s, '槿');
        s.apply(Command::SelectTile(jin));
        s.apply(Command::PlaceAt(0)); // wrong; evict due in 2 ticks

        // Player corrects by hand before the bounce fires.
        s.apply(Command::PlaceAt(0)); // evict 槿 back
        let mu = pool_tile(&s, '木');
        s.apply(Command::SelectTile(mu));
        s.apply(Command::PlaceAt(0)); // correct tile now seated

        run_ticks(&mut s, 3);
        // The stale evict saw a different tile and left it alone.
        assert_eq!(s.slots()[0].map(|t| t.glyph), Some('木'));
    }

    // ── Practice wraparound ──

    #[test]
    fn practice_single_word_catalog_loops() {
        let mut s = PuzzleSession::new(
            catalog(&[("mujin", "木槿", "mù jǐn")]),
            Mode::Practice,
            timing(),
            7,
        );
        solve_current_word(&mut s);
        assert!(s.celebrating());

        let events = run_ticks(&mut s, 4);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Notice { text }] if text == MSG_ALL_DONE
        ));
        assert_eq!(s.active_word(), 0);
        assert!(!s.celebrating());
        assert_eq!(s.pool().len(), 2);
        assert_eq!(s.message(), MSG_ALL_DONE);

        // Transient: the notice clears itself.
        run_ticks(&mut s, 5);
        assert!(s.message().is_empty());
    }

    // ── Challenge mode ──

    #[test]
    fn challenge_completion_reports_once_and_stops_timer() {
        let mut s = session(Mode::Challenge);
        // 50ms ticks → 20 ticks per second; run 3 seconds on the clock.
        run_ticks(&mut s, 60);
        assert_eq!(s.elapsed_seconds(), 3);

        solve_current_word(&mut s);
        run_ticks(&mut s, 4); // advance into word 1
        let mut events = solve_current_word(&mut s);
        events.extend(run_ticks(&mut s, 4));

        let expected_score = challenge_score(2, s.elapsed_seconds());
        let completions: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, SessionEvent::ChallengeComplete { .. }))
            .collect();
        assert_eq!(
            completions,
            vec![&SessionEvent::ChallengeComplete {
                score: expected_score,
                elapsed_seconds: s.elapsed_seconds(),
            }]
        );
        assert!(s.finished());
        assert!(s.celebrating()); // terminal lock holds

        // Timer is stopped for good; further ticks emit nothing.
        let frozen = s.elapsed_seconds();
        let later = run_ticks(&mut s, 100);
        assert!(later.is_empty());
        assert_eq!(s.elapsed_seconds(), frozen);
    }

    #[test]
    fn practice_timer_never_runs() {
        let mut s = session(Mode::Practice);
        run_ticks(&mut s, 200);
        assert_eq!(s.elapsed_seconds(), 0);
    }

    // ── Ownership invariant under a command storm ──

    #[test]
    fn tile_set_invariant_holds_under_random_commands() {
        let mut s = session(Mode::Practice);
        let mut rng = Rng::new(12345);
        for step in 0..600 {
            let roll = rng.next_int(100);
            if !s.celebrating() {
                if roll < 30 {
                    if let Some(t) = s.pool().first().copied() {
                        s.apply(Command::SelectTile(t.id));
                    }
                } else if roll < 55 {
                    let slot = rng.next_int(s.slots().len() as u32) as usize;
                    s.apply(Command::PlaceAt(slot));
                } else if roll < 70 {
                    let slot = rng.next_int(s.slots().len() as u32) as usize;
                    s.apply(Command::EvictAt(slot));
                } else if roll < 80 {
                    if let Some(t) = s.pool().last().copied() {
                        s.apply(Command::BeginDrag(t.id));
                        let slot = rng.next_int(s.slots().len() as u32) as usize;
                        s.apply(Command::DropAt(Some(slot)));
                    }
                } else if roll < 85 {
                    s.apply(Command::ResetCurrentWord);
                }
            }
            if step % 3 == 0 {
                s.tick();
            }

            let ids = all_tile_ids(&s);
            let word_len = s.word().glyphs.len();
            assert_eq!(ids.len(), word_len, "tile lost or duplicated");
            let mut dedup = ids.clone();
            dedup.dedup();
            assert_eq!(dedup.len(), word_len, "duplicate tile id");
        }
    }
}
