/// Events emitted by the puzzle session.
/// The presentation layer consumes these for sound and messaging; the
/// shell consumes `ChallengeComplete` to record the result. Fire-and-forget:
/// the engine never depends on what a consumer does with them.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A tile was seated in its correct slot.
    PlacementSuccess,
    /// A tile was seated in a wrong slot (it will bounce back shortly).
    PlacementError,
    /// The current word was completed correctly.
    WordCelebration,
    /// Non-modal informational notice for the player.
    Notice { text: String },
    /// Challenge mode finished; emitted exactly once per session.
    ChallengeComplete { score: u32, elapsed_seconds: u64 },
}
