/// Persisted challenge leaderboard.
///
/// Top ten results, ordered by score descending, ties broken by the
/// faster time. Stored as `leaderboard.toml` in the save directory.
/// A failed write never touches a finished session's outcome: the error
/// is handed to the shell to show, and the in-memory board stands.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_ENTRIES: usize = 10;

const BOARD_FILE: &str = "leaderboard.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u32,
    pub time_seconds: u64,
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("could not save leaderboard to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize leaderboard: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Serialize, Deserialize, Debug, Default)]
struct BoardFile {
    #[serde(default)]
    entries: Vec<ScoreEntry>,
}

#[derive(Debug)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
    path: PathBuf,
}

impl Leaderboard {
    /// Load the board from the save directory; a missing or unreadable
    /// file is an empty board, not an error.
    pub fn load() -> Self {
        let path = save_dir().join(BOARD_FILE);
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| toml::from_str::<BoardFile>(&text).ok())
            .map(|f| f.entries)
            .unwrap_or_default();
        let mut board = Leaderboard { entries, path };
        sort_ranked(&mut board.entries);
        board.entries.truncate(MAX_ENTRIES);
        board
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Insert a result in rank order, trim to the top ten, and persist.
    /// The in-memory board is updated even when the write fails.
    pub fn record(
        &mut self,
        name: &str,
        score: u32,
        time_seconds: u64,
    ) -> Result<(), BoardError> {
        self.entries.push(ScoreEntry {
            name: name.to_string(),
            score,
            time_seconds,
        });
        sort_ranked(&mut self.entries);
        self.entries.truncate(MAX_ENTRIES);
        self.save()
    }

    fn save(&self) -> Result<(), BoardError> {
        let file = BoardFile {
            entries: self.entries.clone(),
        };
        let text = toml::to_string(&file)?;
        std::fs::write(&self.path, text).map_err(|source| BoardError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Score descending, faster time first on ties.
fn sort_ranked(entries: &mut [ScoreEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.time_seconds.cmp(&b.time_seconds))
    });
}

fn save_dir() -> PathBuf {
    // 1. Exe directory, if writable (portable installs).
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_hanzigarden");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs.
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/hanzigarden");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD.
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
