/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD, or the
/// XDG data dir). Falls back to sensible defaults if the file is missing
/// or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Structs ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    /// Word pack file name, resolved against the search path.
    pub words_file: String,
}

/// All session pacing expressed in engine ticks.
/// At the default 50 ms tick: evict ≈ 0.5 s, feedback ≈ 1 s,
/// celebrate ≈ 1.5 s, notice ≈ 2 s.
#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub evict_delay_ticks: u64,
    pub feedback_ticks: u64,
    pub celebrate_ticks: u64,
    pub notice_ticks: u32,
}

impl TimingConfig {
    pub fn ticks_per_second(&self) -> u64 {
        (1000 / self.tick_rate_ms.max(1)).max(1)
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub grab: Vec<String>,
    pub cancel: Vec<String>,
    pub confirm: Vec<String>,
    pub reset: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_evict_delay")]
    evict_delay_ticks: u64,
    #[serde(default = "default_feedback")]
    feedback_ticks: u64,
    #[serde(default = "default_celebrate")]
    celebrate_ticks: u64,
    #[serde(default = "default_notice")]
    notice_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_grab")]
    grab: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_reset")]
    reset: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_words_file")]
    words_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 50 }
fn default_evict_delay() -> u64 { 10 }  // 0.5s: wrong tile is visible before it bounces back
fn default_feedback() -> u64 { 20 }     // 1s "try again" window
fn default_celebrate() -> u64 { 30 }    // 1.5s celebration before the next word
fn default_notice() -> u32 { 40 }       // 2s transient message

fn default_grab() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into(), "Y".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_reset() -> Vec<String> { vec!["Select".into()] }
fn default_words_file() -> String { "words.toml".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            evict_delay_ticks: default_evict_delay(),
            feedback_ticks: default_feedback(),
            celebrate_ticks: default_celebrate(),
            notice_ticks: default_notice(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            grab: default_grab(),
            cancel: default_cancel(),
            confirm: default_confirm(),
            reset: default_reset(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            words_file: default_words_file(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) XDG data home. Missing file or missing keys fall back to
    /// defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());
        GameConfig {
            timing: TimingConfig {
                tick_rate_ms: toml_cfg.timing.tick_rate_ms,
                evict_delay_ticks: toml_cfg.timing.evict_delay_ticks,
                feedback_ticks: toml_cfg.timing.feedback_ticks,
                celebrate_ticks: toml_cfg.timing.celebrate_ticks,
                notice_ticks: toml_cfg.timing.notice_ticks,
            },
            gamepad: GamepadConfig {
                grab: toml_cfg.gamepad.grab,
                cancel: toml_cfg.gamepad.cancel,
                confirm: toml_cfg.gamepad.confirm,
                reset: toml_cfg.gamepad.reset,
            },
            words_file: toml_cfg.general.words_file,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG path (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so an installed binary still finds data
        // relative to the real executable.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/hanzigarden");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
