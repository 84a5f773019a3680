/// Entry point and game loop.

mod config;
mod domain;
mod session;
mod ui;

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::word::WordCatalog;
use session::catalog::load_catalog;
use session::engine::{Command, Mode, PuzzleSession};
use session::event::SessionEvent;
use session::leaderboard::Leaderboard;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{CursorRow, PlayCursor, Renderer, View};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

const MAX_NAME_LEN: usize = 15;
const MSG_NAME_NEEDED: &str = "请告诉我你的名字，小园丁！";

fn main() {
    let config = GameConfig::load();

    let catalog = match load_catalog(&config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Could not load the word list: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    let mut shell = Shell::new(catalog);

    let result = game_loop(&mut shell, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("谢谢游玩，下次再来花园玩吧！");
}

// ── Shell state: which screen is up, plus everything that outlives a session ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Login,
    ModeSelect,
    Playing,
    Leaderboard,
}

struct Shell {
    screen: Screen,
    catalog: WordCatalog,
    player_name: String,
    name_buffer: String,
    /// Shell-level transient notice (login errors, save results).
    message: String,
    session: Option<PuzzleSession>,
    cursor: PlayCursor,
    board: Leaderboard,
}

impl Shell {
    fn new(catalog: WordCatalog) -> Self {
        Shell {
            screen: Screen::Login,
            catalog,
            player_name: String::new(),
            name_buffer: String::new(),
            message: String::new(),
            session: None,
            cursor: PlayCursor::new(),
            board: Leaderboard::load(),
        }
    }

    fn start_session(&mut self, mode: Mode, config: &GameConfig) {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::from(d.subsec_nanos()) ^ d.as_secs())
            .unwrap_or(1);
        self.session = Some(PuzzleSession::new(
            self.catalog.clone(),
            mode,
            config.timing.clone(),
            seed,
        ));
        self.cursor = PlayCursor::new();
        self.message.clear();
        self.screen = Screen::Playing;
    }

    /// Dropping the session cancels everything scheduled inside it.
    fn end_session(&mut self, to: Screen) {
        self.session = None;
        self.screen = to;
    }
}

// ── Game loop ──

fn game_loop(
    shell: &mut Shell,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.timing.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if handle_input(shell, &kb, &gp, sound, config) {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            let events = match shell.session.as_mut() {
                Some(session) => session.tick(),
                None => Vec::new(),
            };
            process_session_events(shell, &events, sound);
            last_tick = Instant::now();
        }

        let view = match shell.screen {
            Screen::Login => View::Login {
                name: &shell.name_buffer,
                message: &shell.message,
            },
            Screen::Playing => match &shell.session {
                Some(session) => View::Playing {
                    session,
                    cursor: &shell.cursor,
                },
                None => View::ModeSelect {
                    player: &shell.player_name,
                    message: &shell.message,
                },
            },
            Screen::ModeSelect => View::ModeSelect {
                player: &shell.player_name,
                message: &shell.message,
            },
            Screen::Leaderboard => View::Leaderboard {
                entries: shell.board.entries(),
                message: &shell.message,
            },
        };
        renderer.render(&view)?;

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Route session events to the collaborators: sounds for feedback, the
/// leaderboard for a finished challenge. A failed save is reported but
/// never touches the finished session.
fn process_session_events(shell: &mut Shell, events: &[SessionEvent], sound: Option<&SoundEngine>) {
    for event in events {
        match event {
            SessionEvent::PlacementSuccess => {
                if let Some(sfx) = sound {
                    sfx.play_success();
                }
            }
            SessionEvent::PlacementError => {
                if let Some(sfx) = sound {
                    sfx.play_error();
                }
            }
            SessionEvent::WordCelebration => {
                if let Some(sfx) = sound {
                    sfx.play_celebration();
                }
            }
            SessionEvent::Notice { .. } => {
                // Shown via the session's own message bar.
            }
            SessionEvent::ChallengeComplete {
                score,
                elapsed_seconds,
            } => {
                let name = shell.player_name.clone();
                match shell.board.record(&name, *score, *elapsed_seconds) {
                    Ok(()) => {
                        shell.message = format!(
                            "恭喜你完成所有挑战！你的总用时是 {} 秒，得分 {}！",
                            elapsed_seconds, score
                        );
                    }
                    Err(e) => {
                        shell.message = format!("保存成绩到排行榜失败：{e}");
                    }
                }
            }
        }
    }
}

// ── Input handling ──

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_RESET: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];

/// Returns true to quit the program.
fn handle_input(
    shell: &mut Shell,
    kb: &InputState,
    gp: &GamepadState,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> bool {
    let confirm = kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed();
    let esc = kb.was_pressed(KeyCode::Esc);

    match shell.screen {
        // ── Login ──
        Screen::Login => {
            for c in kb.typed_chars() {
                if c == ' ' && shell.name_buffer.is_empty() {
                    continue;
                }
                if shell.name_buffer.chars().count() < MAX_NAME_LEN && !c.is_control() {
                    shell.name_buffer.push(c);
                }
            }
            if kb.was_pressed(KeyCode::Backspace) {
                shell.name_buffer.pop();
            }
            if kb.was_pressed(KeyCode::Enter) || gp.confirm_pressed() {
                let trimmed = shell.name_buffer.trim();
                if trimmed.is_empty() {
                    shell.message = MSG_NAME_NEEDED.to_string();
                } else {
                    shell.player_name = trimmed.to_string();
                    shell.message.clear();
                    shell.screen = Screen::ModeSelect;
                    if let Some(sfx) = sound {
                        sfx.play_menu_blip();
                    }
                }
            }
            if esc {
                return true;
            }
        }

        // ── Mode select ──
        Screen::ModeSelect => {
            if kb.any_pressed(&[KeyCode::Char('1'), KeyCode::Char('p'), KeyCode::Char('P')]) {
                shell.start_session(Mode::Practice, config);
                if let Some(sfx) = sound {
                    sfx.play_menu_blip();
                }
            } else if kb.any_pressed(&[KeyCode::Char('2'), KeyCode::Char('c'), KeyCode::Char('C')])
            {
                shell.start_session(Mode::Challenge, config);
                if let Some(sfx) = sound {
                    sfx.play_menu_blip();
                }
            } else if kb.any_pressed(&[KeyCode::Char('l'), KeyCode::Char('L')]) {
                shell.message.clear();
                shell.screen = Screen::Leaderboard;
            } else if esc {
                shell.name_buffer = shell.player_name.clone();
                shell.screen = Screen::Login;
            }
        }

        // ── Playing ──
        Screen::Playing => {
            if shell.session.is_none() {
                shell.screen = Screen::ModeSelect;
                return false;
            }

            // A finished challenge waits for one confirm, then shows the board.
            if shell.session.as_ref().is_some_and(|s| s.finished()) {
                if confirm || esc {
                    shell.end_session(Screen::Leaderboard);
                }
                return false;
            }

            if esc {
                // Teardown: pending delays die with the session.
                shell.end_session(Screen::ModeSelect);
                return false;
            }

            handle_play_input(shell, kb, gp, sound);
        }

        // ── Leaderboard ──
        Screen::Leaderboard => {
            if confirm || esc {
                shell.message.clear();
                shell.screen = Screen::ModeSelect;
            }
        }
    }

    false
}

/// In-session input: keyboard drives pick-then-place, the gamepad drives
/// grab-and-carry. Both funnel into the same engine commands.
fn handle_play_input(
    shell: &mut Shell,
    kb: &InputState,
    gp: &GamepadState,
    sound: Option<&SoundEngine>,
) {
    let mut commands: Vec<Command> = Vec::new();

    {
        let session = shell
            .session
            .as_ref()
            .expect("play input without a session");
        let word_count = session.catalog().len();
        let pool_len = session.pool().len();
        let slot_len = session.slots().len();
        let cursor = &mut shell.cursor;

        // Cursor movement (keyboard + gamepad d-pad/stick)
        let left = kb.was_pressed(KeyCode::Left) || gp.left_pressed();
        let right = kb.was_pressed(KeyCode::Right) || gp.right_pressed();
        let vertical = kb.was_pressed(KeyCode::Up)
            || kb.was_pressed(KeyCode::Down)
            || gp.up_pressed()
            || gp.down_pressed();

        let row_len = match cursor.row {
            CursorRow::Pool => pool_len,
            CursorRow::Slots => slot_len,
        };
        if left && row_len > 0 {
            cursor.index = (cursor.index + row_len - 1) % row_len;
        }
        if right && row_len > 0 {
            cursor.index = (cursor.index + 1) % row_len;
        }
        if vertical {
            cursor.row = match cursor.row {
                CursorRow::Pool => CursorRow::Slots,
                CursorRow::Slots => CursorRow::Pool,
            };
        }
        // The pool shrinks as tiles seat; keep the cursor on it.
        let row_len = match cursor.row {
            CursorRow::Pool => pool_len,
            CursorRow::Slots => slot_len,
        };
        if row_len > 0 {
            cursor.index = cursor.index.min(row_len - 1);
        } else {
            cursor.index = 0;
        }

        // Keyboard: pick-then-place
        if kb.any_pressed(KEYS_CONFIRM) {
            match cursor.row {
                CursorRow::Pool => {
                    if let Some(tile) = session.pool().get(cursor.index) {
                        commands.push(Command::SelectTile(tile.id));
                    }
                }
                CursorRow::Slots => {
                    if cursor.index < slot_len {
                        commands.push(Command::PlaceAt(cursor.index));
                    }
                }
            }
        }

        // Gamepad: grab-and-carry
        if gp.grab_pressed() {
            match cursor.row {
                CursorRow::Pool => {
                    if let Some(tile) = session.pool().get(cursor.index) {
                        commands.push(Command::BeginDrag(tile.id));
                    }
                }
                CursorRow::Slots => {
                    if cursor.index < slot_len {
                        if session.selection().is_some() {
                            commands.push(Command::DropAt(Some(cursor.index)));
                        } else {
                            commands.push(Command::EvictAt(cursor.index));
                        }
                    }
                }
            }
        }
        if gp.cancel_pressed() {
            commands.push(Command::DropAt(None));
        }

        if kb.any_pressed(KEYS_RESET) || gp.reset_pressed() {
            commands.push(Command::ResetCurrentWord);
        }

        // Word picker: number keys jump, brackets step
        for d in 1..=9u32 {
            let key = KeyCode::Char(char::from_digit(d, 10).unwrap_or('0'));
            if kb.was_pressed(key) && (d as usize) <= word_count {
                commands.push(Command::JumpToWord(d as usize - 1));
            }
        }
        if kb.was_pressed(KeyCode::Char('[')) {
            let prev = (session.active_word() + word_count - 1) % word_count;
            commands.push(Command::JumpToWord(prev));
        }
        if kb.was_pressed(KeyCode::Char(']')) {
            let next = (session.active_word() + 1) % word_count;
            commands.push(Command::JumpToWord(next));
        }
    }

    let mut events = Vec::new();
    if let Some(session) = shell.session.as_mut() {
        for cmd in commands {
            events.extend(session.apply(cmd));
        }
    }
    process_session_events(shell, &events, sound);
}
