/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws. Cells are
/// wide-char aware: every hanzi occupies two terminal columns, with a
/// continuation cell marking the second column.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::session::engine::{Feedback, Mode, PuzzleSession};
use crate::session::leaderboard::ScoreEntry;

// ── Cursor over the play area ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CursorRow {
    Pool,
    Slots,
}

/// Where the player's keyboard/gamepad cursor sits on the play screen.
#[derive(Clone, Copy, Debug)]
pub struct PlayCursor {
    pub row: CursorRow,
    pub index: usize,
}

impl PlayCursor {
    pub fn new() -> Self {
        PlayCursor {
            row: CursorRow::Pool,
            index: 0,
        }
    }
}

// ── What to draw this frame ──

pub enum View<'a> {
    Login {
        name: &'a str,
        message: &'a str,
    },
    ModeSelect {
        player: &'a str,
        message: &'a str,
    },
    Playing {
        session: &'a PuzzleSession,
        cursor: &'a PlayCursor,
    },
    Leaderboard {
        entries: &'a [ScoreEntry],
        message: &'a str,
    },
}

fn view_tag(view: &View) -> u8 {
    match view {
        View::Login { .. } => 0,
        View::ModeSelect { .. } => 1,
        View::Playing { .. } => 2,
        View::Leaderboard { .. } => 3,
    }
}

/// Does this char need two terminal columns? CJK ideographs, fullwidth
/// punctuation and friends all live above U+2E80.
fn is_wide(c: char) -> bool {
    c as u32 >= 0x2E80
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool, // this char occupies 2 terminal columns
    cont: bool, // continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, used for
    /// both Clear and every cell so inter-row gap pixels match exactly.
    const BASE_BG: Color = Color::Rgb { r: 24, g: 26, b: 40 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    /// Normalize bg: Color::Reset → BASE_BG so every cell carries an
    /// explicit background color (never terminal-default).
    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        let len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.ch_len = len;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell.wide = is_wide(c);
        cell
    }

    fn as_str(&self) -> &str {
        if self.ch_len == 0 {
            return "";
        }
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or("?")
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write text at (x, y). Wide chars take two columns (continuation
    /// cell in the second). Returns the column after the last char.
    fn put_text(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) -> usize {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            let cell = Cell::from_char(ch, fg, bg);
            if cell.wide {
                if cx + 1 >= self.width {
                    break;
                }
                self.set(cx, y, cell);
                self.set(cx + 1, y, Cell {
                    fg,
                    bg: Cell::norm_bg(bg),
                    ..Cell::WIDE_CONT
                });
                cx += 2;
            } else {
                self.set(cx, y, cell);
                cx += 1;
            }
        }
        cx
    }

    /// Rendered width of a string in terminal columns.
    fn text_width(s: &str) -> usize {
        s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
    }

    /// Write text centered on the row.
    fn put_centered(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let w = Self::text_width(s);
        let x = self.width.saturating_sub(w) / 2;
        self.put_text(x, y, s, fg, bg);
    }

    /// Fill a whole row with a background color.
    fn fill_row(&mut self, y: usize, fg: Color, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', fg, bg));
        }
    }
}

// ── Palette ──

const HUD_BG: Color = Color::Rgb { r: 40, g: 30, b: 70 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };
const TILE_FG: Color = Color::Rgb { r: 120, g: 220, b: 120 };
const TILE_BORDER: Color = Color::Rgb { r: 220, g: 190, b: 60 };
const SEATED_FG: Color = Color::Rgb { r: 130, g: 230, b: 130 };
const EMPTY_FG: Color = Color::DarkGrey;
const SELECT_FG: Color = Color::Rgb { r: 255, g: 120, b: 120 };
const PINYIN_FG: Color = Color::Rgb { r: 110, g: 170, b: 255 };
const TITLE_FG: Color = Color::Rgb { r: 255, g: 200, b: 90 };

/// Columns reserved for the word-picker sidebar on the play screen.
const SIDEBAR_W: usize = 14;

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_view: Option<u8>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_view: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, view: &View) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
        }

        // Screen change → clear for a clean transition
        let tag = view_tag(view);
        if self.last_view != Some(tag) {
            self.back.cells.fill(Cell::INVALID);
            queue!(
                self.writer,
                SetBackgroundColor(Cell::BASE_BG),
                Clear(ClearType::All)
            )?;
            self.last_view = Some(tag);
        }

        self.front.clear();
        match view {
            View::Login { name, message } => self.compose_login(name, message),
            View::ModeSelect { player, message } => self.compose_mode_select(player, message),
            View::Playing { session, cursor } => self.compose_playing(session, cursor),
            View::Leaderboard { entries, message } => self.compose_leaderboard(entries, message),
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors at start of frame. Not ResetColor — that
        // falls back to the terminal's native default and causes line
        // artifacts on VTE terminals.
        queue!(
            self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of a wide glyph)
                if cell.cont {
                    if cell != prev {
                        need_move = true;
                    }
                    x += 1;
                    continue;
                }

                // For wide cells, also check if the continuation changed
                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Login screen ──

    fn compose_login(&mut self, name: &str, message: &str) {
        let mid = self.front.height / 2;
        self.front
            .put_centered(mid.saturating_sub(5), "欢迎来到汉字拼拼乐花园！", TITLE_FG, Color::Reset);
        self.front
            .put_centered(mid.saturating_sub(2), "我是小园丁，我叫：", Color::White, Color::Reset);

        let field = format!("{}_", name);
        self.front.put_centered(mid, &field, TILE_FG, Color::Reset);

        self.front.put_centered(
            mid + 3,
            "[Enter] 开始探险  [Esc] 退出",
            Color::DarkGrey,
            Color::Reset,
        );
        self.compose_message_bar(message);
    }

    // ── Mode select screen ──

    fn compose_mode_select(&mut self, player: &str, message: &str) {
        let mid = self.front.height / 2;
        self.front
            .put_centered(mid.saturating_sub(6), "选择你的探险模式！", TITLE_FG, Color::Reset);
        let hello = format!("你好，{}！", player);
        self.front
            .put_centered(mid.saturating_sub(3), &hello, Color::White, Color::Reset);

        self.front
            .put_centered(mid.saturating_sub(1), "[1] 自由探索模式", PINYIN_FG, Color::Reset);
        self.front
            .put_centered(mid + 1, "[2] 限时挑战模式", SELECT_FG, Color::Reset);
        self.front
            .put_centered(mid + 3, "[L] 排行榜", TILE_FG, Color::Reset);
        self.front.put_centered(
            mid + 5,
            "[Esc] 返回登录",
            Color::DarkGrey,
            Color::Reset,
        );
        self.compose_message_bar(message);
    }

    // ── Play screen ──

    fn compose_playing(&mut self, s: &PuzzleSession, cursor: &PlayCursor) {
        // HUD row
        self.front.fill_row(0, Color::White, HUD_BG);
        let mode_name = match s.mode() {
            Mode::Practice => "自由探索模式",
            Mode::Challenge => "限时挑战模式",
        };
        self.front.put_text(1, 0, mode_name, Color::White, HUD_BG);
        if s.mode() == Mode::Challenge {
            let clock = format!("时间 {}", format_time(s.elapsed_seconds()));
            let x = self
                .front
                .width
                .saturating_sub(FrameBuffer::text_width(&clock) + 1);
            self.front.put_text(x, 0, &clock, SELECT_FG, HUD_BG);
        }

        self.compose_sidebar(s);

        let main_x = SIDEBAR_W + 2;

        // Pinyin prompt
        self.front
            .put_text(main_x, 2, &s.word().pinyin, PINYIN_FG, Color::Reset);

        // Pool row
        self.front
            .put_text(main_x, 5, "拼图块：", Color::White, Color::Reset);
        let mut x = main_x + 10;
        for (i, tile) in s.pool().iter().enumerate() {
            let selected = s.selection() == Some(tile.id);
            let here = cursor.row == CursorRow::Pool && cursor.index == i;
            let (open, close) = if selected { ('{', '}') } else { ('[', ']') };
            let border = if here {
                Color::White
            } else if selected {
                SELECT_FG
            } else {
                TILE_BORDER
            };
            if here {
                self.front.put_text(x.saturating_sub(1), 5, "▶", Color::White, Color::Reset);
            }
            x = self
                .front
                .put_text(x, 5, &open.to_string(), border, Color::Reset);
            x = self
                .front
                .put_text(x, 5, &tile.glyph.to_string(), TILE_FG, Color::Reset);
            x = self
                .front
                .put_text(x, 5, &close.to_string(), border, Color::Reset);
            x += 2;
        }
        if s.pool().is_empty() && s.celebrating() {
            self.front
                .put_text(main_x + 10, 5, "拼图完成！", TITLE_FG, Color::Reset);
        }

        // Slot row
        self.front
            .put_text(main_x, 8, "拼到这里：", Color::White, Color::Reset);
        let glyphs = &s.word().glyphs;
        let mut x = main_x + 12;
        for (i, seated) in s.slots().iter().enumerate() {
            let here = cursor.row == CursorRow::Slots && cursor.index == i;
            let correct_here = matches!(seated, Some(t) if t.glyph == glyphs[i]);
            let fg = match (seated, s.feedback()) {
                (Some(_), Some(Feedback::Incorrect)) if !correct_here => SELECT_FG,
                (Some(_), _) => SEATED_FG,
                (None, _) => EMPTY_FG,
            };
            let border = if here { Color::White } else { fg };
            if here {
                self.front.put_text(x.saturating_sub(1), 8, "▶", Color::White, Color::Reset);
            }
            x = self.front.put_text(x, 8, "[", border, Color::Reset);
            let shown = match seated {
                Some(t) => t.glyph.to_string(),
                None => "？".to_string(),
            };
            x = self.front.put_text(x, 8, &shown, fg, Color::Reset);
            x = self.front.put_text(x, 8, "]", border, Color::Reset);
            x += 2;
        }

        // Feedback line
        match s.feedback() {
            Some(Feedback::Incorrect) => {
                self.front
                    .put_text(main_x, 11, "再试一次！", SELECT_FG, Color::Reset);
            }
            Some(Feedback::Correct) => {
                // Celebration sparkle row (confetti, terminal edition)
                let mut x = main_x;
                for i in 0..12 {
                    let (spark, color) = match i % 3 {
                        0 => ("✦", TITLE_FG),
                        1 => ("✧", TILE_FG),
                        _ => ("✦", PINYIN_FG),
                    };
                    x = self.front.put_text(x, 11, spark, color, Color::Reset);
                    x += 2;
                }
            }
            None => {}
        }

        if s.finished() {
            self.front.put_centered(
                13,
                "挑战完成！按 Enter 查看排行榜",
                TITLE_FG,
                Color::Reset,
            );
        }

        self.compose_message_bar(s.message());

        // Help bar
        let help_row = self.front.height.saturating_sub(1);
        let help = " ←→:移动  ↑↓:换行  Enter:选择/放下  R:重置  1-9:选词  Esc:返回";
        self.front
            .put_text(0, help_row, help, Color::DarkGrey, Color::Reset);
    }

    /// Word picker: one line per catalog word, jump with the number keys.
    fn compose_sidebar(&mut self, s: &PuzzleSession) {
        self.front.put_text(1, 2, "选一选", TITLE_FG, Color::Reset);
        for (i, word) in s.catalog().words().iter().enumerate() {
            let row = 4 + i;
            if row + 2 >= self.front.height {
                break;
            }
            let active = i == s.active_word();
            let marker = if active { "▶" } else { " " };
            let fg = if active { Color::White } else { Color::DarkGrey };
            let first = word.glyphs.first().copied().unwrap_or('？');
            let label = format!("{}{} {}", marker, i + 1, first);
            self.front.put_text(1, row, &label, fg, Color::Reset);
        }
    }

    // ── Leaderboard screen ──

    fn compose_leaderboard(&mut self, entries: &[ScoreEntry], message: &str) {
        self.front.put_centered(1, "排行榜", TITLE_FG, Color::Reset);

        if entries.is_empty() {
            self.front.put_centered(
                4,
                "还没有人挑战哦，快来创造记录吧！",
                Color::White,
                Color::Reset,
            );
        } else {
            let left = self.front.width.saturating_sub(44) / 2;
            self.front.put_text(
                left,
                3,
                "排名    名字            得分    用时(秒)",
                PINYIN_FG,
                Color::Reset,
            );
            for (i, entry) in entries.iter().enumerate() {
                let row = 5 + i;
                if row + 2 >= self.front.height {
                    break;
                }
                let mut x = self.front.put_text(
                    left,
                    row,
                    &format!("{:<4}", i + 1),
                    Color::White,
                    Color::Reset,
                );
                x = self
                    .front
                    .put_text(x + 4, row, &entry.name, TILE_FG, Color::Reset);
                // Pad out to the score column regardless of name width.
                let score_col = left + 24;
                x = x.max(score_col);
                x = self.front.put_text(
                    x,
                    row,
                    &format!("{:<8}", entry.score),
                    Color::White,
                    Color::Reset,
                );
                self.front.put_text(
                    x,
                    row,
                    &format!("{}", entry.time_seconds),
                    Color::White,
                    Color::Reset,
                );
            }
        }

        let help_row = self.front.height.saturating_sub(1);
        self.front
            .put_text(1, help_row, "[Enter/Esc] 回到主页", Color::DarkGrey, Color::Reset);
        self.compose_message_bar(message);
    }

    // ── Shared: transient message bar ──

    fn compose_message_bar(&mut self, message: &str) {
        if message.is_empty() {
            return;
        }
        let row = self.front.height.saturating_sub(3);
        self.front.fill_row(row, Color::Black, MSG_BG);
        let msg = format!(" ◈ {} ", message);
        self.front.put_text(0, row, &msg, Color::Black, MSG_BG);
    }
}

/// mm:ss clock, same shape as the challenge HUD in the original game.
fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hanzi_are_wide_ascii_is_not() {
        assert!(is_wide('木'));
        assert!(is_wide('！'));
        assert!(!is_wide('a'));
        assert!(!is_wide('ǐ')); // pinyin tone marks stay narrow
    }

    #[test]
    fn put_text_reserves_two_columns_per_hanzi() {
        let mut fb = FrameBuffer::new(20, 2);
        let end = fb.put_text(0, 0, "木a", Color::White, Color::Reset);
        assert_eq!(end, 3);
        assert!(fb.get(0, 0).wide);
        assert!(fb.get(1, 0).cont);
        assert!(!fb.get(2, 0).wide);
    }

    #[test]
    fn text_width_counts_columns() {
        assert_eq!(FrameBuffer::text_width("木槿"), 4);
        assert_eq!(FrameBuffer::text_width("mù jǐn"), 6);
    }

    #[test]
    fn clock_formats_mm_ss() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(65), "01:05");
        assert_eq!(format_time(600), "10:00");
    }
}
