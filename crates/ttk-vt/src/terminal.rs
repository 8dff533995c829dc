#![forbid(unsafe_code)]

//! The terminal: parser, two screens, modes and the dispatch from parsed
//! actions to screen operations.

use ttk_core::signal::{Signal, SlotResult};
use ttk_render::Canvas;
use ttk_style::{Color, Palette, apply_sgr};

use crate::modes::{Modes, MouseTracking};
use crate::parser::{Action, Parser};
use crate::screen::Screen;

/// Lines kept above the primary screen.
pub const DEFAULT_SCROLLBACK: usize = 1000;

const TAB_WIDTH: u16 = 8;

type CsiHandler = fn(&mut Terminal, &[u16]);

/// Handlers for `CSI params final` without private marker or intermediates,
/// indexed by `final - 0x40`.
const CSI_DISPATCH: [Option<CsiHandler>; 63] = csi_table();

const fn csi_table() -> [Option<CsiHandler>; 63] {
    const fn at(b: u8) -> usize {
        (b - 0x40) as usize
    }
    let mut t: [Option<CsiHandler>; 63] = [None; 63];
    t[at(b'@')] = Some(Terminal::csi_ich as CsiHandler);
    t[at(b'A')] = Some(Terminal::csi_cuu as CsiHandler);
    t[at(b'B')] = Some(Terminal::csi_cud as CsiHandler);
    t[at(b'C')] = Some(Terminal::csi_cuf as CsiHandler);
    t[at(b'D')] = Some(Terminal::csi_cub as CsiHandler);
    t[at(b'E')] = Some(Terminal::csi_cnl as CsiHandler);
    t[at(b'F')] = Some(Terminal::csi_cpl as CsiHandler);
    t[at(b'G')] = Some(Terminal::csi_cha as CsiHandler);
    t[at(b'H')] = Some(Terminal::csi_cup as CsiHandler);
    t[at(b'I')] = Some(Terminal::csi_cht as CsiHandler);
    t[at(b'J')] = Some(Terminal::csi_ed as CsiHandler);
    t[at(b'K')] = Some(Terminal::csi_el as CsiHandler);
    t[at(b'L')] = Some(Terminal::csi_il as CsiHandler);
    t[at(b'M')] = Some(Terminal::csi_dl as CsiHandler);
    t[at(b'P')] = Some(Terminal::csi_dch as CsiHandler);
    t[at(b'S')] = Some(Terminal::csi_su as CsiHandler);
    t[at(b'T')] = Some(Terminal::csi_sd as CsiHandler);
    t[at(b'X')] = Some(Terminal::csi_ech as CsiHandler);
    t[at(b'Z')] = Some(Terminal::csi_cbt as CsiHandler);
    t[at(b'`')] = Some(Terminal::csi_cha as CsiHandler);
    t[at(b'a')] = Some(Terminal::csi_cuf as CsiHandler);
    t[at(b'b')] = Some(Terminal::csi_rep as CsiHandler);
    t[at(b'c')] = Some(Terminal::csi_da as CsiHandler);
    t[at(b'd')] = Some(Terminal::csi_vpa as CsiHandler);
    t[at(b'e')] = Some(Terminal::csi_cud as CsiHandler);
    t[at(b'f')] = Some(Terminal::csi_cup as CsiHandler);
    t[at(b'g')] = Some(Terminal::csi_tbc as CsiHandler);
    t[at(b'h')] = Some(Terminal::csi_sm as CsiHandler);
    t[at(b'l')] = Some(Terminal::csi_rm as CsiHandler);
    t[at(b'n')] = Some(Terminal::csi_dsr as CsiHandler);
    t[at(b'r')] = Some(Terminal::csi_decstbm as CsiHandler);
    t[at(b's')] = Some(Terminal::csi_save as CsiHandler);
    t[at(b'u')] = Some(Terminal::csi_restore as CsiHandler);
    t
}

/// Count parameter: missing or 0 means 1.
fn count(params: &[u16], i: usize) -> u16 {
    params.get(i).copied().filter(|&n| n != 0).unwrap_or(1)
}

/// Selector parameter: missing means 0.
fn param(params: &[u16], i: usize) -> u16 {
    params.get(i).copied().unwrap_or(0)
}

/// An xterm-compatible terminal emulator without a host process.
///
/// Bytes go in through [`feed`](Self::feed); the visible state is read
/// through [`screen`](Self::screen) or painted with [`paint`](Self::paint).
/// Replies the application expects (cursor position reports, device
/// attributes) queue up in [`take_replies`](Self::take_replies).
#[derive(Debug)]
pub struct Terminal {
    parser: Parser,
    primary: Screen,
    alternate: Screen,
    alt_active: bool,
    modes: Modes,
    mouse: MouseTracking,
    palette: Palette,
    title: String,
    tab_stops: Vec<bool>,
    last_printed: Option<char>,
    replies: Vec<u8>,
    bell: Signal<()>,
    title_changed: Signal<String>,
}

impl Terminal {
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_scrollback(width, height, DEFAULT_SCROLLBACK)
    }

    pub fn with_scrollback(width: u16, height: u16, scrollback: usize) -> Self {
        let primary = Screen::new(width, height, scrollback);
        let alternate = Screen::new(width, height, 0);
        let tab_stops = default_tab_stops(primary.width());
        Self {
            parser: Parser::new(),
            primary,
            alternate,
            alt_active: false,
            modes: Modes::default(),
            mouse: MouseTracking::Off,
            palette: Palette::default(),
            title: String::new(),
            tab_stops,
            last_printed: None,
            replies: Vec::new(),
            bell: Signal::new("bell"),
            title_changed: Signal::new("titleChanged"),
        }
    }

    /// The screen currently shown.
    pub fn screen(&self) -> &Screen {
        if self.alt_active {
            &self.alternate
        } else {
            &self.primary
        }
    }

    fn screen_mut(&mut self) -> &mut Screen {
        if self.alt_active {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    pub fn primary(&self) -> &Screen {
        &self.primary
    }

    pub fn is_alternate(&self) -> bool {
        self.alt_active
    }

    pub fn modes(&self) -> Modes {
        self.modes
    }

    pub fn mouse_tracking(&self) -> MouseTracking {
        self.mouse
    }

    pub fn cursor_visible(&self) -> bool {
        self.modes.contains(Modes::CURSOR_VISIBLE)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// Emitted on BEL.
    pub fn bell(&self) -> &Signal<()> {
        &self.bell
    }

    /// Emitted with the new title on OSC 0, 1 and 2.
    pub fn title_changed(&self) -> &Signal<String> {
        &self.title_changed
    }

    /// Drain the bytes the terminal wants to send back to the application.
    pub fn take_replies(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.replies)
    }

    /// Consume a chunk of output from the application.
    ///
    /// Every byte is consumed even if a signal receiver fails; the first
    /// receiver error is returned afterwards.
    pub fn feed(&mut self, bytes: &[u8]) -> SlotResult {
        let _span = tracing::trace_span!("ttk.vt.feed", len = bytes.len()).entered();
        let mut first_err = None;
        for &b in bytes {
            if let Some(action) = self.parser.advance(b)
                && let Err(err) = self.apply(action)
            {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Apply one parsed action.
    pub fn apply(&mut self, action: Action) -> SlotResult {
        match action {
            Action::Print(c) => self.print(c),
            Action::Execute(b) => return self.execute(b),
            Action::Escape {
                intermediates,
                final_byte,
            } => self.escape(&intermediates, final_byte),
            Action::Csi {
                private: None,
                params,
                intermediates,
                final_byte,
            } if intermediates.is_empty() => {
                match final_byte
                    .checked_sub(0x40)
                    .and_then(|i| CSI_DISPATCH.get(usize::from(i)).copied().flatten())
                {
                    Some(handler) => handler(self, &params),
                    None => tracing::trace!(final_byte, ?params, "unhandled CSI"),
                }
            }
            Action::Csi {
                private: None,
                intermediates,
                final_byte: b'p',
                ..
            } if intermediates == b"!" => self.soft_reset(),
            Action::Csi { .. } => tracing::trace!(?action, "unhandled CSI"),
            Action::Sgr(params) => {
                let pen = apply_sgr(self.screen().pen(), &params, &self.palette);
                self.screen_mut().set_pen(pen);
            }
            Action::DecSet(modes) => modes.iter().for_each(|&m| self.set_dec_mode(m, true)),
            Action::DecRst(modes) => modes.iter().for_each(|&m| self.set_dec_mode(m, false)),
            Action::Osc { ps, pt } => return self.osc(ps, pt),
            Action::Dcs { .. } => tracing::trace!("ignoring DCS"),
        }
        Ok(())
    }

    fn print(&mut self, c: char) {
        self.last_printed = Some(c);
        let wrap = self.modes.contains(Modes::AUTOWRAP);
        let insert = self.modes.contains(Modes::INSERT);
        self.screen_mut().print(c, wrap, insert);
    }

    fn execute(&mut self, b: u8) -> SlotResult {
        match b {
            0x07 => return self.bell.emit(&()),
            0x08 => self.screen_mut().backspace(),
            0x09 => self.tab_forward(1),
            0x0a..=0x0c => {
                if self.modes.contains(Modes::NEWLINE) {
                    self.screen_mut().carriage_return();
                }
                self.screen_mut().linefeed();
            }
            0x0d => self.screen_mut().carriage_return(),
            _ => {}
        }
        Ok(())
    }

    fn escape(&mut self, intermediates: &[u8], final_byte: u8) {
        match (intermediates, final_byte) {
            ([], b'7') => {
                let origin = self.modes.contains(Modes::ORIGIN);
                self.screen_mut().save_cursor(origin);
            }
            ([], b'8') => {
                let origin = self.screen_mut().restore_cursor().is_some_and(|s| s.origin);
                self.modes.set(Modes::ORIGIN, origin);
            }
            ([], b'D') => self.screen_mut().linefeed(),
            ([], b'M') => self.screen_mut().reverse_index(),
            ([], b'E') => {
                self.screen_mut().carriage_return();
                self.screen_mut().linefeed();
            }
            ([], b'H') => {
                let x = usize::from(self.screen().cursor().0);
                if let Some(stop) = self.tab_stops.get_mut(x) {
                    *stop = true;
                }
            }
            ([], b'c') => self.full_reset(),
            ([], b'=') => self.modes.insert(Modes::APP_KEYPAD),
            ([], b'>') => self.modes.remove(Modes::APP_KEYPAD),
            ([], b'\\') => {}
            ([b'#'], b'8') => self.screen_mut().alignment_pattern(),
            _ => tracing::trace!(?intermediates, final_byte, "unhandled escape"),
        }
    }

    fn osc(&mut self, ps: u16, pt: String) -> SlotResult {
        match ps {
            0..=2 => {
                self.title = pt;
                return self.title_changed.emit(&self.title);
            }
            8 => {
                let uri = pt.split_once(';').map_or("", |(_, uri)| uri);
                let link = (!uri.is_empty()).then_some(uri);
                let pen = self.screen().pen().clone().with_link(link);
                self.screen_mut().set_pen(pen);
            }
            _ => tracing::trace!(ps, "unhandled OSC"),
        }
        Ok(())
    }

    fn set_dec_mode(&mut self, mode: u16, on: bool) {
        if let Some(flag) = Modes::from_dec(mode) {
            self.modes.set(flag, on);
            if flag == Modes::ORIGIN {
                self.home();
            }
            return;
        }
        if let Some(tracking) = MouseTracking::from_dec(mode) {
            self.mouse = if on { tracking } else { MouseTracking::Off };
            return;
        }
        match mode {
            47 => self.switch_screen(on),
            1047 => {
                if !on && self.alt_active {
                    self.alternate.erase_display(2);
                }
                self.switch_screen(on);
            }
            1048 => self.save_or_restore(on),
            1049 => {
                if on {
                    self.save_or_restore(true);
                    self.switch_screen(true);
                    self.alternate.erase_display(2);
                } else {
                    self.switch_screen(false);
                    self.save_or_restore(false);
                }
            }
            _ => tracing::trace!(mode, on, "unhandled DEC mode"),
        }
    }

    fn save_or_restore(&mut self, save: bool) {
        if save {
            let origin = self.modes.contains(Modes::ORIGIN);
            self.primary.save_cursor(origin);
        } else {
            self.primary.restore_cursor();
        }
    }

    /// Show the alternate (`true`) or primary screen. Cursor position and
    /// pen carry over.
    fn switch_screen(&mut self, alternate: bool) {
        if alternate == self.alt_active {
            return;
        }
        let (x, y) = self.screen().cursor();
        let pen = self.screen().pen().clone();
        self.alt_active = alternate;
        let screen = self.screen_mut();
        screen.move_to(x, y);
        screen.set_pen(pen);
        tracing::debug!(alternate, "switched screen");
    }

    // ── cursor helpers ──

    /// Move to a 0-based position, relative to the region in origin mode.
    fn goto(&mut self, x: u16, y: u16) {
        let origin = self.modes.contains(Modes::ORIGIN);
        let screen = self.screen_mut();
        let y = if origin {
            let (top, bottom) = screen.region();
            y.saturating_add(top).min(bottom - 1)
        } else {
            y
        };
        screen.move_to(x, y);
    }

    fn home(&mut self) {
        self.goto(0, 0);
    }

    fn tab_forward(&mut self, n: u16) {
        let screen = self.screen();
        let last = screen.width() - 1;
        let mut x = screen.cursor().0;
        for _ in 0..n {
            x = (usize::from(x) + 1..usize::from(last))
                .find(|&i| self.tab_stops.get(i).copied().unwrap_or(false))
                .map_or(last, |i| i as u16);
        }
        self.screen_mut().set_column(x);
    }

    fn tab_back(&mut self, n: u16) {
        let mut x = self.screen().cursor().0;
        for _ in 0..n {
            x = (0..usize::from(x))
                .rev()
                .find(|&i| self.tab_stops.get(i).copied().unwrap_or(false))
                .map_or(0, |i| i as u16);
        }
        self.screen_mut().set_column(x);
    }

    // ── CSI handlers ──

    fn csi_ich(&mut self, p: &[u16]) {
        self.screen_mut().insert_chars(count(p, 0));
    }

    fn csi_cuu(&mut self, p: &[u16]) {
        self.screen_mut().cursor_up(count(p, 0));
    }

    fn csi_cud(&mut self, p: &[u16]) {
        self.screen_mut().cursor_down(count(p, 0));
    }

    fn csi_cuf(&mut self, p: &[u16]) {
        self.screen_mut().cursor_forward(count(p, 0));
    }

    fn csi_cub(&mut self, p: &[u16]) {
        self.screen_mut().cursor_back(count(p, 0));
    }

    fn csi_cnl(&mut self, p: &[u16]) {
        self.csi_cud(p);
        self.screen_mut().carriage_return();
    }

    fn csi_cpl(&mut self, p: &[u16]) {
        self.csi_cuu(p);
        self.screen_mut().carriage_return();
    }

    fn csi_cha(&mut self, p: &[u16]) {
        self.screen_mut().set_column(count(p, 0) - 1);
    }

    fn csi_cup(&mut self, p: &[u16]) {
        self.goto(count(p, 1) - 1, count(p, 0) - 1);
    }

    fn csi_vpa(&mut self, p: &[u16]) {
        let x = self.screen().cursor().0;
        self.goto(x, count(p, 0) - 1);
    }

    fn csi_cht(&mut self, p: &[u16]) {
        self.tab_forward(count(p, 0));
    }

    fn csi_cbt(&mut self, p: &[u16]) {
        self.tab_back(count(p, 0));
    }

    fn csi_ed(&mut self, p: &[u16]) {
        self.screen_mut().erase_display(param(p, 0));
    }

    fn csi_el(&mut self, p: &[u16]) {
        self.screen_mut().erase_line(param(p, 0));
    }

    fn csi_il(&mut self, p: &[u16]) {
        self.screen_mut().insert_lines(count(p, 0));
    }

    fn csi_dl(&mut self, p: &[u16]) {
        self.screen_mut().delete_lines(count(p, 0));
    }

    fn csi_dch(&mut self, p: &[u16]) {
        self.screen_mut().delete_chars(count(p, 0));
    }

    fn csi_su(&mut self, p: &[u16]) {
        self.screen_mut().scroll_up(count(p, 0));
    }

    fn csi_sd(&mut self, p: &[u16]) {
        self.screen_mut().scroll_down(count(p, 0));
    }

    fn csi_ech(&mut self, p: &[u16]) {
        self.screen_mut().erase_chars(count(p, 0));
    }

    /// REP: repeat the last printed character.
    fn csi_rep(&mut self, p: &[u16]) {
        if let Some(c) = self.last_printed {
            let n = count(p, 0).min(self.screen().width().saturating_mul(self.screen().height()));
            for _ in 0..n {
                self.print(c);
            }
        }
    }

    fn csi_da(&mut self, p: &[u16]) {
        if param(p, 0) == 0 {
            self.replies.extend_from_slice(b"\x1b[?1;2c");
        }
    }

    fn csi_tbc(&mut self, p: &[u16]) {
        match param(p, 0) {
            0 => {
                let x = usize::from(self.screen().cursor().0);
                if let Some(stop) = self.tab_stops.get_mut(x) {
                    *stop = false;
                }
            }
            3 => self.tab_stops.fill(false),
            _ => {}
        }
    }

    fn csi_sm(&mut self, p: &[u16]) {
        for flag in p.iter().filter_map(|&m| Modes::from_ansi(m)) {
            self.modes.insert(flag);
        }
    }

    fn csi_rm(&mut self, p: &[u16]) {
        for flag in p.iter().filter_map(|&m| Modes::from_ansi(m)) {
            self.modes.remove(flag);
        }
    }

    fn csi_dsr(&mut self, p: &[u16]) {
        match param(p, 0) {
            5 => self.replies.extend_from_slice(b"\x1b[0n"),
            6 => {
                let (x, mut y) = self.screen().cursor();
                if self.modes.contains(Modes::ORIGIN) {
                    y = y.saturating_sub(self.screen().region().0);
                }
                let report = format!("\x1b[{};{}R", u32::from(y) + 1, u32::from(x) + 1);
                self.replies.extend_from_slice(report.as_bytes());
            }
            _ => {}
        }
    }

    fn csi_decstbm(&mut self, p: &[u16]) {
        let top = count(p, 0) - 1;
        if self.screen_mut().set_region(top, param(p, 1)) {
            self.home();
        }
    }

    fn csi_save(&mut self, _: &[u16]) {
        let origin = self.modes.contains(Modes::ORIGIN);
        self.screen_mut().save_cursor(origin);
    }

    fn csi_restore(&mut self, _: &[u16]) {
        self.screen_mut().restore_cursor();
    }

    // ── resets and resize ──

    /// DECSTR: modes, pen and region back to defaults; content stays.
    fn soft_reset(&mut self) {
        self.modes
            .remove(Modes::CURSOR_KEYS | Modes::ORIGIN | Modes::INSERT | Modes::APP_KEYPAD);
        self.modes.insert(Modes::AUTOWRAP | Modes::CURSOR_VISIBLE);
        let screen = self.screen_mut();
        screen.set_pen(Color::RESET);
        let height = screen.height();
        screen.set_region(0, height);
    }

    /// RIS.
    pub fn full_reset(&mut self) {
        self.primary.clear();
        self.primary.clear_scrollback();
        self.alternate.clear();
        self.alt_active = false;
        self.modes = Modes::default();
        self.mouse = MouseTracking::Off;
        self.tab_stops = default_tab_stops(self.primary.width());
        self.last_printed = None;
        tracing::debug!("terminal reset");
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.primary.resize(width, height);
        self.alternate.resize(width, height);
        self.tab_stops
            .resize(usize::from(self.primary.width()), false);
        for (x, stop) in self.tab_stops.iter_mut().enumerate() {
            if x > 0 && x % usize::from(TAB_WIDTH) == 0 {
                *stop = true;
            }
        }
        tracing::debug!(width, height, "terminal resized");
    }

    /// Paint the visible screen into `canvas` at its origin.
    pub fn paint(&self, canvas: &mut Canvas) {
        for (y, row) in self.screen().rows().iter().enumerate() {
            for (x, cell) in row.cells.iter().enumerate() {
                canvas.put(x as i32, y as i32, cell.glyph.clone(), &cell.color);
            }
        }
    }
}

fn default_tab_stops(width: u16) -> Vec<bool> {
    (0..width).map(|x| x > 0 && x % TAB_WIDTH == 0).collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tracing_test::traced_test;
    use ttk_core::SlotError;
    use ttk_style::Rgb;

    use super::*;

    fn term(input: &str) -> Terminal {
        let mut t = Terminal::new(20, 5);
        t.feed(input.as_bytes()).unwrap();
        t
    }

    fn text(t: &Terminal, y: u16) -> String {
        t.screen().row_text(y).unwrap().trim_end().to_owned()
    }

    // ── cursor and erase ──

    #[test]
    fn cup_and_relative_moves() {
        let t = term("\x1b[3;5Hx\x1b[2Ay\x1b[10D\x1b[Bz");
        assert_eq!(text(&t, 2), "    x");
        assert_eq!(text(&t, 0), "     y");
        assert_eq!(text(&t, 1), "z");
    }

    #[test]
    fn erase_in_line_and_display() {
        let t = term("abcdef\x1b[1;3H\x1b[K\r\nxyz\x1b[1J");
        assert_eq!(text(&t, 0), "");
        assert_eq!(text(&t, 1), "");
        let t = term("abcdef\x1b[1;3H\x1b[1K");
        assert_eq!(text(&t, 0), "   def");
    }

    #[test]
    fn tabs_and_tab_stops() {
        let t = term("a\tb");
        assert_eq!(t.screen().cell(8, 0).unwrap().glyph.to_string(), "b");
        let t = term("\x1b[3g\x1b[4G\x1bH\r\tq");
        assert_eq!(t.screen().cursor(), (4, 0));
        assert_eq!(text(&t, 0), "   q");
    }

    #[test]
    fn scroll_region_with_origin_mode() {
        let t = term("\x1b[2;4r\x1b[?6h\x1b[1;1Hx\x1b[9;1Hy");
        assert_eq!(text(&t, 1), "x");
        assert_eq!(text(&t, 3), "y");
        assert!(t.modes().contains(Modes::ORIGIN));
    }

    #[test]
    fn repeat_last_character() {
        let t = term("-\x1b[4b");
        assert_eq!(text(&t, 0), "-----");
    }

    // ── modes ──

    #[test]
    fn dec_modes_toggle() {
        let t = term("\x1b[?1h\x1b[?25l\x1b[?1002h\x1b[?1006h\x1b[?2004h");
        assert!(t.modes().contains(Modes::CURSOR_KEYS | Modes::SGR_MOUSE | Modes::BRACKETED_PASTE));
        assert!(!t.cursor_visible());
        assert_eq!(t.mouse_tracking(), MouseTracking::Drag);
        let t = term("\x1b[?1002h\x1b[?1002l\x1b[4h");
        assert_eq!(t.mouse_tracking(), MouseTracking::Off);
        assert!(t.modes().contains(Modes::INSERT));
    }

    #[test]
    fn alternate_screen_saves_cursor() {
        let mut t = term("main\x1b[2;3H");
        t.feed(b"\x1b[?1049h").unwrap();
        assert!(t.is_alternate());
        assert_eq!(text(&t, 0), "");
        t.feed(b"\x1b[5;5Halt").unwrap();
        t.feed(b"\x1b[?1049l").unwrap();
        assert!(!t.is_alternate());
        assert_eq!(text(&t, 0), "main");
        assert_eq!(t.screen().cursor(), (2, 1));
    }

    #[test]
    fn decsc_restores_pen() {
        let t = term("\x1b[1m\x1b7\x1b[0m\x1b8x");
        assert!(t.screen().cell(0, 0).unwrap().color.has_bold());
    }

    // ── signals and replies ──

    #[test]
    fn title_and_bell_signals() {
        let mut t = Terminal::new(10, 2);
        let titles = Rc::new(RefCell::new(Vec::new()));
        let bells = Rc::new(RefCell::new(0));
        let seen = Rc::clone(&titles);
        t.title_changed()
            .connect_ok(move |title: &String| seen.borrow_mut().push(title.clone()));
        let rang = Rc::clone(&bells);
        t.bell().connect_ok(move |_| *rang.borrow_mut() += 1);

        t.feed(b"\x1b]0;first\x07\x1b]2;second\x1b\\\x07").unwrap();
        assert_eq!(*titles.borrow(), vec!["first".to_owned(), "second".to_owned()]);
        assert_eq!(*bells.borrow(), 1);
        assert_eq!(t.title(), "second");
    }

    #[test]
    fn receiver_error_does_not_stop_parsing() {
        let mut t = Terminal::new(10, 2);
        t.bell().connect(|_| Err(SlotError::new("nope")));
        assert!(t.feed(b"a\x07b").is_err());
        assert_eq!(text(&t, 0), "ab");
    }

    #[test]
    fn cursor_position_report() {
        let mut t = term("\x1b[3;7H\x1b[6n\x1b[c");
        assert_eq!(t.take_replies(), b"\x1b[3;7R\x1b[?1;2c");
        assert!(t.take_replies().is_empty());
    }

    #[test]
    fn osc8_links_cells() {
        let t = term("\x1b]8;;https://example.com\x1b\\ab\x1b]8;;\x1b\\c");
        let cell = |x| t.screen().cell(x, 0).unwrap().color.hyperlink().map(str::to_owned);
        assert_eq!(cell(0).as_deref(), Some("https://example.com"));
        assert_eq!(cell(1).as_deref(), Some("https://example.com"));
        assert_eq!(cell(2), None);
    }

    #[test]
    #[traced_test]
    fn malformed_sequences_are_logged() {
        let mut t = Terminal::new(10, 2);
        t.feed(b"\x1b]0;\x1bXtail").unwrap();
        assert_eq!(t.parser().errors(), 1);
        assert!(logs_contain("discarding malformed VT input"));
    }

    // ── painting ──

    #[test]
    fn paint_copies_cells() {
        let t = term("\x1b[32mok");
        let mut canvas = Canvas::new(20, 5);
        t.paint(&mut canvas);
        assert_eq!(canvas.row_text(0).unwrap().trim_end(), "ok");
        assert_eq!(
            canvas.get(0, 0).unwrap().color.foreground(),
            Some(Rgb::new(0, 0xAA, 0))
        );
    }

    #[test]
    fn full_reset_clears_everything() {
        let t = term("\x1b[?1049h\x1b[31mx\x1bc");
        assert!(!t.is_alternate());
        assert_eq!(t.screen().pen(), &Color::RESET);
        assert_eq!(t.modes(), Modes::default());
    }
}
