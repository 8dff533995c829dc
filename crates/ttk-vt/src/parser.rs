#![forbid(unsafe_code)]

//! VT escape-sequence parser.
//!
//! A byte-at-a-time state machine after the DEC VT500 model as implemented by
//! xterm. It turns a program's output stream into [`Action`]s:
//!
//! - printable text (ASCII and UTF-8) -> [`Action::Print`], one char each
//! - C0 controls -> [`Action::Execute`]
//! - `ESC` sequences, including the 7-bit C1 forms -> [`Action::Escape`]
//! - `CSI` sequences -> [`Action::Sgr`], [`Action::DecSet`], [`Action::DecRst`]
//!   or the generic [`Action::Csi`]
//! - `OSC` strings -> [`Action::Osc`]; `DCS` strings -> [`Action::Dcs`]
//! - `SOS`/`PM`/`APC` strings are consumed and dropped
//!
//! Every byte is consumed exactly once. Partial sequences stay buffered
//! across [`Parser::feed`] calls. Malformed input never fails: it is counted
//! ([`Parser::errors`]), logged at debug level and discarded, and the parser
//! goes back to [`State::Ground`]. `CAN` and `SUB` cancel any sequence.
//! Sequence length is bounded, so the parser is back in `Ground` at most
//! [`MAX_STRING_LEN`] bytes after any malformed prefix.

/// Parameters kept per CSI/DCS sequence; extra ones are dropped.
pub const MAX_PARAMS: usize = 32;
/// Intermediate bytes kept per sequence; more marks the sequence malformed.
pub const MAX_INTERMEDIATES: usize = 2;
/// Longest `ESC`/`CSI` sequence accepted, in bytes.
pub const MAX_SEQUENCE_LEN: usize = 256;
/// Longest `OSC`/`DCS`/`SOS`/`PM`/`APC` string accepted, in bytes.
pub const MAX_STRING_LEN: usize = 4096;

const CAN: u8 = 0x18;
const SUB: u8 = 0x1a;
const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// Parser output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// One printable character.
    Print(char),
    /// A C0 control (`BEL`, `BS`, `HT`, `LF`, `CR`, ...).
    Execute(u8),
    /// `ESC [intermediates] final`, covering the 7-bit C1 controls such as
    /// `ESC D` (IND) and `ESC M` (RI).
    Escape { intermediates: Vec<u8>, final_byte: u8 },
    /// Any CSI sequence other than SGR and DEC private mode set/reset.
    Csi {
        private: Option<u8>,
        params: Vec<u16>,
        intermediates: Vec<u8>,
        final_byte: u8,
    },
    /// `CSI … m`. An empty list means reset.
    Sgr(Vec<u16>),
    /// `CSI ? … h`.
    DecSet(Vec<u16>),
    /// `CSI ? … l`.
    DecRst(Vec<u16>),
    /// `OSC ps ; pt` terminated by `BEL` or `ST`.
    Osc { ps: u16, pt: String },
    /// `DCS … final data ST`.
    Dcs {
        private: Option<u8>,
        params: Vec<u16>,
        intermediates: Vec<u8>,
        final_byte: u8,
        data: Vec<u8>,
    },
}

/// Parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum State {
    #[default]
    Ground,
    Escape,
    Csi,
    Osc,
    Dcs,
    SosPmApc,
    /// `ESC` seen inside a string; `\` completes the `ST`.
    StringTerminator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Osc,
    Dcs,
    Ignored,
}

/// VT parser.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    string_kind: StringKind,
    private: Option<u8>,
    params: Vec<u8>,
    intermediates: Vec<u8>,
    /// Final byte of a DCS header, once seen.
    dcs_final: Option<u8>,
    data: Vec<u8>,
    malformed: bool,
    seq_len: usize,
    utf8: [u8; 4],
    utf8_len: u8,
    utf8_need: u8,
    errors: u64,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Ground,
            string_kind: StringKind::Ignored,
            private: None,
            params: Vec::new(),
            intermediates: Vec::new(),
            dcs_final: None,
            data: Vec::new(),
            malformed: false,
            seq_len: 0,
            utf8: [0; 4],
            utf8_len: 0,
            utf8_need: 0,
            errors: 0,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// In `Ground` with no partial UTF-8 character pending.
    pub fn is_ground(&self) -> bool {
        self.state == State::Ground && self.utf8_need == 0
    }

    /// Malformed sequences discarded so far.
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Drop any partial sequence.
    pub fn reset(&mut self) {
        self.clear();
        self.utf8_len = 0;
        self.utf8_need = 0;
    }

    /// Feed a chunk of bytes and collect the resulting actions.
    #[must_use]
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Action> {
        bytes.iter().filter_map(|&b| self.advance(b)).collect()
    }

    /// Advance by one byte.
    pub fn advance(&mut self, b: u8) -> Option<Action> {
        if self.state != State::Ground {
            if matches!(b, CAN | SUB) {
                self.clear();
                return None;
            }
            self.seq_len += 1;
            let limit = match self.state {
                State::Escape | State::Csi => MAX_SEQUENCE_LEN,
                _ => MAX_STRING_LEN,
            };
            if self.seq_len > limit {
                self.error("sequence too long");
                self.clear();
                return None;
            }
        }
        match self.state {
            State::Ground => self.ground(b),
            State::Escape => self.escape(b),
            State::Csi => self.csi(b),
            State::Osc | State::Dcs | State::SosPmApc => self.string(b),
            State::StringTerminator => self.string_terminator(b),
        }
    }

    fn error(&mut self, what: &'static str) {
        self.errors += 1;
        tracing::debug!(what, state = ?self.state, "discarding malformed VT input");
    }

    fn clear(&mut self) {
        self.state = State::Ground;
        self.private = None;
        self.params.clear();
        self.intermediates.clear();
        self.dcs_final = None;
        self.data.clear();
        self.malformed = false;
        self.seq_len = 0;
    }

    fn enter(&mut self, state: State) {
        self.clear();
        self.state = state;
    }

    // ── ground ──

    fn ground(&mut self, b: u8) -> Option<Action> {
        if self.utf8_need > 0 {
            if (0x80..=0xbf).contains(&b) {
                self.utf8[usize::from(self.utf8_len)] = b;
                self.utf8_len += 1;
                self.utf8_need -= 1;
                if self.utf8_need > 0 {
                    return None;
                }
                let len = usize::from(self.utf8_len);
                self.utf8_len = 0;
                let ch = std::str::from_utf8(&self.utf8[..len])
                    .ok()
                    .and_then(|s| s.chars().next());
                if ch.is_none() {
                    self.error("invalid UTF-8");
                }
                return ch.map(Action::Print);
            }
            self.utf8_need = 0;
            self.utf8_len = 0;
            self.error("truncated UTF-8");
        }
        match b {
            ESC => {
                self.enter(State::Escape);
                None
            }
            0x00..=0x1f => Some(Action::Execute(b)),
            0x20..=0x7e => Some(Action::Print(char::from(b))),
            0x7f => None,
            0xc2..=0xdf => self.start_utf8(b, 1),
            0xe0..=0xef => self.start_utf8(b, 2),
            0xf0..=0xf4 => self.start_utf8(b, 3),
            _ => {
                self.error("invalid UTF-8 lead byte");
                None
            }
        }
    }

    fn start_utf8(&mut self, b: u8, continuation: u8) -> Option<Action> {
        self.utf8[0] = b;
        self.utf8_len = 1;
        self.utf8_need = continuation;
        None
    }

    // ── escape ──

    fn push_intermediate(&mut self, b: u8) {
        if self.intermediates.len() < MAX_INTERMEDIATES {
            self.intermediates.push(b);
        } else {
            self.malformed = true;
        }
    }

    fn escape(&mut self, b: u8) -> Option<Action> {
        let plain = self.intermediates.is_empty();
        match b {
            ESC => {
                self.error("escape restarted");
                self.enter(State::Escape);
                None
            }
            0x00..=0x1f => Some(Action::Execute(b)),
            0x20..=0x2f => {
                self.push_intermediate(b);
                None
            }
            b'[' if plain => {
                self.enter(State::Csi);
                None
            }
            b']' if plain => self.begin_string(StringKind::Osc, State::Osc),
            b'P' if plain => self.begin_string(StringKind::Dcs, State::Dcs),
            b'X' | b'^' | b'_' if plain => self.begin_string(StringKind::Ignored, State::SosPmApc),
            0x30..=0x7e => {
                let malformed = self.malformed;
                let intermediates = std::mem::take(&mut self.intermediates);
                self.clear();
                if malformed {
                    self.error("too many escape intermediates");
                    return None;
                }
                Some(Action::Escape {
                    intermediates,
                    final_byte: b,
                })
            }
            0x7f => None,
            _ => {
                self.error("unexpected byte in escape");
                self.clear();
                None
            }
        }
    }

    // ── csi ──

    fn csi(&mut self, b: u8) -> Option<Action> {
        match b {
            ESC => {
                self.error("unterminated CSI");
                self.enter(State::Escape);
                None
            }
            0x00..=0x1f => Some(Action::Execute(b)),
            0x30..=0x3b => {
                if self.intermediates.is_empty() {
                    self.params.push(b);
                } else {
                    self.malformed = true;
                }
                None
            }
            0x3c..=0x3f => {
                if self.params.is_empty() && self.private.is_none() && self.intermediates.is_empty()
                {
                    self.private = Some(b);
                } else {
                    self.malformed = true;
                }
                None
            }
            0x20..=0x2f => {
                self.push_intermediate(b);
                None
            }
            0x40..=0x7e => self.dispatch_csi(b),
            0x7f => None,
            _ => {
                self.malformed = true;
                None
            }
        }
    }

    fn dispatch_csi(&mut self, final_byte: u8) -> Option<Action> {
        if self.malformed {
            self.error("malformed CSI");
            self.clear();
            return None;
        }
        let params = parse_params(&self.params);
        let private = self.private;
        let intermediates = std::mem::take(&mut self.intermediates);
        self.clear();
        Some(match (private, intermediates.is_empty(), final_byte) {
            (None, true, b'm') => Action::Sgr(params),
            (Some(b'?'), true, b'h') => Action::DecSet(params),
            (Some(b'?'), true, b'l') => Action::DecRst(params),
            _ => Action::Csi {
                private,
                params,
                intermediates,
                final_byte,
            },
        })
    }

    // ── strings ──

    fn begin_string(&mut self, kind: StringKind, state: State) -> Option<Action> {
        self.enter(state);
        self.string_kind = kind;
        None
    }

    fn string(&mut self, b: u8) -> Option<Action> {
        match b {
            ESC => {
                self.state = State::StringTerminator;
                None
            }
            BEL if self.string_kind == StringKind::Osc => self.finish_string(),
            _ if self.string_kind == StringKind::Dcs && self.dcs_final.is_none() => {
                self.dcs_header(b);
                None
            }
            0x00..=0x1f => None,
            _ => {
                if self.string_kind != StringKind::Ignored {
                    self.data.push(b);
                }
                None
            }
        }
    }

    fn dcs_header(&mut self, b: u8) {
        match b {
            0x30..=0x3b if self.intermediates.is_empty() => self.params.push(b),
            0x3c..=0x3f if self.params.is_empty() && self.private.is_none() => {
                self.private = Some(b);
            }
            0x20..=0x2f => self.push_intermediate(b),
            0x40..=0x7e => self.dcs_final = Some(b),
            _ => self.malformed = true,
        }
    }

    fn string_terminator(&mut self, b: u8) -> Option<Action> {
        if b == b'\\' {
            return self.finish_string();
        }
        self.error("string interrupted by escape");
        self.enter(State::Escape);
        self.escape(b)
    }

    fn finish_string(&mut self) -> Option<Action> {
        let kind = self.string_kind;
        let malformed = self.malformed;
        let data = std::mem::take(&mut self.data);
        let params = parse_params(&self.params);
        let private = self.private;
        let intermediates = std::mem::take(&mut self.intermediates);
        let dcs_final = self.dcs_final;
        self.clear();
        match kind {
            StringKind::Ignored => None,
            StringKind::Osc => {
                let (ps, pt) = match data.iter().position(|&c| c == b';') {
                    Some(i) => (&data[..i], &data[i + 1..]),
                    None => (&data[..], &[][..]),
                };
                match parse_number(ps) {
                    Some(ps) => Some(Action::Osc {
                        ps,
                        pt: String::from_utf8_lossy(pt).into_owned(),
                    }),
                    None => {
                        self.error("non-numeric OSC command");
                        None
                    }
                }
            }
            StringKind::Dcs => match dcs_final {
                Some(final_byte) if !malformed => Some(Action::Dcs {
                    private,
                    params,
                    intermediates,
                    final_byte,
                    data,
                }),
                _ => {
                    self.error("malformed DCS header");
                    None
                }
            },
        }
    }
}

/// Decimal value, saturating at `u16::MAX`. `None` for empty or non-digit input.
fn parse_number(bytes: &[u8]) -> Option<u16> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(bytes.iter().fold(0u16, |acc, &d| {
        acc.saturating_mul(10).saturating_add(u16::from(d - b'0'))
    }))
}

/// Split parameter bytes on `;` and `:`; an empty field is 0.
fn parse_params(bytes: &[u8]) -> Vec<u16> {
    if bytes.is_empty() {
        return Vec::new();
    }
    bytes
        .split(|&c| c == b';' || c == b':')
        .take(MAX_PARAMS)
        .map(|field| parse_number(field).unwrap_or(0))
        .collect()
}
