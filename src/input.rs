#![warn(clippy::all, clippy::pedantic)]
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{collections::VecDeque, io, time::Duration};

pub const ESC: u8 = 0x1b;
pub const ENTER: u8 = b'\r';
const DEL: u8 = 127;

/// Takes an ASCII letter.
/// Returns the byte the terminal sends for that letter with Ctrl held.
#[must_use]
pub const fn ctrl(key: u8) -> u8 {
    key & 0x1f
}

/// One logical key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable byte, or any byte outside ASCII.
    Char(u8),
    /// A byte below 0x20 other than ESC, including Enter and Tab.
    Control(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    Delete,
    Backspace,
    /// ESC alone, or an escape sequence that did not resolve to a key.
    Escape,
}

impl Key {
    /// Takes a byte read outside an escape sequence.
    /// Returns the key it stands for.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            ESC => Key::Escape,
            DEL => Key::Backspace,
            b if b < 0x20 => Key::Control(b),
            b => Key::Char(b),
        }
    }
}

/// Where the decoder reads bytes from.
pub trait ByteSource {
    /// Takes itself and the longest time to wait.
    /// Returns the next byte, or `None` when nothing arrived in time.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying device cannot be read.
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>>;
}

impl ByteSource for VecDeque<u8> {
    fn read_byte(&mut self, _timeout: Duration) -> io::Result<Option<u8>> {
        Ok(self.pop_front())
    }
}

/// Position inside an escape sequence.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    #[default]
    Ground,
    SawEscape,
    /// `ESC [`
    SawBracket,
    /// `ESC O`
    SawSs3,
    /// `ESC [` and a digit, waiting for `~`.
    SawBracketDigit(u8),
}

/// Outcome of feeding one read to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Pending(DecodeState),
    Emit(Key),
}

impl DecodeState {
    /// Takes itself and the result of one bounded read.
    /// Returns the next state, or the key the sequence resolved to.
    #[must_use]
    pub fn step(self, byte: Option<u8>) -> Step {
        match (self, byte) {
            (DecodeState::Ground, None) => Step::Pending(DecodeState::Ground),
            (DecodeState::Ground, Some(ESC)) => Step::Pending(DecodeState::SawEscape),
            (DecodeState::Ground, Some(b)) => Step::Emit(Key::from_byte(b)),

            (DecodeState::SawEscape, Some(b'[')) => Step::Pending(DecodeState::SawBracket),
            (DecodeState::SawEscape, Some(b'O')) => Step::Pending(DecodeState::SawSs3),

            (DecodeState::SawBracket, Some(d)) if d.is_ascii_digit() => {
                Step::Pending(DecodeState::SawBracketDigit(d))
            }
            (DecodeState::SawBracket, Some(b'A')) => Step::Emit(Key::ArrowUp),
            (DecodeState::SawBracket, Some(b'B')) => Step::Emit(Key::ArrowDown),
            (DecodeState::SawBracket, Some(b'C')) => Step::Emit(Key::ArrowRight),
            (DecodeState::SawBracket, Some(b'D')) => Step::Emit(Key::ArrowLeft),
            (DecodeState::SawBracket | DecodeState::SawSs3, Some(b'H')) => Step::Emit(Key::Home),
            (DecodeState::SawBracket | DecodeState::SawSs3, Some(b'F')) => Step::Emit(Key::End),

            (DecodeState::SawBracketDigit(digit), Some(b'~')) => Step::Emit(match digit {
                b'1' | b'7' => Key::Home,
                b'3' => Key::Delete,
                b'4' | b'8' => Key::End,
                b'5' => Key::PageUp,
                b'6' => Key::PageDown,
                _ => Key::Escape,
            }),

            (state, byte) => {
                tracing::trace!(?state, ?byte, "unrecognized escape sequence");
                Step::Emit(Key::Escape)
            }
        }
    }
}

/// Takes a byte source and the wait allowed between bytes of a sequence.
/// Blocks until a whole key has been read.
///
/// # Errors
///
/// Returns an error if the source cannot be read.
pub fn read_key<S: ByteSource + ?Sized>(source: &mut S, timeout: Duration) -> io::Result<Key> {
    let mut state = DecodeState::Ground;
    loop {
        let byte = source.read_byte(timeout)?;
        match state.step(byte) {
            Step::Emit(key) => return Ok(key),
            Step::Pending(next) => state = next,
        }
    }
}

/// Takes a platform key event and a byte queue.
/// Appends the bytes a VT100 terminal would send for the key, so that every
/// key reaches the editor through the same decoder.
pub fn encode(event: &KeyEvent, out: &mut VecDeque<u8>) {
    if event.kind == KeyEventKind::Release {
        return;
    }
    let sequence: &[u8] = match event.code {
        KeyCode::Up => b"\x1b[A",
        KeyCode::Down => b"\x1b[B",
        KeyCode::Right => b"\x1b[C",
        KeyCode::Left => b"\x1b[D",
        KeyCode::PageUp => b"\x1b[5~",
        KeyCode::PageDown => b"\x1b[6~",
        KeyCode::Home => b"\x1b[1~",
        KeyCode::End => b"\x1b[4~",
        KeyCode::Delete => b"\x1b[3~",
        KeyCode::Backspace => &[DEL],
        KeyCode::Enter => &[ENTER],
        KeyCode::Tab => b"\t",
        KeyCode::Esc => &[ESC],
        KeyCode::Null => &[0],
        KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) && c.is_ascii() => {
            out.push_back(ctrl(c.to_ascii_lowercase() as u8));
            return;
        }
        KeyCode::Char(c) => {
            let mut utf8 = [0; 4];
            out.extend(c.encode_utf8(&mut utf8).bytes());
            return;
        }
        _ => return,
    };
    out.extend(sequence);
}
