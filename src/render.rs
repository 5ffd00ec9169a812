#![warn(clippy::all, clippy::pedantic)]
use crate::{FileBuffer, Highlight, Row, Size};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    style::{Attribute, Color, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::{
    io::{self, Write},
    time::{Duration, Instant},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const FILE_NAME_WIDTH: usize = 20;

/// The text on the message line and when it was set.
#[derive(Debug)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            set_at: Instant::now(),
        }
    }

    /// Takes itself and how long messages stay up.
    /// Returns the text, or nothing once it has expired.
    #[must_use]
    pub fn visible(&self, timeout: Duration) -> &str {
        if self.set_at.elapsed() < timeout {
            &self.text
        } else {
            ""
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Takes a buffer whose viewport is already shifted, the text area size and
/// the message to show.
/// Returns the whole frame as one buffer, ready to be written at once.
///
/// # Errors
///
/// Only fails if formatting into the buffer fails.
pub fn draw(buffer: &FileBuffer, size: &Size, message: &str) -> io::Result<Vec<u8>> {
    let mut frame = Vec::new();
    write!(frame, "{Hide}{}", MoveTo(0, 0))?;
    draw_rows(&mut frame, buffer, size)?;
    draw_status_bar(&mut frame, buffer, size)?;
    draw_message_bar(&mut frame, size, message)?;
    let x = buffer.rx.saturating_sub(buffer.offset.x);
    let y = buffer.cursor.y.saturating_sub(buffer.offset.y);
    write!(
        frame,
        "{}{Show}",
        MoveTo(
            u16::try_from(x).unwrap_or(u16::MAX),
            u16::try_from(y).unwrap_or(u16::MAX)
        )
    )?;
    Ok(frame)
}

/// Takes nothing.
/// Returns a frame that blanks the screen and homes the cursor.
///
/// # Errors
///
/// Only fails if formatting into the buffer fails.
pub fn clear_frame() -> io::Result<Vec<u8>> {
    let mut frame = Vec::new();
    write!(frame, "{}{}", Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(frame)
}

fn draw_welcome_msg(frame: &mut Vec<u8>, width: usize) {
    let mut welcome = format!("Wilo editor -- version {VERSION}");
    welcome.truncate(width);
    let mut padding = (width - welcome.len()) / 2;
    if padding > 0 {
        frame.push(b'~');
        padding -= 1;
    }
    frame.extend(std::iter::repeat(b' ').take(padding));
    frame.extend_from_slice(welcome.as_bytes());
}

fn draw_rows(frame: &mut Vec<u8>, buffer: &FileBuffer, size: &Size) -> io::Result<()> {
    let height = usize::from(size.height);
    let width = usize::from(size.width);
    for terminal_row in 0..height {
        if let Some(row) = buffer.row(terminal_row + buffer.offset.y) {
            draw_row(frame, row, buffer.offset.x, width)?;
        } else if buffer.is_empty() && buffer.offset.y == 0 && terminal_row == height / 3 {
            draw_welcome_msg(frame, width);
        } else {
            frame.push(b'~');
        }
        write!(frame, "{}\r\n", Clear(ClearType::UntilNewLine))?;
    }
    Ok(())
}

/// Takes a frame, a row, the horizontal scroll and the screen width.
/// Draws the visible slice of the row, switching color only where it changes.
pub fn draw_row(frame: &mut Vec<u8>, row: &Row, col_offset: usize, width: usize) -> io::Result<()> {
    let render = row.render();
    let start = col_offset.min(render.len());
    let end = col_offset.saturating_add(width).min(render.len());
    let mut current: Option<Color> = None;
    let mut inverted = false;

    for (&byte, &class) in render[start..end].iter().zip(&row.highlight[start..end]) {
        if byte.is_ascii_control() {
            let symbol = if byte <= 26 { b'@' + byte } else { b'?' };
            write!(frame, "{}", SetAttribute(Attribute::Reverse))?;
            frame.push(symbol);
            write!(frame, "{}", SetAttribute(Attribute::Reset))?;
            if let Some(color) = current {
                write!(frame, "{}", SetForegroundColor(color))?;
            }
            if inverted {
                write!(frame, "{}", SetAttribute(Attribute::Reverse))?;
            }
            continue;
        }

        let want_inverted = class == Highlight::SearchMatch;
        if want_inverted != inverted {
            let attribute = if want_inverted {
                Attribute::Reverse
            } else {
                Attribute::NoReverse
            };
            write!(frame, "{}", SetAttribute(attribute))?;
            inverted = want_inverted;
        }

        let color = (class != Highlight::Normal).then(|| class.color());
        if color != current {
            write!(frame, "{}", SetForegroundColor(color.unwrap_or(Color::Reset)))?;
            current = color;
        }
        frame.push(byte);
    }

    if inverted {
        write!(frame, "{}", SetAttribute(Attribute::NoReverse))?;
    }
    write!(frame, "{}", SetForegroundColor(Color::Reset))
}

fn draw_status_bar(frame: &mut Vec<u8>, buffer: &FileBuffer, size: &Size) -> io::Result<()> {
    let width = usize::from(size.width);
    let file_name: String = buffer.file_path.as_ref().map_or_else(
        || "[No Name]".to_string(),
        |path| path.to_string_lossy().chars().take(FILE_NAME_WIDTH).collect(),
    );
    let dirty_status = if buffer.is_dirty() { "(modified)" } else { "" };
    let status = format!("{file_name} - {} lines {dirty_status}", buffer.len());
    let right = format!(
        "{} | {}/{}",
        buffer.syntax().map_or("no ft", |s| s.file_type),
        buffer.cursor.y + 1,
        buffer.len()
    );

    let mut line: String = status.chars().take(width).collect();
    let mut len = line.chars().count();
    let right_len = right.chars().count();
    while len < width {
        if width - len == right_len {
            line.push_str(&right);
            break;
        }
        line.push(' ');
        len += 1;
    }

    write!(
        frame,
        "{}{line}{}\r\n",
        SetAttribute(Attribute::Reverse),
        SetAttribute(Attribute::Reset)
    )
}

fn draw_message_bar(frame: &mut Vec<u8>, size: &Size, message: &str) -> io::Result<()> {
    write!(frame, "{}", Clear(ClearType::UntilNewLine))?;
    let message: String = message.chars().take(usize::from(size.width)).collect();
    frame.extend_from_slice(message.as_bytes());
    Ok(())
}
