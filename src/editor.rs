#![warn(clippy::all, clippy::pedantic)]
use crate::{
    error::Result,
    input::{self, ctrl, ENTER},
    render::{self, StatusMessage},
    search::Search,
    Config, Console, FileBuffer, Key,
};
use std::path::PathBuf;

const CTRL_F: u8 = ctrl(b'f');
const CTRL_H: u8 = ctrl(b'h');
const CTRL_L: u8 = ctrl(b'l');
const CTRL_Q: u8 = ctrl(b'q');
const CTRL_S: u8 = ctrl(b's');

pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

pub struct Editor<C: Console> {
    should_quit: bool,
    console: C,
    buffer: FileBuffer,
    config: Config,
    message: StatusMessage,
    quit_times: u8,
}

impl<C: Console> Editor<C> {
    /// Takes a console, the document to edit and the session config.
    /// Builds an `Editor` showing the help message.
    pub fn new(console: C, buffer: FileBuffer, config: Config) -> Self {
        Self {
            should_quit: false,
            console,
            buffer,
            config,
            message: StatusMessage::new(HELP_MESSAGE),
            quit_times: config.quit_times,
        }
    }

    /// Takes itself.
    /// Runs the editor until the user quits, then blanks the screen and
    /// restores the console.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be read, written or restored.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("editor started");
        while !self.should_quit {
            self.refresh_screen()?;
            self.process_keypress()?;
        }
        self.console.write_frame(&render::clear_frame()?)?;
        self.console.restore()?;
        tracing::info!("editor quit");
        Ok(())
    }

    #[must_use]
    pub fn buffer(&self) -> &FileBuffer {
        &self.buffer
    }

    #[must_use]
    pub fn console(&self) -> &C {
        &self.console
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.message.text()
    }

    fn set_message(&mut self, text: impl Into<String>) {
        self.message = StatusMessage::new(text);
    }

    /// Takes itself.
    /// Scrolls the viewport to the cursor and redraws the whole screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be written.
    pub fn refresh_screen(&mut self) -> Result<()> {
        let size = self.console.size();
        self.buffer.shift_viewport(&size);
        let frame = render::draw(
            &self.buffer,
            &size,
            self.message.visible(self.config.message_timeout),
        )?;
        self.console.write_frame(&frame)
    }

    fn read_key(&mut self) -> Result<Key> {
        Ok(input::read_key(
            &mut self.console,
            self.config.escape_timeout,
        )?)
    }

    /// Takes itself.
    /// Reads one key and applies it to the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be read or written.
    pub fn process_keypress(&mut self) -> Result<()> {
        let key = self.read_key()?;
        match key {
            Key::Control(ENTER) => self.buffer.insert_newline(),
            Key::Control(CTRL_Q) => {
                if self.buffer.is_dirty() && self.quit_times > 0 {
                    self.set_message(format!(
                        "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit",
                        self.quit_times
                    ));
                    self.quit_times -= 1;
                    return Ok(());
                }
                self.should_quit = true;
            }
            Key::Control(CTRL_S) => self.save()?,
            Key::Control(CTRL_F) => self.find()?,
            Key::Home => self.buffer.home(),
            Key::End => self.buffer.end(),
            Key::Backspace | Key::Control(CTRL_H) => self.buffer.delete_char(),
            Key::Delete => {
                self.buffer.move_cursor(Key::ArrowRight);
                self.buffer.delete_char();
            }
            Key::PageUp | Key::PageDown => {
                let screen_rows = usize::from(self.console.size().height);
                self.buffer.page(key, screen_rows);
            }
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.buffer.move_cursor(key);
            }
            Key::Control(CTRL_L | 0) | Key::Escape => (),
            Key::Char(byte) | Key::Control(byte) => self.buffer.insert_char(byte),
        }
        self.quit_times = self.config.quit_times;
        Ok(())
    }

    /// Takes itself.
    /// Saves the document, asking for a file name first if it has none.
    /// I/O failures are reported on the message line.
    fn save(&mut self) -> Result<()> {
        if self.buffer.file_path.is_none() {
            let Some(name) = self.prompt("Save as: ", "", |_, _, _| ())? else {
                self.set_message("Save aborted");
                return Ok(());
            };
            self.buffer.set_file_path(PathBuf::from(name));
        }
        match self.buffer.save() {
            Ok(bytes) => self.set_message(format!("{bytes} bytes written to disk")),
            Err(error) => {
                tracing::warn!(%error, "save failed");
                self.set_message(format!("Can't save! I/O error: {}", error.reason()));
            }
        }
        Ok(())
    }

    /// Takes itself.
    /// Runs an incremental search. Cancelling puts the cursor and scroll back.
    fn find(&mut self) -> Result<()> {
        let snapshot = self.buffer.snapshot_view();
        let mut search = Search::default();
        let query = self.prompt("Search: ", " (Use ESC/Arrows/Enter)", |buffer, query, key| {
            search.step(buffer, query, key);
        })?;
        if query.is_none() {
            self.buffer.restore_view(snapshot);
        }
        Ok(())
    }

    /// Takes itself, the text around the answer, and a callback run after
    /// every key with the document, the answer so far and the key.
    /// Returns the answer, or `None` if the user pressed Escape.
    ///
    /// # Errors
    ///
    /// Returns an error if the console cannot be read or written.
    pub fn prompt<F>(&mut self, label: &str, hint: &str, mut callback: F) -> Result<Option<String>>
    where
        F: FnMut(&mut FileBuffer, &str, Key),
    {
        let mut answer = String::new();
        loop {
            self.set_message(format!("{label}{answer}{hint}"));
            self.refresh_screen()?;

            let key = self.read_key()?;
            match key {
                Key::Delete | Key::Backspace | Key::Control(CTRL_H) => {
                    answer.pop();
                }
                Key::Escape => {
                    self.set_message("");
                    callback(&mut self.buffer, &answer, key);
                    return Ok(None);
                }
                Key::Control(ENTER) if !answer.is_empty() => {
                    self.set_message("");
                    callback(&mut self.buffer, &answer, key);
                    return Ok(Some(answer));
                }
                Key::Char(byte) if byte.is_ascii() => answer.push(char::from(byte)),
                _ => (),
            }
            callback(&mut self.buffer, &answer, key);
        }
    }
}
