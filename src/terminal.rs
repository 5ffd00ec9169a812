#![warn(clippy::all, clippy::pedantic)]
use crate::{
    error::{Error, Result},
    input::{self, ByteSource},
};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    collections::VecDeque,
    fs::File,
    io::{self, Write},
    time::Duration,
};

/// Rows of the screen taken by the status bar and the message line.
const BAR_ROWS: u16 = 2;

/// Dimensions of the text area, excluding the two bars at the bottom.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

/// What the editor needs from the device it runs on.
pub trait Console: ByteSource {
    /// Takes itself.
    /// Returns the size of the text area.
    fn size(&self) -> Size;

    /// Takes itself and a complete frame.
    /// Writes the frame in a single call.
    ///
    /// # Errors
    ///
    /// Will return an error if the frame could not be written whole.
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;

    /// Takes itself.
    /// Puts the device back into the mode it was in before the editor started.
    ///
    /// # Errors
    ///
    /// Will return an error if the original mode cannot be applied.
    fn restore(&mut self) -> Result<()>;
}

/// The controlling terminal, held in raw mode until `restore` runs.
pub struct Terminal {
    size: Size,
    /// Bytes of already-translated key events not yet handed to the decoder.
    pending: VecDeque<u8>,
    /// Unbuffered handle on stdout, so a frame leaves in one `write`.
    out: File,
    restored: bool,
}

impl Terminal {
    /// Takes nothing.
    /// Queries the window size, then enters raw mode and the alternate screen.
    ///
    /// # Errors
    ///
    /// Will return an error if the size is unavailable or the terminal mode
    /// cannot be changed.
    pub fn new() -> Result<Self> {
        let (width, height) = crossterm::terminal::size().map_err(Error::WindowSize)?;
        let out = unbuffered_stdout()?;
        enable_raw_mode()?;
        let terminal = Self {
            size: Size {
                width,
                height: height.saturating_sub(BAR_ROWS),
            },
            pending: VecDeque::new(),
            out,
            restored: false,
        };
        execute!(io::stdout(), EnterAlternateScreen)?;
        tracing::debug!(width, height, "terminal in raw mode");
        Ok(terminal)
    }
}

#[cfg(unix)]
fn unbuffered_stdout() -> io::Result<File> {
    use std::os::fd::AsFd;
    Ok(File::from(io::stdout().as_fd().try_clone_to_owned()?))
}

#[cfg(windows)]
fn unbuffered_stdout() -> io::Result<File> {
    use std::os::windows::io::AsHandle;
    Ok(File::from(io::stdout().as_handle().try_clone_to_owned()?))
}

impl Drop for Terminal {
    /// Takes itself.
    /// Restores the terminal if the editor did not get to. Failing here ends
    /// the process with status 1.
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(error) = self.restore() {
            tracing::error!(%error, "failed to restore terminal");
            eprintln!("wilo: failed to restore terminal: {error}");
            std::process::exit(1);
        }
    }
}

impl ByteSource for Terminal {
    /// Takes itself and the longest time to wait.
    /// Key events are translated to the bytes a VT100 terminal would send,
    /// and every event already waiting is translated in one go.
    fn read_byte(&mut self, timeout: Duration) -> io::Result<Option<u8>> {
        if let Some(byte) = self.pending.pop_front() {
            return Ok(Some(byte));
        }
        if !event::poll(timeout)? {
            return Ok(None);
        }
        loop {
            if let Event::Key(key) = event::read()? {
                input::encode(&key, &mut self.pending);
            }
            if !event::poll(Duration::ZERO)? {
                break;
            }
        }
        Ok(self.pending.pop_front())
    }
}

impl Console for Terminal {
    fn size(&self) -> Size {
        self.size
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let written = self.out.write(frame)?;
        if written != frame.len() {
            return Err(Error::ShortWrite {
                written,
                expected: frame.len(),
            });
        }
        Ok(())
    }

    /// Takes itself.
    /// Leaves the alternate screen and raw mode. Only the first call does
    /// anything, whether or not it succeeds.
    fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        execute!(io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        tracing::debug!("terminal restored");
        Ok(())
    }
}
