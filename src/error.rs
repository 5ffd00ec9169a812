#![warn(clippy::all, clippy::pedantic)]
use std::{io, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading input or configuring the terminal failed.
    #[error("terminal i/o failed: {0}")]
    Terminal(#[from] io::Error),

    /// A frame could not be written in one piece.
    #[error("short write to terminal: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    #[error("could not query the window size: {0}")]
    WindowSize(#[source] io::Error),

    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Takes itself.
    /// Returns the underlying I/O error as text, for the message line.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Error::Open { source, .. } | Error::Save { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}
