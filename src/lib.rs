#![warn(clippy::all, clippy::pedantic)]
pub mod config;
mod editor;
pub mod error;
mod filebuffer;
pub mod input;
pub mod logging;
pub mod render;
mod row;
pub mod search;
pub mod syntax;
mod terminal;

pub use config::Config;
pub use editor::Editor;
pub use editor::HELP_MESSAGE;
pub use error::{Error, Result};
pub use filebuffer::FileBuffer;
pub use filebuffer::LineReader;
pub use filebuffer::Position;
pub use filebuffer::ViewSnapshot;
pub use input::Key;
pub use row::Row;
pub use syntax::Highlight;
pub use terminal::Console;
pub use terminal::Size;
pub use terminal::Terminal;
