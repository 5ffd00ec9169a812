#![warn(clippy::all, clippy::pedantic)]
use crate::{input::ENTER, FileBuffer, Highlight, Key};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Direction {
    #[default]
    Forward,
    Backward,
}

/// A row's highlight array as it was before a match was painted over it.
#[derive(Debug)]
struct SavedHighlight {
    row: usize,
    highlight: Vec<Highlight>,
}

/// Incremental search state for one `Ctrl-F` prompt.
///
/// The match overlay lives only in the row's highlight array; it is undone
/// at the start of every step, so at most one row is painted at a time.
#[derive(Debug, Default)]
pub struct Search {
    last_match: Option<usize>,
    direction: Direction,
    saved: Option<SavedHighlight>,
}

impl Search {
    /// Takes itself, the buffer, the query as typed so far and the key that
    /// was just pressed.
    /// Moves the cursor to the next match in the chosen direction, wrapping
    /// around the document, and paints the match.
    pub fn step(&mut self, buffer: &mut FileBuffer, query: &str, key: Key) {
        self.restore(buffer);

        match key {
            Key::Control(ENTER) | Key::Escape => {
                self.last_match = None;
                return;
            }
            Key::ArrowRight | Key::ArrowDown => self.direction = Direction::Forward,
            Key::ArrowLeft | Key::ArrowUp => self.direction = Direction::Backward,
            _ => {
                self.last_match = None;
                self.direction = Direction::Forward;
            }
        }
        if self.last_match.is_none() {
            self.direction = Direction::Forward;
        }

        let needle = query.as_bytes();
        let rows = buffer.len();
        if needle.is_empty() || rows == 0 {
            return;
        }

        let mut current = self.last_match;
        for _ in 0..rows {
            let idx = match (current, self.direction) {
                (None, _) => 0,
                (Some(idx), Direction::Forward) => (idx + 1) % rows,
                (Some(0), Direction::Backward) => rows - 1,
                (Some(idx), Direction::Backward) => idx - 1,
            };
            current = Some(idx);
            if self.try_match(buffer, idx, needle) {
                tracing::trace!(query, row = idx, "search match");
                return;
            }
        }
    }

    /// Paints the first occurrence of `needle` in row `idx`, if there is one.
    fn try_match(&mut self, buffer: &mut FileBuffer, idx: usize, needle: &[u8]) -> bool {
        let tab_stop = buffer.tab_stop();
        let Some(row) = buffer.row(idx) else {
            return false;
        };
        let Some(at) = row
            .render()
            .windows(needle.len())
            .position(|window| window == needle)
        else {
            return false;
        };
        let cx = row.rx_to_cx(at, tab_stop);

        self.last_match = Some(idx);
        buffer.cursor.y = idx;
        buffer.cursor.x = cx;
        // Scrolled past the end so the next redraw puts the match at the top.
        buffer.offset.y = buffer.len();

        if let Some(row) = buffer.row_mut(idx) {
            self.saved = Some(SavedHighlight {
                row: idx,
                highlight: row.highlight.clone(),
            });
            let end = (at + needle.len()).min(row.highlight.len());
            row.highlight[at..end].fill(Highlight::SearchMatch);
        }
        true
    }

    /// Takes itself and the buffer.
    /// Puts back the highlight array the last match painted over.
    pub fn restore(&mut self, buffer: &mut FileBuffer) {
        let Some(saved) = self.saved.take() else {
            return;
        };
        if let Some(row) = buffer.row_mut(saved.row) {
            if row.highlight.len() == saved.highlight.len() {
                row.highlight = saved.highlight;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Position;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn buffer_with(lines: &[&str]) -> FileBuffer {
        let mut buffer = FileBuffer::new(4);
        for line in lines {
            buffer.insert_row(buffer.len(), line.as_bytes());
        }
        buffer.set_file_path(PathBuf::from("search.c"));
        buffer.dirty = 0;
        buffer
    }

    #[test]
    fn match_then_cancel_restores_everything() {
        let mut buffer = buffer_with(&["int alpha;", "\tbeta(gamma);", "delta"]);
        buffer.cursor = Position { x: 2, y: 2 };
        let snapshot = buffer.snapshot_view();
        let original = buffer.row(1).unwrap().highlight.clone();
        let mut search = Search::default();

        search.step(&mut buffer, "gam", Key::Char(b'm'));
        assert_eq!(buffer.cursor, Position { x: 6, y: 1 });
        assert_eq!(buffer.row(1).unwrap().highlight[9..12], [Highlight::SearchMatch; 3]);

        search.step(&mut buffer, "gam", Key::Escape);
        buffer.restore_view(snapshot);
        assert_eq!(buffer.cursor, Position { x: 2, y: 2 });
        assert_eq!(buffer.offset, Position::default());
        assert_eq!(buffer.row(1).unwrap().highlight, original);
    }

    #[test]
    fn repeating_the_same_query_is_idempotent() {
        let mut buffer = buffer_with(&["one", "two one"]);
        let mut search = Search::default();
        search.step(&mut buffer, "one", Key::Char(b'e'));
        let first = (buffer.cursor, buffer.row(0).unwrap().highlight.clone());
        search.step(&mut buffer, "one", Key::Backspace);
        assert_eq!((buffer.cursor, buffer.row(0).unwrap().highlight.clone()), first);
        assert!(buffer.row(1).unwrap().highlight.iter().all(|&h| h != Highlight::SearchMatch));
    }

    #[test]
    fn arrows_walk_matches_and_wrap() {
        let mut buffer = buffer_with(&["x", "x", "y", "x"]);
        let mut search = Search::default();
        search.step(&mut buffer, "x", Key::Char(b'x'));
        assert_eq!(buffer.cursor.y, 0);
        search.step(&mut buffer, "x", Key::ArrowDown);
        assert_eq!(buffer.cursor.y, 1);
        search.step(&mut buffer, "x", Key::ArrowRight);
        assert_eq!(buffer.cursor.y, 3);
        search.step(&mut buffer, "x", Key::ArrowDown);
        assert_eq!(buffer.cursor.y, 0);
        search.step(&mut buffer, "x", Key::ArrowUp);
        assert_eq!(buffer.cursor.y, 3);
        let painted = buffer
            .rows()
            .iter()
            .filter(|row| row.highlight.contains(&Highlight::SearchMatch))
            .count();
        assert_eq!(painted, 1);
    }

    #[test]
    fn no_match_leaves_cursor() {
        let mut buffer = buffer_with(&["abc", "def"]);
        buffer.cursor = Position { x: 1, y: 1 };
        let mut search = Search::default();
        search.step(&mut buffer, "zzz", Key::Char(b'z'));
        assert_eq!(buffer.cursor, Position { x: 1, y: 1 });
        assert_eq!(buffer.offset, Position::default());
    }
}
