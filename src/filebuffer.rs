#![warn(clippy::all, clippy::pedantic)]
use crate::{
    config::TAB_STOP,
    error::{Error, Result},
    syntax::{self, SyntaxProfile},
    Key, Row, Size,
};
use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

/// Cursor and scroll state, kept so a prompt can put the view back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSnapshot {
    cursor: Position,
    offset: Position,
}

/// Reads newline-terminated lines, trimming the terminator and any `\r`.
pub struct LineReader<R> {
    reader: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Takes itself.
    /// Returns the next line, or `None` at end of stream.
    ///
    /// # Errors
    ///
    /// Will return an error if the underlying reader fails.
    pub fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// The open document: rows, cursor, scroll offsets and file binding.
///
/// `cursor.y` may equal the row count, meaning the cursor sits on the
/// virtual row past the end; typing there appends a row.
pub struct FileBuffer {
    rows: Vec<Row>,
    pub file_path: Option<PathBuf>,
    /// Bumped on every modification, cleared on load and save.
    pub dirty: usize,
    /// `x` is a raw column, `y` a row index.
    pub cursor: Position,
    /// Rendered column of the cursor, refreshed by `shift_viewport`.
    pub rx: usize,
    /// `x` is the first visible rendered column, `y` the first visible row.
    pub offset: Position,
    syntax: Option<&'static SyntaxProfile>,
    tab_stop: usize,
}

impl Default for FileBuffer {
    /// Takes nothing.
    /// Builds an empty `FileBuffer`.
    fn default() -> Self {
        Self::new(TAB_STOP)
    }
}

impl FileBuffer {
    /// Takes a tab stop.
    /// Builds an empty, unnamed `FileBuffer`.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            file_path: None,
            dirty: 0,
            cursor: Position::default(),
            rx: 0,
            offset: Position::default(),
            syntax: None,
            tab_stop: tab_stop.max(1),
        }
    }

    /// Takes a file path and a tab stop.
    /// Builds a `FileBuffer` from the lines of the file. A path that does not
    /// exist yet gives an empty buffer bound to that path.
    ///
    /// # Errors
    ///
    /// Will return an error if the file exists but cannot be read.
    pub fn open(path: &Path, tab_stop: usize) -> Result<Self> {
        let mut buffer = Self::new(tab_stop);
        buffer.set_file_path(path.to_path_buf());
        let file = match File::open(path) {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "new file");
                return Ok(buffer);
            }
            Err(source) => {
                return Err(Error::Open {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        buffer.load(BufReader::new(file)).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), rows = buffer.len(), "opened");
        Ok(buffer)
    }

    /// Takes itself and a reader.
    /// Appends every line of the reader as a row and marks the buffer clean.
    ///
    /// # Errors
    ///
    /// Will return an error if the reader fails.
    pub fn load<R: BufRead>(&mut self, reader: R) -> io::Result<()> {
        let mut lines = LineReader::new(reader);
        while let Some(line) = lines.next_line()? {
            self.insert_row(self.rows.len(), &line);
        }
        self.dirty = 0;
        Ok(())
    }

    /// Takes itself.
    /// Writes every row followed by a newline to the bound path.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Will return an error if no path is bound or the file cannot be written.
    pub fn save(&mut self) -> Result<usize> {
        let Some(path) = self.file_path.clone() else {
            return Err(Error::Save {
                path: PathBuf::new(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "no file name"),
            });
        };
        let contents = self.rows_to_bytes();
        fs::write(&path, &contents).map_err(|source| Error::Save {
            path: path.clone(),
            source,
        })?;
        self.dirty = 0;
        tracing::info!(path = %path.display(), bytes = contents.len(), "saved");
        Ok(contents.len())
    }

    /// Takes itself.
    /// Returns the document as bytes, one newline after every row.
    #[must_use]
    pub fn rows_to_bytes(&self) -> Vec<u8> {
        let total = self.rows.iter().map(|row| row.len() + 1).sum();
        let mut contents = Vec::with_capacity(total);
        for row in &self.rows {
            contents.extend_from_slice(row.raw());
            contents.push(b'\n');
        }
        contents
    }

    /// Takes itself and a path.
    /// Binds the buffer to the path, picks the syntax profile for its name
    /// and reclassifies every row.
    pub fn set_file_path(&mut self, path: PathBuf) {
        self.syntax = syntax::select(&path.to_string_lossy());
        tracing::debug!(
            path = %path.display(),
            file_type = self.syntax.map(|s| s.file_type),
            "selected syntax"
        );
        self.file_path = Some(path);
        for idx in 0..self.rows.len() {
            let prev_open = idx > 0 && self.rows[idx - 1].open_comment;
            syntax::update_syntax(&mut self.rows[idx], self.syntax, prev_open);
        }
    }

    #[must_use]
    pub fn syntax(&self) -> Option<&'static SyntaxProfile> {
        self.syntax
    }

    #[must_use]
    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Takes itself and a usize representing the index of a row.
    /// Returns the row if there is one with the given index.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Takes itself.
    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty > 0
    }

    /// Takes itself and a row index.
    /// Reclassifies the row, then keeps going down the document for as long
    /// as each row's trailing block comment state changes.
    fn update_syntax_from(&mut self, start: usize) {
        let mut idx = start;
        while idx < self.rows.len() {
            let prev_open = idx > 0 && self.rows[idx - 1].open_comment;
            if !syntax::update_syntax(&mut self.rows[idx], self.syntax, prev_open) {
                break;
            }
            idx += 1;
        }
    }

    /// Takes itself, an index and the raw content.
    /// Inserts a new row before `at`. Does nothing if `at` is past the end.
    pub fn insert_row(&mut self, at: usize, text: &[u8]) {
        if at > self.rows.len() {
            return;
        }
        let mut row = Row::new(text.to_vec(), self.tab_stop);
        // The row now below was classified against this seed.
        row.open_comment = at > 0 && self.rows[at - 1].open_comment;
        self.rows.insert(at, row);
        self.update_syntax_from(at);
        self.dirty += 1;
    }

    /// Takes itself and an index.
    /// Removes the row. Does nothing if `at` is out of range.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.update_syntax_from(at);
        self.dirty += 1;
    }

    /// Inserts `byte` into row `row` at raw column `at`, clamped to the row end.
    pub fn row_insert_char(&mut self, row: usize, at: usize, byte: u8) {
        let tab_stop = self.tab_stop;
        let Some(target) = self.rows.get_mut(row) else {
            return;
        };
        target.insert(at, byte, tab_stop);
        self.update_syntax_from(row);
        self.dirty += 1;
    }

    /// Removes the byte at raw column `at` of row `row`.
    pub fn row_delete_char(&mut self, row: usize, at: usize) {
        let tab_stop = self.tab_stop;
        let Some(target) = self.rows.get_mut(row) else {
            return;
        };
        if target.remove(at, tab_stop) {
            self.update_syntax_from(row);
            self.dirty += 1;
        }
    }

    pub fn row_append(&mut self, row: usize, text: &[u8]) {
        let tab_stop = self.tab_stop;
        let Some(target) = self.rows.get_mut(row) else {
            return;
        };
        target.append(text, tab_stop);
        self.update_syntax_from(row);
        self.dirty += 1;
    }

    /// Takes itself, a row index and a raw column.
    /// Moves everything from the column onwards into a new row below.
    pub fn split_row(&mut self, row: usize, at: usize) {
        let Some(target) = self.rows.get(row) else {
            return;
        };
        let at = at.min(target.len());
        let tail = target.raw()[at..].to_vec();
        self.insert_row(row + 1, &tail);
        let tab_stop = self.tab_stop;
        self.rows[row].split_off(at, tab_stop);
        self.update_syntax_from(row);
    }

    /// Takes itself and a byte.
    /// Inserts the byte at the cursor, creating a row first if the cursor is
    /// on the virtual row past the end.
    pub fn insert_char(&mut self, byte: u8) {
        if self.cursor.y == self.rows.len() {
            self.insert_row(self.rows.len(), b"");
        }
        self.row_insert_char(self.cursor.y, self.cursor.x, byte);
        self.cursor.x += 1;
    }

    /// Takes itself.
    /// Breaks the current row at the cursor and moves to the start of the new row.
    pub fn insert_newline(&mut self) {
        if self.cursor.x == 0 {
            self.insert_row(self.cursor.y, b"");
        } else {
            self.split_row(self.cursor.y, self.cursor.x);
        }
        self.cursor.y += 1;
        self.cursor.x = 0;
    }

    /// Takes itself.
    /// Deletes the character left of the cursor. At the start of a row the
    /// row is joined onto the previous one.
    pub fn delete_char(&mut self) {
        let Position { x, y } = self.cursor;
        if y == self.rows.len() || (x == 0 && y == 0) {
            return;
        }
        if x > 0 {
            self.row_delete_char(y, x - 1);
            self.cursor.x -= 1;
        } else {
            self.cursor.x = self.rows[y - 1].len();
            let joined = self.rows[y].raw().to_vec();
            self.row_append(y - 1, &joined);
            self.delete_row(y);
            self.cursor.y -= 1;
        }
    }

    /// Takes itself and the key entered.
    /// Moves the cursor one step, wrapping across row ends.
    pub fn move_cursor(&mut self, key: Key) {
        let row_len = self.rows.get(self.cursor.y).map(Row::len);
        match key {
            Key::ArrowLeft => {
                if self.cursor.x != 0 {
                    self.cursor.x -= 1;
                } else if self.cursor.y > 0 {
                    self.cursor.y -= 1;
                    self.cursor.x = self.rows[self.cursor.y].len();
                }
            }
            Key::ArrowRight => match row_len {
                Some(len) if self.cursor.x < len => self.cursor.x += 1,
                Some(len) if self.cursor.x == len => {
                    self.cursor.y += 1;
                    self.cursor.x = 0;
                }
                _ => (),
            },
            Key::ArrowUp => self.cursor.y = self.cursor.y.saturating_sub(1),
            Key::ArrowDown => {
                if self.cursor.y < self.rows.len() {
                    self.cursor.y += 1;
                }
            }
            _ => (),
        }
        let row_len = self.rows.get(self.cursor.y).map_or(0, Row::len);
        self.cursor.x = self.cursor.x.min(row_len);
    }

    /// Takes itself, `PageUp` or `PageDown`, and the number of text rows on screen.
    /// Jumps to the edge of the viewport, then scrolls a full screen.
    pub fn page(&mut self, key: Key, screen_rows: usize) {
        let step = match key {
            Key::PageUp => {
                self.cursor.y = self.offset.y;
                Key::ArrowUp
            }
            Key::PageDown => {
                self.cursor.y = (self.offset.y + screen_rows)
                    .saturating_sub(1)
                    .min(self.rows.len());
                Key::ArrowDown
            }
            _ => return,
        };
        for _ in 0..screen_rows {
            self.move_cursor(step);
        }
    }

    pub fn home(&mut self) {
        self.cursor.x = 0;
    }

    pub fn end(&mut self) {
        if let Some(row) = self.rows.get(self.cursor.y) {
            self.cursor.x = row.len();
        }
    }

    /// Takes itself and the size of the text area.
    /// Recomputes the rendered cursor column and scrolls so the cursor is visible.
    pub fn shift_viewport(&mut self, size: &Size) {
        let height = usize::from(size.height);
        let width = usize::from(size.width);
        self.rx = self
            .rows
            .get(self.cursor.y)
            .map_or(0, |row| row.cx_to_rx(self.cursor.x, self.tab_stop));

        if self.cursor.y < self.offset.y {
            self.offset.y = self.cursor.y;
        }
        if self.cursor.y >= self.offset.y + height {
            self.offset.y = (self.cursor.y + 1).saturating_sub(height);
        }
        if self.rx < self.offset.x {
            self.offset.x = self.rx;
        }
        if self.rx >= self.offset.x + width {
            self.offset.x = (self.rx + 1).saturating_sub(width);
        }
    }

    #[must_use]
    pub fn snapshot_view(&self) -> ViewSnapshot {
        ViewSnapshot {
            cursor: self.cursor,
            offset: self.offset,
        }
    }

    pub fn restore_view(&mut self, snapshot: ViewSnapshot) {
        self.cursor = snapshot.cursor;
        self.offset = snapshot.offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Highlight;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn buffer_with(lines: &[&str]) -> FileBuffer {
        let mut buffer = FileBuffer::new(4);
        for line in lines {
            buffer.insert_row(buffer.len(), line.as_bytes());
        }
        buffer.dirty = 0;
        buffer
    }

    fn raw_lines(buffer: &FileBuffer) -> Vec<String> {
        buffer
            .rows()
            .iter()
            .map(|row| String::from_utf8_lossy(row.raw()).into_owned())
            .collect()
    }

    #[test]
    fn line_reader_distinguishes_end_of_stream() {
        let mut lines = LineReader::new(&b"one\r\ntwo\n\nthree"[..]);
        assert_eq!(lines.next_line().unwrap(), Some(b"one".to_vec()));
        assert_eq!(lines.next_line().unwrap(), Some(b"two".to_vec()));
        assert_eq!(lines.next_line().unwrap(), Some(Vec::new()));
        assert_eq!(lines.next_line().unwrap(), Some(b"three".to_vec()));
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn open_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.c");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"int main() {\r\n\treturn 0;\r\n}").unwrap();
        drop(file);

        let mut buffer = FileBuffer::open(&path, 4).unwrap();
        assert_eq!(raw_lines(&buffer), vec!["int main() {", "\treturn 0;", "}"]);
        assert_eq!(buffer.syntax().map(|s| s.file_type), Some("c"));
        assert!(!buffer.is_dirty());

        buffer.insert_char(b'/');
        assert!(buffer.is_dirty());
        let written = buffer.save().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"/int main() {\n\treturn 0;\n}\n");
        assert_eq!(written, 27);
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn open_missing_file_gives_empty_named_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.txt");
        let buffer = FileBuffer::open(&path, 4).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.file_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn save_without_name_fails() {
        let mut buffer = buffer_with(&["x"]);
        buffer.dirty = 1;
        assert!(matches!(buffer.save(), Err(Error::Save { .. })));
        assert!(buffer.is_dirty());
    }

    #[test]
    fn insert_row_out_of_range_is_ignored() {
        let mut buffer = buffer_with(&["a"]);
        buffer.insert_row(5, b"nope");
        buffer.delete_row(5);
        assert_eq!(raw_lines(&buffer), vec!["a"]);
        assert_eq!(buffer.dirty, 0);
    }

    #[test]
    fn insert_then_delete_restores_row() {
        let mut buffer = buffer_with(&["in\tt x;"]);
        buffer.set_file_path(PathBuf::from("t.c"));
        let before = buffer.row(0).unwrap().clone();
        buffer.row_insert_char(0, 2, b'q');
        assert_ne!(buffer.row(0).unwrap(), &before);
        buffer.row_delete_char(0, 2);
        assert_eq!(buffer.row(0).unwrap(), &before);
    }

    #[test]
    fn block_comment_cascades_both_ways() {
        let mut buffer = buffer_with(&["a", "bc", "d"]);
        buffer.set_file_path(PathBuf::from("cascade.c"));
        assert!(buffer.row(1).unwrap().highlight.iter().all(|&h| h == Highlight::Normal));

        buffer.row_insert_char(0, 1, b'/');
        buffer.row_insert_char(0, 2, b'*');
        assert!(buffer.row(0).unwrap().open_comment);
        assert_eq!(buffer.row(1).unwrap().highlight, vec![Highlight::BlockComment; 2]);
        assert_eq!(buffer.row(2).unwrap().highlight, vec![Highlight::BlockComment; 1]);

        buffer.row_insert_char(0, 3, b'*');
        buffer.row_insert_char(0, 4, b'/');
        assert!(!buffer.row(0).unwrap().open_comment);
        assert_eq!(buffer.row(1).unwrap().highlight, vec![Highlight::Normal; 2]);
        assert_eq!(buffer.row(2).unwrap().highlight, vec![Highlight::Normal; 1]);
    }

    #[test]
    fn comment_closed_partway_down_stops_cascade() {
        let mut buffer = buffer_with(&["x", "y */ int z;", "int w;"]);
        buffer.set_file_path(PathBuf::from("stop.c"));
        buffer.row_insert_char(0, 0, b'*');
        buffer.row_insert_char(0, 0, b'/');
        assert_eq!(&buffer.row(1).unwrap().highlight[..4], &[Highlight::BlockComment; 4]);
        assert_eq!(&buffer.row(2).unwrap().highlight[..3], &[Highlight::Keyword2; 3]);
    }

    #[test]
    fn split_row_inside_comment_keeps_state() {
        let mut buffer = buffer_with(&["/* a b */", "int x;"]);
        buffer.set_file_path(PathBuf::from("split.c"));
        buffer.split_row(0, 4);
        assert_eq!(raw_lines(&buffer), vec!["/* a", " b */", "int x;"]);
        assert!(buffer.row(0).unwrap().open_comment);
        assert_eq!(buffer.row(1).unwrap().highlight, vec![Highlight::BlockComment; 5]);
        assert_eq!(&buffer.row(2).unwrap().highlight[..3], &[Highlight::Keyword2; 3]);
    }

    #[test]
    fn backspace_at_column_zero_merges_rows() {
        let mut buffer = buffer_with(&["one", "two", "three"]);
        buffer.move_cursor(Key::ArrowDown);
        assert_eq!(buffer.cursor, Position { x: 0, y: 1 });
        buffer.delete_char();
        assert_eq!(raw_lines(&buffer), vec!["onetwo", "three"]);
        assert_eq!(buffer.cursor, Position { x: 3, y: 0 });
        assert!(buffer.is_dirty());
    }

    #[test]
    fn backspace_at_origin_does_nothing() {
        let mut buffer = buffer_with(&["one"]);
        buffer.delete_char();
        assert_eq!(raw_lines(&buffer), vec!["one"]);
        assert_eq!(buffer.dirty, 0);
    }

    #[test]
    fn newline_splits_at_cursor() {
        let mut buffer = buffer_with(&["hello"]);
        buffer.cursor.x = 2;
        buffer.insert_newline();
        assert_eq!(raw_lines(&buffer), vec!["he", "llo"]);
        assert_eq!(buffer.cursor, Position { x: 0, y: 1 });

        buffer.insert_newline();
        assert_eq!(raw_lines(&buffer), vec!["he", "", "llo"]);
    }

    #[test]
    fn typing_past_last_row_appends() {
        let mut buffer = FileBuffer::new(4);
        buffer.insert_char(b'h');
        buffer.insert_char(b'i');
        assert_eq!(raw_lines(&buffer), vec!["hi"]);
        assert_eq!(buffer.cursor, Position { x: 2, y: 0 });
    }

    #[test]
    fn arrows_wrap_across_rows() {
        let mut buffer = buffer_with(&["ab", "c"]);
        buffer.end();
        buffer.move_cursor(Key::ArrowRight);
        assert_eq!(buffer.cursor, Position { x: 0, y: 1 });
        buffer.move_cursor(Key::ArrowLeft);
        assert_eq!(buffer.cursor, Position { x: 2, y: 0 });
        buffer.move_cursor(Key::ArrowDown);
        assert_eq!(buffer.cursor, Position { x: 1, y: 1 });
        buffer.move_cursor(Key::ArrowDown);
        assert_eq!(buffer.cursor, Position { x: 0, y: 2 });
        buffer.move_cursor(Key::ArrowDown);
        assert_eq!(buffer.cursor.y, 2);
    }

    #[test]
    fn viewport_follows_cursor() {
        let lines: Vec<String> = (0..50).map(|n| format!("\t{n}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut buffer = buffer_with(&refs);
        let size = Size {
            width: 4,
            height: 10,
        };
        buffer.cursor = Position { x: 3, y: 30 };
        buffer.shift_viewport(&size);
        assert_eq!(buffer.rx, 6);
        assert_eq!(buffer.offset, Position { x: 3, y: 21 });

        buffer.cursor = Position { x: 0, y: 5 };
        buffer.shift_viewport(&size);
        assert_eq!(buffer.offset, Position { x: 0, y: 5 });
    }

    #[test]
    fn page_down_moves_a_screen() {
        let lines: Vec<String> = (0..30).map(|n| n.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut buffer = buffer_with(&refs);
        buffer.page(Key::PageDown, 10);
        assert_eq!(buffer.cursor.y, 19);
        buffer.page(Key::PageUp, 10);
        assert_eq!(buffer.cursor.y, 0);
    }
}
