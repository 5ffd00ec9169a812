#![warn(clippy::all, clippy::pedantic)]
use crate::Highlight;

/// One line of the document.
///
/// `render` is `raw` with tabs expanded, and `highlight` carries exactly one
/// class per rendered byte. Both are rebuilt wholesale whenever `raw` changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    raw: Vec<u8>,
    render: Vec<u8>,
    pub highlight: Vec<Highlight>,
    /// The row ends inside an unterminated block comment.
    pub open_comment: bool,
}

impl Row {
    /// Takes the raw content and a tab stop.
    /// Builds a `Row` with its render form computed and every byte `Normal`.
    #[must_use]
    pub fn new(raw: Vec<u8>, tab_stop: usize) -> Self {
        let mut row = Self {
            raw,
            ..Default::default()
        };
        row.update_render(tab_stop);
        row
    }

    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    #[must_use]
    pub fn render(&self) -> &[u8] {
        &self.render
    }

    /// Takes itself.
    /// Returns the number of raw bytes in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Takes itself and a tab stop.
    /// Rebuilds the render form from the raw content. The highlight array is
    /// reset to `Normal` and must be reclassified by the caller.
    pub fn update_render(&mut self, tab_stop: usize) {
        let tab_stop = tab_stop.max(1);
        let tabs = self.raw.iter().filter(|&&b| b == b'\t').count();
        let mut render = Vec::with_capacity(self.raw.len() + tabs * tab_stop.saturating_sub(1));
        for &byte in &self.raw {
            if byte == b'\t' {
                render.push(b' ');
                while render.len() % tab_stop != 0 {
                    render.push(b' ');
                }
            } else {
                render.push(byte);
            }
        }
        self.render = render;
        self.highlight = vec![Highlight::Normal; self.render.len()];
    }

    /// Takes itself, a raw column and a tab stop.
    /// Returns the rendered column the raw column lands on.
    #[must_use]
    pub fn cx_to_rx(&self, cx: usize, tab_stop: usize) -> usize {
        self.raw
            .iter()
            .take(cx)
            .fold(0, |rx, &byte| advance(rx, byte, tab_stop))
    }

    /// Takes itself, a rendered column and a tab stop.
    /// Returns the raw column that covers the rendered column, or the row
    /// length when the rendered column is past the end of the row.
    #[must_use]
    pub fn rx_to_cx(&self, rx: usize, tab_stop: usize) -> usize {
        let mut cur_rx = 0;
        for (cx, &byte) in self.raw.iter().enumerate() {
            cur_rx = advance(cur_rx, byte, tab_stop);
            if cur_rx > rx {
                return cx;
            }
        }
        self.raw.len()
    }

    /// Inserts `byte` at `at`, clamped to the end of the row.
    pub(crate) fn insert(&mut self, at: usize, byte: u8, tab_stop: usize) {
        let at = at.min(self.raw.len());
        self.raw.insert(at, byte);
        self.update_render(tab_stop);
    }

    /// Removes the byte at `at`. Returns false when `at` is out of range.
    pub(crate) fn remove(&mut self, at: usize, tab_stop: usize) -> bool {
        if at >= self.raw.len() {
            return false;
        }
        self.raw.remove(at);
        self.update_render(tab_stop);
        true
    }

    pub(crate) fn append(&mut self, bytes: &[u8], tab_stop: usize) {
        self.raw.extend_from_slice(bytes);
        self.update_render(tab_stop);
    }

    /// Cuts the row at `at` and returns the tail.
    pub(crate) fn split_off(&mut self, at: usize, tab_stop: usize) -> Vec<u8> {
        let at = at.min(self.raw.len());
        let tail = self.raw.split_off(at);
        self.update_render(tab_stop);
        tail
    }
}

/// Steps a rendered column over one raw byte. A zero tab stop counts as one.
fn advance(rx: usize, byte: u8, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    if byte == b'\t' {
        rx + (tab_stop - 1) - (rx % tab_stop) + 1
    } else {
        rx + 1
    }
}
