#![warn(clippy::all, clippy::pedantic)]
use crate::Row;
use bitflags::bitflags;
use crossterm::style::Color;

/// Classification of a single rendered byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Highlight {
    #[default]
    Normal,
    Comment,
    BlockComment,
    Keyword1,
    Keyword2,
    FunctionCall,
    StringLiteral,
    Number,
    SearchMatch,
}

impl Highlight {
    /// Takes itself.
    /// Returns the foreground color the class is drawn with.
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Highlight::Comment | Highlight::BlockComment => Color::DarkCyan,
            Highlight::StringLiteral => Color::DarkMagenta,
            Highlight::FunctionCall | Highlight::Keyword1 => Color::DarkYellow,
            Highlight::Keyword2 => Color::DarkGreen,
            Highlight::Number => Color::DarkRed,
            Highlight::SearchMatch => Color::DarkBlue,
            Highlight::Normal => Color::Reset,
        }
    }
}

bitflags! {
    /// Optional classification rules a profile turns on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Features: u8 {
        const NUMBERS = 1 << 0;
        const STRINGS = 1 << 1;
        const FUNCTIONS = 1 << 2;
    }
}

/// Per-filetype highlighting rules. Chosen once per file by name.
#[derive(Debug, PartialEq, Eq)]
pub struct SyntaxProfile {
    pub file_type: &'static str,
    /// Patterns starting with `.` match the extension, others match anywhere in the name.
    pub file_match: &'static [&'static str],
    pub keywords: &'static [(&'static str, Highlight)],
    pub single_line_comment: Option<&'static str>,
    pub block_comment: Option<(&'static str, &'static str)>,
    pub features: Features,
}

const C_KEYWORDS: &[(&str, Highlight)] = &[
    ("switch", Highlight::Keyword1),
    ("if", Highlight::Keyword1),
    ("while", Highlight::Keyword1),
    ("for", Highlight::Keyword1),
    ("break", Highlight::Keyword1),
    ("continue", Highlight::Keyword1),
    ("return", Highlight::Keyword1),
    ("else", Highlight::Keyword1),
    ("struct", Highlight::Keyword1),
    ("union", Highlight::Keyword1),
    ("typedef", Highlight::Keyword1),
    ("static", Highlight::Keyword1),
    ("enum", Highlight::Keyword1),
    ("class", Highlight::Keyword1),
    ("case", Highlight::Keyword1),
    ("default", Highlight::Keyword1),
    ("int", Highlight::Keyword2),
    ("long", Highlight::Keyword2),
    ("double", Highlight::Keyword2),
    ("float", Highlight::Keyword2),
    ("char", Highlight::Keyword2),
    ("unsigned", Highlight::Keyword2),
    ("signed", Highlight::Keyword2),
    ("void", Highlight::Keyword2),
];

pub static PROFILES: &[SyntaxProfile] = &[SyntaxProfile {
    file_type: "c",
    file_match: &[".c", ".h", ".cpp"],
    keywords: C_KEYWORDS,
    single_line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    features: Features::all(),
}];

/// Takes a file name.
/// Returns the first built-in profile matching it, if any.
#[must_use]
pub fn select(file_name: &str) -> Option<&'static SyntaxProfile> {
    let extension = file_name.rfind('.').map(|idx| &file_name[idx..]);
    PROFILES.iter().find(|profile| {
        profile.file_match.iter().any(|pattern| {
            if pattern.starts_with('.') {
                extension == Some(*pattern)
            } else {
                file_name.contains(pattern)
            }
        })
    })
}

#[must_use]
pub fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t'..=b'\r' | b'\0') || b",.()+-/*=~%<>[];:".contains(&byte)
}

/// Takes a row, the active profile and whether the previous row ended inside
/// a block comment.
/// Reclassifies every rendered byte of the row and records the row's own
/// trailing comment state.
///
/// Returns true when that trailing state changed, meaning the next row was
/// classified against a stale seed and must be redone.
pub fn update_syntax(row: &mut Row, syntax: Option<&SyntaxProfile>, prev_open: bool) -> bool {
    let render = row.render();
    let mut hl = vec![Highlight::Normal; render.len()];
    let mut in_comment = false;

    if let Some(syntax) = syntax {
        in_comment = prev_open;
        classify(render, &mut hl, syntax, &mut in_comment);
    }

    row.highlight = hl;
    let changed = row.open_comment != in_comment;
    row.open_comment = in_comment;
    changed
}

fn classify(render: &[u8], hl: &mut [Highlight], syntax: &SyntaxProfile, in_comment: &mut bool) {
    let scs = syntax.single_line_comment.filter(|s| !s.is_empty());
    let block = syntax
        .block_comment
        .filter(|(start, end)| !start.is_empty() && !end.is_empty());

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut i = 0;

    while i < render.len() {
        let c = render[i];
        let rest = &render[i..];
        let prev_hl = if i > 0 { hl[i - 1] } else { Highlight::Normal };

        if let Some(scs) = scs {
            if in_string.is_none() && !*in_comment && rest.starts_with(scs.as_bytes()) {
                hl[i..].fill(Highlight::Comment);
                break;
            }
        }

        if let Some((start, end)) = block {
            if in_string.is_none() {
                if *in_comment {
                    if rest.starts_with(end.as_bytes()) {
                        hl[i..i + end.len()].fill(Highlight::BlockComment);
                        i += end.len();
                        *in_comment = false;
                        prev_sep = true;
                    } else {
                        hl[i] = Highlight::BlockComment;
                        i += 1;
                    }
                    continue;
                } else if rest.starts_with(start.as_bytes()) {
                    hl[i..i + start.len()].fill(Highlight::BlockComment);
                    i += start.len();
                    *in_comment = true;
                    continue;
                }
            }
        }

        if syntax.features.contains(Features::STRINGS) {
            if let Some(quote) = in_string {
                hl[i] = Highlight::StringLiteral;
                if c == b'\\' && i + 1 < render.len() {
                    hl[i + 1] = Highlight::StringLiteral;
                    i += 2;
                    continue;
                }
                if c == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if c == b'"' || c == b'\'' {
                in_string = Some(c);
                hl[i] = Highlight::StringLiteral;
                i += 1;
                continue;
            }
        }

        if syntax.features.contains(Features::NUMBERS)
            && ((c.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (c == b'.' && prev_hl == Highlight::Number))
        {
            hl[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            let keyword = syntax.keywords.iter().find(|(word, _)| {
                rest.starts_with(word.as_bytes())
                    && is_separator(render.get(i + word.len()).copied().unwrap_or(b'\0'))
            });
            if let Some((word, class)) = keyword {
                hl[i..i + word.len()].fill(*class);
                i += word.len();
                prev_sep = false;
                continue;
            }
        }

        if syntax.features.contains(Features::FUNCTIONS) && c == b'(' {
            for j in (0..i).rev() {
                let b = render[j];
                if is_separator(b) || b == b'!' {
                    break;
                }
                hl[j] = Highlight::FunctionCall;
            }
        }

        prev_sep = is_separator(c);
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn c_profile() -> &'static SyntaxProfile {
        &PROFILES[0]
    }

    fn classify_line(text: &str, prev_open: bool) -> Row {
        let mut row = Row::new(text.as_bytes().to_vec(), 4);
        update_syntax(&mut row, Some(c_profile()), prev_open);
        row
    }

    #[test_case("main.c", Some("c"))]
    #[test_case("include/list.h", Some("c"))]
    #[test_case("engine.cpp", Some("c"))]
    #[test_case("notes.txt", None)]
    #[test_case("Makefile", None)]
    #[test_case("archive.c.bak", None ; "only last extension counts")]
    fn select_by_extension(name: &str, expected: Option<&str>) {
        assert_eq!(select(name).map(|p| p.file_type), expected);
    }

    #[test]
    fn keyword_needs_trailing_separator() {
        let row = classify_line("intx", false);
        assert!(row.highlight.iter().all(|&h| h == Highlight::Normal));

        let row = classify_line("int x", false);
        assert_eq!(&row.highlight[..3], &[Highlight::Keyword2; 3]);
        assert_eq!(&row.highlight[3..], &[Highlight::Normal; 2]);
    }

    #[test_case(b' ')]
    #[test_case(b'\t')]
    #[test_case(b'\x0b' ; "vertical tab")]
    #[test_case(b'\x0c' ; "form feed")]
    #[test_case(b'\0')]
    #[test_case(b';')]
    fn separator_bytes(byte: u8) {
        assert!(is_separator(byte));
    }

    #[test]
    fn vertical_tab_starts_a_keyword() {
        let row = classify_line("a\x0bint x", false);
        assert_eq!(&row.highlight[2..5], &[Highlight::Keyword2; 3]);
    }

    #[test]
    fn plain_keyword_is_keyword1() {
        let row = classify_line("return 0;", false);
        assert_eq!(&row.highlight[..6], &[Highlight::Keyword1; 6]);
        assert_eq!(row.highlight[7], Highlight::Number);
    }

    #[test]
    fn keyword_not_matched_mid_identifier() {
        let row = classify_line("xif ", false);
        assert!(row.highlight.iter().all(|&h| h == Highlight::Normal));
    }

    #[test]
    fn single_line_comment_runs_to_end() {
        let row = classify_line("x = 1; // note", false);
        assert_eq!(row.highlight[4], Highlight::Number);
        assert_eq!(&row.highlight[7..], &[Highlight::Comment; 7]);
        assert!(!row.open_comment);
    }

    #[test]
    fn comment_marker_inside_string_is_text() {
        let row = classify_line("\"a//b\"", false);
        assert!(row.highlight.iter().all(|&h| h == Highlight::StringLiteral));
    }

    #[test]
    fn string_escape_consumes_quote() {
        let row = classify_line(r#""a\"b" x"#, false);
        assert_eq!(&row.highlight[..6], &[Highlight::StringLiteral; 6]);
        assert_eq!(row.highlight[7], Highlight::Normal);
    }

    #[test]
    fn decimal_number_continues_through_dot() {
        let row = classify_line("3.14", false);
        assert_eq!(row.highlight, vec![Highlight::Number; 4]);

        let row = classify_line("x1", false);
        assert_eq!(row.highlight, vec![Highlight::Normal; 2]);
    }

    #[test]
    fn function_call_marks_identifier() {
        let row = classify_line("x = foo(1)", false);
        assert_eq!(&row.highlight[4..7], &[Highlight::FunctionCall; 3]);
        assert_eq!(row.highlight[0], Highlight::Normal);
    }

    #[test]
    fn block_comment_left_open() {
        let row = classify_line("a /* b", false);
        assert!(row.open_comment);
        assert_eq!(&row.highlight[2..], &[Highlight::BlockComment; 4]);
    }

    #[test]
    fn block_comment_seeded_from_previous_row() {
        let row = classify_line("b */ int x", true);
        assert!(!row.open_comment);
        assert_eq!(&row.highlight[..4], &[Highlight::BlockComment; 4]);
        assert_eq!(&row.highlight[5..8], &[Highlight::Keyword2; 3]);
    }

    #[test]
    fn reports_change_of_trailing_state() {
        let mut row = Row::new(b"/* open".to_vec(), 4);
        assert!(update_syntax(&mut row, Some(c_profile()), false));
        assert!(!update_syntax(&mut row, Some(c_profile()), false));
    }

    #[test]
    fn no_profile_means_all_normal() {
        let mut row = Row::new(b"int x; /*".to_vec(), 4);
        update_syntax(&mut row, None, true);
        assert!(row.highlight.iter().all(|&h| h == Highlight::Normal));
        assert!(!row.open_comment);
    }
}
