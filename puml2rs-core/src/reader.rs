//! Source preprocessing.
//!
//! Splits diagram text into numbered lines, captures the leading
//! `'`-comment block as the copyright header and strips everything the
//! parser is not interested in: `@startuml`/`@enduml` markers, `title`,
//! `hide empty` and `note` lines, `#color` tokens and trailing `'` comments.

use crate::error::Location;

/// A single line of the diagram source.
///
/// `original` is the untouched text for diagnostics; `text` is the cleaned
/// form the parser works on.
#[derive(Debug, Clone)]
pub struct Line {
    pub location: Location,
    pub original: String,
    pub text: String,
}

/// Preprocessed diagram source: the copyright header plus all cleaned,
/// non-empty lines.
#[derive(Debug)]
pub struct Source {
    pub file: String,
    pub copyright_header: String,
    pub lines: Vec<Line>,
}

impl Source {
    /// Prepare raw diagram text read from `file` for parsing.
    ///
    /// The library performs no I/O; callers read the file and hand the text
    /// in here.
    pub fn from_text(file: &str, content: &str) -> Self {
        let raw: Vec<(usize, &str)> = content.split('\n').enumerate().collect();

        let copyright_header = parse_copyright_header(&raw);

        let mut lines = Vec::new();
        for (idx, original) in &raw {
            let text = cleanup(original);
            if text.is_empty() {
                continue;
            }
            lines.push(Line {
                location: Location::new(file, idx + 1),
                original: (*original).to_string(),
                text,
            });
        }

        Self {
            file: file.to_string(),
            copyright_header,
            lines,
        }
    }
}

/// Extracts the copyright header at the top of the file: the leading run of
/// comment lines starting with a single quote, with the quote and leading
/// whitespace removed.
fn parse_copyright_header(raw: &[(usize, &str)]) -> String {
    raw.iter()
        .map(|(_, text)| *text)
        .take_while(|text| text.trim_start().starts_with('\''))
        .map(|text| text.trim_start_matches([' ', '\t', '\'']))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reduces a raw line to the text the parser cares about, or to an empty
/// string if nothing is left.
fn cleanup(original: &str) -> String {
    const IGNORED_PREFIXES: [&str; 4] = ["@", "title ", "hide empty ", "note "];

    if IGNORED_PREFIXES.iter().any(|p| original.starts_with(p)) {
        return String::new();
    }

    let text = strip_color_tokens(original);
    let text = match text.find('\'') {
        Some(idx) => &text[..idx],
        None => &text,
    };

    text.trim().to_string()
}

/// Removes `#word` tokens (state color annotations). A `#` with no word
/// characters behind it is kept.
fn strip_color_tokens(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '#' && chars.peek().is_some_and(|n| is_word_char(*n)) {
            while chars.peek().is_some_and(|n| is_word_char(*n)) {
                chars.next();
            }
        } else {
            out.push(c);
        }
    }

    out
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_multiline_copyright_header() {
        let src = Source::from_text(
            "test.puml",
            "' This is\n'   the multiline\n' copyright header\n@startuml\nIdle\n@enduml\n",
        );
        assert_eq!(
            src.copyright_header,
            "This is\nthe multiline\ncopyright header"
        );
    }

    #[test]
    fn header_stops_at_first_non_comment_line() {
        let src = Source::from_text("test.puml", "' top\n@startuml\n' not a header\n");
        assert_eq!(src.copyright_header, "top");
    }

    #[test]
    fn drops_markers_titles_and_notes() {
        let src = Source::from_text(
            "test.puml",
            "@startuml\ntitle My Fsm\nhide empty description\nnote left: hi\nIdle\n@enduml\n",
        );
        let texts: Vec<_> = src.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Idle"]);
    }

    #[test]
    fn strips_color_tokens_and_trailing_comments() {
        let src = Source::from_text("test.puml", "state Working #lightblue ' busy state\n");
        assert_eq!(src.lines[0].text, "state Working");
        assert_eq!(src.lines[0].original, "state Working #lightblue ' busy state");
    }

    #[test]
    fn keeps_one_based_line_numbers() {
        let src = Source::from_text("fsm.puml", "\n\nIdle\n");
        assert_eq!(src.lines[0].location.line, 3);
        assert_eq!(src.lines[0].location.to_string(), "fsm.puml:3");
    }

    #[test]
    fn blank_lines_vanish() {
        let src = Source::from_text("test.puml", "   \n\t\nIdle\n   \n");
        assert_eq!(src.lines.len(), 1);
    }
}
