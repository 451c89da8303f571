//! Text utilities for TUI rendering.

use std::borrow::Cow;

use moltdash_core::core::card::Segment;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string with an ellipsis if it exceeds `max_width` columns.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width + 1 > max_width {
            break;
        }
        truncated.push(ch);
        width += ch_width;
    }
    truncated.push('…');
    truncated
}

/// Expands tabs and drops every other control character except `\n`, so
/// server-provided text cannot disturb the terminal.
pub fn sanitize_for_display(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c != '\n' && c.is_control()) {
        return Cow::Borrowed(s);
    }
    let mut clean = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => clean.push('\n'),
            '\t' => clean.push_str("    "),
            c if c.is_control() => {}
            c => clean.push(c),
        }
    }
    Cow::Owned(clean)
}

/// Word-wraps styled segments to `width` columns.
///
/// Explicit newlines start a new line; words wider than a line are split
/// at character boundaries. Always returns at least one (possibly empty) line.
pub fn wrap_segments(segments: &[Segment], width: usize) -> Vec<Vec<Segment>> {
    let mut wrapper = Wrapper::new(width.max(1));
    for segment in segments {
        let text = sanitize_for_display(&segment.text);
        for (index, paragraph) in text.split('\n').enumerate() {
            if index > 0 {
                wrapper.break_line();
            }
            for token in split_words(paragraph) {
                wrapper.push_token(token, segment.strong);
            }
        }
    }
    wrapper.lines
}

struct Wrapper {
    lines: Vec<Vec<Segment>>,
    width: usize,
    used: usize,
}

impl Wrapper {
    fn new(width: usize) -> Self {
        Self {
            lines: vec![Vec::new()],
            width,
            used: 0,
        }
    }

    fn break_line(&mut self) {
        self.lines.push(Vec::new());
        self.used = 0;
    }

    fn push_token(&mut self, token: &str, strong: bool) {
        let is_space = token.chars().all(char::is_whitespace);
        let token_width = token.width();

        if self.used > 0 && self.used + token_width > self.width {
            self.break_line();
            if is_space {
                return;
            }
        }
        if is_space && self.used == 0 && self.lines.len() > 1 {
            return;
        }
        if token_width <= self.width {
            self.append(token, strong);
            self.used += token_width;
            return;
        }

        for ch in token.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if self.used > 0 && self.used + ch_width > self.width {
                self.break_line();
            }
            let mut buf = [0u8; 4];
            self.append(ch.encode_utf8(&mut buf), strong);
            self.used += ch_width;
        }
    }

    fn append(&mut self, text: &str, strong: bool) {
        let Some(line) = self.lines.last_mut() else {
            return;
        };
        match line.last_mut() {
            Some(last) if last.strong == strong => last.text.push_str(text),
            _ => line.push(Segment {
                text: text.to_string(),
                strong,
            }),
        }
    }
}

/// Splits text into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space = None;
    for (index, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        match in_space {
            Some(previous) if previous != space => {
                tokens.push(&text[start..index]);
                start = index;
            }
            _ => {}
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_lines(lines: &[Vec<Segment>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.iter().map(|s| s.text.as_str()).collect())
            .collect()
    }

    #[test]
    fn test_truncate_with_ellipsis_short() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_with_ellipsis_long() {
        assert_eq!(truncate_with_ellipsis("hello world", 6), "hello…");
    }

    #[test]
    fn test_sanitize_strips_escapes() {
        assert_eq!(sanitize_for_display("a\x1b[31mb\tc"), "a[31mb    c");
        assert!(matches!(sanitize_for_display("plain"), Cow::Borrowed(_)));
        assert!(matches!(sanitize_for_display("two\nlines"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_sanitize_drops_other_control_chars() {
        assert_eq!(
            sanitize_for_display("bell\x07 back\x08space\r\nnext\x7f\u{9b}"),
            "bell backspace\nnext"
        );
    }

    #[test]
    fn test_wrap_breaks_at_words() {
        let lines = wrap_segments(&[Segment::plain("hello brave new world")], 11);
        assert_eq!(plain_lines(&lines), vec!["hello brave", "new world"]);
    }

    #[test]
    fn test_wrap_respects_newlines() {
        let lines = wrap_segments(&[Segment::plain("one\ntwo")], 40);
        assert_eq!(plain_lines(&lines), vec!["one", "two"]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap_segments(&[Segment::plain("abcdefghij")], 4);
        assert_eq!(plain_lines(&lines), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_keeps_emphasis_runs() {
        let lines = wrap_segments(
            &[Segment::strong("Crab facts"), Segment::plain(" in m/ocean")],
            40,
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0][0], Segment::strong("Crab facts"));
        assert_eq!(lines[0][1], Segment::plain(" in m/ocean"));
    }

    #[test]
    fn test_wrap_empty_text_yields_one_line() {
        let lines = wrap_segments(&[Segment::plain("")], 10);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_empty());
    }

    #[test]
    fn test_split_words_alternates() {
        assert_eq!(split_words("a  bc d"), vec!["a", "  ", "bc", " ", "d"]);
    }
}
