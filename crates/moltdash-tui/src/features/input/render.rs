use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthChar;

use super::InputState;

/// Height of the suggestion box including borders.
pub const INPUT_HEIGHT: u16 = 3;

/// Returns the visible slice of `text` and the cursor column within it,
/// scrolled so the cursor stays in view.
fn visible_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let width = width.max(1);

    let mut start = 0;
    let mut cursor_col: usize = chars[..cursor.min(chars.len())]
        .iter()
        .map(|c| c.width().unwrap_or(0))
        .sum();
    while cursor_col >= width && start < chars.len() {
        cursor_col -= chars[start].width().unwrap_or(0);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for ch in &chars[start..] {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        visible.push(*ch);
        used += w;
    }
    (visible, cursor_col)
}

pub fn render_input(input: &InputState, agent_name: &str, frame: &mut Frame, area: Rect) {
    let border_color = if input.submitting {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let title = if input.submitting {
        " Sending… ".to_string()
    } else {
        format!(" Suggest something to {agent_name} ")
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(title, Style::default().fg(Color::DarkGray)));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let (visible, cursor_col) = visible_window(input.text(), input.cursor(), inner.width as usize);
    frame.render_widget(Paragraph::new(Line::from(visible)), inner);
    frame.set_cursor_position(Position::new(inner.x + cursor_col as u16, inner.y));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_unscrolled() {
        assert_eq!(visible_window("hello", 5, 20), ("hello".to_string(), 5));
    }

    #[test]
    fn test_long_text_scrolls_to_cursor() {
        let (visible, col) = visible_window("abcdefghij", 10, 4);
        assert_eq!(visible, "hij");
        assert_eq!(col, 3);
    }

    #[test]
    fn test_cursor_in_middle() {
        let (visible, col) = visible_window("abcdefghij", 2, 4);
        assert_eq!(visible, "abcd");
        assert_eq!(col, 2);
    }
}
