use moltdash_core::core::card::{Card, CardTone};
use moltdash_core::core::relative_time::format_relative;
use moltdash_core::core::session::Feed;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::ScrollState;
use crate::common::text::wrap_segments;

/// Indent of card content under its header line.
const CONTENT_INDENT: &str = "   ";

fn content_width(width: usize) -> usize {
    width.saturating_sub(CONTENT_INDENT.len()).max(1)
}

/// Number of lines one card takes at `width` (header, content, spacer).
fn card_line_count(card: &Card, width: usize) -> usize {
    let content = if card.content.segments.iter().all(|s| s.text.is_empty()) {
        0
    } else {
        wrap_segments(&card.content.segments, content_width(width)).len()
    };
    1 + content + 1
}

/// Total feed height in lines at `width`.
pub fn feed_line_count(feed: &Feed, width: usize) -> usize {
    feed.iter().map(|card| card_line_count(card, width)).sum()
}

fn label_style(card: &Card) -> Style {
    let color = match card.tone {
        CardTone::Error => Color::Red,
        CardTone::Normal if card.streaming => Color::Magenta,
        CardTone::Normal => Color::Cyan,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// Renders one card. Relative time is computed against `now`.
pub fn card_lines(card: &Card, now: f64, width: usize, spinner: &str) -> Vec<Line<'static>> {
    let mut header = vec![
        Span::raw(format!("{} ", card.icon)),
        Span::styled(card.label.clone(), label_style(card)),
        Span::styled(
            format!("  {}", format_relative(card.timestamp, now)),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if card.streaming {
        header.push(Span::styled(
            format!(" {spinner}"),
            Style::default().fg(Color::Magenta),
        ));
    }

    let mut lines = vec![Line::from(header)];
    if card.content.segments.iter().any(|s| !s.text.is_empty()) {
        let base = match card.tone {
            CardTone::Error => Style::default().fg(Color::Red),
            CardTone::Normal => Style::default(),
        };
        for row in wrap_segments(&card.content.segments, content_width(width)) {
            let mut spans = vec![Span::raw(CONTENT_INDENT)];
            spans.extend(row.into_iter().map(|segment| {
                let style = if segment.strong {
                    base.add_modifier(Modifier::BOLD)
                } else {
                    base
                };
                Span::styled(segment.text, style)
            }));
            lines.push(Line::from(spans));
        }
    }
    lines.push(Line::default());
    lines
}

/// Renders the visible slice of the feed, bottom-aligned.
pub fn render_feed(
    feed: &Feed,
    scroll: &ScrollState,
    now: f64,
    spinner: &str,
    frame: &mut Frame,
    area: Rect,
) {
    if feed.is_empty() {
        let waiting = Paragraph::new(Line::from(Span::styled(
            "Waiting for activity…",
            Style::default().fg(Color::DarkGray),
        )))
        .alignment(Alignment::Center);
        let middle = Rect {
            y: area.y + area.height / 2,
            height: 1.min(area.height),
            ..area
        };
        frame.render_widget(waiting, middle);
        return;
    }

    let width = area.width as usize;
    let height = area.height as usize;
    let all_lines: Vec<Line<'static>> = feed
        .iter()
        .flat_map(|card| card_lines(card, now, width, spinner))
        .collect();

    let max_offset = all_lines.len().saturating_sub(height);
    let offset = scroll.offset().min(max_offset);
    let offset = if scroll.is_following() { max_offset } else { offset };

    let mut visible: Vec<Line<'static>> = all_lines.into_iter().skip(offset).take(height).collect();
    if visible.len() < height {
        let mut padded = vec![Line::default(); height - visible.len()];
        padded.append(&mut visible);
        visible = padded;
    }

    frame.render_widget(Paragraph::new(visible), area);

    let below = scroll.lines_below();
    if below > 0 && area.height > 0 {
        let hint = Paragraph::new(Line::from(Span::styled(
            format!(" ↓ {below} more · End to follow "),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )))
        .alignment(Alignment::Right);
        let last_row = Rect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };
        frame.render_widget(hint, last_row);
    }
}

#[cfg(test)]
mod tests {
    use moltdash_core::core::card::{CardContent, CardId, Segment};
    use moltdash_core::core::events::ActivityKind;

    use super::*;

    fn card(content: CardContent, streaming: bool) -> Card {
        Card {
            id: CardId(1),
            kind: ActivityKind::Search,
            icon: "🔍",
            label: "SEARCH".to_string(),
            content,
            tone: CardTone::Normal,
            timestamp: 100.0,
            streaming,
        }
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_card_header_and_content() {
        let lines = card_lines(&card(CardContent::plain("\"crabs\""), false), 142.0, 40, "◐");
        assert_eq!(lines.len(), 3);
        assert_eq!(text(&lines[0]), "🔍 SEARCH  42s");
        assert_eq!(text(&lines[1]), "   \"crabs\"");
        assert!(text(&lines[2]).is_empty());
    }

    #[test]
    fn test_streaming_card_shows_spinner() {
        let lines = card_lines(&card(CardContent::plain("hm"), true), 100.0, 40, "◐");
        assert_eq!(text(&lines[0]), "🔍 SEARCH  now ◐");
    }

    #[test]
    fn test_strong_segment_is_bold() {
        let content = CardContent::from_segments(vec![Segment::strong("Title")]);
        let lines = card_lines(&card(content, false), 100.0, 40, "◐");
        let span = &lines[1].spans[1];
        assert_eq!(span.content, "Title");
        assert!(span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_line_count_matches_rendered_lines() {
        let long = CardContent::plain("word ".repeat(30));
        let c = card(long, false);
        let rendered = card_lines(&c, 100.0, 24, "◐").len();
        assert_eq!(card_line_count(&c, 24), rendered);

        let empty = card(CardContent::plain(""), false);
        assert_eq!(card_line_count(&empty, 24), 2);
        assert_eq!(card_lines(&empty, 100.0, 24, "◐").len(), 2);
    }
}
