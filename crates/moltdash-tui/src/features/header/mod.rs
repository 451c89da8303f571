//! Status header: connection indicator, counters and rate-limit widgets.

use moltdash_core::core::relative_time::format_relative;
use moltdash_core::core::session::{ConnectionState, Session};
use moltdash_core::core::status::{CommentWidget, PostWidget, RateLimitTier, StatusView};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::common::text::truncate_with_ellipsis;

/// Header height including borders.
pub const HEADER_HEIGHT: u16 = 5;

const PLACEHOLDER: &str = "--";

pub fn connection_color(state: ConnectionState) -> Color {
    match state {
        ConnectionState::Idle => Color::DarkGray,
        ConnectionState::Running => Color::Green,
        ConnectionState::Error => Color::Red,
    }
}

pub fn tier_color(tier: RateLimitTier) -> Color {
    match tier {
        RateLimitTier::Normal => Color::Green,
        RateLimitTier::Warning => Color::Yellow,
        RateLimitTier::Reached => Color::Red,
    }
}

/// Counter text left of the comment bar, e.g. `Comments 48/50`.
pub fn comment_counter(widget: &CommentWidget) -> String {
    format!("Comments {}/{}", widget.used, widget.limit)
}

/// Percentage drawn on the bar. Unclamped so overuse stays visible.
pub fn comment_percent_label(widget: &CommentWidget) -> String {
    format!("{:.0}%", widget.percent)
}

/// Ratio the bar physically fills, clamped to `0.0..=1.0`.
pub fn comment_ratio(widget: &CommentWidget) -> f64 {
    (widget.percent / 100.0).clamp(0.0, 1.0)
}

pub fn post_summary(widget: &PostWidget) -> String {
    if widget.warning {
        format!("Posts cooling down · next {}", widget.next_available)
    } else {
        format!("Posts ready · next {}", widget.next_available)
    }
}

fn stats_line(session: &Session, now: f64) -> Line<'static> {
    let state = session.connection;
    let label_style = Style::default().fg(Color::DarkGray);
    let value_style = Style::default().add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled("● ", Style::default().fg(connection_color(state))),
        Span::styled(
            state.label().to_string(),
            Style::default()
                .fg(connection_color(state))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Events ", label_style),
        Span::styled(session.event_count.to_string(), value_style),
    ];

    let (uptime, actions, success) = match &session.status {
        Some(view) => (
            view.uptime.to_string(),
            match view.successful_actions {
                Some(ok) => format!("{} ({ok} ok)", view.total_actions),
                None => view.total_actions.to_string(),
            },
            format!("{:.1}%", view.success_rate),
        ),
        None => (
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
            PLACEHOLDER.to_string(),
        ),
    };
    spans.extend([
        Span::styled("   Uptime ", label_style),
        Span::styled(uptime, value_style),
        Span::styled("   Actions ", label_style),
        Span::styled(actions, value_style),
        Span::styled("   Success ", label_style),
        Span::styled(success, value_style),
    ]);
    if let Some(last) = session.status.as_ref().and_then(|view| view.last_activity) {
        spans.extend([
            Span::styled("   Last ", label_style),
            Span::styled(format_relative(last, now), value_style),
        ]);
    }
    if let Some(pending) = session.pending_suggestions {
        spans.extend([
            Span::styled("   Pending ", label_style),
            Span::styled(pending.to_string(), value_style),
        ]);
    }
    if session.dropped_payloads > 0 {
        spans.push(Span::styled(
            format!("   {} dropped", session.dropped_payloads),
            Style::default().fg(Color::Yellow),
        ));
    }
    Line::from(spans)
}

fn render_comments(view: Option<&StatusView>, frame: &mut Frame, area: Rect) {
    let Some(view) = view else {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("Comments {PLACEHOLDER}"),
                Style::default().fg(Color::DarkGray),
            )),
            area,
        );
        return;
    };
    let widget = &view.comments;
    let counter = comment_counter(widget);
    let next = format!(" next {}", widget.next_available);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(counter.chars().count() as u16 + 1),
            Constraint::Min(6),
            Constraint::Length(next.chars().count() as u16),
        ])
        .split(area);

    let color = tier_color(widget.tier);
    frame.render_widget(
        Paragraph::new(Span::styled(counter, Style::default().fg(color))),
        columns[0],
    );
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .ratio(comment_ratio(widget))
            .label(comment_percent_label(widget)),
        columns[1],
    );
    frame.render_widget(
        Paragraph::new(Span::styled(next, Style::default().fg(Color::DarkGray))),
        columns[2],
    );
}

fn render_posts(view: Option<&StatusView>, frame: &mut Frame, area: Rect) {
    let line = match view {
        Some(view) => {
            let color = if view.posts.warning {
                Color::Yellow
            } else {
                Color::Green
            };
            Line::from(Span::styled(
                post_summary(&view.posts),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            format!("Posts {PLACEHOLDER}"),
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

pub fn render_header(
    session: &Session,
    base_url: &str,
    now: f64,
    frame: &mut Frame,
    area: Rect,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Line::from(Span::styled(
            format!(" {} · moltdash ", session.agent_name()),
            Style::default().add_modifier(Modifier::BOLD),
        )))
        .title_top(
            Line::from(Span::styled(
                format!(
                    " {} ",
                    truncate_with_ellipsis(base_url, usize::from(area.width / 2))
                ),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Right),
        );
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(stats_line(session, now)), rows[0]);
    render_comments(session.status.as_ref(), frame, rows[1]);
    render_posts(session.status.as_ref(), frame, rows[2]);
}

#[cfg(test)]
mod tests {
    use moltdash_core::core::status::StatusSnapshot;

    use super::*;

    fn widget(used: i64, limit: i64, remaining: i64) -> CommentWidget {
        let mut snapshot = StatusSnapshot::default();
        snapshot.rate_limits.comments.used = used;
        snapshot.rate_limits.comments.limit = limit;
        snapshot.rate_limits.comments.remaining = remaining;
        StatusView::from_snapshot(&snapshot).comments
    }

    #[test]
    fn test_overuse_label_is_unclamped_but_bar_is_full() {
        let w = widget(60, 50, 0);
        assert_eq!(comment_percent_label(&w), "120%");
        assert_eq!(comment_ratio(&w), 1.0);
        assert_eq!(tier_color(w.tier), Color::Red);
    }

    #[test]
    fn test_zero_limit_reads_zero_percent() {
        let w = widget(0, 0, 0);
        assert_eq!(comment_percent_label(&w), "0%");
        assert_eq!(comment_ratio(&w), 0.0);
    }

    #[test]
    fn test_comment_counter_and_warning_color() {
        let w = widget(45, 50, 5);
        assert_eq!(comment_counter(&w), "Comments 45/50");
        assert_eq!(tier_color(w.tier), Color::Yellow);
    }

    #[test]
    fn test_post_summary() {
        let cooling = PostWidget {
            warning: true,
            next_available: "26m".to_string(),
        };
        assert_eq!(post_summary(&cooling), "Posts cooling down · next 26m");
    }

    fn stats_text(session: &Session, now: f64) -> String {
        stats_line(session, now)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }

    #[test]
    fn test_stats_line_before_first_poll() {
        let session = Session::default();
        assert_eq!(
            stats_text(&session, 0.0),
            "● Idle   Events 0   Uptime --   Actions --   Success --"
        );
    }

    #[test]
    fn test_stats_line_shows_last_activity_and_pending_queue() {
        let mut session = Session::default();
        let snapshot = StatusSnapshot {
            uptime_hours: 1.5,
            total_actions: 40,
            successful_actions: Some(38),
            success_rate: 95.0,
            last_activity: Some(1_000.0),
            ..StatusSnapshot::default()
        };
        session.status = Some(StatusView::from_snapshot(&snapshot));
        session.pending_suggestions = Some(2);

        assert_eq!(
            stats_text(&session, 1_125.0),
            "● Idle   Events 0   Uptime 1h 30m   Actions 40 (38 ok)   Success 95.0%   Last 2m   Pending 2"
        );
    }
}
