//! Pure view functions.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame, and never
//! mutate state or return effects.

use moltdash_core::core::events::now_secs;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::features::feed::render_feed;
use crate::features::header::{HEADER_HEIGHT, render_header};
use crate::features::input::{INPUT_HEIGHT, render_input};
use crate::state::{AppState, NoticeTone};

/// Height of the key-hint footer.
const FOOTER_HEIGHT: u16 = 1;

/// Horizontal margin around the feed (left and right).
pub const FEED_MARGIN: u16 = 1;

/// Spinner frames for the streaming card.
const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

const KEY_HINTS: &str = "Enter send · ↑↓ PgUp PgDn scroll · End follow · Ctrl+R reconnect · Esc quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub header: Rect,
    pub feed: Rect,
    pub input: Rect,
    pub footer: Rect,
}

pub fn layout(area: Rect) -> DashboardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);
    let feed = Layout::default()
        .direction(Direction::Horizontal)
        .horizontal_margin(FEED_MARGIN)
        .constraints([Constraint::Min(1)])
        .split(rows[1])[0];
    DashboardLayout {
        header: rows[0],
        feed,
        input: rows[2],
        footer: rows[3],
    }
}

pub fn spinner(frame: usize) -> &'static str {
    SPINNER_FRAMES[(frame / 3) % SPINNER_FRAMES.len()]
}

fn footer_line(app: &AppState) -> Line<'static> {
    match &app.notice {
        Some(notice) => {
            let color = match notice.tone {
                NoticeTone::Info => Color::Green,
                NoticeTone::Error => Color::Red,
            };
            Line::from(Span::styled(
                format!(" {}", notice.text),
                Style::default().fg(color),
            ))
        }
        None => Line::from(Span::styled(
            format!(" {KEY_HINTS}"),
            Style::default().fg(Color::DarkGray),
        )),
    }
}

pub fn render(app: &AppState, frame: &mut Frame) {
    let areas = layout(frame.area());
    let now = now_secs();

    render_header(&app.session, &app.base_url, now, frame, areas.header);
    render_feed(
        &app.session.feed,
        &app.scroll,
        now,
        spinner(app.spinner_frame),
        frame,
        areas.feed,
    );
    render_input(&app.input, app.session.agent_name(), frame, areas.input);
    frame.render_widget(Paragraph::new(footer_line(app)), areas.footer);
}
