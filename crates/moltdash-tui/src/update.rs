//! TUI reducer (update function).
//!
//! All state mutations happen here. The runtime calls `update(app, event)`
//! and executes the returned effects.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use moltdash_core::core::events::now_secs;
use moltdash_core::core::session::{SessionChange, SessionEvent};
use moltdash_core::suggestions::SuggestionOutcome;
use ratatui::layout::Rect;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::features::feed::feed_line_count;
use crate::features::input::{self, InputAction};
use crate::render;
use crate::state::{AppState, Notice};

/// Lines scrolled per mouse wheel notch.
const MOUSE_SCROLL_LINES: usize = 3;

pub fn update(app: &mut AppState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Tick => {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
            if app.notice.as_ref().is_some_and(Notice::is_expired) {
                app.notice = None;
            }
            vec![]
        }
        UiEvent::Frame { width, height } => {
            handle_frame(app, width, height);
            vec![]
        }
        UiEvent::Terminal(term_event) => handle_terminal_event(app, term_event),
        UiEvent::Session(session_event) => {
            handle_session_event(app, session_event, now_secs());
            vec![]
        }
        UiEvent::SuggestionSubmitted(outcome) => {
            handle_suggestion_outcome(app, outcome);
            vec![]
        }
    }
}

fn handle_frame(app: &mut AppState, width: u16, height: u16) {
    let areas = render::layout(Rect::new(0, 0, width, height));
    let feed_width = areas.feed.width as usize;
    app.scroll.viewport_height = areas.feed.height as usize;
    if app.scroll.viewport_width != feed_width {
        app.scroll.viewport_width = feed_width;
        refresh_line_count(app);
    }
}

fn refresh_line_count(app: &mut AppState) {
    app.scroll.cached_line_count = feed_line_count(&app.session.feed, app.scroll.viewport_width);
}

fn handle_session_event(app: &mut AppState, event: SessionEvent, now: f64) {
    let changes = app.session.apply(event, now);
    for change in &changes {
        if let SessionChange::Reconnecting(delay) = change {
            app.notice = Some(Notice::error(format!(
                "Stream lost. Reconnecting in {}s",
                delay.as_secs()
            )));
        }
    }
    let feed_changed = changes.iter().any(|change| {
        matches!(
            change,
            SessionChange::CardAdded(_)
                | SessionChange::CardUpdated(_)
                | SessionChange::CardFinalized(_)
                | SessionChange::CardsEvicted(_)
        )
    });
    if feed_changed {
        refresh_line_count(app);
    }
}

fn handle_suggestion_outcome(app: &mut AppState, outcome: SuggestionOutcome) {
    app.input.submitting = false;
    if outcome.clears_input() {
        app.input.clear();
        // The next poll corrects this if the bot was quicker.
        if let Some(pending) = app.session.pending_suggestions.as_mut() {
            *pending += 1;
        }
    }
    app.notice = match outcome {
        SuggestionOutcome::Skipped => None,
        SuggestionOutcome::Accepted => Some(Notice::info(format!(
            "Suggestion sent to {}",
            app.session.agent_name()
        ))),
        SuggestionOutcome::Rejected(Some(reason)) => {
            Some(Notice::error(format!("Suggestion rejected: {reason}")))
        }
        SuggestionOutcome::Rejected(None) => Some(Notice::error("Suggestion rejected")),
        SuggestionOutcome::Failed(error) => {
            Some(Notice::error(format!("Suggestion failed: {error}")))
        }
    };
}

fn handle_terminal_event(app: &mut AppState, event: Event) -> Vec<UiEffect> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => {
            match mouse.kind {
                MouseEventKind::ScrollUp => app.scroll.scroll_up(MOUSE_SCROLL_LINES),
                MouseEventKind::ScrollDown => app.scroll.scroll_down(MOUSE_SCROLL_LINES),
                _ => {}
            }
            vec![]
        }
        Event::Paste(text) => {
            input::handle_paste(&mut app.input, &text);
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent) -> Vec<UiEffect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if ctrl => vec![UiEffect::Quit],
        KeyCode::Char('r') if ctrl => {
            app.notice = Some(Notice::info("Reconnecting…"));
            vec![UiEffect::Reconnect]
        }
        KeyCode::Esc => {
            if app.input.is_empty() {
                vec![UiEffect::Quit]
            } else {
                app.input.clear();
                vec![]
            }
        }
        KeyCode::Up => {
            app.scroll.scroll_up(1);
            vec![]
        }
        KeyCode::Down => {
            app.scroll.scroll_down(1);
            vec![]
        }
        KeyCode::PageUp => {
            app.scroll.page_up();
            vec![]
        }
        KeyCode::PageDown => {
            app.scroll.page_down();
            vec![]
        }
        KeyCode::End => {
            app.scroll.scroll_to_bottom();
            app.input.move_end();
            vec![]
        }
        _ => match input::handle_key(&mut app.input, key) {
            InputAction::Submit(text) => vec![UiEffect::SubmitSuggestion { text }],
            InputAction::Edited | InputAction::Ignored => vec![],
        },
    }
}
