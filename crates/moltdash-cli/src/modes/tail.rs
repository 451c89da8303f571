//! Line-oriented activity output.
//!
//! Cards go to stdout, one line each; connection chatter goes to stderr.
//! A streaming thought is printed once, when it is finalized.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use moltdash_core::client::DashboardClient;
use moltdash_core::config::Config;
use moltdash_core::core::card::Card;
use moltdash_core::core::events::now_secs;
use moltdash_core::core::relative_time::format_relative;
use moltdash_core::core::session::{ConnectionState, Session, SessionChange};
use moltdash_core::stream::{StreamControl, StreamOptions, run_activity_stream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TailLine {
    Stdout(String),
    Stderr(String),
}

/// Formats a card as `[2m] 💭 THOUGHT: text`.
pub fn format_card_line(card: &Card, now: f64) -> String {
    let content = card
        .content
        .to_plain_text()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let relative = format_relative(card.timestamp, now);
    if content.is_empty() {
        format!("[{relative}] {} {}", card.icon, card.label)
    } else {
        format!("[{relative}] {} {}: {content}", card.icon, card.label)
    }
}

/// Maps one session change to the line it should print, if any.
pub fn describe_change(session: &Session, change: &SessionChange, now: f64) -> Option<TailLine> {
    match change {
        SessionChange::CardAdded(id) => session
            .feed
            .get(*id)
            .filter(|card| !card.streaming)
            .map(|card| TailLine::Stdout(format_card_line(card, now))),
        SessionChange::CardFinalized(id) => session
            .feed
            .get(*id)
            .map(|card| TailLine::Stdout(format_card_line(card, now))),
        SessionChange::ConnectionChanged(ConnectionState::Running) => {
            Some(TailLine::Stderr("Connected to activity stream".to_string()))
        }
        SessionChange::ConnectionChanged(ConnectionState::Error) => {
            let error = session.last_error.as_deref().unwrap_or("unknown error");
            Some(TailLine::Stderr(format!("Stream error: {error}")))
        }
        SessionChange::Reconnecting(delay) => Some(TailLine::Stderr(format!(
            "Reconnecting in {}s",
            delay.as_secs()
        ))),
        _ => None,
    }
}

/// Writes the lines for `changes`, stopping at the first write error.
pub fn print_changes(
    session: &Session,
    changes: &[SessionChange],
    now: f64,
    stdout: &mut impl Write,
    stderr: &mut impl Write,
) -> io::Result<()> {
    for change in changes {
        match describe_change(session, change, now) {
            Some(TailLine::Stdout(line)) => {
                writeln!(stdout, "{line}")?;
                stdout.flush()?;
            }
            Some(TailLine::Stderr(line)) => writeln!(stderr, "{line}")?,
            None => {}
        }
    }
    Ok(())
}

/// Prints activity until Ctrl+C or until stdout is closed.
///
/// # Errors
/// Returns an error if writing fails for a reason other than a closed pipe.
pub async fn run(config: &Config, client: DashboardClient) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let control = StreamControl::new(CancellationToken::new());
    let options = StreamOptions {
        reconnect_delay: config.reconnect_delay(),
        backfill: config.backfill,
    };

    let _ = writeln!(
        io::stderr(),
        "Tailing {} (Ctrl+C to stop)",
        client.base_url()
    );
    tokio::spawn(run_activity_stream(
        Arc::new(client),
        options,
        tx,
        control.clone(),
    ));

    let mut session = Session::new(config.agent_name.clone(), config.feed_limit);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("Ctrl+C received, stopping tail");
                break Ok(());
            }
            event = rx.recv() => {
                let Some(event) = event else { break Ok(()) };
                let now = now_secs();
                let changes = session.apply(event, now);
                let written = print_changes(
                    &session,
                    &changes,
                    now,
                    &mut io::stdout().lock(),
                    &mut io::stderr().lock(),
                );
                match written {
                    Ok(()) => {}
                    Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                        debug!("Output closed, stopping tail");
                        break Ok(());
                    }
                    Err(err) => break Err(err).context("write activity line"),
                }
            }
        }
    };

    control.shutdown();
    result
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use moltdash_core::core::card::icon_for;
    use moltdash_core::core::events::ActivityKind;
    use moltdash_core::core::session::{SessionEvent, StreamSignal};

    use super::*;

    const NOW: f64 = 1_700_000_100.0;

    fn apply(session: &mut Session, json: &str) -> Vec<SessionChange> {
        session.apply(
            SessionEvent::Stream(StreamSignal::Payload(json.to_string())),
            NOW,
        )
    }

    #[test]
    fn test_thought_prints_one_line() {
        let mut session = Session::default();
        let changes = apply(
            &mut session,
            r#"{"type":"thought","details":{"content":"Crabs are\nunderrated"},"timestamp":1700000000}"#,
        );
        let lines: Vec<_> = changes
            .iter()
            .filter_map(|c| describe_change(&session, c, NOW))
            .collect();
        assert_eq!(
            lines,
            vec![TailLine::Stdout(format!(
                "[1m] {} THOUGHT: Crabs are underrated",
                icon_for(&ActivityKind::Thought)
            ))]
        );
    }

    #[test]
    fn test_streaming_thought_prints_on_finalize() {
        let mut session = Session::default();
        let first = apply(
            &mut session,
            r#"{"type":"thought_chunk","details":{"chunk":"Hel","accumulated":"Hel"},"timestamp":1700000100}"#,
        );
        assert!(first.iter().all(|c| describe_change(&session, c, NOW).is_none()));

        let second = apply(
            &mut session,
            r#"{"type":"thought_chunk","details":{"chunk":"lo","accumulated":"Hello"},"timestamp":1700000100}"#,
        );
        assert!(second.iter().all(|c| describe_change(&session, c, NOW).is_none()));

        let done = apply(
            &mut session,
            r#"{"type":"thought","details":{"content":"Hello"},"timestamp":1700000100}"#,
        );
        let lines: Vec<_> = done
            .iter()
            .filter_map(|c| describe_change(&session, c, NOW))
            .collect();
        assert_eq!(lines.len(), 1);
        let TailLine::Stdout(line) = &lines[0] else {
            panic!("expected stdout line");
        };
        assert!(line.starts_with("[now]"));
        assert!(line.ends_with("THINKING: Hello"));
    }

    /// Reader end already gone, like `moltdash tail | head -1` after one line.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_print_changes_routes_lines() {
        let mut session = Session::default();
        let mut changes = session.apply(SessionEvent::Stream(StreamSignal::Connected), NOW);
        changes.extend(apply(
            &mut session,
            r#"{"type":"search","details":{"query":"crabs"},"timestamp":1700000100}"#,
        ));

        let (mut out, mut err) = (Vec::new(), Vec::new());
        print_changes(&session, &changes, NOW, &mut out, &mut err).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("crabs"));
        assert_eq!(String::from_utf8(err).unwrap(), "Connected to activity stream\n");
    }

    #[test]
    fn test_closed_stdout_stops_printing() {
        let mut session = Session::default();
        let mut changes = apply(
            &mut session,
            r#"{"type":"search","details":{"query":"crabs"},"timestamp":1700000100}"#,
        );
        changes.push(SessionChange::Reconnecting(Duration::from_secs(5)));

        let mut err = Vec::new();
        let result = print_changes(&session, &changes, NOW, &mut ClosedPipe, &mut err);

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(err.is_empty());
    }

    #[test]
    fn test_connection_changes_go_to_stderr() {
        let mut session = Session::default();
        let changes = session.apply(SessionEvent::Stream(StreamSignal::Connected), NOW);
        assert_eq!(
            describe_change(&session, &changes[0], NOW),
            Some(TailLine::Stderr("Connected to activity stream".to_string()))
        );

        let changes = session.apply(
            SessionEvent::Stream(StreamSignal::Disconnected {
                error: "HTTP 502".to_string(),
            }),
            NOW,
        );
        assert_eq!(
            describe_change(&session, &changes[0], NOW),
            Some(TailLine::Stderr("Stream error: HTTP 502".to_string()))
        );

        let change = SessionChange::Reconnecting(Duration::from_secs(5));
        assert_eq!(
            describe_change(&session, &change, NOW),
            Some(TailLine::Stderr("Reconnecting in 5s".to_string()))
        );
    }
}
