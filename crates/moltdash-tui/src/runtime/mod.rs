//! TUI runtime - owns terminal, runs event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and produces
//! effects; this module executes them.
//!
//! ## Inbox Pattern
//!
//! - The stream supervisor and status poller send `SessionEvent`s to
//!   `session_tx`
//! - Spawned effects send their result `UiEvent` to `inbox_tx`
//! - The runtime drains both receivers each frame

mod inbox;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use inbox::{SessionEventReceiver, SessionEventSender, UiEventReceiver, UiEventSender};
use moltdash_core::client::DashboardClient;
use moltdash_core::config::Config;
use moltdash_core::poller::run_status_poller;
use moltdash_core::stream::{StreamControl, StreamOptions, run_activity_stream};
use moltdash_core::suggestions::submit_suggestion;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::terminal::DashboardTerminal;
use crate::{render, update};

/// Frame cadence while the user is interacting or a card is streaming.
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

/// Full-screen dashboard runtime.
///
/// Terminal state is restored on drop, panic, or quit.
pub struct TuiRuntime {
    terminal: DashboardTerminal,
    pub state: AppState,
    config: Config,
    client: Arc<DashboardClient>,
    inbox_tx: UiEventSender,
    inbox_rx: UiEventReceiver,
    session_tx: SessionEventSender,
    session_rx: SessionEventReceiver,
    /// Cancels the background stream and poller tasks.
    cancel: CancellationToken,
    stream_control: StreamControl,
    last_tick: Instant,
    last_terminal_event: Instant,
}

impl TuiRuntime {
    pub fn new(config: Config, client: DashboardClient) -> Result<Self> {
        let terminal = DashboardTerminal::open().context("Failed to setup terminal")?;

        let state = AppState::new(&config);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let stream_control = StreamControl::new(cancel.child_token());

        let now = Instant::now();
        Ok(Self {
            terminal,
            state,
            config,
            client: Arc::new(client),
            inbox_tx,
            inbox_rx,
            session_tx,
            session_rx,
            cancel,
            stream_control,
            last_tick: now,
            last_terminal_event: now,
        })
    }

    /// Starts the background tasks and runs the event loop until quit.
    pub fn run(&mut self) -> Result<()> {
        self.spawn_background_tasks();
        self.terminal.enable_input()?;

        let result = self.event_loop();

        self.terminal.disable_input();
        self.cancel.cancel();
        result
    }

    fn spawn_background_tasks(&self) {
        let options = StreamOptions {
            reconnect_delay: self.config.reconnect_delay(),
            backfill: self.config.backfill,
        };
        tokio::spawn(run_activity_stream(
            Arc::clone(&self.client),
            options,
            self.session_tx.clone(),
            self.stream_control.clone(),
        ));
        tokio::spawn(run_status_poller(
            Arc::clone(&self.client),
            self.config.poll_interval(),
            self.session_tx.clone(),
            self.cancel.child_token(),
        ));
        debug!("Background tasks started");
    }

    fn event_loop(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            let mut events = self.collect_events()?;

            // Layout updates must happen before other events in the batch.
            let size = self.terminal.size()?;
            events.insert(
                0,
                UiEvent::Frame {
                    width: size.width,
                    height: size.height,
                },
            );

            for event in events {
                if matches!(&event, UiEvent::Terminal(_)) {
                    self.last_terminal_event = Instant::now();
                }
                let marks_dirty = matches!(&event, UiEvent::Tick);
                let effects = update::update(&mut self.state, event);
                if marks_dirty {
                    dirty = true;
                }
                self.execute_effects(effects);
            }

            if dirty {
                self.terminal.draw(|frame| {
                    render::render(&self.state, frame);
                })?;
                dirty = false;
            }
        }

        Ok(())
    }

    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();

        let recent_terminal_activity = self.last_terminal_event.elapsed() < IDLE_POLL_DURATION;
        let needs_fast_poll = recent_terminal_activity
            || self.state.session.feed.streaming().is_some()
            || self.state.input.submitting;
        let tick_interval = if needs_fast_poll {
            FRAME_DURATION
        } else {
            IDLE_POLL_DURATION
        };

        while let Ok(ev) = self.session_rx.try_recv() {
            events.push(UiEvent::Session(ev));
        }
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            tick_interval.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= tick_interval {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns an async effect, sending an optional "started" event immediately
    /// and the result event when complete.
    fn spawn_effect<F, Fut>(&self, started: Option<UiEvent>, f: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        if let Some(ev) = started {
            let _ = tx.send(ev);
        }
        tokio::spawn(async move {
            let _ = tx.send(f().await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => {
                self.state.should_quit = true;
            }
            UiEffect::SubmitSuggestion { text } => {
                let client = Arc::clone(&self.client);
                self.spawn_effect(None, move || async move {
                    UiEvent::SuggestionSubmitted(submit_suggestion(&client, &text).await)
                });
            }
            UiEffect::Reconnect => {
                self.stream_control.reconnect_now();
            }
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.terminal.restore();
    }
}
