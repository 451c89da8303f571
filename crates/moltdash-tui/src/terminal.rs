//! The dashboard's hold on the terminal.
//!
//! [`DashboardTerminal`] records every mode it switches on and switches them
//! off again newest first, either on drop or from the panic hook.

use std::io::{self, Stdout};
use std::ops::{Deref, DerefMut};
use std::panic;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::warn;

/// Set while a dashboard holds the terminal; the panic hook only restores then.
static HELD: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();

/// A terminal mode the dashboard switches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Raw,
    AlternateScreen,
    /// Pasted text arrives as one event in the suggestion box.
    BracketedPaste,
    /// Wheel scrolling in the feed.
    Mouse,
}

impl Mode {
    /// Everything the dashboard ever enables, in enabling order.
    const ALL: [Mode; 4] = [
        Mode::Raw,
        Mode::AlternateScreen,
        Mode::BracketedPaste,
        Mode::Mouse,
    ];

    fn is_input(self) -> bool {
        matches!(self, Mode::BracketedPaste | Mode::Mouse)
    }

    fn enable(self) -> io::Result<()> {
        match self {
            Mode::Raw => enable_raw_mode(),
            Mode::AlternateScreen => execute!(io::stdout(), EnterAlternateScreen),
            Mode::BracketedPaste => execute!(io::stdout(), EnableBracketedPaste),
            Mode::Mouse => execute!(io::stdout(), EnableMouseCapture),
        }
    }

    fn disable(self) -> io::Result<()> {
        match self {
            Mode::Raw => disable_raw_mode(),
            Mode::AlternateScreen => execute!(io::stdout(), LeaveAlternateScreen),
            Mode::BracketedPaste => execute!(io::stdout(), DisableBracketedPaste),
            Mode::Mouse => execute!(io::stdout(), DisableMouseCapture),
        }
    }
}

/// Modes currently switched on, oldest first.
#[derive(Debug, Default)]
struct ModeStack(Vec<Mode>);

impl ModeStack {
    /// Returns false if `mode` was already on.
    fn push(&mut self, mode: Mode) -> bool {
        if self.0.contains(&mode) {
            return false;
        }
        self.0.push(mode);
        true
    }

    /// Removes the modes matching `pred` and returns them newest first.
    fn pop_where(&mut self, pred: impl Fn(Mode) -> bool) -> Vec<Mode> {
        let mut popped: Vec<Mode> = self.0.iter().copied().filter(|m| pred(*m)).collect();
        self.0.retain(|m| !pred(*m));
        popped.reverse();
        popped
    }
}

fn switch_off(modes: Vec<Mode>) {
    for mode in modes {
        if let Err(err) = mode.disable() {
            warn!(?mode, error = %err, "Failed to restore terminal mode");
        }
    }
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if HELD.swap(false, Ordering::SeqCst) {
                for mode in Mode::ALL.into_iter().rev() {
                    let _ = mode.disable();
                }
            }
            previous(info);
        }));
    });
}

/// Raw-mode, alternate-screen ratatui terminal.
///
/// Derefs to the inner [`Terminal`] for drawing.
pub struct DashboardTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    modes: ModeStack,
}

impl DashboardTerminal {
    /// Takes over the terminal.
    ///
    /// # Errors
    /// Returns an error if a mode cannot be enabled or the backend cannot be
    /// created. Whatever was switched on is switched off again.
    pub fn open() -> Result<Self> {
        install_panic_hook();
        let mut modes = ModeStack::default();
        for mode in [Mode::Raw, Mode::AlternateScreen] {
            if let Err(err) = mode.enable() {
                switch_off(modes.pop_where(|_| true));
                return Err(err).with_context(|| format!("Failed to enable {mode:?}"));
            }
            modes.push(mode);
        }
        HELD.store(true, Ordering::SeqCst);

        match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => Ok(Self { terminal, modes }),
            Err(err) => {
                HELD.store(false, Ordering::SeqCst);
                switch_off(modes.pop_where(|_| true));
                Err(err).context("Failed to create terminal")
            }
        }
    }

    /// Turns on bracketed paste and mouse capture.
    ///
    /// # Errors
    /// Returns an error if the terminal rejects either mode.
    pub fn enable_input(&mut self) -> Result<()> {
        for mode in [Mode::BracketedPaste, Mode::Mouse] {
            if self.modes.push(mode) {
                mode.enable()
                    .with_context(|| format!("Failed to enable {mode:?}"))?;
            }
        }
        Ok(())
    }

    pub fn disable_input(&mut self) {
        switch_off(self.modes.pop_where(Mode::is_input));
    }

    /// Switches every mode off. Safe to call twice.
    pub fn restore(&mut self) {
        HELD.store(false, Ordering::SeqCst);
        switch_off(self.modes.pop_where(|_| true));
    }
}

impl Deref for DashboardTerminal {
    type Target = Terminal<CrosstermBackend<Stdout>>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for DashboardTerminal {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for DashboardTerminal {
    fn drop(&mut self) {
        self.restore();
    }
}
