//! Activity stream supervisor.
//!
//! Owns at most one open subscription at a time. Any failure (open error,
//! transport error, clean end of stream) is reported to the inbox and
//! followed by a fixed-delay retry, forever, until cancelled.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::Notify;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::client::{ActivityStream, DashboardClient, DashboardError, DashboardResult};
use crate::core::events::ActivityEvent;
use crate::core::session::{SessionEvent, StreamSignal};

/// Default delay between a failure and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Floor applied to `StreamOptions::reconnect_delay`.
pub const MIN_RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Something that can open an activity subscription.
pub trait ActivitySource: Send + Sync + 'static {
    fn open(&self) -> impl Future<Output = DashboardResult<ActivityStream>> + Send;

    /// Recent events used to seed the feed before the first connection.
    fn recent(&self) -> impl Future<Output = DashboardResult<Vec<ActivityEvent>>> + Send;
}

impl ActivitySource for DashboardClient {
    fn open(&self) -> impl Future<Output = DashboardResult<ActivityStream>> + Send {
        self.open_activity_stream()
    }

    fn recent(&self) -> impl Future<Output = DashboardResult<Vec<ActivityEvent>>> + Send {
        self.recent_activity()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    pub reconnect_delay: Duration,
    /// Fetch recent activity once before the first connection.
    pub backfill: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            backfill: true,
        }
    }
}

/// Handle for steering a running supervisor.
#[derive(Debug, Clone, Default)]
pub struct StreamControl {
    cancel: CancellationToken,
    reconnect: Arc<Notify>,
}

impl StreamControl {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            reconnect: Arc::new(Notify::new()),
        }
    }

    /// Tears down the current subscription (or skips the pending delay) and
    /// connects again immediately.
    pub fn reconnect_now(&self) {
        self.reconnect.notify_one();
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

enum SessionEnd {
    Failed(DashboardError),
    ReconnectRequested,
    Cancelled,
    InboxClosed,
}

/// Runs the supervised subscription loop until cancelled or the inbox closes.
pub async fn run_activity_stream<S: ActivitySource>(
    source: Arc<S>,
    options: StreamOptions,
    inbox: UnboundedSender<SessionEvent>,
    control: StreamControl,
) {
    if options.backfill && !backfill(source.as_ref(), &inbox, &control).await {
        return;
    }
    let delay = options.reconnect_delay.max(MIN_RECONNECT_DELAY);

    loop {
        match consume_once(source.as_ref(), &inbox, &control).await {
            SessionEnd::Cancelled | SessionEnd::InboxClosed => break,
            SessionEnd::ReconnectRequested => {
                info!("Reconnecting activity stream on request");
                continue;
            }
            SessionEnd::Failed(err) => {
                warn!(error = %err, kind = %err.kind, "Activity stream failed");
                let disconnected = StreamSignal::Disconnected {
                    error: err.to_string(),
                };
                let reconnecting = StreamSignal::Reconnecting { delay };
                if !emit(&inbox, disconnected) || !emit(&inbox, reconnecting) {
                    break;
                }
            }
        }

        tokio::select! {
            () = control.cancel.cancelled() => break,
            () = control.reconnect.notified() => info!("Skipping reconnect delay on request"),
            () = tokio::time::sleep(delay) => {}
        }
    }
    debug!("Activity stream supervisor stopped");
}

async fn backfill<S: ActivitySource>(
    source: &S,
    inbox: &UnboundedSender<SessionEvent>,
    control: &StreamControl,
) -> bool {
    let result = tokio::select! {
        () = control.cancel.cancelled() => return false,
        result = source.recent() => result,
    };
    match result {
        Ok(events) if events.is_empty() => true,
        Ok(events) => {
            debug!(count = events.len(), "Backfilled recent activity");
            inbox.send(SessionEvent::Backfill(events)).is_ok()
        }
        Err(err) => {
            warn!(error = %err, "Failed to fetch recent activity");
            true
        }
    }
}

async fn consume_once<S: ActivitySource>(
    source: &S,
    inbox: &UnboundedSender<SessionEvent>,
    control: &StreamControl,
) -> SessionEnd {
    let opened = tokio::select! {
        () = control.cancel.cancelled() => return SessionEnd::Cancelled,
        () = control.reconnect.notified() => return SessionEnd::ReconnectRequested,
        opened = source.open() => opened,
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(err) => return SessionEnd::Failed(err),
    };

    info!("Activity stream connected");
    if !emit(inbox, StreamSignal::Connected) {
        return SessionEnd::InboxClosed;
    }

    loop {
        let next = tokio::select! {
            () = control.cancel.cancelled() => return SessionEnd::Cancelled,
            () = control.reconnect.notified() => return SessionEnd::ReconnectRequested,
            next = stream.next() => next,
        };
        match next {
            Some(Ok(payload)) => {
                if !emit(inbox, StreamSignal::Payload(payload)) {
                    return SessionEnd::InboxClosed;
                }
            }
            Some(Err(err)) => return SessionEnd::Failed(err),
            None => return SessionEnd::Failed(DashboardError::closed()),
        }
    }
}

fn emit(inbox: &UnboundedSender<SessionEvent>, signal: StreamSignal) -> bool {
    inbox.send(SessionEvent::Stream(signal)).is_ok()
}
