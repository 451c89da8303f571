//! Periodic status poller.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::client::{DashboardClient, DashboardResult, PendingSuggestion};
use crate::core::session::{PollOutcome, SessionEvent};
use crate::core::status::StatusSnapshot;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

pub trait StatusSource: Send + Sync + 'static {
    fn fetch_status(&self) -> impl Future<Output = DashboardResult<StatusSnapshot>> + Send;

    fn fetch_pending_suggestions(
        &self,
    ) -> impl Future<Output = DashboardResult<Vec<PendingSuggestion>>> + Send;
}

impl StatusSource for DashboardClient {
    fn fetch_status(&self) -> impl Future<Output = DashboardResult<StatusSnapshot>> + Send {
        self.status()
    }

    fn fetch_pending_suggestions(
        &self,
    ) -> impl Future<Output = DashboardResult<Vec<PendingSuggestion>>> + Send {
        self.pending_suggestions()
    }
}

/// Polls immediately, then every `interval`, until cancelled or the inbox
/// closes. Failures are reported and the timer keeps going.
///
/// The suggestion queue is only fetched after a successful status poll, and
/// its failures are logged without touching the connection state.
pub async fn run_status_poller<S: StatusSource>(
    source: Arc<S>,
    interval: Duration,
    inbox: UnboundedSender<SessionEvent>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = source.fetch_status() => result,
        };
        let reachable = result.is_ok();
        let outcome = match result {
            Ok(snapshot) => PollOutcome::Snapshot(snapshot),
            Err(err) => {
                warn!(error = %err, kind = %err.kind, "Status poll failed");
                PollOutcome::Failed(err.to_string())
            }
        };
        if inbox.send(SessionEvent::Poll(outcome)).is_err() {
            break;
        }
        if !reachable {
            continue;
        }

        let pending = tokio::select! {
            () = cancel.cancelled() => break,
            pending = source.fetch_pending_suggestions() => pending,
        };
        match pending {
            Ok(pending) => {
                let outcome = PollOutcome::PendingSuggestions(pending.len());
                if inbox.send(SessionEvent::Poll(outcome)).is_err() {
                    break;
                }
            }
            Err(err) => debug!(error = %err, "Pending suggestions poll failed"),
        }
    }
    debug!("Status poller stopped");
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::mpsc;
    use tokio::time::Instant;

    use super::*;
    use crate::client::DashboardError;

    #[derive(Default)]
    struct FlakySource {
        calls: Mutex<Vec<Instant>>,
        pending_calls: Mutex<usize>,
    }

    impl StatusSource for FlakySource {
        fn fetch_status(&self) -> impl Future<Output = DashboardResult<StatusSnapshot>> + Send {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Instant::now());
            let result = if calls.len() % 2 == 0 {
                Err(DashboardError::http_status(500, ""))
            } else {
                Ok(StatusSnapshot {
                    running: true,
                    ..StatusSnapshot::default()
                })
            };
            async move { result }
        }

        fn fetch_pending_suggestions(
            &self,
        ) -> impl Future<Output = DashboardResult<Vec<PendingSuggestion>>> + Send {
            let mut calls = self.pending_calls.lock().unwrap();
            *calls += 1;
            let result = if *calls == 1 {
                Ok(vec![PendingSuggestion {
                    id: 1,
                    text: "more crabs".to_string(),
                    timestamp: None,
                }])
            } else {
                Err(DashboardError::http_status(404, ""))
            };
            async move { result }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval_despite_failures() {
        let source = Arc::new(FlakySource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let start = Instant::now();
        let task = tokio::spawn(run_status_poller(
            Arc::clone(&source),
            DEFAULT_POLL_INTERVAL,
            tx,
            cancel.clone(),
        ));

        let mut outcomes = Vec::new();
        for _ in 0..5 {
            match rx.recv().await {
                Some(SessionEvent::Poll(outcome)) => outcomes.push(outcome),
                other => panic!("unexpected event: {other:?}"),
            }
        }
        cancel.cancel();
        task.await.unwrap();

        assert!(matches!(outcomes[0], PollOutcome::Snapshot(_)));
        assert_eq!(outcomes[1], PollOutcome::PendingSuggestions(1));
        assert!(matches!(outcomes[2], PollOutcome::Failed(ref e) if e == "HTTP 500"));
        // A failed queue fetch sends nothing.
        assert!(matches!(outcomes[3], PollOutcome::Snapshot(_)));
        assert!(matches!(outcomes[4], PollOutcome::Failed(_)));
        assert_eq!(*source.pending_calls.lock().unwrap(), 2);

        let calls = source.calls.lock().unwrap().clone();
        assert_eq!(calls[0], start);
        for pair in calls.windows(2) {
            assert_eq!(pair[1] - pair[0], DEFAULT_POLL_INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_poller() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_status_poller(
            Arc::new(FlakySource::default()),
            DEFAULT_POLL_INTERVAL,
            tx,
            cancel.clone(),
        ));
        rx.recv().await.unwrap();
        cancel.cancel();
        task.await.unwrap();
    }
}
