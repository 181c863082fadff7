//! Background feed polling as a scoped subscription.
//!
//! [`subscribe`] starts a dedicated thread that fetches the source on a
//! timer and sends [`FeedMsg`]s to the UI thread over an [`mpsc`] channel.
//! The returned [`Subscription`] owns both the thread and the receiving end;
//! dropping it (or calling [`Subscription::unsubscribe`]) stops the thread
//! and waits for it, so an old subscription can never race a new one.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{FeedMsg, SnapshotSource};

/// A live feed subscription.
pub struct Subscription {
    /// Dropping this sender tells the poller to stop.
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    rx: Receiver<FeedMsg>,
}

/// Start polling `source` every `interval`.
///
/// The first fetch happens immediately and is always delivered.  After that
/// a snapshot is only delivered when it differs from the last one sent, so
/// each [`FeedMsg::Snapshot`] corresponds to a change in the collection.
/// Every failed fetch is reported as [`FeedMsg::Error`].
pub fn subscribe(source: Box<dyn SnapshotSource>, interval: Duration) -> Subscription {
    let (tx, rx) = mpsc::channel();
    let (stop_tx, stop_rx) = mpsc::channel::<()>();

    info!(source = source.name(), ?interval, "feed subscribed");

    let handle = thread::spawn(move || {
        let mut last: Option<Value> = None;
        loop {
            let msg = match source.fetch() {
                Ok(value) if last.as_ref() == Some(&value) => {
                    debug!(source = source.name(), "snapshot unchanged");
                    None
                }
                Ok(value) => {
                    last = Some(value.clone());
                    Some(FeedMsg::Snapshot(value))
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "feed fetch failed");
                    // The next good fetch must clear the error, even if the
                    // collection did not change during the outage.
                    last = None;
                    Some(FeedMsg::Error(e.to_string()))
                }
            };

            // Don't deliver anything once unsubscribed.
            if !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty)) {
                return;
            }
            if let Some(msg) = msg {
                // If the receiver is gone the subscription has been dropped.
                if tx.send(msg).is_err() {
                    return;
                }
            }

            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    });

    Subscription {
        stop_tx: Some(stop_tx),
        handle: Some(handle),
        rx,
    }
}

impl Subscription {
    /// Next pending delivery, if any.  Never blocks.
    pub fn try_next(&self) -> Option<FeedMsg> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next delivery.
    pub fn next_timeout(&self, timeout: Duration) -> Option<FeedMsg> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn is_active(&self) -> bool {
        self.stop_tx.is_some()
    }

    /// Stop the poller and wait for its thread to exit.  Safe to call more
    /// than once; only the first call does anything.
    ///
    /// Blocks until a fetch in flight finishes, which for HTTP can take up
    /// to the request timeout.  Use [`detach`](Self::detach) when nothing
    /// will subscribe again.
    pub fn unsubscribe(&mut self) {
        let Some(stop_tx) = self.stop_tx.take() else {
            return;
        };
        drop(stop_tx);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("feed poller thread panicked");
            }
        }
        info!("feed unsubscribed");
    }

    /// Stop the poller without waiting for it.
    ///
    /// The thread exits after its current fetch and delivers nothing more.
    /// Afterwards [`unsubscribe`](Self::unsubscribe) and `Drop` are no-ops.
    pub fn detach(&mut self) {
        if self.stop_tx.take().is_none() {
            return;
        }
        self.handle = None;
        info!("feed detached");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays scripted fetch results, then repeats the last one.
    struct Scripted {
        steps: Mutex<VecDeque<Result<Value, String>>>,
        last: Mutex<Result<Value, String>>,
        fetches: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(steps: Vec<Result<Value, String>>, fetches: Arc<AtomicUsize>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                last: Mutex::new(Ok(Value::Null)),
                fetches,
            }
        }
    }

    impl SnapshotSource for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch(&self) -> Result<Value, FeedError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut last = self.last.lock().unwrap();
            if let Some(step) = self.steps.lock().unwrap().pop_front() {
                *last = step;
            }
            match &*last {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(FeedError::Io(std::io::Error::other(e.clone()))),
            }
        }
    }

    const WAIT: Duration = Duration::from_secs(2);
    const FAST: Duration = Duration::from_millis(5);

    #[test]
    fn first_snapshot_is_delivered_immediately() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Scripted::new(vec![Ok(json!({ "a": {} }))], fetches);
        let sub = subscribe(Box::new(source), Duration::from_secs(60));

        assert_eq!(sub.next_timeout(WAIT), Some(FeedMsg::Snapshot(json!({ "a": {} }))));
    }

    #[test]
    fn unchanged_snapshots_are_not_redelivered() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Scripted::new(
            vec![Ok(json!({ "a": {} })), Ok(json!({ "a": {} })), Ok(json!({ "b": {} }))],
            fetches,
        );
        let sub = subscribe(Box::new(source), FAST);

        assert_eq!(sub.next_timeout(WAIT), Some(FeedMsg::Snapshot(json!({ "a": {} }))));
        assert_eq!(sub.next_timeout(WAIT), Some(FeedMsg::Snapshot(json!({ "b": {} }))));
    }

    #[test]
    fn failures_are_reported_and_polling_continues() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Scripted::new(vec![Err("offline".into()), Ok(json!({ "a": {} }))], fetches);
        let sub = subscribe(Box::new(source), FAST);

        match sub.next_timeout(WAIT) {
            Some(FeedMsg::Error(e)) => assert!(e.contains("offline"), "{e}"),
            other => panic!("expected an error, got {other:?}"),
        }
        assert_eq!(sub.next_timeout(WAIT), Some(FeedMsg::Snapshot(json!({ "a": {} }))));
    }

    #[test]
    fn same_snapshot_after_a_failure_is_delivered_again() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Scripted::new(
            vec![Ok(json!({ "a": {} })), Err("blip".into()), Ok(json!({ "a": {} }))],
            fetches,
        );
        let sub = subscribe(Box::new(source), FAST);

        assert_eq!(sub.next_timeout(WAIT), Some(FeedMsg::Snapshot(json!({ "a": {} }))));
        assert!(matches!(sub.next_timeout(WAIT), Some(FeedMsg::Error(_))));
        assert_eq!(sub.next_timeout(WAIT), Some(FeedMsg::Snapshot(json!({ "a": {} }))));
    }

    #[test]
    fn state_recovers_once_the_feed_comes_back() {
        use crate::locale::{Language, LocaleTable};
        use crate::state::{Phase, PresentationState};
        use chrono::NaiveDate;

        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let deals = json!({ "a": { "title": "A", "isReady": "true" } });
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Scripted::new(
            vec![Ok(deals.clone()), Err("blip".into()), Ok(deals)],
            fetches,
        );
        let sub = subscribe(Box::new(source), FAST);
        let mut state = PresentationState::new(LocaleTable::builtin(), Language::En, today);

        for _ in 0..3 {
            let msg = sub.next_timeout(WAIT).expect("delivery");
            state.apply(msg, today);
        }

        assert_eq!(state.phase(), Phase::Ready);
        assert!(state.error_message().is_none());
        assert_eq!(state.deals().len(), 1);
    }

    #[test]
    fn detach_returns_without_waiting_for_a_slow_fetch() {
        struct Slow;

        impl SnapshotSource for Slow {
            fn name(&self) -> &str {
                "slow"
            }

            fn fetch(&self) -> Result<Value, FeedError> {
                thread::sleep(Duration::from_millis(500));
                Ok(json!({}))
            }
        }

        let mut sub = subscribe(Box::new(Slow), FAST);
        let started = std::time::Instant::now();
        sub.detach();
        assert!(started.elapsed() < Duration::from_millis(250));
        assert!(!sub.is_active());

        // Nothing is delivered after detaching, and later calls are no-ops.
        assert_eq!(sub.next_timeout(Duration::from_millis(700)), None);
        sub.unsubscribe();
        sub.detach();
    }

    #[test]
    fn unsubscribe_is_idempotent_and_stops_fetching() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Scripted::new(vec![Ok(json!({}))], fetches.clone());
        let mut sub = subscribe(Box::new(source), FAST);
        assert!(sub.next_timeout(WAIT).is_some());

        sub.unsubscribe();
        assert!(!sub.is_active());
        let after = fetches.load(Ordering::SeqCst);

        sub.unsubscribe();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(fetches.load(Ordering::SeqCst), after);
    }

    #[test]
    fn dropping_the_subscription_stops_the_thread() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let source = Scripted::new(vec![Ok(json!({}))], fetches.clone());
        let sub = subscribe(Box::new(source), FAST);
        assert!(sub.next_timeout(WAIT).is_some());

        drop(sub);
        let after = fetches.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(fetches.load(Ordering::SeqCst), after);
    }
}
