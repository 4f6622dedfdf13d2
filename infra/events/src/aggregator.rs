use crate::bus::EventBus;
use crate::error::EventBusError;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Published once per settled burst of change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogChanged {
    /// How many raw notifications were folded into this event.
    pub notifications: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Armed,
    Closed,
}

/// Cheap handle that storage backends use to report a change.
///
/// Sending never blocks and is safe from any thread. Notifications sent after the aggregator
/// has been torn down are discarded.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: mpsc::UnboundedSender<()>,
}

impl ChangeNotifier {
    pub fn notify(&self) {
        if self.tx.send(()).is_err() {
            trace!("Change notification ignored: aggregator is gone");
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Debounces change notifications into [`CatalogChanged`] events.
///
/// The first notification arms a timer of `window`; every further notification restarts it.
/// When the timer fires the bus receives a single event. Tearing the aggregator down while
/// armed suppresses the pending event.
#[derive(Debug)]
pub struct ChangeAggregator {
    notifier: ChangeNotifier,
    phase: Arc<Mutex<Phase>>,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
    window: Duration,
}

impl ChangeAggregator {
    /// Starts the debounce task on the current tokio runtime.
    ///
    /// # Errors
    /// Returns [`EventBusError::NoRuntime`] when called outside a runtime.
    pub fn spawn(bus: EventBus, window: Duration) -> Result<Self, EventBusError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|err| {
            EventBusError::NoRuntime {
                message: err.to_string().into(),
                context: Some("Spawning change aggregator".into()),
            }
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let phase = Arc::new(Mutex::new(Phase::Idle));
        let token = CancellationToken::new();

        let task = handle.spawn(run(rx, bus, window, Arc::clone(&phase), token.clone()));
        debug!(window_ms = window.as_millis(), "Change aggregator started");

        Ok(Self { notifier: ChangeNotifier { tx }, phase, token, task: Some(task), window })
    }

    #[must_use]
    pub fn notifier(&self) -> ChangeNotifier {
        self.notifier.clone()
    }

    pub fn notify(&self) {
        self.notifier.notify();
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// `true` while a burst is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        *self.phase.lock() == Phase::Armed
    }

    /// Stops the task and waits for it to exit. No event is published afterwards.
    pub async fn shutdown(mut self) {
        self.close();
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
            && !err.is_cancelled()
        {
            warn!(error = %err, "Change aggregator task ended abnormally");
        }
        debug!("Change aggregator stopped");
    }

    fn close(&self) {
        *self.phase.lock() = Phase::Closed;
        self.token.cancel();
    }
}

impl Drop for ChangeAggregator {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<()>,
    bus: EventBus,
    window: Duration,
    phase: Arc<Mutex<Phase>>,
    token: CancellationToken,
) {
    loop {
        let first = tokio::select! {
            biased;
            () = token.cancelled() => return,
            msg = rx.recv() => msg,
        };
        if first.is_none() {
            return;
        }

        {
            let mut guard = phase.lock();
            if *guard == Phase::Closed {
                return;
            }
            *guard = Phase::Armed;
        }
        trace!("Change aggregator armed");

        let mut notifications = 1_usize;
        let mut open = true;
        let timer = sleep(window);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                msg = rx.recv(), if open => match msg {
                    Some(()) => {
                        notifications += 1;
                        timer.as_mut().reset(Instant::now() + window);
                    },
                    None => open = false,
                },
                () = &mut timer => break,
            }
        }

        // Emission and teardown are serialised by the phase lock.
        let mut guard = phase.lock();
        if *guard == Phase::Closed {
            return;
        }
        *guard = Phase::Idle;
        debug!(notifications, "Change burst settled");
        if let Err(err) = bus.publish(CatalogChanged { notifications }) {
            warn!(error = %err, "Failed to publish catalog change");
        }
        drop(guard);

        if !open {
            return;
        }
    }
}
