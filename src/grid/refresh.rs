//! Periodic background refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

struct Task {
    handle: JoinHandle<()>,
    cancel: Sender<()>,
}

/// A background thread that calls a tick function every period.
///
/// At most one thread runs per instance. Changing the period of a running
/// task only updates the shared period; it is picked up after the current
/// sleep. [`disable`](Self::disable) wakes the thread and joins it.
#[derive(Default)]
pub struct AutoRefresh {
    period_ms: Arc<AtomicU64>,
    task: Option<Task>,
}

impl std::fmt::Debug for AutoRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoRefresh")
            .field("period_ms", &self.period_ms.load(Ordering::Relaxed))
            .field("running", &self.task.is_some())
            .finish()
    }
}

impl AutoRefresh {
    /// Idle instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `tick` every `period` until disabled. A zero period disables.
    ///
    /// If a thread is already running only its period changes and `tick` is
    /// dropped.
    pub fn enable(&mut self, period: Duration, tick: impl Fn() + Send + 'static) {
        let period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        if period_ms == 0 {
            self.disable();
            return;
        }
        self.period_ms.store(period_ms, Ordering::Release);

        if self.is_running() {
            debug!(period_ms, "auto-refresh period updated");
            return;
        }

        let (cancel, cancelled) = mpsc::channel::<()>();
        let shared_period = Arc::clone(&self.period_ms);
        let handle = thread::spawn(move || loop {
            let period_ms = shared_period.load(Ordering::Acquire);
            if period_ms == 0 {
                break;
            }
            tick();
            match cancelled.recv_timeout(Duration::from_millis(period_ms)) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        self.task = Some(Task { handle, cancel });
        debug!(period_ms, "auto-refresh started");
    }

    /// Stop the thread and wait for it to exit.
    pub fn disable(&mut self) {
        self.period_ms.store(0, Ordering::Release);
        if let Some(task) = self.task.take() {
            // The thread may already have exited on its own.
            let _ = task.cancel.send(());
            if task.handle.join().is_err() {
                debug!("auto-refresh thread panicked");
            }
            debug!("auto-refresh stopped");
        }
    }

    /// True while the background thread is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|task| !task.handle.is_finished())
    }

    /// Current period, `None` when disabled.
    #[must_use]
    pub fn period(&self) -> Option<Duration> {
        match self.period_ms.load(Ordering::Acquire) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.disable();
    }
}
