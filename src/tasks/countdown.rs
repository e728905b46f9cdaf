use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, TimeDelta};
use serde::Deserialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::events::CountdownFinished;

const TICK: Duration = Duration::from_secs(1);

/// Source of local wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// How the tick loop schedules its next wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TickMode {
    /// Wake exactly when the displayed second changes.
    #[default]
    Aligned,
    /// Sleep a fixed second between ticks; drifts against the wall clock.
    Fixed,
}

/// `MM:SS` below one hour, `HH:MM:SS` (unbounded hours) from there on.
pub fn format_remaining(total_secs: u64) -> String {
    let secs = total_secs % 60;
    let mins = total_secs / 60;
    if mins >= 60 {
        format!("{:02}:{:02}:{:02}", mins / 60, mins % 60, secs)
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

/// Whole seconds still left before the target, or `None` once it is reached.
///
/// The count drops exactly when a full second boundary is crossed, so a tick
/// landing on the boundary never repeats the previous value.
fn whole_seconds(remaining: TimeDelta) -> Option<u64> {
    let ms = remaining.num_milliseconds();
    (ms > 0).then(|| ((ms - 1) / 1000) as u64)
}

fn next_wait(mode: TickMode, remaining: TimeDelta, secs: u64) -> Duration {
    match mode {
        TickMode::Fixed => TICK,
        TickMode::Aligned => {
            let ms = remaining.num_milliseconds() - secs as i64 * 1000;
            Duration::from_millis(ms.clamp(1, 1000) as u64)
        }
    }
}

struct Running {
    target: NaiveDateTime,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Publishes the formatted time left until a target instant, once per second.
///
/// The display text is a `watch` channel: the tick task is its only writer
/// while running, and `stop` clears it only after the task has exited.
pub struct CountdownEngine {
    clock: Arc<dyn Clock>,
    mode: TickMode,
    display: Arc<watch::Sender<String>>,
    finished: Option<mpsc::Sender<CountdownFinished>>,
    running: Option<Running>,
}

impl CountdownEngine {
    pub fn new(clock: Arc<dyn Clock>, mode: TickMode) -> Self {
        let (display, _) = watch::channel(String::new());
        Self {
            clock,
            mode,
            display: Arc::new(display),
            finished: None,
            running: None,
        }
    }

    /// Registers the receiver of the completion signal.
    pub fn with_observer(mut self, finished: mpsc::Sender<CountdownFinished>) -> Self {
        self.finished = Some(finished);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.display.subscribe()
    }

    pub fn text(&self) -> String {
        self.display.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    /// Target of the current (or last naturally finished) countdown.
    pub fn target(&self) -> Option<NaiveDateTime> {
        self.running.as_ref().map(|r| r.target)
    }

    /// Starts counting down to `target`, replacing any countdown in progress.
    pub async fn start(&mut self, target: NaiveDateTime) {
        self.halt().await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            target,
            self.clock.clone(),
            self.mode,
            self.display.clone(),
            self.finished.clone(),
            cancel.clone(),
        ));
        info!(%target, mode = ?self.mode, "countdown started");
        self.running = Some(Running {
            target,
            cancel,
            handle,
        });
    }

    /// Stops ticking and clears the display. Safe to call repeatedly.
    pub async fn stop(&mut self) {
        if self.halt().await {
            info!("countdown stopped");
        }
        self.display.send_if_modified(|text| {
            let changed = !text.is_empty();
            text.clear();
            changed
        });
    }

    async fn halt(&mut self) -> bool {
        let Some(Running { cancel, handle, .. }) = self.running.take() else {
            return false;
        };
        cancel.cancel();
        if let Err(err) = handle.await {
            warn!("countdown task ended abnormally: {err}");
        }
        true
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            running.cancel.cancel();
        }
    }
}

async fn run(
    target: NaiveDateTime,
    clock: Arc<dyn Clock>,
    mode: TickMode,
    display: Arc<watch::Sender<String>>,
    finished: Option<mpsc::Sender<CountdownFinished>>,
    cancel: CancellationToken,
) {
    let mut first = true;
    loop {
        let remaining = target - clock.now();
        let secs = match whole_seconds(remaining) {
            Some(secs) => secs,
            // started exactly on the target: show zero once before expiring
            None if first && remaining.num_milliseconds() == 0 => 0,
            None => {
                display.send_replace(String::new());
                info!(%target, "countdown expired");
                if let Some(tx) = finished {
                    tokio::select! {
                        _ = cancel.cancelled() => debug!("completion dropped; countdown stopped"),
                        res = tx.send(CountdownFinished { target }) => {
                            if res.is_err() {
                                debug!("completion observer went away");
                            }
                        }
                    }
                }
                return;
            }
        };
        first = false;

        let text = format_remaining(secs);
        trace!(remaining = secs, %text, "countdown tick");
        display.send_replace(text);

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = sleep(next_wait(mode, remaining, secs)) => {}
        }
    }
}
