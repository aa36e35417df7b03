//! Countdown engine.
//!
//! [`Countdown`] is a plain state machine: the caller feeds it "now" on each
//! tick. [`start_countdown`] wires it to a [`TaskScheduler`] and a
//! [`Clock`] and reports through callbacks.
//!
//! ## State Transitions
//!
//! ```text
//! Running -> Completed   (remaining went negative)
//! Running -> Cancelled   (explicit cancel)
//! ```
//!
//! Both end states are terminal.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

use super::scheduler::{ScheduledTask, TaskFlow, TaskScheduler};
use crate::clock::Clock;

/// How often a live countdown refreshes.
pub const TICK_INTERVAL: StdDuration = StdDuration::from_secs(1);

/// What the display shows once the target has passed.
pub const ZERO_DISPLAY: &str = "00:00:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownPhase {
    Running,
    Completed,
    Cancelled,
}

/// Snapshot handed to renderers and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub target_instant: DateTime<Local>,
    /// Milliseconds left; zero once completed.
    pub remaining_ms: i64,
    pub completed: bool,
    pub phase: CountdownPhase,
    pub display: String,
}

/// Output of one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownTick {
    pub display: String,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct Countdown {
    target: DateTime<Local>,
    remaining: Duration,
    phase: CountdownPhase,
}

impl Countdown {
    pub fn new(target: DateTime<Local>, now: DateTime<Local>) -> Self {
        Self {
            target,
            remaining: target - now,
            phase: CountdownPhase::Running,
        }
    }

    pub fn target(&self) -> DateTime<Local> {
        self.target
    }

    pub fn phase(&self) -> CountdownPhase {
        self.phase
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn state(&self) -> CountdownState {
        CountdownState {
            target_instant: self.target,
            remaining_ms: self.remaining.num_milliseconds().max(0),
            completed: self.phase == CountdownPhase::Completed,
            phase: self.phase,
            display: format_remaining(self.remaining),
        }
    }

    /// Recompute the remaining time. Returns `None` once the countdown is no
    /// longer running.
    pub fn tick(&mut self, now: DateTime<Local>) -> Option<CountdownTick> {
        if self.phase != CountdownPhase::Running {
            return None;
        }
        let remaining = self.target - now;
        if remaining < Duration::zero() {
            self.remaining = Duration::zero();
            self.phase = CountdownPhase::Completed;
            return Some(CountdownTick {
                display: ZERO_DISPLAY.to_string(),
                completed: true,
            });
        }
        self.remaining = remaining;
        Some(CountdownTick {
            display: format_remaining(remaining),
            completed: false,
        })
    }

    /// Returns true if this call moved a running countdown to `Cancelled`.
    pub fn cancel(&mut self) -> bool {
        if self.phase == CountdownPhase::Running {
            self.phase = CountdownPhase::Cancelled;
            true
        } else {
            false
        }
    }
}

/// `"2d 10:45:20"` while at least a day remains, `"10:45:20"` after that.
/// Negative durations read as zero.
pub fn format_remaining(remaining: Duration) -> String {
    let ms = remaining.num_milliseconds().max(0);
    let days = ms / 86_400_000;
    let hours = (ms % 86_400_000) / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    }
}

/// A live countdown. Dropping the handle does not stop it; call
/// [`cancel`](Self::cancel).
pub struct CountdownHandle {
    countdown: Rc<RefCell<Countdown>>,
    /// Set by any `cancel`, even one made from inside a callback.
    cancelled: Rc<Cell<bool>>,
    task: RefCell<ScheduledTask>,
}

impl CountdownHandle {
    pub fn phase(&self) -> CountdownPhase {
        self.countdown.borrow().phase()
    }

    pub fn is_running(&self) -> bool {
        self.phase() == CountdownPhase::Running
    }

    pub fn state(&self) -> CountdownState {
        self.countdown.borrow().state()
    }

    /// Stop ticking. No callback fires after this returns, including a
    /// call made from inside `on_tick`. Safe to call repeatedly and after
    /// completion.
    pub fn cancel(&self) {
        self.cancelled.set(true);
        if self.countdown.borrow_mut().cancel() {
            tracing::debug!(target_instant = %self.countdown.borrow().target(), "countdown cancelled");
        }
        self.task.borrow_mut().cancel();
    }
}

impl std::fmt::Debug for CountdownHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownHandle")
            .field("state", &self.state())
            .finish()
    }
}

/// Count down to `target`, ticking every [`TICK_INTERVAL`].
///
/// `on_tick` receives the formatted remaining time. When the target passes,
/// `on_tick` gets [`ZERO_DISPLAY`], `on_complete` runs once and ticking stops.
pub fn start_countdown<S, C, T, F>(
    scheduler: &S,
    clock: C,
    target: DateTime<Local>,
    on_tick: T,
    on_complete: F,
) -> CountdownHandle
where
    S: TaskScheduler + ?Sized,
    C: Clock + 'static,
    T: FnMut(&str) + 'static,
    F: FnOnce() + 'static,
{
    start_countdown_every(scheduler, TICK_INTERVAL, clock, target, on_tick, on_complete)
}

/// [`start_countdown`] with a custom tick period.
pub fn start_countdown_every<S, C, T, F>(
    scheduler: &S,
    period: StdDuration,
    clock: C,
    target: DateTime<Local>,
    mut on_tick: T,
    on_complete: F,
) -> CountdownHandle
where
    S: TaskScheduler + ?Sized,
    C: Clock + 'static,
    T: FnMut(&str) + 'static,
    F: FnOnce() + 'static,
{
    let countdown = Rc::new(RefCell::new(Countdown::new(target, clock.now())));
    let shared = Rc::clone(&countdown);
    let cancelled = Rc::new(Cell::new(false));
    let stop_requested = Rc::clone(&cancelled);
    let mut on_complete = Some(on_complete);

    tracing::debug!(target_instant = %target, ?period, "countdown started");

    let task = scheduler.every(
        period,
        Box::new(move || {
            // Release the borrow before calling out so callbacks may cancel.
            let tick = shared.borrow_mut().tick(clock.now());
            let Some(tick) = tick else {
                return TaskFlow::Stop;
            };
            on_tick(&tick.display);
            if stop_requested.get() {
                return TaskFlow::Stop;
            }
            if tick.completed {
                tracing::debug!("countdown completed");
                if let Some(done) = on_complete.take() {
                    done();
                }
                return TaskFlow::Stop;
            }
            TaskFlow::Continue
        }),
    );

    CountdownHandle {
        countdown,
        cancelled,
        task: RefCell::new(task),
    }
}
