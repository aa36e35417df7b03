//! Repeating-task schedulers.
//!
//! The countdown only needs "call me every `period` until I say stop, and let
//! me cancel". [`ManualScheduler`] runs on virtual time; [`TokioScheduler`]
//! runs on a current-thread tokio runtime inside a `LocalSet`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::ManualClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFlow {
    Continue,
    Stop,
}

pub type RepeatingTask = Box<dyn FnMut() -> TaskFlow>;

pub trait TaskScheduler {
    /// Run `task` every `period`, first one `period` from now.
    fn every(&self, period: Duration, task: RepeatingTask) -> ScheduledTask;
}

impl<S: TaskScheduler + ?Sized> TaskScheduler for &S {
    fn every(&self, period: Duration, task: RepeatingTask) -> ScheduledTask {
        (**self).every(period, task)
    }
}

impl<S: TaskScheduler + ?Sized> TaskScheduler for Rc<S> {
    fn every(&self, period: Duration, task: RepeatingTask) -> ScheduledTask {
        (**self).every(period, task)
    }
}

/// Handle to a scheduled task. Dropping it leaves the task running.
pub struct ScheduledTask {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl ScheduledTask {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stop the task. Later calls do nothing.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("cancelled", &self.cancel.is_none())
            .finish()
    }
}

const MIN_PERIOD: Duration = Duration::from_millis(1);

// ── Manual (virtual time) ────────────────────────────────────────────

struct ManualEntry {
    id: u64,
    period: Duration,
    due: Duration,
    /// `None` while the task is running.
    task: Option<RepeatingTask>,
    cancelled: bool,
}

#[derive(Default)]
struct ManualInner {
    elapsed: Duration,
    next_id: u64,
    entries: Vec<ManualEntry>,
}

/// Scheduler on virtual time. Nothing runs until [`advance`](Self::advance)
/// is called; the linked [`ManualClock`] moves in step with it.
#[derive(Clone)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualInner>>,
    clock: ManualClock,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ManualInner::default())),
            clock,
        }
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Tasks still scheduled.
    pub fn active_tasks(&self) -> usize {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| !e.cancelled)
            .count()
    }

    /// Move virtual time forward by `by`, running every task that falls due,
    /// in due order.
    pub fn advance(&self, by: Duration) {
        let deadline = self.inner.borrow().elapsed + by;

        loop {
            let next = {
                let inner = self.inner.borrow();
                inner
                    .entries
                    .iter()
                    .filter(|e| !e.cancelled && e.task.is_some() && e.due <= deadline)
                    .min_by_key(|e| (e.due, e.id))
                    .map(|e| (e.id, e.due))
            };
            let Some((id, due)) = next else { break };

            self.move_to(due);
            let Some(mut task) = self.take_task(id) else {
                continue;
            };

            let flow = task();

            let mut inner = self.inner.borrow_mut();
            if let Some(pos) = inner.entries.iter().position(|e| e.id == id) {
                let entry = &mut inner.entries[pos];
                if flow == TaskFlow::Stop || entry.cancelled {
                    inner.entries.remove(pos);
                } else {
                    entry.due = due + entry.period;
                    entry.task = Some(task);
                }
            }
        }

        self.move_to(deadline);
    }

    fn move_to(&self, at: Duration) {
        let step = {
            let mut inner = self.inner.borrow_mut();
            let step = at.saturating_sub(inner.elapsed);
            inner.elapsed = inner.elapsed.max(at);
            step
        };
        if !step.is_zero() {
            let step = chrono::Duration::from_std(step).unwrap_or_else(|_| chrono::Duration::zero());
            self.clock.advance(step);
        }
    }

    fn take_task(&self, id: u64) -> Option<RepeatingTask> {
        let mut inner = self.inner.borrow_mut();
        inner
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .and_then(|e| e.task.take())
    }
}

fn cancel_manual(inner: &Weak<RefCell<ManualInner>>, id: u64) {
    let Some(inner) = inner.upgrade() else { return };
    let mut inner = inner.borrow_mut();
    if let Some(pos) = inner.entries.iter().position(|e| e.id == id) {
        if inner.entries[pos].task.is_some() {
            inner.entries.remove(pos);
        } else {
            // Running right now; `advance` drops it when the call returns.
            inner.entries[pos].cancelled = true;
        }
    }
}

impl TaskScheduler for ManualScheduler {
    fn every(&self, period: Duration, task: RepeatingTask) -> ScheduledTask {
        let period = period.max(MIN_PERIOD);
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            let due = inner.elapsed + period;
            inner.entries.push(ManualEntry {
                id,
                period,
                due,
                task: Some(task),
                cancelled: false,
            });
            id
        };
        let weak = Rc::downgrade(&self.inner);
        ScheduledTask::new(move || cancel_manual(&weak, id))
    }
}

// ── Tokio ────────────────────────────────────────────────────────────

/// Scheduler backed by `tokio::time::interval` on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TaskScheduler for TokioScheduler {
    /// # Panics
    /// Panics when called outside a `tokio::task::LocalSet`.
    fn every(&self, period: Duration, mut task: RepeatingTask) -> ScheduledTask {
        let period = period.max(MIN_PERIOD);
        let stopped = Rc::new(std::cell::Cell::new(false));
        let flag = Rc::clone(&stopped);

        let handle = tokio::task::spawn_local(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if flag.get() || task() == TaskFlow::Stop {
                    break;
                }
            }
        });

        ScheduledTask::new(move || {
            stopped.set(true);
            handle.abort();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use chrono::NaiveDate;
    use std::cell::Cell;

    fn scheduler() -> ManualScheduler {
        let start = NaiveDate::from_ymd_opt(2026, 2, 13)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        ManualScheduler::new(ManualClock::at_local(start))
    }

    fn counter(stop_after: u32) -> (Rc<Cell<u32>>, RepeatingTask) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let task: RepeatingTask = Box::new(move || {
            c.set(c.get() + 1);
            if c.get() >= stop_after {
                TaskFlow::Stop
            } else {
                TaskFlow::Continue
            }
        });
        (count, task)
    }

    #[test]
    fn first_run_is_one_period_out() {
        let s = scheduler();
        let (count, task) = counter(u32::MAX);
        let _handle = s.every(Duration::from_secs(1), task);
        s.advance(Duration::from_millis(999));
        assert_eq!(count.get(), 0);
        s.advance(Duration::from_millis(1));
        assert_eq!(count.get(), 1);
        s.advance(Duration::from_secs(3));
        assert_eq!(count.get(), 4);
    }

    #[test]
    fn stop_removes_task() {
        let s = scheduler();
        let (count, task) = counter(2);
        let _handle = s.every(Duration::from_secs(1), task);
        s.advance(Duration::from_secs(10));
        assert_eq!(count.get(), 2);
        assert_eq!(s.active_tasks(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let s = scheduler();
        let (count, task) = counter(u32::MAX);
        let mut handle = s.every(Duration::from_secs(1), task);
        s.advance(Duration::from_secs(2));
        handle.cancel();
        handle.cancel();
        s.advance(Duration::from_secs(5));
        assert_eq!(count.get(), 2);
        assert_eq!(s.active_tasks(), 0);
    }

    #[test]
    fn clock_follows_virtual_time() {
        let s = scheduler();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let clock = s.clock().clone();
        let log = Rc::clone(&seen);
        let _handle = s.every(
            Duration::from_secs(30),
            Box::new(move || {
                log.borrow_mut().push(clock.now().format("%H:%M:%S").to_string());
                TaskFlow::Continue
            }),
        );
        s.advance(Duration::from_secs(75));
        assert_eq!(*seen.borrow(), vec!["23:59:30", "00:00:00"]);
        assert_eq!(s.clock().now().format("%H:%M:%S").to_string(), "00:00:15");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn tokio_cancel_before_first_tick() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (count, task) = counter(u32::MAX);
                let mut handle = TokioScheduler.every(Duration::from_millis(10), task);
                handle.cancel();
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(count.get(), 0);
            })
            .await;
    }

    #[tokio::test(flavor = "current_thread")]
    async fn tokio_runs_until_stop() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (count, task) = counter(3);
                let _handle = TokioScheduler.every(Duration::from_millis(5), task);
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert_eq!(count.get(), 3);
            })
            .await;
    }
}
