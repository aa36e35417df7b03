//! One live countdown per display element.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local};

use super::engine::{start_countdown_every, CountdownHandle, TICK_INTERVAL};
use super::scheduler::TaskScheduler;
use crate::clock::Clock;
use crate::render::{skip_missing, Surface};

/// Tracks the active countdown of each element. Starting a countdown on an
/// element cancels whatever was ticking there before.
pub struct CountdownBoard<S> {
    scheduler: S,
    period: Duration,
    active: HashMap<String, CountdownHandle>,
}

impl<S: TaskScheduler> CountdownBoard<S> {
    pub fn new(scheduler: S) -> Self {
        Self::with_period(scheduler, TICK_INTERVAL)
    }

    pub fn with_period(scheduler: S, period: Duration) -> Self {
        Self {
            scheduler,
            period,
            active: HashMap::new(),
        }
    }

    /// Start counting down to `target` on `element_id`.
    ///
    /// Returns `None` and leaves everything untouched when the surface has
    /// no such element.
    pub fn start<C, F>(
        &mut self,
        surface: Rc<dyn Surface>,
        element_id: &str,
        clock: C,
        target: DateTime<Local>,
        on_complete: F,
    ) -> Option<&CountdownHandle>
    where
        C: Clock + 'static,
        F: FnOnce() + 'static,
    {
        if !surface.has_element(element_id) {
            tracing::debug!(element_id, "countdown target not in view; not started");
            return None;
        }

        if let Some(previous) = self.active.remove(element_id) {
            previous.cancel();
        }

        let id = element_id.to_string();
        let handle = start_countdown_every(
            &self.scheduler,
            self.period,
            clock,
            target,
            move |text| skip_missing(surface.set_text(&id, text)),
            on_complete,
        );
        self.active.insert(element_id.to_string(), handle);
        self.active.get(element_id)
    }

    pub fn get(&self, element_id: &str) -> Option<&CountdownHandle> {
        self.active.get(element_id)
    }

    /// Cancel the countdown on `element_id`, if any.
    pub fn stop(&mut self, element_id: &str) {
        if let Some(handle) = self.active.remove(element_id) {
            handle.cancel();
        }
    }

    pub fn stop_all(&mut self) {
        for (_, handle) in self.active.drain() {
            handle.cancel();
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::countdown::engine::CountdownPhase;
    use crate::countdown::scheduler::ManualScheduler;
    use crate::render::{ids, MemorySurface};
    use chrono::{Duration as ChronoDuration, NaiveDate};

    fn setup() -> (ManualClock, CountdownBoard<ManualScheduler>) {
        let start = NaiveDate::from_ymd_opt(2026, 2, 13)
            .unwrap()
            .and_hms_opt(23, 59, 50)
            .unwrap();
        let clock = ManualClock::at_local(start);
        let board = CountdownBoard::new(ManualScheduler::new(clock.clone()));
        (clock, board)
    }

    #[test]
    fn restarting_cancels_previous() {
        let (clock, mut board) = setup();
        let surface = Rc::new(MemorySurface::with_elements([ids::TIMER]));
        let now = clock.now();

        board.start(surface.clone(), ids::TIMER, clock.clone(), now + ChronoDuration::hours(1), || {});
        board.start(surface.clone(), ids::TIMER, clock.clone(), now + ChronoDuration::seconds(5), || {});
        assert_eq!(board.scheduler().active_tasks(), 1);

        board.scheduler().advance(Duration::from_secs(1));
        assert_eq!(surface.text(ids::TIMER).as_deref(), Some("00:00:04"));
    }

    #[test]
    fn missing_element_is_a_no_op() {
        let (clock, mut board) = setup();
        let surface = Rc::new(MemorySurface::default());
        let now = clock.now();
        assert!(board
            .start(surface, ids::TIMER, clock, now + ChronoDuration::seconds(5), || {})
            .is_none());
        assert_eq!(board.scheduler().active_tasks(), 0);
    }

    #[test]
    fn stop_cancels() {
        let (clock, mut board) = setup();
        let surface = Rc::new(MemorySurface::with_elements([ids::TIMER]));
        let now = clock.now();
        board.start(surface, ids::TIMER, clock, now + ChronoDuration::seconds(5), || {});
        let phase_before = board.get(ids::TIMER).map(|h| h.phase());
        assert_eq!(phase_before, Some(CountdownPhase::Running));
        board.stop(ids::TIMER);
        board.stop(ids::TIMER);
        assert!(board.get(ids::TIMER).is_none());
        assert_eq!(board.scheduler().active_tasks(), 0);
    }
}
