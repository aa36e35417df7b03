//! Clock sources.
//!
//! Every time-dependent decision reads "now" through [`Clock`] so tests can
//! pin or step the time.

use std::cell::Cell;
use std::rc::Rc;

use chrono::{DateTime, Duration, Local, NaiveDateTime, TimeZone};

pub trait Clock {
    /// Current local instant.
    fn now(&self) -> DateTime<Local>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

/// The machine's wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self(at)
    }

    /// Pin the clock to a local wall-clock time.
    ///
    /// Ambiguous times (DST fold) resolve to the earlier instant; times inside
    /// a DST gap resolve to the first valid instant after it.
    pub fn at_local(naive: NaiveDateTime) -> Self {
        Self(resolve_local(naive))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// A clock that only moves when told to. Cheap to clone; clones share time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(at)),
        }
    }

    pub fn at_local(naive: NaiveDateTime) -> Self {
        Self::new(resolve_local(naive))
    }

    pub fn set(&self, at: DateTime<Local>) {
        self.now.set(at);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// Map a local wall-clock time onto an instant.
pub(crate) fn resolve_local(naive: NaiveDateTime) -> DateTime<Local> {
    let mut probe = naive;
    // A DST gap is at most a couple of hours; walk forward until we leave it.
    for _ in 0..(4 * 60) {
        if let Some(at) = Local.from_local_datetime(&probe).earliest() {
            return at;
        }
        probe += Duration::minutes(1);
    }
    Local.from_utc_datetime(&naive)
}
