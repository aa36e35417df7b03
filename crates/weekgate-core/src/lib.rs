//! # Weekgate Core Library
//!
//! Access control and time gating for a themed week of date-locked pages: a
//! login gate, a dashboard, and one page per day that opens at local midnight
//! of its date.
//!
//! ## Architecture
//!
//! - **Clock**: injectable source of "now" ([`SystemClock`], [`FixedClock`],
//!   [`ManualClock`])
//! - **Date Gate**: calendar-day comparison with an explicit dev-mode override
//! - **Session**: the logged-in identity, kept only for the session
//! - **Schedule**: the week's ordered events
//! - **Countdown**: remaining-time display driven by a cancellable repeating
//!   task, on virtual time or a tokio `LocalSet`
//! - **Access**: composes session and gate into per-page decisions
//!
//! Rendering and navigation stay outside: the core hands them plain data
//! through [`Surface`] and [`Navigation`].

pub mod access;
pub mod clock;
pub mod countdown;
pub mod dashboard;
pub mod error;
pub mod gate;
pub mod render;
pub mod schedule;
pub mod session;
pub mod storage;

pub use access::{AccessController, AccessDecision, AccessReason, Navigation, Page};
pub use clock::{Clock, FixedClock, ManualClock, SystemClock};
pub use countdown::{
    format_remaining, start_countdown, CountdownBoard, CountdownHandle, CountdownPhase,
    CountdownState, ManualScheduler, TaskScheduler, TokioScheduler,
};
pub use dashboard::{render_dashboard, start_dashboard_timer, DashboardTimer};
pub use error::{
    ConfigError, CoreError, InvalidDate, RenderError, Result, ScheduleError, SessionError,
};
pub use gate::{DateGate, GateConfig, GateDecision};
pub use render::{CardView, MemorySurface, Surface};
pub use schedule::{Schedule, ScheduledEvent};
pub use session::{Identity, MemoryBackend, SessionBackend, SessionStore, SqliteBackend};
pub use storage::Config;
