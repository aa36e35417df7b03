mod board;
mod engine;
mod scheduler;

pub use board::CountdownBoard;
pub use engine::{
    format_remaining, start_countdown, start_countdown_every, Countdown, CountdownHandle,
    CountdownPhase, CountdownState, CountdownTick, TICK_INTERVAL, ZERO_DISPLAY,
};
pub use scheduler::{
    ManualScheduler, RepeatingTask, ScheduledTask, TaskFlow, TaskScheduler, TokioScheduler,
};
