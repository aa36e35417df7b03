use std::io::Write;

use chrono::{DateTime, Local};
use clap::Args;
use serde::Serialize;
use tokio::sync::oneshot;
use weekgate_core::countdown::{start_countdown_every, Countdown};
use weekgate_core::dashboard::WEEK_COMPLETE;
use weekgate_core::gate::{local_midnight, parse_calendar_date};
use weekgate_core::{Clock, Config, CountdownState, SystemClock, TokioScheduler};

use crate::common::{clock_from, print_json, CliResult};

#[derive(Args)]
pub struct CountdownArgs {
    /// Count down to local midnight of this date (defaults to the next event)
    #[arg(long)]
    to: Option<String>,
    /// Print a single snapshot as JSON instead of ticking
    #[arg(long)]
    once: bool,
    /// Pretend it is this local time (snapshot only)
    #[arg(long, requires = "once")]
    now: Option<String>,
}

#[derive(Serialize)]
struct Snapshot {
    label: Option<String>,
    #[serde(flatten)]
    state: CountdownState,
}

pub fn run(args: CountdownArgs) -> CliResult {
    let config = Config::load_or_default();
    let clock = clock_from(args.now.as_deref())?;

    let (label, target) = match args.to.as_deref() {
        Some(raw) => (None, local_midnight(parse_calendar_date(raw)?)),
        None => match config.schedule(clock.now())?.next_event(clock.now()) {
            Some(event) => (Some(event.label.clone()), event.target_instant()),
            None => {
                println!("{WEEK_COMPLETE}");
                return Ok(());
            }
        },
    };

    if args.once {
        let state = Countdown::new(target, clock.now()).state();
        return print_json(&Snapshot { label, state });
    }

    if let Some(label) = &label {
        println!("Next: {label}");
    }
    run_live(target, config.tick_interval())
}

/// Tick on the wall clock until `target` passes.
fn run_live(target: DateTime<Local>, period: std::time::Duration) -> CliResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, async move {
        let (done_tx, done_rx) = oneshot::channel();
        let handle = start_countdown_every(
            &TokioScheduler,
            period,
            SystemClock,
            target,
            |text| {
                print!("\r{text}  ");
                let _ = std::io::stdout().flush();
            },
            move || {
                let _ = done_tx.send(());
            },
        );
        tracing::info!(%target, ?period, "countdown running");

        if done_rx.await.is_err() {
            tracing::warn!(phase = ?handle.phase(), "countdown stopped before completing");
        }
        println!();
    });
    Ok(())
}
