use chrono::Datelike;
use clap::Subcommand;
use serde::Serialize;
use weekgate_core::gate::friendly_date;
use weekgate_core::{Clock, Config, DateGate, GateDecision, ScheduledEvent};

use crate::common::{clock_from, gate_config, print_json, CliResult};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// List the week's events with their current gate state
    List {
        /// Year of the week (defaults to config, then the current year)
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        now: Option<String>,
        #[arg(long)]
        dev_mode: bool,
    },
    /// Show the next upcoming event
    Next {
        #[arg(long)]
        now: Option<String>,
    },
}

#[derive(Serialize)]
struct EventRow<'a> {
    #[serde(flatten)]
    event: &'a ScheduledEvent,
    friendly: String,
    state: GateDecision,
}

#[derive(Serialize)]
struct NextOutput<'a> {
    next: Option<&'a ScheduledEvent>,
    starts_at: Option<String>,
}

pub fn run(action: ScheduleAction) -> CliResult {
    let config = Config::load_or_default();
    match action {
        ScheduleAction::List { year, now, dev_mode } => {
            let clock = clock_from(now.as_deref())?;
            let schedule = match year {
                Some(year) => weekgate_core::Schedule::themed_week(year)?,
                None => config.schedule(clock.now())?,
            };
            let gate = DateGate::new(clock, gate_config(&config, dev_mode));
            let rows: Vec<EventRow<'_>> = schedule
                .events()
                .iter()
                .map(|event| EventRow {
                    event,
                    friendly: friendly_date(event.target_date),
                    state: gate.decide(event.target_date),
                })
                .collect();
            print_json(&rows)?;
        }
        ScheduleAction::Next { now } => {
            let now = clock_from(now.as_deref())?.now();
            let schedule = config.schedule(now)?;
            let next = schedule.next_event(now);
            if next.is_none() {
                tracing::info!(year = now.year(), "themed week is over");
            }
            print_json(&NextOutput {
                next,
                starts_at: next.map(|e| e.target_instant().to_rfc3339()),
            })?;
        }
    }
    Ok(())
}
