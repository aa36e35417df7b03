use clap::Subcommand;
use serde::Serialize;
use weekgate_core::gate::{days_remaining, friendly_date, is_today, parse_calendar_date};
use weekgate_core::{Clock, Config, DateGate, GateDecision};

use crate::common::{clock_from, gate_config, print_json, CliResult};

#[derive(Subcommand)]
pub enum GateAction {
    /// Is DATE (YYYY-MM-DD) open yet?
    Check {
        date: String,
        /// Pretend it is this local time (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        now: Option<String>,
        /// Open every day regardless of the date
        #[arg(long)]
        dev_mode: bool,
    },
    /// Friendly name and days left for DATE
    Days {
        date: String,
        #[arg(long)]
        now: Option<String>,
    },
}

#[derive(Serialize)]
struct CheckOutput {
    date: String,
    decision: GateDecision,
    unlocked: bool,
    dev_mode: bool,
}

#[derive(Serialize)]
struct DaysOutput {
    date: String,
    friendly: String,
    days_remaining: i64,
    is_today: bool,
}

pub fn run(action: GateAction) -> CliResult {
    match action {
        GateAction::Check { date, now, dev_mode } => {
            let config = Config::load_or_default();
            let gate = DateGate::new(clock_from(now.as_deref())?, gate_config(&config, dev_mode));
            let target = parse_calendar_date(&date)?;
            let decision = gate.decide(target);
            print_json(&CheckOutput {
                date: target.to_string(),
                decision,
                unlocked: decision.is_unlocked(),
                dev_mode: gate.config().dev_mode,
            })?;
        }
        GateAction::Days { date, now } => {
            let now = clock_from(now.as_deref())?.now();
            let target = parse_calendar_date(&date)?;
            print_json(&DaysOutput {
                date: target.to_string(),
                friendly: friendly_date(target),
                days_remaining: days_remaining(now, target),
                is_today: is_today(now, target),
            })?;
        }
    }
    Ok(())
}
