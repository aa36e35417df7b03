//! Helpers shared by the subcommands.

use weekgate_core::clock::FixedClock;
use weekgate_core::gate::parse_local_datetime;
use weekgate_core::{Clock, Config, GateConfig, SystemClock};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// `--now` pins the clock; without it the wall clock is read once.
pub fn clock_from(now: Option<&str>) -> Result<FixedClock, weekgate_core::InvalidDate> {
    match now {
        Some(raw) => Ok(FixedClock::at_local(parse_local_datetime(raw)?)),
        None => Ok(FixedClock::new(SystemClock.now())),
    }
}

/// Gate settings from the config file, with `--dev-mode` on top.
pub fn gate_config(config: &Config, dev_mode_flag: bool) -> GateConfig {
    let mut gate = config.gate_config();
    gate.dev_mode |= dev_mode_flag;
    gate
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
