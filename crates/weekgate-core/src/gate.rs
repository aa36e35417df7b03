//! Date gate: decides whether a calendar day has been reached.
//!
//! Both "now" and the target are reduced to their local calendar day before
//! comparing, so a page opens at 00:00 local time on its day no matter what
//! hour the visitor arrives.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::clock::{resolve_local, Clock};
use crate::error::InvalidDate;

/// Gate configuration, injected at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Open every day regardless of the clock (development and previews).
    #[serde(default)]
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateDecision {
    Unlocked,
    Locked,
}

impl GateDecision {
    pub fn is_unlocked(self) -> bool {
        self == GateDecision::Unlocked
    }
}

impl From<bool> for GateDecision {
    fn from(unlocked: bool) -> Self {
        if unlocked {
            GateDecision::Unlocked
        } else {
            GateDecision::Locked
        }
    }
}

/// Compares target days against the injected clock.
#[derive(Debug, Clone)]
pub struct DateGate<C> {
    clock: C,
    config: GateConfig,
}

impl<C: Clock> DateGate<C> {
    pub fn new(clock: C, config: GateConfig) -> Self {
        Self { clock, config }
    }

    pub fn config(&self) -> GateConfig {
        self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn decide(&self, target: NaiveDate) -> GateDecision {
        if self.config.dev_mode {
            return GateDecision::Unlocked;
        }
        let today = self.clock.now().date_naive();
        GateDecision::from(today >= target)
    }

    pub fn is_unlocked_on(&self, target: NaiveDate) -> bool {
        self.decide(target).is_unlocked()
    }

    /// Parse `target` and check it. Malformed input is an error even in dev
    /// mode.
    pub fn is_unlocked(&self, target: &str) -> Result<bool, InvalidDate> {
        let date = parse_calendar_date(target)?;
        Ok(self.is_unlocked_on(date))
    }
}

/// Read a target date. Accepts `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`; the time
/// of day is dropped.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, InvalidDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InvalidDate::new(input, "empty date"));
    }
    if !has_iso_shape(trimmed) {
        return Err(InvalidDate::new(input, "expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    parse_local_datetime(trimmed)
        .map(|dt| dt.date())
        .map_err(|_| InvalidDate::new(input, "expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"))
}

/// Read a local wall-clock time, `YYYY-MM-DDTHH:MM:SS` (a bare date means
/// midnight).
pub fn parse_local_datetime(input: &str) -> Result<NaiveDateTime, InvalidDate> {
    let trimmed = input.trim();
    if !has_iso_shape(trimmed) {
        return Err(InvalidDate::new(input, "expected YYYY-MM-DDTHH:MM:SS"));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| InvalidDate::new(input, "expected YYYY-MM-DDTHH:MM:SS"))
}

/// Zero-padded `YYYY-MM-DD`, optionally followed by `[T ]HH:MM:SS` and
/// anything chrono parses after that. chrono alone accepts `2026-2-7`.
fn has_iso_shape(s: &str) -> bool {
    fn digits(b: &[u8]) -> bool {
        b.iter().all(u8::is_ascii_digit)
    }
    let b = s.as_bytes();
    let date_ok = b.len() >= 10
        && digits(&b[0..4])
        && b[4] == b'-'
        && digits(&b[5..7])
        && b[7] == b'-'
        && digits(&b[8..10]);
    if !date_ok {
        return false;
    }
    if b.len() == 10 {
        return true;
    }
    b.len() >= 19
        && matches!(b[10], b'T' | b' ')
        && digits(&b[11..13])
        && b[13] == b':'
        && digits(&b[14..16])
        && b[16] == b':'
        && digits(&b[17..19])
}

/// The instant the local calendar day `date` begins.
pub fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    resolve_local(date.and_time(NaiveTime::MIN))
}

/// `"Saturday, Feb 14"`.
pub fn friendly_date(date: NaiveDate) -> String {
    date.format("%A, %b %-d").to_string()
}

/// Whole days from today to `target`: positive while upcoming, zero on the
/// day, negative afterwards.
pub fn days_remaining(now: DateTime<Local>, target: NaiveDate) -> i64 {
    (target - now.date_naive()).num_days()
}

pub fn is_today(now: DateTime<Local>, date: NaiveDate) -> bool {
    now.date_naive() == date
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::Duration;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn gate_at(naive: NaiveDateTime) -> DateGate<FixedClock> {
        DateGate::new(FixedClock::at_local(naive), GateConfig::default())
    }

    #[test]
    fn valentines_boundary() {
        let before = date(2026, 2, 13).and_hms_opt(23, 59, 59).unwrap();
        let at = date(2026, 2, 14).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(gate_at(before).is_unlocked("2026-02-14"), Ok(false));
        assert_eq!(gate_at(at).is_unlocked("2026-02-14"), Ok(true));
    }

    #[test]
    fn time_of_day_is_ignored() {
        let late = date(2026, 2, 10).and_hms_opt(23, 30, 0).unwrap();
        let gate = gate_at(late);
        assert_eq!(gate.is_unlocked("2026-02-10T23:59:59"), Ok(true));
        assert_eq!(gate.is_unlocked("2026-02-11T00:00:00"), Ok(false));
    }

    #[test]
    fn past_days_stay_open() {
        let gate = gate_at(date(2026, 3, 1).and_hms_opt(9, 0, 0).unwrap());
        assert!(gate.is_unlocked_on(date(2026, 2, 7)));
        assert_eq!(gate.decide(date(2026, 2, 14)), GateDecision::Unlocked);
    }

    #[test]
    fn dev_mode_opens_everything() {
        let now = date(2020, 1, 1).and_hms_opt(0, 0, 0).unwrap();
        let gate = DateGate::new(FixedClock::at_local(now), GateConfig { dev_mode: true });
        assert!(gate.is_unlocked_on(date(2099, 12, 31)));
    }

    #[test]
    fn malformed_dates_fail_fast() {
        let gate = DateGate::new(
            FixedClock::at_local(date(2026, 2, 14).and_hms_opt(0, 0, 0).unwrap()),
            GateConfig { dev_mode: true },
        );
        for bad in [
            "",
            "   ",
            "2026-13-01",
            "14/02/2026",
            "tomorrow",
            "2026-02-30",
            "2026-2-7",
            "2026-02-7",
            "2026-02-07T1:00:00",
            "2026-02-07T10:00",
        ] {
            let err = gate.is_unlocked(bad).unwrap_err();
            assert_eq!(err.input, bad);
        }
    }

    #[test]
    fn accepted_date_shapes() {
        assert_eq!(parse_calendar_date(" 2026-02-07 "), Ok(date(2026, 2, 7)));
        assert_eq!(parse_calendar_date("2026-02-07T23:59:59"), Ok(date(2026, 2, 7)));
        assert_eq!(
            parse_local_datetime("2026-02-07T08:30:00.250").map(|dt| dt.date()),
            Ok(date(2026, 2, 7))
        );
        assert!(parse_local_datetime("2026-2-07T08:30:00").is_err());
    }

    #[test]
    fn date_helpers() {
        assert_eq!(friendly_date(date(2026, 2, 14)), "Saturday, Feb 14");
        let now = local_midnight(date(2026, 2, 10)) + Duration::hours(15);
        assert_eq!(days_remaining(now, date(2026, 2, 14)), 4);
        assert_eq!(days_remaining(now, date(2026, 2, 10)), 0);
        assert_eq!(days_remaining(now, date(2026, 2, 7)), -3);
        assert!(is_today(now, date(2026, 2, 10)));
        assert!(!is_today(now, date(2026, 2, 11)));
    }

    proptest! {
        #[test]
        fn unlocks_exactly_at_local_midnight(offset in 0i64..3650) {
            let target = date(2020, 1, 1) + Duration::days(offset);
            let midnight = local_midnight(target);
            let at = DateGate::new(FixedClock::new(midnight), GateConfig::default());
            let just_before = DateGate::new(
                FixedClock::new(midnight - Duration::milliseconds(1)),
                GateConfig::default(),
            );
            prop_assert!(at.is_unlocked_on(target));
            prop_assert!(!just_before.is_unlocked_on(target));
        }
    }
}
