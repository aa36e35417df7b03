//! The themed week's event schedule.
//!
//! Events are ordered by date and each one opens at local midnight of its
//! day. The default schedule is Valentine's week (Feb 7 – Feb 14) of a given
//! year.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{InvalidDate, ScheduleError};
use crate::gate::{local_midnight, parse_calendar_date};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub label: String,
    /// Page slug, e.g. `rose_day` for `rose_day.html`.
    pub slug: String,
    pub target_date: NaiveDate,
}

impl ScheduledEvent {
    /// Local midnight of the event's day.
    pub fn target_instant(&self) -> DateTime<Local> {
        local_midnight(self.target_date)
    }
}

/// `(label, day of February)` for the themed week.
const THEMED_WEEK: [(&str, u32); 8] = [
    ("Rose Day", 7),
    ("Propose Day", 8),
    ("Chocolate Day", 9),
    ("Teddy Day", 10),
    ("Promise Day", 11),
    ("Hug Day", 12),
    ("Kiss Day", 13),
    ("Valentine's Day", 14),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    events: Vec<ScheduledEvent>,
}

impl Schedule {
    /// Valentine's week of `year`.
    ///
    /// # Errors
    /// Fails with [`ScheduleError::InvalidDate`] when `year` is outside the
    /// supported calendar range.
    pub fn themed_week(year: i32) -> Result<Self, ScheduleError> {
        let events = THEMED_WEEK
            .iter()
            .map(|&(label, day)| -> Result<ScheduledEvent, ScheduleError> {
                let target_date = NaiveDate::from_ymd_opt(year, 2, day).ok_or_else(|| {
                    InvalidDate::new(format!("{year}-02-{day:02}"), "year out of range")
                })?;
                Ok(ScheduledEvent {
                    label: label.to_string(),
                    slug: slug_for(label),
                    target_date,
                })
            })
            .collect::<Result<Vec<_>, ScheduleError>>()?;
        Ok(Self { events })
    }

    /// Build a schedule from `(label, date)` pairs.
    ///
    /// # Errors
    /// Fails on a malformed date, an empty label, or dates that are not
    /// strictly ascending.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut events: Vec<ScheduledEvent> = Vec::new();
        for (label, date) in entries {
            let target_date = parse_calendar_date(date)?;
            let label = label.trim();
            if label.is_empty() {
                return Err(ScheduleError::EmptyLabel(target_date));
            }
            if events.last().is_some_and(|prev| prev.target_date >= target_date) {
                return Err(ScheduleError::OutOfOrder {
                    label: label.to_string(),
                    date: target_date,
                });
            }
            events.push(ScheduledEvent {
                label: label.to_string(),
                slug: slug_for(label),
                target_date,
            });
        }
        Ok(Self { events })
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// First event that starts strictly after `now`; `None` once the week is
    /// over.
    pub fn next_event(&self, now: DateTime<Local>) -> Option<&ScheduledEvent> {
        self.events.iter().find(|event| event.target_instant() > now)
    }

    pub fn event_for_slug(&self, slug: &str) -> Option<&ScheduledEvent> {
        self.events.iter().find(|event| event.slug == slug)
    }

    pub fn event_on(&self, date: NaiveDate) -> Option<&ScheduledEvent> {
        self.events.iter().find(|event| event.target_date == date)
    }
}

/// `"Valentine's Day"` -> `"valentines_day"`.
fn slug_for(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}
