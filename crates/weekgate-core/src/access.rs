//! Access controller.
//!
//! Every protected page is checked in the same order: is someone logged in,
//! then has the page's day arrived. An anonymous visitor never learns whether
//! a day is open. Outcomes are [`AccessDecision`] values for the caller to act
//! on, never errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::SessionError;
use crate::gate::DateGate;
use crate::schedule::Schedule;
use crate::session::{SessionBackend, SessionStore};

/// Shown when a locked card is clicked.
pub const LOCKED_NOTICE: &str = "It's not that day yet! Patience is key... 🤫";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Page {
    Login,
    Dashboard,
    ComingSoon,
    /// A day page of the schedule.
    Day { slug: String, date: NaiveDate },
    /// Any other protected page.
    Other { name: String },
}

impl Page {
    /// Map a request path (`Pages/rose_day.html`, `/`, `dashboard.html`) to a
    /// page, resolving day pages against `schedule`.
    pub fn from_path(path: &str, schedule: &Schedule) -> Self {
        let file = path.rsplit('/').next().unwrap_or_default();
        let stem = file.strip_suffix(".html").unwrap_or(file);
        match stem {
            "" | "index" => Page::Login,
            "dashboard" => Page::Dashboard,
            "coming_soon" => Page::ComingSoon,
            _ => match schedule.event_for_slug(stem) {
                Some(event) => Page::Day {
                    slug: event.slug.clone(),
                    date: event.target_date,
                },
                None => Page::Other {
                    name: stem.to_string(),
                },
            },
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Page::Login)
    }

    pub fn gate_date(&self) -> Option<NaiveDate> {
        match self {
            Page::Day { date, .. } => Some(*date),
            _ => None,
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            Page::Login => "index.html".into(),
            Page::Dashboard => "dashboard.html".into(),
            Page::ComingSoon => "coming_soon.html".into(),
            Page::Day { slug, .. } => format!("{slug}.html"),
            Page::Other { name } => format!("{name}.html"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    Granted,
    Unauthenticated,
    NotYetUnlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    pub allow: bool,
    pub reason: AccessReason,
}

impl AccessDecision {
    pub const fn granted() -> Self {
        Self {
            allow: true,
            reason: AccessReason::Granted,
        }
    }

    pub const fn denied(reason: AccessReason) -> Self {
        Self { allow: false, reason }
    }
}

/// What the navigation collaborator should do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Navigation {
    /// Render the requested page.
    Stay,
    /// Go to another page instead.
    Redirect { to: String },
    /// Follow the clicked link.
    Follow { to: String },
    /// Swallow the click and show a notice.
    Intercept { notice: String },
}

pub struct AccessController<B, C> {
    session: SessionStore<B>,
    gate: DateGate<C>,
}

impl<B: SessionBackend, C: Clock> AccessController<B, C> {
    pub fn new(session: SessionStore<B>, gate: DateGate<C>) -> Self {
        Self { session, gate }
    }

    pub fn session(&self) -> &SessionStore<B> {
        &self.session
    }

    pub fn gate(&self) -> &DateGate<C> {
        &self.gate
    }

    pub fn evaluate(&self, page: &Page) -> AccessDecision {
        if page.requires_auth() && !self.session.is_logged_in() {
            tracing::info!(page = %page.file_name(), "access denied: not logged in");
            return AccessDecision::denied(AccessReason::Unauthenticated);
        }
        match page.gate_date() {
            Some(date) => self.evaluate_date(date),
            None => AccessDecision::granted(),
        }
    }

    /// Decision for a dashboard card tied to `date`.
    pub fn evaluate_card(&self, date: NaiveDate) -> AccessDecision {
        if !self.session.is_logged_in() {
            return AccessDecision::denied(AccessReason::Unauthenticated);
        }
        self.evaluate_date(date)
    }

    fn evaluate_date(&self, date: NaiveDate) -> AccessDecision {
        if self.gate.is_unlocked_on(date) {
            AccessDecision::granted()
        } else {
            tracing::info!(%date, "access denied: day not reached yet");
            AccessDecision::denied(AccessReason::NotYetUnlocked)
        }
    }

    /// Evaluate a direct page visit and say where to go.
    pub fn visit(&self, page: &Page) -> (AccessDecision, Navigation) {
        let decision = self.evaluate(page);
        let nav = match decision.reason {
            AccessReason::Granted => Navigation::Stay,
            AccessReason::Unauthenticated => Navigation::Redirect {
                to: Page::Login.file_name(),
            },
            AccessReason::NotYetUnlocked => Navigation::Redirect {
                to: Page::ComingSoon.file_name(),
            },
        };
        (decision, nav)
    }

    /// Evaluate a click on the dashboard card of `page`.
    pub fn click_card(&self, page: &Page) -> (AccessDecision, Navigation) {
        let decision = match page.gate_date() {
            Some(date) => self.evaluate_card(date),
            None => self.evaluate(page),
        };
        let nav = match decision.reason {
            AccessReason::Granted => Navigation::Follow {
                to: page.file_name(),
            },
            AccessReason::Unauthenticated => Navigation::Redirect {
                to: Page::Login.file_name(),
            },
            AccessReason::NotYetUnlocked => Navigation::Intercept {
                notice: LOCKED_NOTICE.to_string(),
            },
        };
        (decision, nav)
    }

    /// Landing on the login page ends any previous session.
    ///
    /// # Errors
    /// Returns an error if the session backend fails.
    pub fn enter_login(&mut self) -> Result<(), SessionError> {
        self.session.clear()
    }

    /// Submit the login form. Goes to the dashboard once a name is stored,
    /// otherwise stays on the login page.
    ///
    /// # Errors
    /// Returns an error if the session backend fails.
    pub fn login(&mut self, name: &str, photo: Option<&str>) -> Result<Navigation, SessionError> {
        self.session.save(name.trim(), photo)?;
        if self.session.is_logged_in() {
            tracing::info!("logged in");
            Ok(Navigation::Redirect {
                to: Page::Dashboard.file_name(),
            })
        } else {
            Ok(Navigation::Stay)
        }
    }

    /// "Exit portal": clear the session and go back to the login page.
    ///
    /// # Errors
    /// Returns an error if the session backend fails.
    pub fn logout(&mut self) -> Result<Navigation, SessionError> {
        self.session.clear()?;
        Ok(Navigation::Redirect {
            to: Page::Login.file_name(),
        })
    }
}
