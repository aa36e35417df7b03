//! Dashboard page flow: identity placeholders, the next-event countdown and
//! the open/locked state of every day card.

use std::rc::Rc;

use crate::access::AccessController;
use crate::clock::Clock;
use crate::countdown::{CountdownBoard, TaskScheduler};
use crate::gate::GateDecision;
use crate::render::{ids, render_card, render_identity, skip_missing, Surface};
use crate::schedule::{Schedule, ScheduledEvent};
use crate::session::SessionBackend;

/// Timer text once every event has passed.
pub const WEEK_COMPLETE: &str = "Week Complete! ❤️";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardTimer {
    /// Counting down to this event.
    Counting(ScheduledEvent),
    WeekComplete,
}

/// Start the header countdown toward the next event. `on_event_start` runs
/// when that event begins (the caller re-renders so its card opens).
pub fn start_dashboard_timer<S, C, F>(
    board: &mut CountdownBoard<S>,
    surface: Rc<dyn Surface>,
    schedule: &Schedule,
    clock: C,
    on_event_start: F,
) -> DashboardTimer
where
    S: TaskScheduler,
    C: Clock + 'static,
    F: FnOnce() + 'static,
{
    let Some(next) = schedule.next_event(clock.now()) else {
        board.stop(ids::TIMER);
        skip_missing(surface.set_text(ids::TIMER, WEEK_COMPLETE));
        return DashboardTimer::WeekComplete;
    };

    skip_missing(surface.set_text(ids::TIMER_LABEL, &format!("Next: {}", next.label)));
    board.start(surface, ids::TIMER, clock, next.target_instant(), on_event_start);
    DashboardTimer::Counting(next.clone())
}

/// Push the open/locked state of every event's card (card id = event slug).
pub fn render_cards<B, C>(
    surface: &dyn Surface,
    controller: &AccessController<B, C>,
    schedule: &Schedule,
) -> Vec<(String, GateDecision)>
where
    B: SessionBackend,
    C: Clock,
{
    schedule
        .events()
        .iter()
        .map(|event| {
            let decision = controller.gate().decide(event.target_date);
            render_card(surface, &event.slug, decision);
            (event.slug.clone(), decision)
        })
        .collect()
}

/// Full dashboard render for a logged-in visitor.
pub fn render_dashboard<B, C>(
    surface: &dyn Surface,
    controller: &AccessController<B, C>,
    schedule: &Schedule,
) -> Vec<(String, GateDecision)>
where
    B: SessionBackend,
    C: Clock,
{
    render_identity(surface, &controller.session().get());
    render_cards(surface, controller, schedule)
}
