use clap::Args;
use serde::Serialize;
use weekgate_core::countdown::Countdown;
use weekgate_core::dashboard::{render_dashboard, WEEK_COMPLETE};
use weekgate_core::render::ids;
use weekgate_core::session::PhotoUpload;
use weekgate_core::{
    AccessController, AccessDecision, CardView, Clock, Config, DateGate, FixedClock, Identity,
    MemorySurface, Navigation, Page, SessionStore, SqliteBackend,
};

use crate::common::{clock_from, gate_config, print_json, CliResult};

/// Who is visiting. Without `--name` the visitor is anonymous.
#[derive(Args)]
pub struct VisitorArgs {
    /// Log in with this name first
    #[arg(long)]
    name: Option<String>,
    /// Attach this image as the visitor's photo
    #[arg(long, requires = "name")]
    photo: Option<std::path::PathBuf>,
    /// Pretend it is this local time (YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    now: Option<String>,
    #[arg(long)]
    dev_mode: bool,
}

#[derive(Args)]
pub struct AccessArgs {
    /// Page path, e.g. `Pages/rose_day.html` or `dashboard.html`
    page: String,
    /// Treat it as a dashboard card click instead of a direct visit
    #[arg(long)]
    card: bool,
    #[command(flatten)]
    visitor: VisitorArgs,
}

#[derive(Args)]
pub struct DashboardArgs {
    #[command(flatten)]
    visitor: VisitorArgs,
}

#[derive(Serialize)]
struct AccessOutput {
    page: Page,
    decision: AccessDecision,
    navigation: Navigation,
}

#[derive(Serialize)]
struct CardRow {
    slug: String,
    label: String,
    #[serde(flatten)]
    view: CardView,
}

#[derive(Serialize)]
struct DashboardOutput {
    identity: Identity,
    timer_label: Option<String>,
    timer: String,
    cards: Vec<CardRow>,
}

type Controller = AccessController<SqliteBackend, FixedClock>;

fn controller_for(visitor: &VisitorArgs, config: &Config) -> Result<Controller, Box<dyn std::error::Error>> {
    let gate = DateGate::new(clock_from(visitor.now.as_deref())?, gate_config(config, visitor.dev_mode));
    let mut controller = AccessController::new(SessionStore::new(SqliteBackend::open()?), gate);

    if let Some(name) = &visitor.name {
        let photo = match &visitor.photo {
            Some(path) => Some(PhotoUpload::from_path(path)?.to_data_url()),
            None => None,
        };
        let nav = controller.login(name, photo.as_deref())?;
        if nav == Navigation::Stay {
            tracing::warn!("blank name; visiting anonymously");
        }
    }
    Ok(controller)
}

pub fn run(args: AccessArgs) -> CliResult {
    let config = Config::load_or_default();
    let controller = controller_for(&args.visitor, &config)?;
    let schedule = config.schedule(controller.gate().clock().now())?;

    let page = Page::from_path(&args.page, &schedule);
    let (decision, navigation) = if args.card {
        controller.click_card(&page)
    } else {
        controller.visit(&page)
    };
    print_json(&AccessOutput {
        page,
        decision,
        navigation,
    })
}

pub fn run_dashboard(args: DashboardArgs) -> CliResult {
    let config = Config::load_or_default();
    let controller = controller_for(&args.visitor, &config)?;

    let (_, navigation) = controller.visit(&Page::Dashboard);
    if navigation != Navigation::Stay {
        return print_json(&navigation);
    }

    let now = controller.gate().clock().now();
    let schedule = config.schedule(now)?;
    let mut elements = vec![ids::NAME, ids::PHOTO_DISPLAY, ids::PHOTO_FRAME, ids::NAV_PHOTO, ids::NAV_FRAME];
    elements.extend(schedule.events().iter().map(|e| e.slug.as_str()));
    let surface = MemorySurface::with_elements(elements);

    let states = render_dashboard(&surface, &controller, &schedule);
    let cards = schedule
        .events()
        .iter()
        .zip(states)
        .map(|(event, (slug, decision))| CardRow {
            view: surface.card(&slug).unwrap_or_else(|| CardView::from(decision)),
            slug,
            label: event.label.clone(),
        })
        .collect();

    let next = schedule.next_event(now);
    print_json(&DashboardOutput {
        identity: controller.session().get(),
        timer_label: next.map(|e| format!("Next: {}", e.label)),
        timer: next.map_or_else(
            || WEEK_COMPLETE.to_string(),
            |e| Countdown::new(e.target_instant(), now).state().display,
        ),
        cards,
    })
}
