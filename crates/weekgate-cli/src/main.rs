use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "weekgate-cli", version, about = "Weekgate CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Date gate checks
    Gate {
        #[command(subcommand)]
        action: commands::gate::GateAction,
    },
    /// Themed week schedule
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Live countdown to a date or the next event
    Countdown(commands::countdown::CountdownArgs),
    /// Evaluate page access for a one-off session
    Access(commands::access::AccessArgs),
    /// Render the dashboard for a one-off session as JSON
    Dashboard(commands::access::DashboardArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("WEEKGATE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Gate { action } => commands::gate::run(action),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Countdown(args) => commands::countdown::run(args),
        Commands::Access(args) => commands::access::run(args),
        Commands::Dashboard(args) => commands::access::run_dashboard(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
