use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pactroom", version, about = "Pactroom CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pact management
    Pact {
        #[command(subcommand)]
        action: commands::pact::PactAction,
    },
    /// Pact membership and relay assignments
    Participant {
        #[command(subcommand)]
        action: commands::participant::ParticipantAction,
    },
    /// Record, undo and list check-ins
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Who owes a check-in on a date
    Due(commands::due::DueArgs),
    /// Completion rates and streaks
    Stats(commands::stats::StatsArgs),
    /// Weekly recap with roasts
    Recap(commands::recap::RecapArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("PACTROOM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Pact { action } => commands::pact::run(action),
        Commands::Participant { action } => commands::participant::run(action),
        Commands::Checkin { action } => commands::checkin::run(action),
        Commands::Due(args) => commands::due::run(args),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::Recap(args) => commands::recap::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
