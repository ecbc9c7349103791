use chrono::NaiveDate;
use clap::Args;
use pactroom_core::pact::parse_date;
use pactroom_core::storage::PactStore;
use pactroom_core::{pact_stats, Config, StatsAggregator};

use super::{date_or_today, print_json, CommandResult};

#[derive(Args)]
pub struct StatsArgs {
    /// Pact ID
    pact: String,
    /// Reference date (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
    /// Only this participant's stats
    #[arg(long)]
    user: Option<String>,
}

pub fn run(args: StatsArgs) -> CommandResult {
    let config = Config::load_or_default();
    let store = PactStore::open()?;
    let aggregator = StatsAggregator::with_policy(config.streak_policy());
    let stats = pact_stats(&store, &aggregator, &args.pact, date_or_today(args.as_of))?;

    match args.user {
        Some(user) => {
            let derived = stats
                .participant(&user)
                .ok_or_else(|| format!("{user} is not a participant of {}", args.pact))?;
            print_json(derived)
        }
        None => print_json(&stats),
    }
}
