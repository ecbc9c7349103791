use chrono::NaiveDate;
use clap::Args;
use pactroom_core::pact::parse_date;
use pactroom_core::storage::PactStore;
use pactroom_core::{load_weekly_recap, Config};

use super::{date_or_today, print_json, CommandResult};

#[derive(Args)]
pub struct RecapArgs {
    /// Pact ID
    pact: String,
    /// Last day of the recap window (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
}

pub fn run(args: RecapArgs) -> CommandResult {
    let config = Config::load_or_default();
    let store = PactStore::open()?;
    let recap = load_weekly_recap(
        &store,
        &args.pact,
        date_or_today(args.as_of),
        &config.recap_config(),
    )?
    .ok_or_else(|| format!("pact not found: {}", args.pact))?;
    print_json(&recap)
}
