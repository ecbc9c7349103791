use chrono::NaiveDate;
use clap::Args;
use pactroom_core::load_due_board;
use pactroom_core::pact::parse_date;
use pactroom_core::storage::PactStore;

use super::{date_or_today, print_json, CommandResult};

#[derive(Args)]
pub struct DueArgs {
    /// Pact ID
    pact: String,
    /// Day to check (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
}

pub fn run(args: DueArgs) -> CommandResult {
    let store = PactStore::open()?;
    let board = load_due_board(&store, &args.pact, date_or_today(args.date))?;
    print_json(&board)
}
