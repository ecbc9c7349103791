use chrono::NaiveDate;
use clap::Subcommand;
use pactroom_core::pact::parse_date;
use pactroom_core::storage::PactStore;
use pactroom_core::{CheckInReader, CheckInRecord, DateRange, Outcome};

use super::{date_or_today, print_json, CommandResult};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Record a success or a fold
    Record {
        /// Pact ID
        pact: String,
        /// User ID
        user: String,
        /// success or fold
        outcome: Outcome,
        /// Day the check-in counts for (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Remove a check-in
    Undo {
        /// Pact ID
        pact: String,
        /// User ID
        user: String,
        /// Day of the check-in to remove (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
    },
    /// List check-ins for a pact
    List {
        /// Pact ID
        pact: String,
        /// Only this user's check-ins
        #[arg(long)]
        user: Option<String>,
        /// Earliest day (inclusive)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Latest day (inclusive)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
}

pub fn run(action: CheckinAction) -> CommandResult {
    let store = PactStore::open()?;

    match action {
        CheckinAction::Record {
            pact,
            user,
            outcome,
            date,
        } => {
            let record = CheckInRecord::new(pact, user, date_or_today(date), outcome);
            store.record_check_in(&record)?;
            print_json(&record)?;
        }
        CheckinAction::Undo { pact, user, date } => {
            if !store.delete_check_in(&pact, &user, date)? {
                return Err(format!("no check-in for {user} in {pact} on {date}").into());
            }
            print_json(&serde_json::json!({
                "pact_id": pact,
                "user_id": user,
                "date": date,
                "deleted": true,
            }))?;
        }
        CheckinAction::List {
            pact,
            user,
            from,
            to,
        } => {
            let range = DateRange { from, to };
            let records = store.check_ins(&pact, user.as_deref(), range)?;
            print_json(&records)?;
        }
    }
    Ok(())
}
