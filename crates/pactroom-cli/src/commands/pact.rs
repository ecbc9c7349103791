use chrono::NaiveDate;
use clap::Subcommand;
use pactroom_core::pact::parse_date;
use pactroom_core::storage::PactStore;
use pactroom_core::{CadenceRule, Pact, PactMode, PactReader};

use super::{date_or_today, print_json, CommandResult};

#[derive(Subcommand)]
pub enum PactAction {
    /// Create a new pact
    Create {
        /// Pact name
        name: String,
        /// Cadence kind (daily, weekly, custom)
        #[arg(long, default_value = "daily")]
        cadence: String,
        /// Weekdays for a custom cadence (0=Sun..6=Sat or names, comma-separated)
        #[arg(long)]
        days: Option<String>,
        /// Participation mode (individual, group, relay)
        #[arg(long, default_value = "individual")]
        mode: PactMode,
        /// First counted day (YYYY-MM-DD, default today)
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,
    },
    /// List all pacts
    List,
    /// Show a pact with its participants
    Show {
        /// Pact ID
        id: String,
    },
}

pub fn run(action: PactAction) -> CommandResult {
    let store = PactStore::open()?;

    match action {
        PactAction::Create {
            name,
            cadence,
            days,
            mode,
            start,
        } => {
            if days.is_some() && !cadence.eq_ignore_ascii_case("custom") {
                return Err("--days only applies to a custom cadence".into());
            }
            let cadence = CadenceRule::parse(&cadence, days.as_deref())?;
            let id = uuid::Uuid::new_v4().to_string();
            let pact = Pact::new(id, name, cadence, mode, date_or_today(start));
            store.create_pact(&pact)?;
            print_json(&pact)?;
        }
        PactAction::List => {
            let pacts = store.list_pacts()?;
            print_json(&pacts)?;
        }
        PactAction::Show { id } => {
            let pact = store
                .pact(&id)?
                .ok_or_else(|| format!("pact not found: {id}"))?;
            let participants = store.participants(&id)?;
            print_json(&serde_json::json!({
                "pact": pact,
                "participants": participants,
            }))?;
        }
    }
    Ok(())
}
