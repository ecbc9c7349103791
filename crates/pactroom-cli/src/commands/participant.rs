use clap::Subcommand;
use pactroom_core::storage::PactStore;
use pactroom_core::{PactReader, Participant, WeekdaySet};

use super::{print_json, CommandResult};

#[derive(Subcommand)]
pub enum ParticipantAction {
    /// Add a user to a pact
    Add {
        /// Pact ID
        pact: String,
        /// User ID
        user: String,
        /// Relay weekdays this user covers (e.g. "1,5" or "mon,fri")
        #[arg(long)]
        relay: Option<WeekdaySet>,
    },
    /// Set or clear a participant's relay weekdays
    Relay {
        /// Pact ID
        pact: String,
        /// User ID
        user: String,
        /// Weekdays (e.g. "3" or "wed"), or "none" to clear
        days: String,
    },
    /// List a pact's participants
    List {
        /// Pact ID
        pact: String,
    },
}

pub fn run(action: ParticipantAction) -> CommandResult {
    let store = PactStore::open()?;

    match action {
        ParticipantAction::Add { pact, user, relay } => {
            let mut participant = Participant::new(pact, user);
            participant.relay_assignment = relay;
            store.add_participant(&participant)?;
            print_json(&participant)?;
        }
        ParticipantAction::Relay { pact, user, days } => {
            let assignment = if days.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(days.parse::<WeekdaySet>()?)
            };
            store.set_relay_assignment(&pact, &user, assignment.as_ref())?;
            let participant = Participant {
                pact_id: pact,
                user_id: user,
                relay_assignment: assignment,
            };
            print_json(&participant)?;
        }
        ParticipantAction::List { pact } => {
            if store.pact(&pact)?.is_none() {
                return Err(format!("pact not found: {pact}").into());
            }
            print_json(&store.participants(&pact)?)?;
        }
    }
    Ok(())
}
