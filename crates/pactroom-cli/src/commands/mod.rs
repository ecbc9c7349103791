pub mod checkin;
pub mod config;
pub mod due;
pub mod pact;
pub mod participant;
pub mod recap;
pub mod stats;

use chrono::{Local, NaiveDate};
use pactroom_core::Config;
use serde::Serialize;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Resolve an optional date argument, defaulting to today's local date.
pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Print `value` as JSON, pretty unless `display.pretty_json` is off.
pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    let pretty = Config::load_or_default().display.pretty_json;
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
