//! # Pactroom Core Library
//!
//! This library provides the cadence and accountability statistics engine for
//! Pactroom, an app where small groups hold each other to shared recurring
//! commitments ("pacts"). All operations are available via the standalone
//! `pactroom` CLI over the same core library.
//!
//! ## Architecture
//!
//! - **Cadence**: decides whether a commitment is due on a date and counts due
//!   dates over a window, honoring relay assignments
//! - **Stats**: gap-tolerant streaks and per-participant / pact-level
//!   completion rates, computed fresh from check-in history on every call
//! - **Due board / Recap**: today's outstanding check-ins and the weekly recap
//!   with roasts for folders
//! - **Storage**: SQLite-based pact and check-in store plus TOML configuration
//!
//! ## Key Components
//!
//! - [`is_due`] / [`expected_occurrences`]: cadence evaluation
//! - [`compute_streaks`]: streak calculator
//! - [`StatsAggregator`]: derived stats for a whole pact
//! - [`PactStore`]: persistence, implementing the reader traits
//! - [`Config`]: application configuration management

pub mod cadence;
pub mod due;
pub mod error;
pub mod pact;
pub mod recap;
pub mod stats;
pub mod storage;

pub use cadence::{expected_occurrences, is_due, CadenceRule, PactMode, PactWindow, WeekdaySet};
pub use due::{due_board, load_due_board, DueBoard, DueEntry, DueStatus};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use pact::{CheckInHistory, CheckInRecord, Outcome, Pact, Participant};
pub use recap::{
    load_weekly_recap, weekly_recap, RecapConfig, RecapEntry, Roast, RoastReason, WeeklyRecap,
};
pub use stats::{
    aggregate, compute_streaks, pact_stats, DerivedStats, PactStats, PactTotals, StatsAggregator,
    StreakPolicy, Streaks, GAP_TOLERANCE_DAYS,
};
pub use storage::{CheckInReader, Config, DateRange, PactReader, PactStore};
