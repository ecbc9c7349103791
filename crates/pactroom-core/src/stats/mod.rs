//! Statistics module for Pactroom
//!
//! This module derives accountability statistics from check-in history:
//! gap-tolerant streaks and per-participant / pact-level completion rates.

mod aggregate;
mod streak;

pub use streak::{
    compute_streaks, compute_streaks_with, StreakPolicy, Streaks, GAP_TOLERANCE_DAYS,
};

pub use aggregate::{
    aggregate, completion_rate, pact_stats, DerivedStats, PactStats, PactTotals, StatsAggregator,
};
