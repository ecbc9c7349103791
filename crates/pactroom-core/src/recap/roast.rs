//! Roast lines for participants who let the pact down.
//!
//! Selection is deterministic: the same pact, user and date always produce
//! the same line, so regenerating a recap never reshuffles it.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Why a participant is being roasted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoastReason {
    /// Checked in with a fold
    Folded,
    /// Was due and never checked in
    Missed,
}

const FOLD_LINES: &[&str] = &[
    "{user} folded faster than a cheap lawn chair.",
    "{user} looked at the commitment, looked at the couch, and chose the couch.",
    "Breaking news: {user} has discovered the fold button and cannot stop pressing it.",
    "{user} folded. The group chat will remember this.",
    "{user}'s willpower has been reported missing. Last seen: right before the fold.",
    "Somewhere a motivational poster just fell off the wall. Thanks, {user}.",
];

const MISSED_LINES: &[&str] = &[
    "{user} didn't even fold. {user} just vanished.",
    "Has anyone checked on {user}? The pact has. Twice.",
    "{user} treated the due date like a terms-of-service page: scrolled right past it.",
    "Ghosting people is rude, {user}. Ghosting a pact is worse.",
    "{user}'s check-in is still loading. Estimated arrival: never.",
    "The pact was due. {user} was not.",
];

fn seed(pact_id: &str, user_id: &str, date: NaiveDate) -> u64 {
    let digest = Sha256::new()
        .chain_update(pact_id.as_bytes())
        .chain_update(b"|")
        .chain_update(user_id.as_bytes())
        .chain_update(b"|")
        .chain_update(date.format("%Y-%m-%d").to_string().as_bytes())
        .finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Pick a roast line for `user_id`, stable for a given pact and date.
pub fn pick_roast(pact_id: &str, user_id: &str, date: NaiveDate, reason: RoastReason) -> String {
    let lines = match reason {
        RoastReason::Folded => FOLD_LINES,
        RoastReason::Missed => MISSED_LINES,
    };
    let mut rng = Mcg128Xsl64::seed_from_u64(seed(pact_id, user_id, date));
    lines
        .choose(&mut rng)
        .copied()
        .unwrap_or("{user} let the pact down.")
        .replace("{user}", user_id)
}
