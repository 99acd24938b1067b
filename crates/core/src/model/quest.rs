use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::QuestId;

/// A daily mini-challenge from the quest config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub id: QuestId,
    pub text: String,
}

/// Top-level shape of `quests.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuestFile {
    #[serde(default)]
    pub quests: Vec<Quest>,
}

/// Pick the quest for `date`.
///
/// Selection is a pure function of the ISO date string and the list size,
/// so every device with the same quest list shows the same quest without
/// any coordination. Returns `None` for an empty list.
#[must_use]
pub fn quest_of_the_day(quests: &[Quest], date: NaiveDate) -> Option<&Quest> {
    if quests.is_empty() {
        return None;
    }
    let key = date.format("%Y-%m-%d").to_string();
    let index = date_hash(&key) as usize % quests.len();
    quests.get(index)
}

/// Storage key marking `quest` completed on `date`; the same quest on a
/// later date is independently completable.
#[must_use]
pub fn completion_key(id: &QuestId, date: NaiveDate) -> String {
    format!("{id}-{}", date.format("%Y-%m-%d"))
}

/// Order-dependent polynomial rolling hash (multiplier 31), truncated to
/// 32-bit signed at every step, then taken absolute.
fn date_hash(value: &str) -> u32 {
    let mut hash: i32 = 0;
    for ch in value.chars() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(ch as i32);
    }
    hash.unsigned_abs()
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
