use chrono::NaiveDate;

/// Consecutive-day activity counter.
///
/// `last_date` is the most recent calendar day that counted toward the
/// streak. Invariant: `best >= current` after every update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Streak {
    current: u32,
    best: u32,
    last_date: Option<NaiveDate>,
}

/// What a call to [`Streak::observe`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakUpdate {
    /// Today was already counted; nothing changed.
    AlreadyCounted,
    /// Yesterday was the last active day; the streak grew to `length`.
    Extended { length: u32 },
    /// The chain was broken, or had never started; the streak restarts at 1.
    Restarted,
}

impl Streak {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from persisted fields.
    ///
    /// A stored record with `best < current` is repaired by raising `best`,
    /// so the invariant holds from the first read.
    #[must_use]
    pub fn from_persisted(current: u32, best: u32, last_date: Option<NaiveDate>) -> Self {
        Self {
            current,
            best: best.max(current),
            last_date,
        }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn best(&self) -> u32 {
        self.best
    }

    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }

    /// Count `today` toward the streak.
    ///
    /// Same day twice is a no-op; the day after `last_date` extends the
    /// chain; any gap (or a fresh record) restarts it at 1. `best` and
    /// `last_date` are brought up to date before returning.
    pub fn observe(&mut self, today: NaiveDate) -> StreakUpdate {
        if self.last_date == Some(today) {
            return StreakUpdate::AlreadyCounted;
        }

        let update = if self.last_date.is_some() && self.last_date == today.pred_opt() {
            self.current += 1;
            StreakUpdate::Extended {
                length: self.current,
            }
        } else {
            self.current = 1;
            StreakUpdate::Restarted
        };

        if self.current > self.best {
            self.best = self.current;
        }
        self.last_date = Some(today);
        update
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
