use chrono::{FixedOffset, NaiveDate, Offset, Utc};

/// Source of the calendar date that "today" means for booking rules.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock evaluated at the clinic's UTC offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Out-of-range offsets fall back to UTC.
    pub fn with_offset_minutes(minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
