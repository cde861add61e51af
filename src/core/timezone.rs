use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};

/// Institution-local calendar.
///
/// Timestamps are stored as UTC; due dates, voucher validity and late fees are
/// judged against the institution's local date.
#[derive(Debug, Clone, Copy)]
pub struct InstitutionClock {
    offset: FixedOffset,
}

impl InstitutionClock {
    /// Builds a clock from a UTC offset in minutes (e.g. 300 for UTC+5)
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(|offset| Self { offset })
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Local calendar date of the current instant
    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    /// Local calendar date of a UTC instant
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

impl Default for InstitutionClock {
    fn default() -> Self {
        Self::utc()
    }
}

/// `YYYYMM` period code used in voucher and receipt numbers
pub fn period_code(date: NaiveDate) -> String {
    format!("{:04}{:02}", date.year(), date.month())
}
