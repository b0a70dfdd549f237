//! Studio-local calendar arithmetic.
//!
//! Months, weeks, and the payment due day are all judged in the studio's
//! fixed UTC offset, not in UTC.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};

use studio_core::config::BookingConfig;
use studio_core::result::AppResult;
use studio_entity::schedule::StudioDay;

#[derive(Debug, Clone, Copy)]
pub struct StudioCalendar {
    offset: FixedOffset,
}

impl StudioCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Calendar in the offset configured for the studio.
    pub fn from_config(config: &BookingConfig) -> AppResult<Self> {
        Ok(Self::new(config.studio_offset()?))
    }

    /// The studio-local calendar date of `instant`.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Whether two instants fall in the same studio-local calendar month.
    pub fn same_month(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
        let (a, b) = (self.local_date(a), self.local_date(b));
        a.year() == b.year() && a.month() == b.month()
    }

    /// Whether `now` is past the day-of-month on which payment is due.
    pub fn is_past_due_day(&self, now: DateTime<Utc>, due_day: u32) -> bool {
        self.local_date(now).day() > due_day
    }

    /// First day of the studio-local month containing `now`.
    pub fn month_start(&self, now: DateTime<Utc>) -> NaiveDate {
        self.local_date(now).with_day(1).unwrap_or_else(|| self.local_date(now))
    }

    /// Monday of the studio-local week containing `now`.
    pub fn week_start(&self, now: DateTime<Utc>) -> NaiveDate {
        monday_of(self.local_date(now))
    }

    /// Concrete date of a make-up session on `day`.
    ///
    /// The base week is the current business week; on Saturday and Sunday
    /// that is the week starting next Monday. The date moves one week
    /// further when `next_week` is set or when it has already passed.
    pub fn redemption_date(&self, now: DateTime<Utc>, day: StudioDay, next_week: bool) -> NaiveDate {
        let today = self.local_date(now);
        let base = business_week_start(today);
        let date = base + Duration::days(day.offset_from_monday());
        if next_week || date < today {
            date + Duration::days(7)
        } else {
            date
        }
    }
}

/// Monday of the ISO week containing `date`.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Monday of the current business week; weekends roll to next Monday.
pub fn business_week_start(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => monday_of(date),
    }
}
