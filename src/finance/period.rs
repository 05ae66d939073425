//! Calendar periods used to slice expenses and incomes.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Half-open timestamp range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Whole days from `first` through `last`, both included.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        let end = last
            .succ_opt()
            .map(|d| d.and_time(NaiveTime::MIN))
            .unwrap_or(NaiveDateTime::MAX);
        Self::new(first.and_time(NaiveTime::MIN), end)
    }

    /// The rolling week ending today: `today - 6 ..= today`.
    pub fn last_7_days(today: NaiveDate) -> Self {
        Self::days(today - Duration::days(6), today)
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Last calendar day that still falls inside the range.
    pub fn last_day(&self) -> NaiveDate {
        let last = self.end - Duration::nanoseconds(1);
        last.date()
    }
}

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    year: i32,
    month: u32,
    #[serde(skip)]
    first: NaiveDate,
    #[serde(skip)]
    next: NaiveDate,
}

impl Period {
    /// `None` unless `month` is 1-12 and the year is representable.
    pub fn month(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self { year, month, first, next })
    }

    /// The month `date` falls in.
    pub fn containing(date: NaiveDate) -> Self {
        // Day 1 of an existing date's month always exists; only the year's
        // last month can overflow, and only at chrono's maximum year.
        Self::month(date.year(), date.month()).unwrap_or(Self {
            year: date.year(),
            month: date.month(),
            first: date.with_day(1).unwrap_or(date),
            next: NaiveDate::MAX,
        })
    }

    pub fn current_month() -> Self {
        Self::containing(crate::util::today())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_number(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn range(&self) -> DateRange {
        DateRange::new(
            self.first.and_time(NaiveTime::MIN),
            self.next.and_time(NaiveTime::MIN),
        )
    }

    /// `YYYY-MM`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Monday of the week `date` falls in.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}
