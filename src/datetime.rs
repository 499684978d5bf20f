use chrono::{Datelike, NaiveDate, NaiveDateTime};


/// Type for all creation timestamps.
pub type Timestamp = chrono::DateTime<chrono::Utc>;


/// Calendar date (no time component) a transaction is attributed to.
pub type Date = NaiveDate;


/// Source of "now" for all calendar computations.
///
/// Calendar filters (today, week, month) work in local wall-clock time.
pub trait Clock {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;

    /// Current UTC timestamp, used to stamp new records.
    fn timestamp(&self) -> Timestamp;

    /// Current local calendar day.
    fn today(&self) -> Date {
        self.now().date()
    }
}


/// Clock backed by the system time and local timezone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;


impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now()
            .naive_local()
    }

    fn timestamp(&self) -> Timestamp {
        chrono::Utc::now()
    }
}


/// Clock frozen at a given local time. Timestamps are produced
/// by interpreting the local time as UTC.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    now: NaiveDateTime,
}


impl FixedClock {
    /// Creates a clock, that always returns `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        FixedClock { now: now }
    }

    /// Creates a clock frozen at noon of a given day.
    ///
    /// Returns `None` for an invalid date.
    pub fn at(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .map(Self::new)
    }
}


impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn timestamp(&self) -> Timestamp {
        self.now.and_utc()
    }
}


/// Year and month pair identifying a calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}


impl YearMonth {
    /// Month, that contains a given date.
    pub fn of(date: Date) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month()
        }
    }

    /// Month, that precedes the current one.
    pub fn pred(self) -> Self {
        if self.month == 1 {
            YearMonth { year: self.year - 1, month: 12 }
        } else {
            YearMonth { year: self.year, month: self.month - 1 }
        }
    }

    /// Checks if a date falls into this month.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Short label, e.g. `Jan 2024`.
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|first| first.format("%b %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }
}


/// The `count` most recent months ending with the month of `today`,
/// oldest first.
pub fn trailing_months(today: Date, count: usize) -> Vec<YearMonth> {
    let mut months = Vec::with_capacity(count);
    let mut current = YearMonth::of(today);

    for _ in 0..count {
        months.push(current);
        current = current.pred();
    }

    months.reverse();
    months
}
