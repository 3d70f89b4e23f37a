use std::fmt;
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};
use time::util::days_in_year_month;
use time::{Date, Month, OffsetDateTime};

/// A single calendar day, formatted and parsed as the unpadded `YYYY-M-D`
/// string the persistence slot has always used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct DayDate {
    inner: Date,
}

impl DayDate {
    pub fn new(year: i32, month: u8, day: u8) -> Result<Self, DateParseError> {
        let month = Month::try_from(month).map_err(|_| DateParseError::OutOfRange)?;
        let inner =
            Date::from_calendar_date(year, month, day).map_err(|_| DateParseError::OutOfRange)?;
        Ok(Self { inner })
    }

    pub fn today() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self { inner: now.date() }
    }

    pub fn year(&self) -> i32 {
        self.inner.year()
    }

    pub fn month(&self) -> u8 {
        self.inner.month() as u8
    }

    pub fn day(&self) -> u8 {
        self.inner.day()
    }
}

impl From<Date> for DayDate {
    fn from(inner: Date) -> Self {
        Self { inner }
    }
}

impl fmt::Display for DayDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.year(), self.month(), self.day())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("expected a date shaped like 2024-3-15")]
    Malformed,
    #[error("date components out of range")]
    OutOfRange,
}

impl FromStr for DayDate {
    type Err = DateParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.trim().splitn(3, '-');
        let year = parts
            .next()
            .and_then(|p| p.parse::<i32>().ok())
            .ok_or(DateParseError::Malformed)?;
        let month = parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .ok_or(DateParseError::Malformed)?;
        let day = parts
            .next()
            .and_then(|p| p.parse::<u8>().ok())
            .ok_or(DateParseError::Malformed)?;
        DayDate::new(year, month, day)
    }
}

/// The currently displayed month. Navigation is unbounded in both
/// directions; the year rolls when stepping across January or December.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    year: i32,
    month: Month,
}

impl MonthCursor {
    pub fn new(year: i32, month: u8) -> Result<Self, DateParseError> {
        let month = Month::try_from(month).map_err(|_| DateParseError::OutOfRange)?;
        Ok(Self { year, month })
    }

    pub fn containing(date: DayDate) -> Self {
        Self {
            year: date.year(),
            month: Month::try_from(date.month()).unwrap_or(Month::January),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month as u8
    }

    pub fn month_name(&self) -> &'static str {
        match self.month {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    pub fn previous(self) -> Self {
        let year = if self.month == Month::January {
            self.year - 1
        } else {
            self.year
        };
        Self {
            year,
            month: self.month.previous(),
        }
    }

    pub fn next(self) -> Self {
        let year = if self.month == Month::December {
            self.year + 1
        } else {
            self.year
        };
        Self {
            year,
            month: self.month.next(),
        }
    }

    pub fn days_in_month(&self) -> u8 {
        days_in_year_month(self.year, self.month)
    }

    /// Day-of-week of the first of the month, 0 = Sunday .. 6 = Saturday.
    pub fn first_weekday(&self) -> u8 {
        Date::from_calendar_date(self.year, self.month, 1)
            .map(|date| date.weekday().number_days_from_sunday())
            .unwrap_or(0)
    }

    pub fn date_of(&self, day: u8) -> Option<DayDate> {
        Date::from_calendar_date(self.year, self.month, day)
            .ok()
            .map(DayDate::from)
    }

    pub fn contains(&self, date: DayDate) -> bool {
        date.year() == self.year && date.month() == self.month as u8
    }
}

impl Default for MonthCursor {
    fn default() -> Self {
        Self::containing(DayDate::today())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridCell {
    Blank,
    Day(u8),
}

/// Flat month layout: `first_weekday` blanks, then day cells, then trailing
/// blanks so every row is exactly seven cells wide.
#[derive(Debug, Clone)]
pub struct MonthGrid {
    cells: Vec<GridCell>,
    leading: u8,
    days: u8,
}

pub const WEEK_COLUMNS: usize = 7;
pub const WEEKDAY_LABELS: [&str; WEEK_COLUMNS] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

impl MonthGrid {
    pub fn for_month(cursor: MonthCursor) -> Self {
        let leading = cursor.first_weekday();
        let days = cursor.days_in_month();
        let filled = leading as usize + days as usize;
        let trailing = (WEEK_COLUMNS - filled % WEEK_COLUMNS) % WEEK_COLUMNS;

        let mut cells = Vec::with_capacity(filled + trailing);
        cells.extend(std::iter::repeat(GridCell::Blank).take(leading as usize));
        cells.extend((1..=days).map(GridCell::Day));
        cells.extend(std::iter::repeat(GridCell::Blank).take(trailing));
        Self {
            cells,
            leading,
            days,
        }
    }

    pub fn leading_blanks(&self) -> u8 {
        self.leading
    }

    pub fn day_count(&self) -> u8 {
        self.days
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(WEEK_COLUMNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leap_year_february_has_29_days() {
        let cursor = MonthCursor::new(2024, 2).expect("valid month");
        assert_eq!(cursor.days_in_month(), 29);
        assert_eq!(MonthCursor::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthCursor::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthCursor::new(2000, 2).unwrap().days_in_month(), 29);
    }

    #[test]
    fn march_2024_starts_on_friday() {
        let cursor = MonthCursor::new(2024, 3).expect("valid month");
        assert_eq!(cursor.first_weekday(), 5);
        assert_eq!(cursor.days_in_month(), 31);
    }

    #[test]
    fn navigation_rolls_the_year() {
        let january = MonthCursor::new(2024, 1).unwrap();
        let december = january.previous();
        assert_eq!(december.year(), 2023);
        assert_eq!(december.month(), 12);
        assert_eq!(december.next(), january);

        let mut cursor = january;
        for _ in 0..24 {
            cursor = cursor.next();
        }
        assert_eq!(cursor, MonthCursor::new(2026, 1).unwrap());
    }

    #[test]
    fn grid_aligns_day_one_under_its_weekday() {
        let cursor = MonthCursor::new(2024, 3).unwrap();
        let grid = MonthGrid::for_month(cursor);
        assert_eq!(grid.leading_blanks(), 5);
        assert_eq!(grid.day_count(), 31);
        assert_eq!(grid.cells()[5], GridCell::Day(1));
        assert_eq!(grid.cells().len() % WEEK_COLUMNS, 0);
        for row in grid.rows() {
            assert_eq!(row.len(), WEEK_COLUMNS);
        }
        let day_cells = grid
            .cells()
            .iter()
            .filter(|cell| matches!(cell, GridCell::Day(_)))
            .count();
        assert_eq!(day_cells, 31);
    }

    #[test]
    fn grid_is_consistent_across_a_range_of_months() {
        for year in 1999..=2031 {
            for month in 1..=12u8 {
                let cursor = MonthCursor::new(year, month).unwrap();
                let grid = MonthGrid::for_month(cursor);
                assert_eq!(
                    grid.cells().len(),
                    (grid.leading_blanks() as usize + grid.day_count() as usize + 6)
                        / WEEK_COLUMNS
                        * WEEK_COLUMNS
                );
                assert_eq!(
                    grid.cells()[grid.leading_blanks() as usize],
                    GridCell::Day(1)
                );
            }
        }
    }

    #[test]
    fn day_date_round_trips_the_unpadded_format() {
        let date: DayDate = "2024-3-5".parse().expect("parse");
        assert_eq!(date.to_string(), "2024-3-5");
        assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 5));

        let padded: DayDate = "2024-03-05".parse().expect("padded input accepted");
        assert_eq!(padded, date);
    }

    #[test]
    fn day_date_rejects_garbage() {
        assert!("not-a-date".parse::<DayDate>().is_err());
        assert!("2024-13-1".parse::<DayDate>().is_err());
        assert!("2024-2-30".parse::<DayDate>().is_err());
        assert!("2024-3".parse::<DayDate>().is_err());
    }

    #[test]
    fn date_of_is_bounded_by_the_month() {
        let cursor = MonthCursor::new(2024, 2).unwrap();
        assert!(cursor.date_of(29).is_some());
        assert!(cursor.date_of(30).is_none());
        assert!(cursor.date_of(0).is_none());
    }
}
