//! Resolves the `year` and `month` query parameters into a range of instants.

use serde::Deserialize;
use time::{Date, Month, OffsetDateTime, UtcOffset};

use crate::{Error, timestamp::to_millis};

/// The query parameters for selecting a month or a whole year.
///
/// The values are kept as strings so that invalid input produces a JSON
/// error message rather than a plain text rejection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PeriodQuery {
    /// The calendar year, e.g. "2026". Defaults to the current year.
    pub year: Option<String>,
    /// The month number from 1 to 12. Omit to select the whole year.
    pub month: Option<String>,
}

/// A calendar month or a calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    /// The calendar year.
    pub year: i32,
    /// The month within `year`, or `None` for the whole year.
    pub month: Option<Month>,
}

impl Period {
    /// A single month.
    pub fn month(year: i32, month: Month) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// A whole year.
    pub fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    /// Parse the period from query parameters. `today` supplies the default year.
    ///
    /// Blank parameters are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the year is not a number between 1 and
    /// 9999 or the month is not a number between 1 and 12.
    pub fn from_query(query: &PeriodQuery, today: Date) -> Result<Self, Error> {
        let year = match non_blank(&query.year) {
            Some(year) => parse_year(year)?,
            None => today.year(),
        };

        let month = non_blank(&query.month).map(parse_month).transpose()?;

        Ok(Self { year, month })
    }

    /// The first and last instants of the period in the timezone `local_offset`.
    pub fn window(&self, local_offset: UtcOffset) -> Result<DateWindow, Error> {
        let (first_month, last_month) = match self.month {
            Some(month) => (month, month),
            None => (Month::January, Month::December),
        };

        let first_day = Date::from_calendar_date(self.year, first_month, 1)
            .map_err(|error| Error::Validation(error.to_string()))?;
        let last_day = last_day_of_month(self.year, last_month)?;

        let start = first_day.midnight().assume_offset(local_offset);
        let end = last_day
            .with_hms_milli(23, 59, 59, 999)
            .map_err(|error| Error::Validation(error.to_string()))?
            .assume_offset(local_offset);

        Ok(DateWindow { start, end })
    }
}

/// An inclusive range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    /// The first millisecond in the window.
    pub start: OffsetDateTime,
    /// The last millisecond in the window.
    pub end: OffsetDateTime,
}

impl DateWindow {
    /// The start of the window as epoch milliseconds.
    pub fn start_millis(&self) -> i64 {
        to_millis(self.start)
    }

    /// The end of the window as epoch milliseconds.
    pub fn end_millis(&self) -> i64 {
        to_millis(self.end)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_year(text: &str) -> Result<i32, Error> {
    match text.parse::<i32>() {
        Ok(year) if (1..=9999).contains(&year) => Ok(year),
        _ => Err(Error::Validation(format!(
            "year must be a number between 1 and 9999, got \"{text}\""
        ))),
    }
}

fn parse_month(text: &str) -> Result<Month, Error> {
    text.parse::<u8>()
        .ok()
        .and_then(|month| Month::try_from(month).ok())
        .ok_or_else(|| {
            Error::Validation(format!(
                "month must be a number between 1 and 12, got \"{text}\""
            ))
        })
}

fn last_day_of_month(year: i32, month: Month) -> Result<Date, Error> {
    let last_day = match month {
        Month::December => Date::from_calendar_date(year, Month::December, 31),
        month => Date::from_calendar_date(year, month.next(), 1)
            .map(|first_of_next_month| first_of_next_month - time::Duration::days(1)),
    };

    last_day.map_err(|error| Error::Validation(error.to_string()))
}
