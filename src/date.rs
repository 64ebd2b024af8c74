//! Calendar date parsing and month arithmetic shared by the records and the analytics.

use time::{Date, Month, macros::format_description};

use crate::Error;

/// Parse a `YYYY-MM-DD` string into a [Date].
///
/// Surrounding whitespace is ignored.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not a valid calendar date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let format = format_description!("[year]-[month]-[day]");

    Date::parse(text.trim(), &format).map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Parse an optional date string, treating a missing or blank string as `None`.
///
/// # Errors
/// Returns [Error::InvalidDate] if a non-blank `text` is not a valid calendar date.
pub(crate) fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_date(text).map(Some),
    }
}

/// Formats a date as a short month and year, e.g. "Jan 2024".
pub fn month_label(date: Date) -> String {
    let month = match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!("{month} {}", date.year())
}

/// The first day of the month that `date` falls in.
pub(crate) fn first_day_of_month(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

/// The last day of the month that `date` falls in.
pub(crate) fn last_day_of_month(date: Date) -> Date {
    (28..=31)
        .rev()
        .find_map(|day| date.replace_day(day).ok())
        .unwrap_or(date)
}

/// Shift `date` by a number of calendar months.
///
/// When the target month is shorter than the source day, the day is clamped
/// to the end of the target month, e.g. 31 Jan + 1 month is 29 Feb in a
/// leap year.
///
/// Returns `None` if the shifted date is outside the supported year range.
pub(crate) fn add_months(date: Date, months: i32) -> Option<Date> {
    let month_index = date
        .year()
        .checked_mul(12)?
        .checked_add(date.month() as i32 - 1)?
        .checked_add(months)?;
    let year = month_index.div_euclid(12);
    let month = Month::try_from((month_index.rem_euclid(12) + 1) as u8).ok()?;

    (1..=date.day())
        .rev()
        .find_map(|day| Date::from_calendar_date(year, month, day).ok())
}
