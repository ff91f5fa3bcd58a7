use crate::constants::FACT_TIME_FORMAT;
use crate::core_listing::error::ListParseError;
use chrono::{
    DateTime, Datelike, FixedOffset, Month, Months, NaiveDate, NaiveDateTime, TimeZone, Utc,
};

/// Interprets a naive listing time in the server's timezone.
pub fn local_to_utc(
    naive: NaiveDateTime,
    tz: FixedOffset,
) -> Result<DateTime<Utc>, ListParseError> {
    tz.from_local_datetime(&naive)
        .single()
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| ListParseError::UnsupportedDate(naive.to_string()))
}

/// Parses the three date fields of an `ls -l` line: `Mon DD HH:MM` for
/// recent files, `Mon DD YYYY` for the others.
///
/// A recent date carries no year. The current year is assumed, and a date
/// that lands six months or more in the future is moved back one year.
pub fn parse_ls_time(
    month: &str,
    day: &str,
    year_or_time: &str,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> Result<DateTime<Utc>, ListParseError> {
    let unsupported = || {
        ListParseError::UnsupportedDate(format!("{} {} {}", month, day, year_or_time))
    };

    let month = month.parse::<Month>().map_err(|_| unsupported())?;
    let day: u32 = day.parse().map_err(|_| unsupported())?;

    if let Some((hour, minute)) = year_or_time.split_once(':') {
        let hour: u32 = hour.parse().map_err(|_| unsupported())?;
        let minute: u32 = minute.parse().map_err(|_| unsupported())?;
        let year = now.with_timezone(&tz).year();

        let naive = NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .ok_or_else(unsupported)?;
        let time = local_to_utc(naive, tz)?;

        let horizon = now
            .checked_add_months(Months::new(6))
            .ok_or_else(unsupported)?;
        if time < horizon {
            Ok(time)
        } else {
            time.checked_sub_months(Months::new(12))
                .ok_or_else(unsupported)
        }
    } else {
        if year_or_time.len() != 4 {
            return Err(unsupported());
        }
        let year: i32 = year_or_time.parse().map_err(|_| unsupported())?;

        let naive = NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(unsupported)?;
        local_to_utc(naive, tz)
    }
}

/// Parses a `YYYYMMDDHHMMSS[.fff]` fact time, as sent by MLSD and MDTM.
/// These are always UTC; fractional seconds are dropped.
pub fn parse_fact_timestamp(value: &str) -> Result<DateTime<Utc>, ListParseError> {
    let whole = value.split('.').next().unwrap_or(value);
    NaiveDateTime::parse_from_str(whole, FACT_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ListParseError::InvalidTimestamp(value.to_string()))
}
