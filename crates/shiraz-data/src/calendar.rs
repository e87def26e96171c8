//! Gregorian to local solar (Jalali) calendar conversion.
//!
//! Uses the 2820-year break table of the astronomical solar calendar as
//! tabulated for the years -61 to 3177.

use crate::{DataError, Result};
use chrono::{Datelike, Days, NaiveDate};
use shiraz_traits::LocalDate;

/// Years at which the 33-year leap cycle restarts.
const BREAKS: [i32; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

/// Offset between local and Gregorian year numbers at the local new year.
const YEAR_OFFSET: i32 = 621;

/// Leap position and new-year day of a local year.
#[derive(Debug, Clone, Copy)]
struct YearInfo {
    /// 0 for a leap year, otherwise years since the last leap year
    leap: i32,
    /// Gregorian year in which the local year starts
    gregorian_year: i32,
    /// Day of March on which the local year starts
    march: u32,
}

fn year_info(year: i32) -> Result<YearInfo> {
    let (first, last) = (BREAKS[0], BREAKS[BREAKS.len() - 1]);
    if year < first || year >= last {
        return Err(DataError::InvalidDate(format!(
            "local year {year} outside supported range {first}..{last}"
        )));
    }

    let mut leap_local = -14;
    let mut previous = first;
    let mut jump = 0;
    for &brk in &BREAKS[1..] {
        jump = brk - previous;
        if year < brk {
            break;
        }
        leap_local += jump / 33 * 8 + (jump % 33) / 4;
        previous = brk;
    }

    let mut n = year - previous;
    leap_local += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_local += 1;
    }

    let gregorian_year = year + YEAR_OFFSET;
    let leap_gregorian = gregorian_year / 4 - (gregorian_year / 100 + 1) * 3 / 4 - 150;
    let march = 20 + leap_local - leap_gregorian;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    Ok(YearInfo {
        leap,
        gregorian_year,
        march: u32::try_from(march)
            .map_err(|_| DataError::InvalidDate(format!("no new year for local year {year}")))?,
    })
}

fn new_year(info: &YearInfo) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(info.gregorian_year, 3, info.march).ok_or_else(|| {
        DataError::InvalidDate(format!(
            "{}-03-{} is not a Gregorian date",
            info.gregorian_year, info.march
        ))
    })
}

/// Whether the local year has 366 days.
///
/// Years outside the supported range are reported as common years.
pub fn is_leap_year(year: i32) -> bool {
    year_info(year).is_ok_and(|info| info.leap == 0)
}

/// Number of days in a local month (31 for months 1-6, 30 for 7-11, 29 or
/// 30 for month 12).
pub fn month_length(year: i32, month: u32) -> u32 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        _ if is_leap_year(year) => 30,
        _ => 29,
    }
}

/// Converts a Gregorian date to the local calendar.
///
/// # Errors
///
/// Returns [`DataError::InvalidDate`] outside the supported year range.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use shiraz_data::gregorian_to_local;
///
/// let date = gregorian_to_local(NaiveDate::from_ymd_opt(2021, 3, 21).unwrap()).unwrap();
/// assert_eq!(date.to_string(), "1400-01-01");
/// ```
pub fn gregorian_to_local(date: NaiveDate) -> Result<LocalDate> {
    let mut year = date.year() - YEAR_OFFSET;
    let info = year_info(year)?;
    let mut k = (date - new_year(&info)?).num_days();

    if k >= 0 {
        if k <= 185 {
            return local(year, 1 + k / 31, k % 31 + 1);
        }
        k -= 186;
    } else {
        year -= 1;
        k += 179;
        if info.leap == 1 {
            k += 1;
        }
    }
    local(year, 7 + k / 30, k % 30 + 1)
}

/// Converts a local date to the Gregorian calendar.
///
/// # Errors
///
/// Returns [`DataError::InvalidDate`] outside the supported year range or
/// for day 30 of month 12 in a common year.
pub fn local_to_gregorian(date: LocalDate) -> Result<NaiveDate> {
    if date.day() > month_length(date.year(), date.month()) {
        return Err(DataError::InvalidDate(format!(
            "{date} is past the end of its month"
        )));
    }
    let info = year_info(date.year())?;
    let month = date.month();
    let offset = if month <= 6 {
        (month - 1) * 31
    } else {
        186 + (month - 7) * 30
    } + date.day()
        - 1;
    new_year(&info)?
        .checked_add_days(Days::new(u64::from(offset)))
        .ok_or_else(|| DataError::InvalidDate(format!("{date} overflows the Gregorian range")))
}

fn local(year: i32, month: i64, day: i64) -> Result<LocalDate> {
    let month = u32::try_from(month).map_err(|_| DataError::InvalidDate(format!("month {month}")))?;
    let day = u32::try_from(day).map_err(|_| DataError::InvalidDate(format!("day {day}")))?;
    Ok(LocalDate::new(year, month, day)?)
}
