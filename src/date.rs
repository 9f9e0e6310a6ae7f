use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use std::str::FromStr;
use thiserror::Error;

const DELIMITER: char = '-';

const MAX_SEGMENTS: usize = 3;

// Upper bound of the proleptic Gregorian years PyPI timestamps can carry. chrono accepts much
// larger years.
const MAX_YEAR: u32 = 9999;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum DateError {
    #[error("invalid date format `{0}`; expected YEAR[-MONTH[-DAY]]")]
    InvalidFormat(String),
    #[error("`{0}` is not a valid calendar date")]
    InvalidDate(String),
}

/// An exclusive upper bound on upload times: midnight UTC at the start of a calendar date.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Cutoff(DateTime<Utc>);

impl Cutoff {
    #[must_use]
    pub fn instant(self) -> DateTime<Utc> {
        self.0
    }

    /// Whether `timestamp` is strictly earlier than the cutoff.
    #[must_use]
    pub fn admits(self, timestamp: DateTime<Utc>) -> bool {
        timestamp < self.0
    }
}

impl From<NaiveDate> for Cutoff {
    fn from(date: NaiveDate) -> Self {
        Self(Utc.from_utc_datetime(&date.and_time(NaiveTime::default())))
    }
}

impl std::fmt::Display for Cutoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

impl FromStr for Cutoff {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Parses `YEAR`, `YEAR-MONTH`, or `YEAR-MONTH-DAY` into a [`Cutoff`].
///
/// Missing trailing components default to 1. So does a component equal to zero, e.g., `2020-0`
/// is January 2020.
pub fn normalize(date_str: &str) -> Result<Cutoff, DateError> {
    let segments = date_str.split(DELIMITER).collect::<Vec<_>>();

    // Check the shape of every segment before checking any value, so that, e.g.,
    // `99999-xx` is reported as a format error rather than as an out-of-range year.
    if segments.len() > MAX_SEGMENTS
        || !segments
            .iter()
            .all(|segment| !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(DateError::InvalidFormat(date_str.to_owned()));
    }

    let invalid_date = || DateError::InvalidDate(date_str.to_owned());

    let mut components = [1u32; MAX_SEGMENTS];
    for (component, segment) in components.iter_mut().zip(&segments) {
        // A run of digits that overflows `u32` is still an integer; it is just not a
        // plausible date component.
        let value = u32::from_str(segment).map_err(|_| invalid_date())?;
        if value != 0 {
            *component = value;
        }
    }
    let [year, month, day] = components;

    if year > MAX_YEAR {
        return Err(invalid_date());
    }

    let year = i32::try_from(year).map_err(|_| invalid_date())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .map(Cutoff::from)
        .ok_or_else(invalid_date)
}
