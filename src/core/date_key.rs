use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DaybookError;

const KEY_FORMAT: &str = "%Y-%m-%d";

/// Canonical identifier for a local calendar day, rendered as zero-padded
/// `YYYY-MM-DD` so that string order matches chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The key for the current local calendar day.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parse a canonical key. Anything but a zero-padded `YYYY-MM-DD` is rejected.
    pub fn from_key(s: &str) -> Result<Self, DaybookError> {
        let s = s.trim();
        if s.len() != 10 {
            return Err(DaybookError::Validation(format!("not a YYYY-MM-DD date: {s:?}")));
        }
        NaiveDate::parse_from_str(s, KEY_FORMAT)
            .map(Self)
            .map_err(|_| DaybookError::Validation(format!("not a YYYY-MM-DD date: {s:?}")))
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Midnight at the start of this day, without zone information.
    pub fn start_of_day(&self) -> NaiveDateTime {
        self.0.and_time(chrono::NaiveTime::MIN)
    }

    /// Start of this day on the local clock. `None` only when local midnight
    /// does not exist (a DST gap at 00:00).
    pub fn local_start(&self) -> Option<DateTime<Local>> {
        Local.from_local_datetime(&self.start_of_day()).earliest()
    }

    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The Sunday that opens the week containing this day.
    pub fn week_start(&self) -> Self {
        let offset = self.0.weekday().num_days_from_sunday();
        Self(self.0 - chrono::Duration::days(i64::from(offset)))
    }

    pub fn month_start(&self) -> Self {
        Self(self.0.with_day(1).unwrap_or(self.0))
    }

    pub fn month_end(&self) -> Self {
        let (year, month) = if self.0.month() == 12 {
            (self.0.year() + 1, 1)
        } else {
            (self.0.year(), self.0.month() + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|first| first.pred_opt())
            .map(Self)
            .unwrap_or(*self)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = DaybookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_key(&raw).map_err(serde::de::Error::custom)
    }
}
