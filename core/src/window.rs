use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use chrono::TimeDelta;
use logsift_state::EVENT_TIMESTAMP_FORMAT;

use crate::QueryInputError;

/// Inclusive `[start, end]` range of event timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// `[center - seconds, center + seconds]`.
    pub fn around(center: NaiveDateTime, seconds: i64) -> Result<Self, QueryInputError> {
        if seconds < 0 {
            return Err(QueryInputError::InvalidSeconds(seconds.to_string()));
        }
        let delta = TimeDelta::try_seconds(seconds).ok_or(QueryInputError::OutOfRange(seconds))?;
        let start = center
            .checked_sub_signed(delta)
            .ok_or(QueryInputError::OutOfRange(seconds))?;
        let end = center
            .checked_add_signed(delta)
            .ok_or(QueryInputError::OutOfRange(seconds))?;
        Ok(Self { start, end })
    }

    /// Parse `YYYY-MM-DD hh:mm:ss, N`, a center time and a half-width in
    /// seconds.
    pub fn parse(input: &str) -> Result<Self, QueryInputError> {
        let (datetime, seconds) = input
            .split_once(',')
            .ok_or_else(|| QueryInputError::MissingWindow(input.to_string()))?;
        let datetime = datetime.trim();
        let center = NaiveDateTime::parse_from_str(datetime, EVENT_TIMESTAMP_FORMAT)
            .map_err(|_| QueryInputError::InvalidDateTime(datetime.to_string()))?;
        let seconds = seconds.trim();
        let seconds: i64 = seconds
            .parse()
            .map_err(|_| QueryInputError::InvalidSeconds(seconds.to_string()))?;
        Self::around(center, seconds)
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        self.start <= *timestamp && *timestamp <= self.end
    }
}

impl FromStr for TimeWindow {
    type Err = QueryInputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} .. {}",
            self.start.format(EVENT_TIMESTAMP_FORMAT),
            self.end.format(EVENT_TIMESTAMP_FORMAT)
        )
    }
}
