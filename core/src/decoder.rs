//! Timestamp decoders, one per log-line layout.
//!
//! Stateless layouts are handled by [`TimestampDecoder`]; the two offset
//! layouts need an [`OffsetReconciler`]. [`FamilyDecoder`] picks whichever a
//! family's [`DecoderKind`] calls for.

use std::ops::Range;

use chrono::Days;
use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::DecodeError;
use crate::reconciler::AnchorStyle;
use crate::reconciler::OffsetReconciler;

const SYSLOG_STAMP_LEN: usize = 15;
const ISO_STAMP_LEN: usize = 19;
const ISO_STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SYSLOG_STAMP_FORMAT: &str = "%Y %b %d %H:%M:%S";
const APACHE_STAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

// Fixed columns of `last` output: `Www Mmm DD HH:MM - HH:MM (dur)`.
const SESSION_MONTH_DAY: Range<usize> = 43..49;
const SESSION_LOGIN_TIME: Range<usize> = 50..55;
const SESSION_LOGOUT_TIME: Range<usize> = 58..63;
const STILL_LOGGED_IN: &str = "still logged in";

/// How the lines of one log family encode their timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecoderKind {
    /// `Mon DD HH:MM:SS <host> <source>: <description>`; no year.
    StandardSyslog,
    /// `YYYY-MM-DD HH:MM:SS <description>`.
    IsoPrefixed,
    /// `<token> YYYY-MM-DD HH:MM:SS: <description>`.
    IsoAfterToken,
    /// Common Log Format: `... [DD/Mon/YYYY:HH:MM:SS ±ZZZZ] <description>`.
    BracketedApache,
    /// `last` output: a login event and, once the session ended, a logout.
    SessionHistory,
    /// `last -f btmp` output: one failed-login event per line.
    FailedLogin,
    /// `[ secs] ...` kernel ring buffer anchored by `RTC time:`.
    DmesgOffset,
    /// `[ secs] ...` X server log anchored by `Log file: ..., Time: ...`.
    XorgOffset,
}

impl DecoderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DecoderKind::StandardSyslog => "standard-syslog",
            DecoderKind::IsoPrefixed => "iso-prefixed",
            DecoderKind::IsoAfterToken => "iso-after-token",
            DecoderKind::BracketedApache => "bracketed-apache",
            DecoderKind::SessionHistory => "session-history",
            DecoderKind::FailedLogin => "failed-login",
            DecoderKind::DmesgOffset => "dmesg-offset",
            DecoderKind::XorgOffset => "xorg-offset",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineFormat {
    StandardSyslog,
    IsoPrefixed,
    IsoAfterToken,
    BracketedApache,
    SessionHistory,
    FailedLogin,
}

/// One normalized occurrence produced from a raw line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEvent {
    pub timestamp: NaiveDateTime,
    pub description: String,
}

impl DecodedEvent {
    pub fn new(timestamp: NaiveDateTime, description: impl Into<String>) -> Self {
        Self {
            timestamp,
            description: description.into(),
        }
    }
}

/// Pure decoder for the layouts that carry an absolute timestamp on every line.
///
/// Layouts without a year are dated in `reference_year`, normally the year
/// at which ingestion runs. Entries written in a previous year come out
/// mis-dated; that is accepted.
#[derive(Clone, Copy, Debug)]
pub struct TimestampDecoder {
    format: LineFormat,
    reference_year: i32,
}

impl TimestampDecoder {
    pub fn new(format: LineFormat, reference_year: i32) -> Self {
        Self {
            format,
            reference_year,
        }
    }

    pub fn format(&self) -> LineFormat {
        self.format
    }

    pub fn decode(&self, line: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        match self.format {
            LineFormat::StandardSyslog => {
                decode_standard_syslog(line, self.reference_year).map(|event| vec![event])
            }
            LineFormat::IsoPrefixed => decode_iso_prefixed(line).map(|event| vec![event]),
            LineFormat::IsoAfterToken => decode_iso_after_token(line).map(|event| vec![event]),
            LineFormat::BracketedApache => decode_bracketed_apache(line).map(|event| vec![event]),
            LineFormat::SessionHistory => decode_session_history(line, self.reference_year),
            LineFormat::FailedLogin => {
                decode_failed_login(line, self.reference_year).map(|event| vec![event])
            }
        }
    }
}

/// Per-family decoder: stateless for most layouts, an [`OffsetReconciler`]
/// for offset-based ones.
#[derive(Debug)]
pub enum FamilyDecoder {
    Line(TimestampDecoder),
    Offset(OffsetReconciler),
}

impl FamilyDecoder {
    pub fn new(kind: DecoderKind, reference_year: i32) -> Self {
        let line = |format| Self::Line(TimestampDecoder::new(format, reference_year));
        match kind {
            DecoderKind::StandardSyslog => line(LineFormat::StandardSyslog),
            DecoderKind::IsoPrefixed => line(LineFormat::IsoPrefixed),
            DecoderKind::IsoAfterToken => line(LineFormat::IsoAfterToken),
            DecoderKind::BracketedApache => line(LineFormat::BracketedApache),
            DecoderKind::SessionHistory => line(LineFormat::SessionHistory),
            DecoderKind::FailedLogin => line(LineFormat::FailedLogin),
            DecoderKind::DmesgOffset => Self::Offset(OffsetReconciler::new(AnchorStyle::Rtc)),
            DecoderKind::XorgOffset => {
                Self::Offset(OffsetReconciler::new(AnchorStyle::XorgLogFile))
            }
        }
    }

    pub fn decode(&mut self, line: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        match self {
            Self::Line(decoder) => decoder.decode(line),
            Self::Offset(reconciler) => reconciler.decode(line),
        }
    }

    /// Start over for a new physical file. Returns the number of buffered
    /// offset events that never saw an anchor and are discarded.
    pub fn reset(&mut self) -> usize {
        match self {
            Self::Line(_) => 0,
            Self::Offset(reconciler) => reconciler.reset(),
        }
    }
}

pub(crate) fn parse_stamp(text: &str, format: &str) -> Result<NaiveDateTime, DecodeError> {
    NaiveDateTime::parse_from_str(text, format)
        .map_err(|err| DecodeError::invalid_timestamp(text, err))
}

fn decode_standard_syslog(line: &str, year: i32) -> Result<DecodedEvent, DecodeError> {
    let stamp = line.get(..SYSLOG_STAMP_LEN).ok_or(DecodeError::TooShort {
        expected: SYSLOG_STAMP_LEN,
    })?;
    let timestamp = parse_stamp(&format!("{year} {stamp}"), SYSLOG_STAMP_FORMAT)?;

    // `<host> <source>: <description>`; the host may be blank.
    let rest = line[SYSLOG_STAMP_LEN..].trim_start();
    let description = match rest.split_once(": ") {
        // The `:` must close the source token, at most one token past the host.
        Some((head, description)) if head.matches(' ').count() <= 1 => description,
        _ => rest.split_once(' ').map_or("", |(_, description)| description),
    };
    Ok(DecodedEvent::new(timestamp, description))
}

fn decode_iso_prefixed(line: &str) -> Result<DecodedEvent, DecodeError> {
    let stamp = line.get(..ISO_STAMP_LEN).ok_or(DecodeError::TooShort {
        expected: ISO_STAMP_LEN,
    })?;
    let timestamp = parse_stamp(stamp, ISO_STAMP_FORMAT)?;
    let description = line.get(ISO_STAMP_LEN + 1..).unwrap_or_default();
    Ok(DecodedEvent::new(timestamp, description))
}

fn decode_iso_after_token(line: &str) -> Result<DecodedEvent, DecodeError> {
    let fields: Vec<&str> = line.split(' ').collect();
    let (Some(&date), Some(&time)) = (fields.get(1), fields.get(2)) else {
        return Err(DecodeError::MissingField("date and time fields"));
    };
    // The time field carries a trailing `:` separator.
    let time = time.get(..8).unwrap_or(time);
    let timestamp = parse_stamp(&format!("{date} {time}"), ISO_STAMP_FORMAT)?;
    let description = fields.get(3..).map(|rest| rest.join(" ")).unwrap_or_default();
    Ok(DecodedEvent::new(timestamp, description))
}

fn decode_bracketed_apache(line: &str) -> Result<DecodedEvent, DecodeError> {
    let start = line.find('[').ok_or(DecodeError::MissingField("`[`"))?;
    let end = line.find(']').ok_or(DecodeError::MissingField("`]`"))?;
    let inner = line
        .get(start + 1..end)
        .ok_or(DecodeError::MissingField("bracketed timestamp"))?;
    // `12/Jul/2014:06:52:52 -0700`: the zone offset is ignored.
    let stamp = inner.split(' ').next().unwrap_or_default();
    let timestamp = parse_stamp(stamp, APACHE_STAMP_FORMAT)?;
    let description = line.get(end + 2..).unwrap_or_default();
    Ok(DecodedEvent::new(timestamp, description))
}

fn decode_session_history(line: &str, year: i32) -> Result<Vec<DecodedEvent>, DecodeError> {
    let login = session_login_time(line, year)?;
    let mut events = vec![DecodedEvent::new(login, format!("Log-in: {line}"))];
    if line.contains(STILL_LOGGED_IN) {
        return Ok(events);
    }
    // `gone - no logout`, `down`, `crash` and friends carry no logout time.
    if let Some(logout) = line
        .get(SESSION_LOGOUT_TIME)
        .and_then(|time| session_logout_time(line, time, login, year))
    {
        events.push(DecodedEvent::new(logout, format!("Log-off: {line}")));
    }
    Ok(events)
}

fn decode_failed_login(line: &str, year: i32) -> Result<DecodedEvent, DecodeError> {
    let login = session_login_time(line, year)?;
    Ok(DecodedEvent::new(login, format!("Failed login: {line}")))
}

fn session_login_time(line: &str, year: i32) -> Result<NaiveDateTime, DecodeError> {
    let month_day = line
        .get(SESSION_MONTH_DAY)
        .ok_or(DecodeError::TooShort {
            expected: SESSION_LOGIN_TIME.end,
        })?;
    let time = line.get(SESSION_LOGIN_TIME).ok_or(DecodeError::TooShort {
        expected: SESSION_LOGIN_TIME.end,
    })?;
    session_stamp(year, month_day, time)
}

/// The logout column only holds a clock time. It belongs to the login date,
/// or the following day when it reads earlier than the login.
fn session_logout_time(
    line: &str,
    time: &str,
    login: NaiveDateTime,
    year: i32,
) -> Option<NaiveDateTime> {
    let month_day = line.get(SESSION_MONTH_DAY)?;
    let logout = session_stamp(year, month_day, time).ok()?;
    if logout < login {
        logout.checked_add_days(Days::new(1))
    } else {
        Some(logout)
    }
}

fn session_stamp(year: i32, month_day: &str, time: &str) -> Result<NaiveDateTime, DecodeError> {
    parse_stamp(&format!("{year} {month_day} {time}:00"), SYSLOG_STAMP_FORMAT)
}

#[cfg(test)]
#[path = "decoder_tests.rs"]
mod tests;
