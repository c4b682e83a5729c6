//! Offset-to-absolute time reconciliation for kernel ring buffer style logs.
//!
//! Lines in these logs carry `[ secs]` since power-on. Somewhere in each file
//! an anchor line announces the wall-clock time; offsets seen before it are
//! buffered and placed on the timeline once it arrives.

use chrono::NaiveDateTime;
use chrono::TimeDelta;
use tracing::debug;

use crate::DecodeError;
use crate::decoder::DecodedEvent;
use crate::decoder::parse_stamp;

const RTC_MARKER: &str = "RTC time:";
const RTC_STAMP_FORMAT: &str = "%H:%M:%S, date: %m/%d/%y";
const XORG_MARKER: &str = "Log file:";
const XORG_TIME_MARKER: &str = ", Time: ";
/// Width of the `(==) ` tag in front of the Xorg marker.
const XORG_TAG_LEN: usize = 5;
const XORG_STAMP_FORMAT: &str = "%b %d %H:%M:%S %Y";

/// Which kind of line announces the wall-clock time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorStyle {
    /// `[    0.178426] RTC time: 22:01:31, date: 07/10/14`
    Rtc,
    /// `[     4.124] (==) Log file: "/var/log/Xorg.0.log", Time: Mon Jul 14 20:48:05 2014`
    XorgLogFile,
}

#[derive(Debug, PartialEq)]
enum State {
    AwaitingAnchor { pending: Vec<(i64, String)> },
    Anchored { anchor: NaiveDateTime },
}

enum AnchorScan {
    Found(DecodedEvent),
    /// The marker is there but the time next to it does not parse.
    Malformed,
    Absent,
}

/// Per-file state machine turning offset lines into absolute events.
#[derive(Debug)]
pub struct OffsetReconciler {
    style: AnchorStyle,
    state: State,
}

impl OffsetReconciler {
    pub fn new(style: AnchorStyle) -> Self {
        Self {
            style,
            state: State::AwaitingAnchor {
                pending: Vec::new(),
            },
        }
    }

    pub fn is_anchored(&self) -> bool {
        matches!(self.state, State::Anchored { .. })
    }

    pub fn anchor(&self) -> Option<NaiveDateTime> {
        match self.state {
            State::Anchored { anchor } => Some(anchor),
            State::AwaitingAnchor { .. } => None,
        }
    }

    /// Number of offset events buffered while waiting for the anchor.
    pub fn pending_len(&self) -> usize {
        match &self.state {
            State::AwaitingAnchor { pending } => pending.len(),
            State::Anchored { .. } => 0,
        }
    }

    /// Feed one line. While awaiting the anchor most lines are buffered and
    /// nothing is returned; the anchor line returns itself followed by every
    /// buffered event in the order it was read.
    pub fn decode(&mut self, line: &str) -> Result<Vec<DecodedEvent>, DecodeError> {
        match &mut self.state {
            State::Anchored { anchor } => {
                let (offset, description) = parse_offset_line(line)?;
                let timestamp = shift(*anchor, offset).ok_or(DecodeError::OutOfRange)?;
                Ok(vec![DecodedEvent::new(timestamp, description)])
            }
            State::AwaitingAnchor { pending } => match scan_anchor(self.style, line) {
                AnchorScan::Found(anchor_event) => {
                    let anchor = anchor_event.timestamp;
                    debug!("offset anchor found at {anchor}");
                    let buffered = std::mem::take(pending);
                    let mut events = Vec::with_capacity(buffered.len() + 1);
                    events.push(anchor_event);
                    for (offset, description) in buffered {
                        match shift(anchor, offset) {
                            Some(timestamp) => events.push(DecodedEvent::new(timestamp, description)),
                            None => debug!("dropping offset {offset}s: outside the date range"),
                        }
                    }
                    self.state = State::Anchored { anchor };
                    Ok(events)
                }
                AnchorScan::Malformed => Ok(Vec::new()),
                AnchorScan::Absent => {
                    let (offset, description) = parse_offset_line(line)?;
                    pending.push((offset, description.to_string()));
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Return to awaiting an anchor, as at the start of a new physical file.
    /// Returns how many buffered events are discarded.
    pub fn reset(&mut self) -> usize {
        let dropped = self.pending_len();
        self.state = State::AwaitingAnchor {
            pending: Vec::new(),
        };
        dropped
    }
}

fn shift(anchor: NaiveDateTime, offset: i64) -> Option<NaiveDateTime> {
    anchor.checked_add_signed(TimeDelta::try_seconds(offset)?)
}

/// Split `[ secs] description` into whole seconds (rounded half away from
/// zero) and the description.
fn parse_offset_line(line: &str) -> Result<(i64, &str), DecodeError> {
    let end = line.find(']').ok_or(DecodeError::MissingField("`]`"))?;
    let raw = line.get(1..end).unwrap_or_default().trim();
    let seconds: f64 = raw
        .parse()
        .map_err(|_| DecodeError::InvalidOffset(raw.to_string()))?;
    if !seconds.is_finite() {
        return Err(DecodeError::InvalidOffset(raw.to_string()));
    }
    let description = line.get(end + 2..).unwrap_or_default();
    if description.is_empty() {
        return Err(DecodeError::EmptyDescription);
    }
    Ok((seconds.round() as i64, description))
}

fn scan_anchor(style: AnchorStyle, line: &str) -> AnchorScan {
    match style {
        AnchorStyle::Rtc => scan_rtc(line),
        AnchorStyle::XorgLogFile => scan_xorg(line),
    }
}

fn scan_rtc(line: &str) -> AnchorScan {
    let Some(marker) = line.find(RTC_MARKER) else {
        return AnchorScan::Absent;
    };
    let raw = line.get(marker + RTC_MARKER.len() + 1..).unwrap_or_default();
    // ` 9:01:31, date: ...` for single-digit hours.
    let stamp = match raw.strip_prefix(' ') {
        Some(rest) => format!("0{}", rest.trim_start()),
        None => raw.to_string(),
    };
    match parse_stamp(&stamp, RTC_STAMP_FORMAT) {
        Ok(anchor) => AnchorScan::Found(DecodedEvent::new(anchor, &line[marker..])),
        Err(err) => {
            debug!("ignoring RTC anchor: {err}");
            AnchorScan::Malformed
        }
    }
}

fn scan_xorg(line: &str) -> AnchorScan {
    let Some(marker) = line.find(XORG_MARKER) else {
        return AnchorScan::Absent;
    };
    let Some(time_at) = line.find(XORG_TIME_MARKER) else {
        return AnchorScan::Malformed;
    };
    // `Mon Jul 14 20:48:05 2014`: the weekday is not checked against the date.
    let raw = &line[time_at + XORG_TIME_MARKER.len()..];
    let stamp = raw.split_once(' ').map_or("", |(_, rest)| rest);
    match parse_stamp(stamp, XORG_STAMP_FORMAT) {
        Ok(anchor) => {
            let description = line.get(marker.saturating_sub(XORG_TAG_LEN)..).unwrap_or(&line[marker..]);
            AnchorScan::Found(DecodedEvent::new(anchor, description))
        }
        Err(err) => {
            debug!("ignoring Xorg anchor: {err}");
            AnchorScan::Malformed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(hour, min, sec))
            .expect("valid timestamp")
    }

    fn feed(reconciler: &mut OffsetReconciler, lines: &[&str]) -> Vec<DecodedEvent> {
        lines
            .iter()
            .filter_map(|line| reconciler.decode(line).ok())
            .flatten()
            .collect()
    }

    #[test]
    fn buffered_offsets_are_placed_in_read_order() {
        let mut reconciler = OffsetReconciler::new(AnchorStyle::Rtc);
        let events = feed(
            &mut reconciler,
            &[
                "[    5.000000] a",
                "[    2.000000] b",
                "[    9.000000] c",
                "[    0.178426] RTC time: 22:01:31, date: 07/10/14",
            ],
        );
        let anchor = at(2014, 7, 10, 22, 1, 31);
        assert_eq!(
            events,
            vec![
                DecodedEvent::new(anchor, "RTC time: 22:01:31, date: 07/10/14"),
                DecodedEvent::new(at(2014, 7, 10, 22, 1, 36), "a"),
                DecodedEvent::new(at(2014, 7, 10, 22, 1, 33), "b"),
                DecodedEvent::new(at(2014, 7, 10, 22, 1, 40), "c"),
            ]
        );
        assert_eq!(reconciler.anchor(), Some(anchor));
        assert_eq!(reconciler.pending_len(), 0);
    }

    #[test]
    fn anchored_lines_convert_immediately() {
        let mut reconciler = OffsetReconciler::new(AnchorStyle::Rtc);
        feed(&mut reconciler, &["[    0.17] RTC time: 22:01:31, date: 07/10/14"]);
        assert!(reconciler.is_anchored());
        let events = reconciler
            .decode("[   12.500001] usb 2-1: new high-speed USB device")
            .expect("decodes");
        assert_eq!(
            events,
            vec![DecodedEvent::new(
                at(2014, 7, 10, 22, 1, 44),
                "usb 2-1: new high-speed USB device"
            )]
        );
    }

    #[test]
    fn offsets_round_half_away_from_zero() {
        assert_eq!(parse_offset_line("[    2.5] x"), Ok((3, "x")));
        assert_eq!(parse_offset_line("[    2.4999] x"), Ok((2, "x")));
    }

    #[test]
    fn single_digit_rtc_hour_is_zero_padded() {
        let mut reconciler = OffsetReconciler::new(AnchorStyle::Rtc);
        feed(&mut reconciler, &["[    0.17] RTC time:  9:01:31, date: 07/10/14"]);
        assert_eq!(reconciler.anchor(), Some(at(2014, 7, 10, 9, 1, 31)));
    }

    #[test]
    fn malformed_anchor_keeps_waiting() {
        let mut reconciler = OffsetReconciler::new(AnchorStyle::Rtc);
        let events = feed(
            &mut reconciler,
            &["[    1.0] early", "[    1.1] RTC time: soon, date: unknown"],
        );
        assert_eq!(events, Vec::new());
        assert!(!reconciler.is_anchored());
        assert_eq!(reconciler.pending_len(), 1);
    }

    #[test]
    fn lines_without_offset_or_description_are_rejected() {
        let mut reconciler = OffsetReconciler::new(AnchorStyle::Rtc);
        assert_eq!(
            reconciler.decode("no offset here"),
            Err(DecodeError::MissingField("`]`"))
        );
        assert_eq!(
            reconciler.decode("[ abc] text"),
            Err(DecodeError::InvalidOffset("abc".to_string()))
        );
        assert_eq!(
            reconciler.decode("[    1.0]"),
            Err(DecodeError::EmptyDescription)
        );
        assert_eq!(reconciler.pending_len(), 0);
    }

    #[test]
    fn reset_discards_pending_and_forgets_the_anchor() {
        let mut reconciler = OffsetReconciler::new(AnchorStyle::Rtc);
        feed(&mut reconciler, &["[    1.0] one", "[    2.0] two"]);
        assert_eq!(reconciler.reset(), 2);

        feed(&mut reconciler, &["[    0.17] RTC time: 22:01:31, date: 07/10/14"]);
        assert_eq!(reconciler.reset(), 0);
        assert_eq!(reconciler.anchor(), None);
    }

    #[test]
    fn xorg_anchor_includes_the_tag_and_skips_the_weekday() {
        let mut reconciler = OffsetReconciler::new(AnchorStyle::XorgLogFile);
        let events = feed(
            &mut reconciler,
            &[
                "[     3.998] X.Org X Server 1.14.5",
                // Jul 14 2014 was a Monday; the weekday is not checked.
                "[     4.124] (==) Log file: \"/var/log/Xorg.0.log\", Time: Fri Jul 14 20:48:05 2014",
            ],
        );
        assert_eq!(
            events,
            vec![
                DecodedEvent::new(
                    at(2014, 7, 14, 20, 48, 5),
                    "(==) Log file: \"/var/log/Xorg.0.log\", Time: Fri Jul 14 20:48:05 2014"
                ),
                DecodedEvent::new(at(2014, 7, 14, 20, 48, 9), "X.Org X Server 1.14.5"),
            ]
        );
    }

    #[test]
    fn xorg_log_file_line_without_time_is_dropped() {
        let mut reconciler = OffsetReconciler::new(AnchorStyle::XorgLogFile);
        let events = feed(
            &mut reconciler,
            &["[     4.124] (==) Log file: \"/var/log/Xorg.0.log\""],
        );
        assert_eq!(events, Vec::new());
        assert_eq!(reconciler.pending_len(), 0);
    }
}
