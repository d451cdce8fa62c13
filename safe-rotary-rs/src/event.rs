//! Classified events and their one-line text form.
//!
//! The device surface renders each event as a single line:
//!
//! | Event | Line |
//! |---|---|
//! | [`RotaryEvent::Rotation`] | decimal position, e.g. `3\n` |
//! | [`RotaryEvent::ButtonShort`] | `BTN_SHORT\n` |
//! | [`RotaryEvent::ButtonLong`] | `BTN_LONG\n` |
//!
//! [`RotaryEvent::parse_line`] and [`PositionTracker`] are the consumer
//! half: they turn lines back into events and absolute positions into
//! per-read deltas.

use core::fmt::Write;

use heapless::String;

use crate::error::{DeviceError, ParseError};

/// Longest possible event line: `"-2147483648\n"`.
pub const MAX_LINE_LEN: usize = 12;

const SHORT_KEYWORD: &str = "BTN_SHORT";
const LONG_KEYWORD: &str = "BTN_LONG";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RotaryEvent {
    /// The knob moved; carries the new absolute position.
    Rotation(i32),
    /// Button released before the long-press threshold.
    ButtonShort,
    /// Button held past the long-press threshold.
    ButtonLong,
}

impl RotaryEvent {
    /// Render the event as its text line, newline included.
    pub fn to_line(&self) -> String<MAX_LINE_LEN> {
        let mut line = String::new();
        // Capacity covers i32::MIN plus the newline, so this cannot fail.
        let _ = match self {
            RotaryEvent::Rotation(position) => write!(line, "{}\n", position),
            RotaryEvent::ButtonShort => write!(line, "{}\n", SHORT_KEYWORD),
            RotaryEvent::ButtonLong => write!(line, "{}\n", LONG_KEYWORD),
        };
        line
    }

    /// Copy the event line into `buf`, returning the number of bytes written.
    pub fn write_line(&self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        let line = self.to_line();
        let bytes = line.as_bytes();
        let dest = buf
            .get_mut(..bytes.len())
            .ok_or(DeviceError::BufferTooSmall { needed: bytes.len() })?;
        dest.copy_from_slice(bytes);
        Ok(bytes.len())
    }

    /// Decode a line produced by [`write_line`](Self::write_line).
    ///
    /// Button keywords are matched as prefixes; anything else must be a
    /// signed decimal integer. The trailing newline is optional.
    pub fn parse_line(line: &[u8]) -> Result<Self, ParseError> {
        let text = core::str::from_utf8(line).map_err(|_| ParseError::Malformed)?;
        let text = text.trim_end_matches(&['\n', '\r'][..]);

        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        if text.starts_with(LONG_KEYWORD) {
            return Ok(RotaryEvent::ButtonLong);
        }
        if text.starts_with(SHORT_KEYWORD) {
            return Ok(RotaryEvent::ButtonShort);
        }

        text.trim()
            .parse::<i32>()
            .map(RotaryEvent::Rotation)
            .map_err(|_| ParseError::Malformed)
    }
}

// ── PositionTracker ──────────────────────────────────────────────────────

/// Turns successive absolute positions into deltas.
///
/// The first position seen only establishes the baseline, so a consumer
/// that starts after the knob has already moved does not see a jump.
#[derive(Debug, Default, Clone, Copy)]
pub struct PositionTracker {
    last: Option<i32>,
}

impl PositionTracker {
    pub const fn new() -> Self {
        Self { last: None }
    }

    /// Record `position` and return the movement since the previous one.
    pub fn update(&mut self, position: i32) -> i32 {
        let delta = match self.last {
            Some(prev) => position.wrapping_sub(prev),
            None => 0,
        };
        self.last = Some(position);
        delta
    }

    pub fn last(&self) -> Option<i32> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_match_device_format() {
        assert_eq!(RotaryEvent::Rotation(3).to_line().as_str(), "3\n");
        assert_eq!(RotaryEvent::Rotation(-12).to_line().as_str(), "-12\n");
        assert_eq!(RotaryEvent::ButtonShort.to_line().as_str(), "BTN_SHORT\n");
        assert_eq!(RotaryEvent::ButtonLong.to_line().as_str(), "BTN_LONG\n");
    }

    #[test]
    fn extreme_position_fits_line() {
        let line = RotaryEvent::Rotation(i32::MIN).to_line();
        assert_eq!(line.as_str(), "-2147483648\n");
        assert_eq!(line.len(), MAX_LINE_LEN);
    }

    #[test]
    fn write_line_rejects_short_buffer() {
        let mut buf = [0u8; 4];
        assert_eq!(
            RotaryEvent::ButtonLong.write_line(&mut buf),
            Err(DeviceError::BufferTooSmall { needed: 9 })
        );
        assert_eq!(buf, [0u8; 4]);
    }

    #[test]
    fn write_line_copies_bytes() {
        let mut buf = [0u8; 32];
        let n = RotaryEvent::ButtonShort.write_line(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"BTN_SHORT\n");
    }

    #[test]
    fn parse_recognises_keywords_and_positions() {
        assert_eq!(RotaryEvent::parse_line(b"BTN_LONG\n"), Ok(RotaryEvent::ButtonLong));
        assert_eq!(RotaryEvent::parse_line(b"BTN_SHORT"), Ok(RotaryEvent::ButtonShort));
        assert_eq!(RotaryEvent::parse_line(b"-7\n"), Ok(RotaryEvent::Rotation(-7)));
        assert_eq!(RotaryEvent::parse_line(b"42\r\n"), Ok(RotaryEvent::Rotation(42)));
    }

    #[test]
    fn parse_rejects_empty_and_garbage() {
        assert_eq!(RotaryEvent::parse_line(b""), Err(ParseError::Empty));
        assert_eq!(RotaryEvent::parse_line(b"\n"), Err(ParseError::Empty));
        assert_eq!(RotaryEvent::parse_line(b"BTN\n"), Err(ParseError::Malformed));
        assert_eq!(RotaryEvent::parse_line(&[0xff, 0x0a]), Err(ParseError::Malformed));
    }

    #[test]
    fn tracker_uses_first_position_as_baseline() {
        let mut tracker = PositionTracker::new();
        assert_eq!(tracker.update(17), 0);
        assert_eq!(tracker.update(20), 3);
        assert_eq!(tracker.update(18), -2);
        assert_eq!(tracker.last(), Some(18));
    }

    #[test]
    fn tracker_delta_survives_wraparound() {
        let mut tracker = PositionTracker::new();
        tracker.update(i32::MAX);
        assert_eq!(tracker.update(i32::MIN), 1);
    }
}
