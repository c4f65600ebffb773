//! Laser module wire protocol
//!
//! ASCII frames starting with `$` and terminated by `&`. The host sends
//! a command; the module answers with an acknowledgement frame followed
//! by exactly one reply frame.
//!
//! | Frame | Bytes |
//! |---|---|
//! | Power-on command | `$0003260130&` |
//! | Measure / off command | `$00022123&` |
//! | Acknowledgement | `$00023335` |
//! | Power-on confirmation | `$0003260130` |
//! | Measurement | `$000621` + 10 digits (10 µm units) |
//!
//! The four module error frames share the measurement prefix and are
//! themselves 10-digit frames, so they are matched exactly before a frame
//! is read as a measurement.

use gonio_core::traits::ModuleError;
use heapless::Vec;

/// Power-on command
pub const POWER_ON_COMMAND: &[u8] = b"$0003260130&";

/// Single-shot measure command
pub const MEASURE_COMMAND: &[u8] = b"$00022123&";

/// Off command (the module reuses the measure code)
pub const OFF_COMMAND: &[u8] = MEASURE_COMMAND;

/// Frame start byte
pub const FRAME_START: u8 = b'$';

/// Frame terminator byte
pub const FRAME_END: u8 = b'&';

/// Acknowledgement, precedes every reply
pub const ACK_FRAME: &[u8] = b"$00023335";

/// Power-on confirmation
pub const CONFIRM_FRAME: &[u8] = b"$0003260130";

/// Target closer than the minimum range
pub const TOO_CLOSE_FRAME: &[u8] = b"$0006210000001542";

/// No echo
pub const NO_ECHO_FRAME: &[u8] = b"$0006210000001643";

/// Echo too strong
pub const ECHO_TOO_STRONG_FRAME: &[u8] = b"$0006210000001744";

/// Too much ambient light
pub const AMBIENT_LIGHT_FRAME: &[u8] = b"$0006210000001845";

/// Prefix of a measurement frame
pub const MEASUREMENT_PREFIX: &[u8] = b"$000621";

/// Decimal digits following the measurement prefix
pub const MEASUREMENT_DIGITS: usize = 10;

/// Raw measurement units per meter
pub const METERS_DIVISOR: f64 = 100_000.0;

/// Longest frame kept before the reader gives up on it
///
/// Longer than any legal frame, so overflow always means garbage.
pub const MAX_FRAME_LEN: usize = 24;

/// A frame body, without the terminator
pub type Frame = Vec<u8, MAX_FRAME_LEN>;

/// Framing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Frame exceeded [`MAX_FRAME_LEN`] and was dropped
    Overflow,
}

/// Byte-at-a-time frame assembler
///
/// Bytes outside a frame are ignored. `$` always starts a new frame, so
/// a truncated frame is dropped as soon as the next one begins.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: Frame,
    in_frame: bool,
    overflowed: bool,
}

impl FrameReader {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            in_frame: false,
            overflowed: false,
        }
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.buf.clear();
        self.in_frame = false;
        self.overflowed = false;
    }

    /// Feed one received byte
    ///
    /// Returns a complete frame when `byte` is the terminator.
    pub fn feed(&mut self, byte: u8) -> Option<Result<Frame, FrameError>> {
        match byte {
            FRAME_START => {
                self.reset();
                self.in_frame = true;
                // Cannot fail: buffer was just cleared
                let _ = self.buf.push(byte);
                None
            }
            FRAME_END if self.in_frame => {
                let overflowed = self.overflowed;
                let frame = core::mem::take(&mut self.buf);
                self.reset();
                Some(if overflowed {
                    Err(FrameError::Overflow)
                } else {
                    Ok(frame)
                })
            }
            _ if self.in_frame => {
                if !self.overflowed && self.buf.push(byte).is_err() {
                    self.overflowed = true;
                    self.buf.clear();
                }
                None
            }
            _ => None,
        }
    }
}

/// Meaning of a received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    Ack,
    Confirm,
    /// Raw distance in 10 µm units
    Measurement(u64),
    Error(ModuleError),
    /// Anything else, including overflowed frames
    Unknown,
}

impl Reply {
    /// Classify a frame body
    pub fn classify(frame: &[u8]) -> Self {
        match frame {
            TOO_CLOSE_FRAME => Reply::Error(ModuleError::TooClose),
            NO_ECHO_FRAME => Reply::Error(ModuleError::NoEcho),
            ECHO_TOO_STRONG_FRAME => Reply::Error(ModuleError::EchoTooStrong),
            AMBIENT_LIGHT_FRAME => Reply::Error(ModuleError::AmbientLight),
            ACK_FRAME => Reply::Ack,
            CONFIRM_FRAME => Reply::Confirm,
            _ => parse_measurement(frame).map_or(Reply::Unknown, Reply::Measurement),
        }
    }
}

/// Parse `$000621` + 10 decimal digits into the raw distance
pub fn parse_measurement(frame: &[u8]) -> Option<u64> {
    let digits = frame.strip_prefix(MEASUREMENT_PREFIX)?;
    if digits.len() != MEASUREMENT_DIGITS {
        return None;
    }

    digits.iter().try_fold(0u64, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + (b - b'0') as u64)
    })
}

/// Convert a raw distance to meters
pub fn raw_to_meters(raw: u64) -> f64 {
    raw as f64 / METERS_DIVISOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feed_all(reader: &mut FrameReader, bytes: &[u8]) -> Option<Result<Frame, FrameError>> {
        let mut last = None;
        for &b in bytes {
            if let Some(r) = reader.feed(b) {
                last = Some(r);
            }
        }
        last
    }

    #[test]
    fn test_frame_assembly() {
        let mut reader = FrameReader::new();
        let frame = feed_all(&mut reader, b"$00023335&").unwrap().unwrap();
        assert_eq!(frame.as_slice(), ACK_FRAME);
    }

    #[test]
    fn test_noise_before_start_ignored() {
        let mut reader = FrameReader::new();
        let frame = feed_all(&mut reader, b"\x00\xFFxx$0003260130&").unwrap().unwrap();
        assert_eq!(frame.as_slice(), CONFIRM_FRAME);
    }

    #[test]
    fn test_stray_terminator_ignored() {
        let mut reader = FrameReader::new();
        assert_eq!(reader.feed(b'&'), None);
    }

    #[test]
    fn test_new_start_drops_partial_frame() {
        let mut reader = FrameReader::new();
        let frame = feed_all(&mut reader, b"$0002$00023335&").unwrap().unwrap();
        assert_eq!(frame.as_slice(), ACK_FRAME);
    }

    #[test]
    fn test_overflow_resyncs_at_terminator() {
        let mut reader = FrameReader::new();
        assert_eq!(
            feed_all(&mut reader, b"$0123456789012345678901234567890&"),
            Some(Err(FrameError::Overflow))
        );
        let frame = feed_all(&mut reader, b"$00023335&").unwrap().unwrap();
        assert_eq!(frame.as_slice(), ACK_FRAME);
    }

    #[test]
    fn test_classify_codes() {
        assert_eq!(Reply::classify(ACK_FRAME), Reply::Ack);
        assert_eq!(Reply::classify(CONFIRM_FRAME), Reply::Confirm);
        assert_eq!(
            Reply::classify(b"$0006210000123456"),
            Reply::Measurement(123_456)
        );
        assert_eq!(Reply::classify(b"$00099"), Reply::Unknown);
        assert_eq!(Reply::classify(b""), Reply::Unknown);
    }

    #[test]
    fn test_error_frames_win_over_measurement() {
        assert_eq!(
            Reply::classify(TOO_CLOSE_FRAME),
            Reply::Error(ModuleError::TooClose)
        );
        assert_eq!(
            Reply::classify(NO_ECHO_FRAME),
            Reply::Error(ModuleError::NoEcho)
        );
        assert_eq!(
            Reply::classify(ECHO_TOO_STRONG_FRAME),
            Reply::Error(ModuleError::EchoTooStrong)
        );
        assert_eq!(
            Reply::classify(AMBIENT_LIGHT_FRAME),
            Reply::Error(ModuleError::AmbientLight)
        );
    }

    #[test]
    fn test_measurement_needs_ten_digits() {
        assert_eq!(parse_measurement(b"$000621000012345"), None);
        assert_eq!(parse_measurement(b"$00062100001234567"), None);
        assert_eq!(parse_measurement(b"$00062100001234x6"), None);
        assert_eq!(parse_measurement(b"$0006219999999999"), Some(9_999_999_999));
    }

    #[test]
    fn test_off_is_measure_code() {
        assert_eq!(OFF_COMMAND, MEASURE_COMMAND);
        assert_eq!(POWER_ON_COMMAND.last(), Some(&FRAME_END));
    }

    proptest! {
        #[test]
        fn prop_measurement_parses_exactly(d in 0u64..10_000_000_000) {
            let text = std::format!("$000621{:010}", d);
            let reply = Reply::classify(text.as_bytes());
            let is_error = [TOO_CLOSE_FRAME, NO_ECHO_FRAME, ECHO_TOO_STRONG_FRAME, AMBIENT_LIGHT_FRAME]
                .contains(&text.as_bytes());

            if is_error {
                prop_assert!(matches!(reply, Reply::Error(_)));
            } else {
                prop_assert_eq!(reply, Reply::Measurement(d));
                prop_assert_eq!(raw_to_meters(d), d as f64 / 100000.0);
            }
        }

        #[test]
        fn prop_reader_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..200)) {
            let mut reader = FrameReader::new();
            for b in bytes {
                if let Some(Ok(frame)) = reader.feed(b) {
                    prop_assert!(frame.len() <= MAX_FRAME_LEN);
                    prop_assert_eq!(frame.first(), Some(&FRAME_START));
                }
            }
        }
    }
}
