//! Laser rangefinder module driver
//!
//! Blocking request/response exchanges over a dedicated UART. Every wait
//! polls the receiver against a [`Deadline`], so a silent or unplugged
//! module costs at most the configured timeouts and retries.
//!
//! The module reports measurement errors with a latency of about
//! [`ERROR_REPLY_DELAY_MS`], while good results come back much faster.
//! [`RESULT_TIMEOUT_MS`] is therefore kept above the error delay so an
//! error frame is received and reported instead of timing out.

use gonio_core::traits::{LinkState, Rangefinder, RangefinderError, Side};
use gonio_hal::{Clock, Deadline, UartRx, UartTx};

use super::protocol::{
    raw_to_meters, FrameError, FrameReader, Reply, MEASURE_COMMAND, OFF_COMMAND,
    POWER_ON_COMMAND,
};

/// Time for the acknowledgement frame to follow a command
pub const ACK_TIMEOUT_MS: u32 = 500;

/// Time for the power-on confirmation to follow the acknowledgement
pub const CONFIRM_TIMEOUT_MS: u32 = 1500;

/// Latency with which the module reports a failed measurement
pub const ERROR_REPLY_DELAY_MS: u32 = 5000;

/// Time for a measurement reply to follow the acknowledgement
pub const RESULT_TIMEOUT_MS: u32 = 7000;

/// Times a timed-out exchange is re-sent before the unit is faulted
pub const COMM_RETRIES: u8 = 2;

/// Upper bound on stale bytes dropped before a new command
const DRAIN_LIMIT: usize = 256;

/// Timeouts for one module link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RangefinderTimeouts {
    pub ack_ms: u32,
    pub confirm_ms: u32,
    pub result_ms: u32,
    pub retries: u8,
}

impl Default for RangefinderTimeouts {
    fn default() -> Self {
        Self {
            ack_ms: ACK_TIMEOUT_MS,
            confirm_ms: CONFIRM_TIMEOUT_MS,
            result_ms: RESULT_TIMEOUT_MS,
            retries: COMM_RETRIES,
        }
    }
}

/// One laser module on its own UART
pub struct LaserRangefinder<U, C> {
    side: Side,
    uart: U,
    clock: C,
    reader: FrameReader,
    timeouts: RangefinderTimeouts,
    enabled: bool,
    last_measurement: f64,
    link: LinkState,
}

impl<U, C> LaserRangefinder<U, C>
where
    U: UartTx + UartRx,
    C: Clock,
{
    /// Create a driver for a powered-down module
    pub fn new(side: Side, uart: U, clock: C, timeouts: RangefinderTimeouts) -> Self {
        Self {
            side,
            uart,
            clock,
            reader: FrameReader::new(),
            timeouts,
            enabled: false,
            last_measurement: 0.0,
            link: LinkState::Idle,
        }
    }

    /// Release the UART and clock
    pub fn release(self) -> (U, C) {
        (self.uart, self.clock)
    }

    /// Drop stale input and send a command
    fn send(&mut self, command: &[u8]) -> Result<(), RangefinderError> {
        let _dropped = self
            .uart
            .discard_pending(DRAIN_LIMIT)
            .map_err(|_| RangefinderError::Bus)?;
        #[cfg(feature = "defmt")]
        if _dropped > 0 {
            defmt::debug!("{}: dropped {} stale bytes", self.side, _dropped);
        }
        self.reader.reset();

        self.uart
            .write_blocking(command)
            .map_err(|_| RangefinderError::Bus)?;
        self.uart.flush().map_err(|_| RangefinderError::Bus)
    }

    /// Next complete frame received before `deadline`
    fn next_reply(&mut self, deadline: &Deadline) -> Result<Reply, RangefinderError> {
        loop {
            if deadline.expired(&self.clock) {
                return Err(RangefinderError::Timeout);
            }

            let byte = match self.uart.try_read_byte() {
                Ok(Some(byte)) => byte,
                Ok(None) => continue,
                Err(_) => return Err(RangefinderError::Bus),
            };

            match self.reader.feed(byte) {
                Some(Ok(frame)) => return Ok(Reply::classify(&frame)),
                Some(Err(FrameError::Overflow)) => return Ok(Reply::Unknown),
                None => {}
            }
        }
    }

    /// Wait for a specific frame, discarding anything else
    fn wait_for(&mut self, wanted: Reply, timeout_ms: u32) -> Result<(), RangefinderError> {
        let deadline = Deadline::after(&self.clock, timeout_ms);
        loop {
            let reply = self.next_reply(&deadline)?;
            if reply == wanted {
                return Ok(());
            }
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "{}: discarding {} while waiting for {}",
                self.side,
                reply,
                wanted
            );
        }
    }

    fn power_on_exchange(&mut self) -> Result<(), RangefinderError> {
        self.link = LinkState::AwaitingReply;
        self.wait_for(Reply::Ack, self.timeouts.ack_ms)?;
        self.link = LinkState::AwaitingConfirm;
        self.wait_for(Reply::Confirm, self.timeouts.confirm_ms)
    }

    fn result_exchange(&mut self) -> Result<f64, RangefinderError> {
        self.link = LinkState::AwaitingReply;
        self.wait_for(Reply::Ack, self.timeouts.ack_ms)?;
        self.link = LinkState::AwaitingMeasurement;

        let deadline = Deadline::after(&self.clock, self.timeouts.result_ms);
        match self.next_reply(&deadline)? {
            Reply::Measurement(raw) => Ok(raw_to_meters(raw)),
            Reply::Error(e) => Err(e.into()),
            _other => {
                #[cfg(feature = "defmt")]
                defmt::warn!("{}: unexpected reply {}", self.side, _other);
                Err(RangefinderError::ProtocolMismatch)
            }
        }
    }

    /// Run an exchange, re-sending `command` after each timeout
    fn with_retries<T>(
        &mut self,
        command: &'static [u8],
        mut exchange: impl FnMut(&mut Self) -> Result<T, RangefinderError>,
    ) -> Result<T, RangefinderError> {
        let mut attempt = 0;
        loop {
            match exchange(self) {
                Err(RangefinderError::Timeout) if attempt < self.timeouts.retries => {
                    attempt += 1;
                    #[cfg(feature = "defmt")]
                    defmt::warn!("{}: timeout, retry {}", self.side, attempt);
                    self.send(command)?;
                }
                Err(RangefinderError::Timeout) => {
                    self.mark_faulted();
                    return Err(RangefinderError::Timeout);
                }
                Err(e) => {
                    self.enabled = false;
                    self.link = LinkState::Idle;
                    return Err(e);
                }
                Ok(value) => {
                    self.link = LinkState::Idle;
                    return Ok(value);
                }
            }
        }
    }
}

impl<U, C> Rangefinder for LaserRangefinder<U, C>
where
    U: UartTx + UartRx,
    C: Clock,
{
    fn side(&self) -> Side {
        self.side
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn last_measurement(&self) -> f64 {
        self.last_measurement
    }

    fn link_state(&self) -> LinkState {
        self.link
    }

    fn send_power_on(&mut self) -> Result<(), RangefinderError> {
        self.enabled = false;
        self.send(POWER_ON_COMMAND)?;
        self.link = LinkState::AwaitingReply;
        Ok(())
    }

    fn await_power_on(&mut self) -> Result<(), RangefinderError> {
        self.with_retries(POWER_ON_COMMAND, Self::power_on_exchange)?;
        self.enabled = true;
        #[cfg(feature = "defmt")]
        defmt::info!("{} laser on", self.side);
        Ok(())
    }

    fn trigger_measurement(&mut self) -> Result<(), RangefinderError> {
        if !self.enabled {
            return Err(RangefinderError::NotEnabled);
        }
        self.send(MEASURE_COMMAND)?;
        self.link = LinkState::AwaitingReply;
        Ok(())
    }

    fn read_result(&mut self) -> Result<f64, RangefinderError> {
        if !self.enabled {
            return Err(RangefinderError::NotEnabled);
        }

        let meters = self.with_retries(MEASURE_COMMAND, Self::result_exchange)?;
        self.last_measurement = meters;
        self.enabled = false;
        Ok(meters)
    }

    fn power_off(&mut self) -> Result<(), RangefinderError> {
        self.enabled = false;
        self.link = LinkState::Idle;
        self.send(OFF_COMMAND)
    }

    fn mark_faulted(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::warn!("{} laser faulted", self.side);
        self.enabled = false;
        self.link = LinkState::Faulted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rangefinder::protocol::{ACK_FRAME, CONFIRM_FRAME};
    use core::cell::Cell;
    use gonio_core::traits::ModuleError;
    use heapless::{Deque, Vec};

    /// Clock that advances 1 ms every time it is read
    struct TickClock(Cell<u64>);

    impl Clock for TickClock {
        fn now_ms(&self) -> u64 {
            let now = self.0.get();
            self.0.set(now + 1);
            now
        }
    }

    /// Module simulator: each write queues the next scripted reply
    struct ScriptedModule {
        replies: Deque<&'static [u8], 8>,
        rx: Deque<u8, 512>,
        written: Vec<u8, 256>,
        writes: usize,
    }

    impl ScriptedModule {
        fn new(replies: &[&'static [u8]]) -> Self {
            let mut queue = Deque::new();
            for reply in replies {
                queue.push_back(*reply).unwrap();
            }
            Self {
                replies: queue,
                rx: Deque::new(),
                written: Vec::new(),
                writes: 0,
            }
        }
    }

    impl UartTx for ScriptedModule {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.written.extend_from_slice(data).unwrap();
            self.writes += 1;
            if let Some(reply) = self.replies.pop_front() {
                for &b in reply {
                    self.rx.push_back(b).unwrap();
                }
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl UartRx for ScriptedModule {
        type Error = ();

        fn try_read_byte(&mut self) -> Result<Option<u8>, ()> {
            Ok(self.rx.pop_front())
        }
    }

    const ACK_CONFIRM: &[u8] = b"$00023335&$0003260130&";
    const SILENT: &[u8] = b"";

    fn laser(replies: &[&'static [u8]]) -> LaserRangefinder<ScriptedModule, TickClock> {
        LaserRangefinder::new(
            Side::Left,
            ScriptedModule::new(replies),
            TickClock(Cell::new(0)),
            RangefinderTimeouts::default(),
        )
    }

    fn powered(replies: &[&'static [u8]]) -> LaserRangefinder<ScriptedModule, TickClock> {
        let mut all: Vec<&'static [u8], 8> = Vec::new();
        all.push(ACK_CONFIRM).unwrap();
        all.extend_from_slice(replies).unwrap();
        let mut l = laser(&all);
        l.power_on().unwrap();
        l
    }

    #[test]
    fn test_power_on_handshake() {
        let mut l = laser(&[ACK_CONFIRM]);
        assert!(!l.is_enabled());

        l.send_power_on().unwrap();
        assert_eq!(l.link_state(), LinkState::AwaitingReply);
        l.await_power_on().unwrap();

        assert!(l.is_enabled());
        assert_eq!(l.link_state(), LinkState::Idle);
        let (uart, _) = l.release();
        assert_eq!(uart.written.as_slice(), POWER_ON_COMMAND);
    }

    #[test]
    fn test_unexpected_frames_discarded_during_handshake() {
        let mut l = laser(&[b"$0001&$00023335&$0000&$0003260130&"]);
        l.power_on().unwrap();
        assert!(l.is_enabled());
    }

    #[test]
    fn test_stale_bytes_drained_before_command() {
        let mut l = powered(&[b"$00023335&$0006210000123456&"]);
        // Late reply from an earlier exchange still sitting in the receiver
        for &b in b"$00023335&$0006210000999999&" {
            l.uart.rx.push_back(b).unwrap();
        }

        l.trigger_measurement().unwrap();
        assert_eq!(l.read_result(), Ok(1.23456));
    }

    #[test]
    fn test_power_on_retried_after_timeout() {
        let mut l = laser(&[SILENT, ACK_CONFIRM]);
        l.power_on().unwrap();
        assert!(l.is_enabled());
        let (uart, _) = l.release();
        assert_eq!(uart.writes, 2);
    }

    #[test]
    fn test_silent_module_faults_after_retries() {
        let mut l = laser(&[]);
        assert_eq!(l.power_on(), Err(RangefinderError::Timeout));
        assert!(!l.is_enabled());
        assert_eq!(l.link_state(), LinkState::Faulted);

        let (uart, clock) = l.release();
        // One send plus COMM_RETRIES re-sends
        assert_eq!(uart.writes, 1 + COMM_RETRIES as usize);
        // Bounded: never waits much past the configured budget
        let budget = (1 + COMM_RETRIES as u64) * ACK_TIMEOUT_MS as u64;
        assert!(clock.0.get() <= budget + 16);
    }

    #[test]
    fn test_ack_without_confirm_times_out() {
        let mut l = laser(&[b"$00023335&", b"$00023335&", b"$00023335&"]);
        assert_eq!(l.power_on(), Err(RangefinderError::Timeout));
        assert_eq!(l.link_state(), LinkState::Faulted);
    }

    #[test]
    fn test_measurement() {
        let mut l = powered(&[b"$00023335&$0006210000123456&"]);

        l.trigger_measurement().unwrap();
        assert_eq!(l.link_state(), LinkState::AwaitingReply);
        let meters = l.read_result().unwrap();

        assert_eq!(meters, 1.23456);
        assert_eq!(l.last_measurement(), 1.23456);
        assert!(!l.is_enabled());
        assert_eq!(l.link_state(), LinkState::Idle);
    }

    #[test]
    fn test_module_error_keeps_last_measurement() {
        let mut l = powered(&[b"$00023335&$0006210000001643&"]);
        l.last_measurement = 4.2;

        l.trigger_measurement().unwrap();
        assert_eq!(
            l.read_result(),
            Err(RangefinderError::Module(ModuleError::NoEcho))
        );
        assert_eq!(l.last_measurement(), 4.2);
        assert!(!l.is_enabled());
    }

    #[test]
    fn test_garbage_result_is_mismatch() {
        let mut l = powered(&[b"$00023335&$000621XYZ&"]);
        l.trigger_measurement().unwrap();
        assert_eq!(l.read_result(), Err(RangefinderError::ProtocolMismatch));
        assert_eq!(l.last_measurement(), 0.0);
    }

    #[test]
    fn test_overflowed_result_is_mismatch() {
        let mut l = powered(&[b"$00023335&$000621000000000000000000000000000&"]);
        l.trigger_measurement().unwrap();
        assert_eq!(l.read_result(), Err(RangefinderError::ProtocolMismatch));
    }

    #[test]
    fn test_result_timeout_is_bounded() {
        let mut l = powered(&[b"$00023335&"]);
        l.trigger_measurement().unwrap();
        assert_eq!(l.read_result(), Err(RangefinderError::Timeout));
        assert_eq!(l.link_state(), LinkState::Faulted);
        assert_eq!(l.last_measurement(), 0.0);
    }

    #[test]
    fn test_measure_requires_enabled_unit() {
        let mut l = laser(&[]);
        assert_eq!(l.trigger_measurement(), Err(RangefinderError::NotEnabled));
        assert_eq!(l.read_result(), Err(RangefinderError::NotEnabled));
    }

    #[test]
    fn test_power_off_sends_off_command() {
        let mut l = powered(&[]);
        l.power_off().unwrap();
        assert!(!l.is_enabled());
        let (uart, _) = l.release();
        assert!(uart.written.ends_with(OFF_COMMAND));
    }

    #[test]
    fn test_result_timeout_exceeds_error_delay() {
        let t = RangefinderTimeouts::default();
        assert!(t.result_ms > ERROR_REPLY_DELAY_MS);
        assert_eq!(ACK_FRAME.len() + 1, b"$00023335&".len());
        assert_eq!(CONFIRM_FRAME, &POWER_ON_COMMAND[..POWER_ON_COMMAND.len() - 1]);
    }
}
