//! Laser rangefinder trait

/// Mounting position of a laser module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    Left,
    Right,
}

/// Protocol sub-state of one module link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No exchange in progress
    #[default]
    Idle,
    /// Command sent, waiting for the acknowledgement
    AwaitingReply,
    /// Acknowledged power-on, waiting for the confirmation
    AwaitingConfirm,
    /// Acknowledged measurement, waiting for the result
    AwaitingMeasurement,
    /// Retries exhausted
    Faulted,
}

/// Error frames reported by the module itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModuleError {
    /// Target closer than the minimum range
    TooClose,
    /// No echo received
    NoEcho,
    /// Echo saturated the receiver
    EchoTooStrong,
    /// Too much ambient light
    AmbientLight,
}

/// Errors from rangefinder operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangefinderError {
    /// Expected frame did not arrive before its deadline
    Timeout,
    /// A frame arrived but was not the expected code
    ProtocolMismatch,
    /// The module reported a measurement error
    Module(ModuleError),
    /// The serial link failed
    Bus,
    /// Operation needs a powered, enabled unit
    NotEnabled,
}

impl From<ModuleError> for RangefinderError {
    fn from(e: ModuleError) -> Self {
        RangefinderError::Module(e)
    }
}

/// One laser rangefinder module
///
/// All waits are bounded: every method that waits for the module returns
/// `Err(RangefinderError::Timeout)` instead of blocking forever.
pub trait Rangefinder {
    /// Which side of the arm this module is mounted on
    fn side(&self) -> Side;

    /// Check if the unit is powered and ready to measure
    fn is_enabled(&self) -> bool;

    /// Last successfully parsed distance in meters
    fn last_measurement(&self) -> f64;

    /// Current protocol sub-state
    fn link_state(&self) -> LinkState;

    /// Send the power-on command without waiting for a reply
    fn send_power_on(&mut self) -> Result<(), RangefinderError>;

    /// Wait for the power-on acknowledgement and confirmation
    ///
    /// On success the unit becomes enabled.
    fn await_power_on(&mut self) -> Result<(), RangefinderError>;

    /// Power the unit on and wait for its confirmation
    fn power_on(&mut self) -> Result<(), RangefinderError> {
        self.send_power_on()?;
        self.await_power_on()
    }

    /// Send the measure command and return immediately
    fn trigger_measurement(&mut self) -> Result<(), RangefinderError>;

    /// Wait for and parse the result of a triggered measurement
    ///
    /// On success the distance is stored as the last measurement and the
    /// unit is disabled. On any error the last measurement is unchanged.
    fn read_result(&mut self) -> Result<f64, RangefinderError>;

    /// Send the off command and disable the unit
    fn power_off(&mut self) -> Result<(), RangefinderError>;

    /// Mark the unit faulted after it failed to respond
    fn mark_faulted(&mut self);
}
