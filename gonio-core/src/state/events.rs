//! Events that trigger state transitions

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Lifecycle events
    /// Calibration loaded, peripherals ready
    StartupComplete,

    // Button events
    /// Measure/select button pressed
    MeasurePressed,
    /// Mode button pressed
    ModePressed,

    // Laser power-on outcomes
    /// Both units confirmed power-on
    BothConfirmed,
    /// Exactly one unit confirmed before its deadline
    OneConfirmed,
    /// No unit confirmed
    NoneConfirmed,

    // Measurement outcomes
    /// At least one enabled unit returned a valid result
    ResultsParsed,
    /// No enabled unit returned a valid result
    MeasurementFailed,
    /// Angle sensor transaction failed
    SensorFault,

    // Display cycle
    /// Result snapshot handed to the renderer
    Published,
    /// Result display interval ran out
    DisplayElapsed,
}
