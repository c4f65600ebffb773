//! Measurement controller
//!
//! Owns the device state and every component the measurement cycle
//! touches. [`Controller::step`] runs one control cycle: it consumes the
//! pending button presses, performs the work of the current state, and
//! feeds the outcome to [`DeviceState::transition`].
//!
//! All waits happen inside the drivers and are deadline bounded, so one
//! step always returns.

use gonio_hal::Clock;

use crate::battery::battery_percent;
use crate::config::{CalibrationField, CalibrationRecord, DisplayUnit};
use crate::geometry::Geometry;
use crate::input::{ButtonEvents, Buttons};
use crate::state::{DeviceState, Event};
use crate::traits::{
    AngleSample, AngleSensor, CalibrationStorage, LinkState, Rangefinder, SensorError, Side,
};

/// Controller-level fault indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// No laser confirmed power-on
    LaserFault,
    /// One laser failed; the device carries on with the other
    UnitFaulted(Side),
    /// No enabled laser returned a result
    MeasurementFailed,
    /// Angle sensor transaction failed
    SensorBusFault,
    /// Calibration could not be read or written
    StorageFault,
}

/// Runtime controller settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    /// How long a result stays on screen before returning to idle
    pub display_interval_ms: u32,
    /// Mechanical constants for triangulation
    pub geometry: Geometry,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            display_interval_ms: 3000,
            geometry: Geometry::default(),
        }
    }
}

/// Per-laser status for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnitStatus {
    pub enabled: bool,
    pub last_measurement_m: f64,
    pub link: LinkState,
}

impl UnitStatus {
    fn of<R: Rangefinder>(unit: &R) -> Self {
        Self {
            enabled: unit.is_enabled(),
            last_measurement_m: unit.last_measurement(),
            link: unit.link_state(),
        }
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub state: DeviceState,
    /// Last published length, in meters
    pub measured_length_m: f64,
    /// Latest calibrated angle
    pub angle_deg: f64,
    pub left: UnitStatus,
    pub right: UnitStatus,
    /// Battery charge, 0..=100
    pub battery_percent: u8,
    pub unit: DisplayUnit,
    /// Most recent fault, cleared when a new measurement starts
    pub fault: Option<Fault>,
}

impl Snapshot {
    /// Measured length in the selected display unit
    pub fn display_length(&self) -> f64 {
        self.unit.convert(self.measured_length_m)
    }
}

/// The measurement controller
pub struct Controller<'b, L, R, A, S, C> {
    state: DeviceState,
    left: L,
    right: R,
    angle: A,
    storage: S,
    clock: C,
    buttons: &'b Buttons,
    config: ControllerConfig,
    calibration: CalibrationRecord,
    /// Published result
    measured_length_m: f64,
    /// Result computed in WaitMeasure, published from Measure
    pending_length_m: f64,
    /// Angle sampled when the measurement was triggered
    measurement_angle_deg: f64,
    angle_deg: f64,
    battery_percent: u8,
    left_triggered: bool,
    right_triggered: bool,
    fault: Option<Fault>,
    wait_idle_since_ms: u64,
}

impl<'b, L, R, A, S, C> Controller<'b, L, R, A, S, C>
where
    L: Rangefinder,
    R: Rangefinder,
    A: AngleSensor,
    S: CalibrationStorage,
    C: Clock,
{
    /// Create a controller in the `Init` state
    pub fn new(
        left: L,
        right: R,
        angle: A,
        storage: S,
        clock: C,
        buttons: &'b Buttons,
        config: ControllerConfig,
    ) -> Self {
        Self {
            state: DeviceState::Init,
            left,
            right,
            angle,
            storage,
            clock,
            buttons,
            config,
            calibration: CalibrationRecord::default(),
            measured_length_m: 0.0,
            pending_length_m: 0.0,
            measurement_angle_deg: 0.0,
            angle_deg: 0.0,
            battery_percent: 0,
            left_triggered: false,
            right_triggered: false,
            fault: None,
            wait_idle_since_ms: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Calibration currently in effect
    pub fn calibration(&self) -> &CalibrationRecord {
        &self.calibration
    }

    /// Most recent fault
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// Run one control cycle and return the resulting state
    ///
    /// Presses arriving in a state that has no use for them are consumed
    /// and dropped, so they cannot fire later in an unrelated state.
    pub fn step(&mut self) -> DeviceState {
        let buttons = self.buttons.take();

        let event = match self.state {
            DeviceState::Init => Some(self.startup()),
            DeviceState::Idle => self.idle(buttons),
            DeviceState::WaitLaserOn => Some(self.await_lasers()),
            DeviceState::LasersOn | DeviceState::OneLaser => self.aim(buttons),
            DeviceState::WaitMeasure => Some(self.collect_results()),
            DeviceState::Measure => Some(self.publish()),
            DeviceState::WaitIdle => self.hold_result(),
        };

        if let Some(event) = event {
            self.dispatch(event);
        }
        self.state
    }

    /// Snapshot of everything the renderer shows
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state,
            measured_length_m: self.measured_length_m,
            angle_deg: self.angle_deg,
            left: UnitStatus::of(&self.left),
            right: UnitStatus::of(&self.right),
            battery_percent: self.battery_percent,
            unit: self.calibration.unit,
            fault: self.fault,
        }
    }

    fn dispatch(&mut self, event: Event) {
        let next = self.state.transition(event);
        #[cfg(feature = "defmt")]
        if next != self.state {
            defmt::debug!("{} --{}--> {}", self.state, event, next);
        }
        self.state = next;
    }

    fn startup(&mut self) -> Event {
        self.calibration = match self.storage.load() {
            Ok(record) => record,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Calibration load failed ({}), using defaults", _e);
                self.fault = Some(Fault::StorageFault);
                CalibrationRecord::default()
            }
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Calibration: angle_offset={} unit={}",
            self.calibration.angle_offset,
            self.calibration.unit.name()
        );

        self.angle.set_offset(self.calibration.angle_offset);
        if self.refresh_angle().is_err() {
            self.fault = Some(Fault::SensorBusFault);
        }

        Event::StartupComplete
    }

    fn idle(&mut self, buttons: ButtonEvents) -> Option<Event> {
        if buttons.measure {
            self.fault = None;
            // Both commands go out before blocking on either confirmation
            for result in [self.left.send_power_on(), self.right.send_power_on()] {
                if let Err(_e) = result {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Power-on command failed: {}", _e);
                }
            }
            return Some(Event::MeasurePressed);
        }

        if buttons.mode {
            self.calibration.unit = self.calibration.unit.next();
            self.persist(CalibrationField::Unit);
            return Some(Event::ModePressed);
        }

        None
    }

    fn await_lasers(&mut self) -> Event {
        let left = self.left.await_power_on().is_ok();
        let right = self.right.await_power_on().is_ok();

        match (left, right) {
            (true, true) => Event::BothConfirmed,
            (true, false) => {
                self.right.mark_faulted();
                self.fault = Some(Fault::UnitFaulted(Side::Right));
                Event::OneConfirmed
            }
            (false, true) => {
                self.left.mark_faulted();
                self.fault = Some(Fault::UnitFaulted(Side::Left));
                Event::OneConfirmed
            }
            (false, false) => {
                self.abandon(Fault::LaserFault);
                Event::NoneConfirmed
            }
        }
    }

    fn aim(&mut self, buttons: ButtonEvents) -> Option<Event> {
        if buttons.measure {
            let left = trigger(&mut self.left);
            let right = trigger(&mut self.right);
            self.left_triggered = left == Ok(true);
            self.right_triggered = right == Ok(true);
            for side in [left, right].into_iter().filter_map(Result::err) {
                self.fault = Some(Fault::UnitFaulted(side));
            }

            // Angle is sampled while the modules are measuring
            return match self.refresh_angle() {
                Ok(sample) => {
                    self.measurement_angle_deg = sample.angle_deg;
                    Some(Event::MeasurePressed)
                }
                Err(_) => {
                    self.abandon(Fault::SensorBusFault);
                    Some(Event::SensorFault)
                }
            };
        }

        if buttons.mode {
            return match self.angle.zero() {
                Ok(offset) => {
                    self.calibration.angle_offset = offset;
                    self.persist(CalibrationField::AngleOffset);
                    self.angle_deg = 0.0;
                    Some(Event::ModePressed)
                }
                Err(_) => {
                    self.abandon(Fault::SensorBusFault);
                    Some(Event::SensorFault)
                }
            };
        }

        match self.refresh_angle() {
            Ok(_) => None,
            Err(_) => {
                self.abandon(Fault::SensorBusFault);
                Some(Event::SensorFault)
            }
        }
    }

    fn collect_results(&mut self) -> Event {
        let left = if self.left_triggered {
            self.left.read_result().ok()
        } else {
            None
        };
        let right = if self.right_triggered {
            self.right.read_result().ok()
        } else {
            None
        };

        let geometry = &self.config.geometry;
        let length = match (left, right) {
            (Some(l), Some(r)) => Some(geometry.triangulate(l, r, self.measurement_angle_deg)),
            (Some(d), None) => {
                if self.right_triggered {
                    self.fault = Some(Fault::UnitFaulted(Side::Right));
                }
                Some(geometry.single_range(d))
            }
            (None, Some(d)) => {
                if self.left_triggered {
                    self.fault = Some(Fault::UnitFaulted(Side::Left));
                }
                Some(geometry.single_range(d))
            }
            (None, None) => None,
        };

        self.left_triggered = false;
        self.right_triggered = false;

        match length {
            Some(length) => {
                self.pending_length_m = length;
                Event::ResultsParsed
            }
            None => {
                self.abandon(Fault::MeasurementFailed);
                Event::MeasurementFailed
            }
        }
    }

    fn publish(&mut self) -> Event {
        self.measured_length_m = self.pending_length_m;
        self.wait_idle_since_ms = self.clock.now_ms();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Measured {} m at {} deg",
            self.measured_length_m,
            self.measurement_angle_deg
        );

        Event::Published
    }

    fn hold_result(&mut self) -> Option<Event> {
        let elapsed = self.clock.now_ms().saturating_sub(self.wait_idle_since_ms);
        (elapsed >= self.config.display_interval_ms as u64).then_some(Event::DisplayElapsed)
    }

    fn refresh_angle(&mut self) -> Result<AngleSample, SensorError> {
        let sample = self.angle.sample()?;
        self.angle_deg = sample.angle_deg;
        self.battery_percent = battery_percent(sample.battery_volts);
        Ok(sample)
    }

    fn persist(&mut self, field: CalibrationField) {
        if let Err(_e) = self.storage.save(&self.calibration, field) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Saving {} failed: {}", field, _e);
            self.fault = Some(Fault::StorageFault);
        }
    }

    /// Record a fault and switch off whatever is still powered
    fn abandon(&mut self, fault: Fault) {
        self.fault = Some(fault);
        self.left_triggered = false;
        self.right_triggered = false;

        if self.left.is_enabled() {
            let _ = self.left.power_off();
        }
        if self.right.is_enabled() {
            let _ = self.right.power_off();
        }
    }
}

/// Send the measure command to an enabled unit
///
/// Returns whether the unit was triggered. A unit that rejects the command
/// is faulted and its side returned as the error.
fn trigger<U: Rangefinder>(unit: &mut U) -> Result<bool, Side> {
    if !unit.is_enabled() {
        return Ok(false);
    }
    match unit.trigger_measurement() {
        Ok(()) => Ok(true),
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} measure command failed: {}", unit.side(), _e);
            unit.mark_faulted();
            Err(unit.side())
        }
    }
}
