//! State machine definition
//!
//! Laser power, angle sampling and result publication are all a function
//! of the current state and an event.

use super::events::Event;

/// Device operating states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    /// Power-on: load calibration, first angle sample
    #[default]
    Init,
    /// Lasers off, waiting for the user
    Idle,
    /// Power-on commands sent, waiting for confirmations
    WaitLaserOn,
    /// Both lasers on, user aiming
    LasersOn,
    /// Only one laser confirmed, user aiming
    OneLaser,
    /// Measurement triggered, waiting for results
    WaitMeasure,
    /// Results in, computing the final length
    Measure,
    /// Result on screen until the display interval elapses
    WaitIdle,
}

impl DeviceState {
    /// Process an event and return the next state
    ///
    /// Pairs not listed leave the state unchanged.
    pub fn transition(self, event: Event) -> Self {
        use DeviceState::*;
        use Event::*;

        match (self, event) {
            // Init transitions
            (Init, StartupComplete) => Idle,

            // Idle transitions
            (Idle, MeasurePressed) => WaitLaserOn,
            (Idle, ModePressed) => Idle, // unit change

            // WaitLaserOn transitions
            (WaitLaserOn, BothConfirmed) => LasersOn,
            (WaitLaserOn, OneConfirmed) => OneLaser,
            (WaitLaserOn, NoneConfirmed) => Idle,

            // Aiming transitions
            (LasersOn | OneLaser, ModePressed) => self, // zero angle
            (LasersOn | OneLaser, MeasurePressed) => WaitMeasure,
            (LasersOn | OneLaser, SensorFault) => Idle,

            // WaitMeasure transitions
            (WaitMeasure, ResultsParsed) => Measure,
            (WaitMeasure, MeasurementFailed) => Idle,

            // Measure transitions
            (Measure, Published) => WaitIdle,

            // WaitIdle transitions
            (WaitIdle, DisplayElapsed) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [DeviceState; 8] = [
        DeviceState::Init,
        DeviceState::Idle,
        DeviceState::WaitLaserOn,
        DeviceState::LasersOn,
        DeviceState::OneLaser,
        DeviceState::WaitMeasure,
        DeviceState::Measure,
        DeviceState::WaitIdle,
    ];

    #[test]
    fn test_init_to_idle() {
        assert_eq!(
            DeviceState::Init.transition(Event::StartupComplete),
            DeviceState::Idle
        );
    }

    #[test]
    fn test_full_measurement_cycle() {
        let mut state = DeviceState::Idle;
        for (event, expected) in [
            (Event::MeasurePressed, DeviceState::WaitLaserOn),
            (Event::BothConfirmed, DeviceState::LasersOn),
            (Event::ModePressed, DeviceState::LasersOn),
            (Event::MeasurePressed, DeviceState::WaitMeasure),
            (Event::ResultsParsed, DeviceState::Measure),
            (Event::Published, DeviceState::WaitIdle),
            (Event::DisplayElapsed, DeviceState::Idle),
        ] {
            state = state.transition(event);
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn test_power_on_outcomes() {
        let s = DeviceState::WaitLaserOn;
        assert_eq!(s.transition(Event::BothConfirmed), DeviceState::LasersOn);
        assert_eq!(s.transition(Event::OneConfirmed), DeviceState::OneLaser);
        assert_eq!(s.transition(Event::NoneConfirmed), DeviceState::Idle);
    }

    #[test]
    fn test_one_laser_measures() {
        let s = DeviceState::OneLaser;
        assert_eq!(s.transition(Event::ModePressed), DeviceState::OneLaser);
        assert_eq!(s.transition(Event::MeasurePressed), DeviceState::WaitMeasure);
    }

    #[test]
    fn test_degraded_paths_return_to_idle() {
        assert_eq!(
            DeviceState::WaitMeasure.transition(Event::MeasurementFailed),
            DeviceState::Idle
        );
        assert_eq!(
            DeviceState::LasersOn.transition(Event::SensorFault),
            DeviceState::Idle
        );
        assert_eq!(
            DeviceState::OneLaser.transition(Event::SensorFault),
            DeviceState::Idle
        );
    }

    #[test]
    fn test_buttons_ignored_while_busy() {
        for state in [
            DeviceState::Init,
            DeviceState::WaitLaserOn,
            DeviceState::WaitMeasure,
            DeviceState::Measure,
            DeviceState::WaitIdle,
        ] {
            assert_eq!(state.transition(Event::MeasurePressed), state);
            assert_eq!(state.transition(Event::ModePressed), state);
        }
    }

    #[test]
    fn test_only_listed_pairs_move() {
        // Every state reacts to a small set of events; everything else is a no-op
        let events = [
            Event::StartupComplete,
            Event::MeasurePressed,
            Event::ModePressed,
            Event::BothConfirmed,
            Event::OneConfirmed,
            Event::NoneConfirmed,
            Event::ResultsParsed,
            Event::MeasurementFailed,
            Event::SensorFault,
            Event::Published,
            Event::DisplayElapsed,
        ];

        let mut moves = 0;
        for state in ALL_STATES {
            for event in events {
                if state.transition(event) != state {
                    moves += 1;
                }
            }
        }
        // Init:1 Idle:1 WaitLaserOn:3 LasersOn:2 OneLaser:2 WaitMeasure:2 Measure:1 WaitIdle:1
        assert_eq!(moves, 13);
    }
}
