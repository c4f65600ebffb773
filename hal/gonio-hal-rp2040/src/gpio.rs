//! Button inputs

use embassy_rp::gpio::Input;
use gonio_hal::{Edge, EdgeInput, InputPin};

/// GPIO input with edge interrupts
pub struct ButtonInput<'d> {
    pin: Input<'d>,
}

impl<'d> ButtonInput<'d> {
    pub fn new(pin: Input<'d>) -> Self {
        Self { pin }
    }
}

impl<'d> InputPin for ButtonInput<'d> {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }
}

impl<'d> EdgeInput for ButtonInput<'d> {
    async fn wait_for_edge(&mut self, edge: Edge) {
        match edge {
            Edge::Falling => self.pin.wait_for_falling_edge().await,
            Edge::Rising => self.pin.wait_for_rising_edge().await,
        }
    }
}
