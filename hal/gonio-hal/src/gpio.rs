//! GPIO pin abstractions
//!
//! Buttons are plain digital inputs that can also wait for an edge.

/// Signal edge that triggers an input interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// High to low transition (normally-high button pressed)
    Falling,
    /// Low to high transition
    Rising,
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Input pin with edge-interrupt support
///
/// The returned future completes from the pin's interrupt once the
/// requested edge has been seen.
pub trait EdgeInput: InputPin {
    /// Wait for the given edge
    fn wait_for_edge(&mut self, edge: Edge) -> impl core::future::Future<Output = ()>;
}
