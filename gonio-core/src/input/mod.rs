//! User input
//!
//! Button edges arrive from interrupt context; the controller consumes
//! them once per control cycle.

pub mod button;

pub use button::{Button, ButtonEvents, Buttons, DEBOUNCE_MS};
