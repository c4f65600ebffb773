//! Device state machine
//!
//! The transition table is a pure function of the current state and an
//! event. The controller performs the side effects and feeds the
//! resulting events back in.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::DeviceState;
