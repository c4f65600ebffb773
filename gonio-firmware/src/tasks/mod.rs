//! Embassy async tasks
//!
//! Button tasks run on the high-priority interrupt executor so a press is
//! recorded even while the control loop blocks on a laser reply.

pub mod buttons;
pub mod display;

pub use buttons::button_task;
pub use display::display_task;
