//! State shared between execution contexts
//!
//! Button flags are written from the high-priority executor and consumed
//! by the control loop; snapshots flow from the control loop to the
//! display task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use gonio_core::controller::Snapshot;
use gonio_core::input::Buttons;

/// Debounced button flags
pub static BUTTONS: Buttons = Buttons::new();

/// Latest snapshot for the renderer (older ones are overwritten)
pub static SNAPSHOT: Signal<CriticalSectionRawMutex, Snapshot> = Signal::new();
