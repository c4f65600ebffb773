//! Debounced push buttons shared with interrupt context
//!
//! The edge handler is the only writer of a button's state and the
//! controller the only consumer. Marking a press is a single atomic store,
//! consuming it a single atomic swap, so a press landing between two
//! control cycles is seen exactly once.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};

/// Minimum time between two accepted transitions
pub const DEBOUNCE_MS: u32 = 20;

/// One debounced button
pub struct Button {
    /// Set by the edge handler, cleared by the consumer
    pressed: AtomicBool,
    /// Timestamp of the last accepted transition (wrapping ms)
    last_accepted_ms: AtomicU32,
    /// False until the first transition has been accepted
    armed: AtomicBool,
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

impl Button {
    /// Create a released button
    pub const fn new() -> Self {
        Self {
            pressed: AtomicBool::new(false),
            last_accepted_ms: AtomicU32::new(0),
            armed: AtomicBool::new(false),
        }
    }

    /// Record an edge seen at `now_ms`
    ///
    /// Called from the pin's interrupt handler with the logical level read
    /// right after the edge. Returns `true` if the edge was accepted as a
    /// new press, `false` if it was bounce or the button already reads
    /// released.
    pub fn on_edge(&self, now_ms: u32, pressed: bool) -> bool {
        if !pressed {
            return false;
        }
        if self.armed.load(Ordering::Relaxed) {
            let last = self.last_accepted_ms.load(Ordering::Relaxed);
            if now_ms.wrapping_sub(last) < DEBOUNCE_MS {
                return false;
            }
        }

        self.last_accepted_ms.store(now_ms, Ordering::Relaxed);
        self.armed.store(true, Ordering::Relaxed);
        self.pressed.store(true, Ordering::Release);
        true
    }

    /// Read and clear the pressed flag
    pub fn take_pressed(&self) -> bool {
        self.pressed.swap(false, Ordering::Acquire)
    }

}

/// Presses consumed in one control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvents {
    pub measure: bool,
    pub mode: bool,
}

/// The device's two buttons
pub struct Buttons {
    /// Primary action
    pub measure: Button,
    /// Secondary action, meaning depends on state
    pub mode: Button,
}

impl Default for Buttons {
    fn default() -> Self {
        Self::new()
    }
}

impl Buttons {
    pub const fn new() -> Self {
        Self {
            measure: Button::new(),
            mode: Button::new(),
        }
    }

    /// Consume pending presses on both buttons
    pub fn take(&self) -> ButtonEvents {
        ButtonEvents {
            measure: self.measure.take_pressed(),
            mode: self.mode.take_pressed(),
        }
    }
}
