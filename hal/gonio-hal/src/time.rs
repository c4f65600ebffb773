//! Monotonic time and deadlines
//!
//! Every wait on external hardware in this firmware is expressed as a
//! [`Deadline`] polled against a [`Clock`], never as an open-ended loop.

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary fixed point (usually boot)
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Point in time after which a wait must give up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    expires_at_ms: u64,
}

impl Deadline {
    /// Deadline `timeout_ms` from now
    pub fn after<C: Clock + ?Sized>(clock: &C, timeout_ms: u32) -> Self {
        Self {
            expires_at_ms: clock.now_ms().saturating_add(timeout_ms as u64),
        }
    }

    /// Check whether the deadline has passed
    pub fn expired<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        clock.now_ms() >= self.expires_at_ms
    }
}
