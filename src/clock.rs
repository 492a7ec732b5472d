//! Monotonic Millisecond Clock Definitions

use embassy_time::Instant;

/// A monotonically increasing millisecond counter with 32-bit wraparound.
///
/// The counter wraps from `u32::MAX` back to 0 after roughly 49.7 days, like
/// the millisecond tick counter of most MCU HALs. Implementations must never
/// step backwards other than by wrapping.
///
/// The detector is generic over this trait so tests can substitute a fake
/// clock and step time deterministically.
pub trait MonotonicClock {
    /// Returns the current counter value in milliseconds.
    fn now_ms(&self) -> u32;
}

/// System uptime clock backed by the embassy time driver.
///
/// Truncates [`Instant::now`] to 32 bits, which produces exactly the wrapping
/// behavior the detector expects.
#[derive(Debug, Default, Clone, Copy)]
pub struct Uptime;

impl MonotonicClock for Uptime {
    fn now_ms(&self) -> u32 {
        Instant::now().as_millis() as u32
    }
}

impl<T: MonotonicClock> MonotonicClock for &T {
    fn now_ms(&self) -> u32 {
        T::now_ms(*self)
    }
}
